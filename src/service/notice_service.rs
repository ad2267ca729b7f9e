use std::sync::Arc;

use chrono::Utc;

use crate::{
    domain::*,
    error::{AppError, Result},
    repository::NoticeRepository,
};

/// Public listing parameters after query-string parsing.
#[derive(Debug, Clone, Default)]
pub struct NoticeQuery {
    pub category: Option<Category>,
    pub subcategory: Option<String>,
    pub search: Option<String>,
    pub include_expired: bool,
}

pub struct NoticeService {
    repo: Arc<dyn NoticeRepository>,
}

impl NoticeService {
    pub fn new(repo: Arc<dyn NoticeRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, query: NoticeQuery, page: PageRequest) -> Result<Page<Notice>> {
        let filter = NoticeFilter {
            active_only: true,
            visible_at: (!query.include_expired).then(Utc::now),
            category: query.category,
            subcategory: query.subcategory.filter(|s| !s.is_empty()),
            search: query.search,
            approval_status: None,
        };

        let total = self.repo.count(&filter).await?;
        let notices = self.repo.list(&filter, page.limit(), page.offset()).await?;

        Ok(Page::new(notices, total, page))
    }

    /// Expired notices are only visible to admins.
    pub async fn get(&self, id: i64, viewer: Option<&User>) -> Result<Notice> {
        let notice = self.find(id).await?;

        let is_admin = viewer.map(User::is_admin).unwrap_or(false);
        if notice.is_expired_at(Utc::now()) && !is_admin {
            return Err(AppError::NotFound("Notice not found".to_string()));
        }

        Ok(notice)
    }

    pub async fn create(&self, author: &User, request: CreateNoticeRequest) -> Result<Notice> {
        request.check()?;

        let notice = self
            .repo
            .create(NewNotice::from_request(request, &author.uid, &author.name))
            .await?;

        tracing::info!(notice_id = notice.id, author = %author.uid, "Created notice");
        Ok(notice)
    }

    /// Partial update; an empty patch returns the notice untouched.
    pub async fn update(&self, id: i64, update: UpdateNoticeRequest) -> Result<Notice> {
        update.check()?;
        let mut notice = self.find(id).await?;

        if update.is_empty() {
            return Ok(notice);
        }

        update.apply(&mut notice);
        notice.ensure_subcategory()?;
        notice.updated_at = Utc::now();

        self.repo.update(id, notice).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound("Notice not found".to_string()));
        }

        tracing::info!(notice_id = id, "Deleted notice");
        Ok(())
    }

    pub async fn subcategories(&self, category: Category) -> Result<Vec<String>> {
        self.repo.distinct_subcategories(category).await
    }

    pub(crate) async fn find(&self, id: i64) -> Result<Notice> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notice not found".to_string()))
    }
}
