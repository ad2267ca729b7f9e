use std::sync::Arc;

use chrono::Utc;

use crate::{
    domain::*,
    error::{AppError, Result},
    repository::{NoticeRepository, UserRepository},
};

#[derive(Debug, Clone, Default)]
pub struct AdminNoticeQuery {
    pub include_expired: bool,
    pub approval_status: Option<ApprovalStatus>,
}

/// Moderation and reporting over the whole store. Callers are admins.
pub struct AdminService {
    user_repo: Arc<dyn UserRepository>,
    notice_repo: Arc<dyn NoticeRepository>,
}

impl AdminService {
    pub fn new(user_repo: Arc<dyn UserRepository>, notice_repo: Arc<dyn NoticeRepository>) -> Self {
        Self { user_repo, notice_repo }
    }

    /// All notices, inactive ones included.
    pub async fn list_notices(&self, query: AdminNoticeQuery, page: PageRequest) -> Result<Page<Notice>> {
        let filter = NoticeFilter {
            visible_at: (!query.include_expired).then(Utc::now),
            approval_status: query.approval_status,
            ..Default::default()
        };

        let total = self.notice_repo.count(&filter).await?;
        let notices = self.notice_repo.list(&filter, page.limit(), page.offset()).await?;

        Ok(Page::new(notices, total, page))
    }

    pub async fn approve(&self, id: i64, admin: &User) -> Result<Notice> {
        let mut notice = self.pending_notice(id).await?;

        let now = Utc::now();
        notice.approval_status = ApprovalStatus::Approved;
        notice.approved_by = Some(admin.uid.clone());
        notice.approved_at = Some(now);
        notice.rejection_reason = None;
        notice.updated_at = now;

        let notice = self.notice_repo.update(id, notice).await?;
        tracing::info!(notice_id = id, admin = %admin.uid, "Approved notice");
        Ok(notice)
    }

    pub async fn reject(&self, id: i64, admin: &User, reason: &str) -> Result<Notice> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::Validation("A rejection reason is required".to_string()));
        }

        let mut notice = self.pending_notice(id).await?;

        notice.approval_status = ApprovalStatus::Rejected;
        notice.rejection_reason = Some(reason.to_string());
        notice.updated_at = Utc::now();

        let notice = self.notice_repo.update(id, notice).await?;
        tracing::info!(notice_id = id, admin = %admin.uid, "Rejected notice");
        Ok(notice)
    }

    /// Approves the pending notices among `ids`. Already-decided notices are
    /// left alone and not counted.
    pub async fn bulk_approve(&self, ids: &[i64], admin: &User) -> Result<BulkApproveOutcome> {
        if ids.is_empty() {
            return Err(AppError::Validation("notice_ids must not be empty".to_string()));
        }

        let outcome = self.notice_repo.bulk_approve(ids, &admin.uid, Utc::now()).await?;
        if outcome.found == 0 {
            return Err(AppError::NotFound("No notices found with provided IDs".to_string()));
        }

        tracing::info!(
            admin = %admin.uid,
            requested = ids.len(),
            approved = outcome.approved,
            "Bulk approved notices"
        );
        Ok(outcome)
    }

    /// Aggregate counts, computed on every call.
    pub async fn stats(&self) -> Result<SystemStats> {
        let by_status = |status| NoticeFilter {
            approval_status: Some(status),
            ..Default::default()
        };

        Ok(SystemStats {
            total_users: self.user_repo.count(None).await?,
            total_notices: self.notice_repo.count(&NoticeFilter::default()).await?,
            pending_notices: self.notice_repo.count(&by_status(ApprovalStatus::Pending)).await?,
            approved_notices: self.notice_repo.count(&by_status(ApprovalStatus::Approved)).await?,
            rejected_notices: self.notice_repo.count(&by_status(ApprovalStatus::Rejected)).await?,
            users_by_role: UsersByRole {
                student: self.user_repo.count(Some(Role::Student)).await?,
                faculty: self.user_repo.count(Some(Role::Faculty)).await?,
                admin: self.user_repo.count(Some(Role::Admin)).await?,
            },
            generated_at: Utc::now(),
        })
    }

    async fn pending_notice(&self, id: i64) -> Result<Notice> {
        let notice = self
            .notice_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notice not found".to_string()))?;

        if notice.approval_status != ApprovalStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Notice has already been {}",
                notice.approval_status
            )));
        }

        Ok(notice)
    }
}
