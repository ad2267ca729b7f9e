use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{QueryBuilder, Sqlite, SqlitePool, FromRow};

use crate::{
    domain::{
        fold_for_search, ApprovalStatus, BulkApproveOutcome, Category, NewNotice, Notice,
        NoticeFilter,
    },
    error::{AppError, Result},
    repository::NoticeRepository,
};

#[derive(FromRow)]
struct NoticeRow {
    id: i64,
    title: String,
    content: String,
    category: String,
    subcategory: Option<String>,
    author_uid: String,
    author_name: String,
    is_active: i32,
    priority: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
    expires_at: Option<NaiveDateTime>,
    approval_status: String,
    rejection_reason: Option<String>,
    approved_by: Option<String>,
    approved_at: Option<NaiveDateTime>,
}

const NOTICE_COLUMNS: &str = "id, title, content, category, subcategory, author_uid, author_name, \
     is_active, priority, created_at, updated_at, expires_at, approval_status, \
     rejection_reason, approved_by, approved_at";

pub struct SqliteNoticeRepository {
    pool: SqlitePool,
}

impl SqliteNoticeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_notice(row: NoticeRow) -> Result<Notice> {
        Ok(Notice {
            id: row.id,
            title: row.title,
            content: row.content,
            category: row
                .category
                .parse()
                .map_err(|_| AppError::Database(format!("Invalid notice category: {}", row.category)))?,
            subcategory: row.subcategory,
            author_uid: row.author_uid,
            author_name: row.author_name,
            is_active: row.is_active != 0,
            priority: row.priority,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
            expires_at: row.expires_at.map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
            approval_status: row.approval_status.parse().map_err(|_| {
                AppError::Database(format!("Invalid approval status: {}", row.approval_status))
            })?,
            rejection_reason: row.rejection_reason,
            approved_by: row.approved_by,
            approved_at: row.approved_at.map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
        })
    }

    /// Appends the WHERE clause for `filter`. Every value goes through a bind.
    fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &NoticeFilter) {
        builder.push(" WHERE 1 = 1");

        if filter.active_only {
            builder.push(" AND is_active = 1");
        }
        if let Some(now) = filter.visible_at {
            builder
                .push(" AND (expires_at IS NULL OR expires_at > ")
                .push_bind(now.naive_utc())
                .push(")");
        }
        if let Some(category) = filter.category {
            builder.push(" AND category = ").push_bind(category.as_str());
        }
        if let Some(subcategory) = &filter.subcategory {
            builder.push(" AND subcategory = ").push_bind(subcategory.clone());
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = like_pattern(search);
            builder
                .push(" AND (search_title LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR search_content LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }
        if let Some(status) = filter.approval_status {
            builder.push(" AND approval_status = ").push_bind(status.as_str());
        }
    }
}

/// Substring pattern over the folded search columns, with LIKE wildcards in
/// the term escaped.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in fold_for_search(term).chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl NoticeRepository for SqliteNoticeRepository {
    async fn create(&self, notice: NewNotice) -> Result<Notice> {
        let created_at = notice.created_at.naive_utc();

        let result = sqlx::query(
            r#"
            INSERT INTO notices (
                title, content, category, subcategory, author_uid, author_name,
                is_active, priority, created_at, updated_at, expires_at, approval_status,
                search_title, search_content
            ) VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(&notice.title)
        .bind(&notice.content)
        .bind(notice.category.as_str())
        .bind(&notice.subcategory)
        .bind(&notice.author_uid)
        .bind(&notice.author_name)
        .bind(notice.priority)
        .bind(created_at)
        .bind(created_at)
        .bind(notice.expires_at.map(|dt| dt.naive_utc()))
        .bind(ApprovalStatus::Pending.as_str())
        .bind(fold_for_search(&notice.title))
        .bind(fold_for_search(&notice.content))
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created notice".to_string())
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Notice>> {
        let row = sqlx::query_as::<_, NoticeRow>(&format!(
            "SELECT {} FROM notices WHERE id = ?",
            NOTICE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_notice).transpose()
    }

    async fn list(&self, filter: &NoticeFilter, limit: i64, offset: i64) -> Result<Vec<Notice>> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM notices", NOTICE_COLUMNS));
        Self::push_filter(&mut builder, filter);
        builder
            .push(" ORDER BY priority DESC, created_at DESC, id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = builder
            .build_query_as::<NoticeRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(Self::row_to_notice)
            .collect()
    }

    async fn count(&self, filter: &NoticeFilter) -> Result<i64> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM notices");
        Self::push_filter(&mut builder, filter);

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn update(&self, id: i64, notice: Notice) -> Result<Notice> {
        let is_active_int = if notice.is_active { 1i32 } else { 0i32 };

        let result = sqlx::query(
            r#"
            UPDATE notices
            SET title = ?, content = ?, category = ?, subcategory = ?,
                is_active = ?, priority = ?, updated_at = ?, expires_at = ?,
                approval_status = ?, rejection_reason = ?, approved_by = ?, approved_at = ?,
                search_title = ?, search_content = ?
            WHERE id = ?
            "#
        )
        .bind(&notice.title)
        .bind(&notice.content)
        .bind(notice.category.as_str())
        .bind(&notice.subcategory)
        .bind(is_active_int)
        .bind(notice.priority)
        .bind(notice.updated_at.naive_utc())
        .bind(notice.expires_at.map(|dt| dt.naive_utc()))
        .bind(notice.approval_status.as_str())
        .bind(&notice.rejection_reason)
        .bind(&notice.approved_by)
        .bind(notice.approved_at.map(|dt| dt.naive_utc()))
        .bind(fold_for_search(&notice.title))
        .bind(fold_for_search(&notice.content))
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Notice not found".to_string()));
        }

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated notice".to_string())
        })
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notices WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn distinct_subcategories(&self, category: Category) -> Result<Vec<String>> {
        let subcategories = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT subcategory
            FROM notices
            WHERE category = ? AND subcategory IS NOT NULL AND subcategory != ''
            ORDER BY subcategory ASC
            "#
        )
        .bind(category.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(subcategories)
    }

    async fn bulk_approve(
        &self,
        ids: &[i64],
        approved_by: &str,
        at: DateTime<Utc>,
    ) -> Result<BulkApproveOutcome> {
        let unique: BTreeSet<i64> = ids.iter().copied().collect();
        let at = at.naive_utc();
        let mut outcome = BulkApproveOutcome { found: 0, approved: 0 };

        let mut tx = self.pool.begin().await?;

        for id in unique {
            let status = sqlx::query_scalar::<_, String>(
                "SELECT approval_status FROM notices WHERE id = ?"
            )
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

            let Some(status) = status else { continue };
            outcome.found += 1;

            if status != ApprovalStatus::Pending.as_str() {
                continue;
            }

            let result = sqlx::query(
                r#"
                UPDATE notices
                SET approval_status = ?, approved_by = ?, approved_at = ?, updated_at = ?
                WHERE id = ? AND approval_status = ?
                "#
            )
            .bind(ApprovalStatus::Approved.as_str())
            .bind(approved_by)
            .bind(at)
            .bind(at)
            .bind(id)
            .bind(ApprovalStatus::Pending.as_str())
            .execute(&mut *tx)
            .await?;

            outcome.approved += result.rows_affected();
        }

        tx.commit().await?;

        Ok(outcome)
    }
}
