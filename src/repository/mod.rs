use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crate::domain::*;
use crate::error::Result;

pub mod notice_repository;
pub mod user_repository;

pub use notice_repository::SqliteNoticeRepository;
pub use user_repository::SqliteUserRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: CreateUserRequest) -> Result<User>;
    async fn find_by_uid(&self, uid: &str) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn list(&self, role: Option<Role>, limit: i64, offset: i64) -> Result<Vec<User>>;
    async fn count(&self, role: Option<Role>) -> Result<i64>;
    async fn update(&self, uid: &str, update: UpdateUserRequest) -> Result<User>;
    async fn touch_last_login(&self, uid: &str, at: DateTime<Utc>) -> Result<()>;
    /// Returns `false` when no user had this uid.
    async fn delete(&self, uid: &str) -> Result<bool>;
}

#[async_trait]
pub trait NoticeRepository: Send + Sync {
    async fn create(&self, notice: NewNotice) -> Result<Notice>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Notice>>;
    /// Ordered by priority, then creation time, newest first.
    async fn list(&self, filter: &NoticeFilter, limit: i64, offset: i64) -> Result<Vec<Notice>>;
    async fn count(&self, filter: &NoticeFilter) -> Result<i64>;
    async fn update(&self, id: i64, notice: Notice) -> Result<Notice>;
    /// Returns `false` when no notice had this id.
    async fn delete(&self, id: i64) -> Result<bool>;
    async fn distinct_subcategories(&self, category: Category) -> Result<Vec<String>>;
    /// Approves every pending notice among `ids` in one transaction.
    async fn bulk_approve(
        &self,
        ids: &[i64],
        approved_by: &str,
        at: DateTime<Utc>,
    ) -> Result<BulkApproveOutcome>;
}
