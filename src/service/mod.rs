pub mod admin_service;
pub mod notice_service;
pub mod user_service;

use std::sync::Arc;
use sqlx::SqlitePool;
use crate::repository::*;
use crate::auth::TokenVerifier;
use admin_service::AdminService;
use notice_service::NoticeService;
use user_service::UserService;

pub use admin_service::AdminNoticeQuery;
pub use notice_service::NoticeQuery;

pub struct ServiceContext {
    pub user_repo: Arc<dyn UserRepository>,
    pub notice_repo: Arc<dyn NoticeRepository>,
    pub user_service: Arc<UserService>,
    pub notice_service: Arc<NoticeService>,
    pub admin_service: Arc<AdminService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        notice_repo: Arc<dyn NoticeRepository>,
        verifier: Arc<dyn TokenVerifier>,
        db_pool: SqlitePool,
    ) -> Self {
        let user_service = Arc::new(UserService::new(user_repo.clone(), verifier));
        let notice_service = Arc::new(NoticeService::new(notice_repo.clone()));
        let admin_service = Arc::new(AdminService::new(user_repo.clone(), notice_repo.clone()));

        Self {
            user_repo,
            notice_repo,
            user_service,
            notice_service,
            admin_service,
            db_pool,
        }
    }

    /// Wires the SQLite repositories over `db_pool`.
    pub fn with_sqlite(db_pool: SqlitePool, verifier: Arc<dyn TokenVerifier>) -> Self {
        let user_repo = Arc::new(SqliteUserRepository::new(db_pool.clone()));
        let notice_repo = Arc::new(SqliteNoticeRepository::new(db_pool.clone()));
        Self::new(user_repo, notice_repo, verifier, db_pool)
    }
}
