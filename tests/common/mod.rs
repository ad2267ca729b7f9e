#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use noticeboard::{
    api::create_app,
    auth::TokenVerifier,
    config::Settings,
    domain::{Category, CreateUserRequest, NewNotice, Notice, Role, User, VerifiedIdentity},
    error::{AppError, Result},
    repository::{NoticeRepository, UserRepository},
    service::ServiceContext,
};
use serde_json::Value;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tower::ServiceExt;

/// Maps fixed bearer tokens to identities; anything else is rejected.
#[derive(Default)]
pub struct StaticTokenVerifier {
    identities: HashMap<String, VerifiedIdentity>,
}

impl StaticTokenVerifier {
    pub fn with(mut self, token: &str, uid: &str, email: Option<&str>, name: Option<&str>) -> Self {
        self.identities.insert(
            token.to_string(),
            VerifiedIdentity {
                uid: uid.to_string(),
                email: email.map(str::to_string),
                name: name.map(str::to_string),
            },
        );
        self
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity> {
        self.identities
            .get(token)
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Invalid authentication token".to_string()))
    }
}

pub const ADMIN_TOKEN: &str = "admin-token";
pub const STUDENT_TOKEN: &str = "student-token";
pub const FACULTY_TOKEN: &str = "faculty-token";
pub const NEWCOMER_TOKEN: &str = "newcomer-token";

pub async fn test_pool() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await?;

    Ok(pool)
}

pub struct TestApp {
    pub router: Router,
    pub context: Arc<ServiceContext>,
}

impl TestApp {
    /// Full router over a fresh database with an admin, a faculty member and a
    /// student already registered. `newcomer-token` belongs to nobody yet.
    pub async fn spawn() -> anyhow::Result<Self> {
        let pool = test_pool().await?;

        let verifier = StaticTokenVerifier::default()
            .with(ADMIN_TOKEN, "admin-1", Some("admin@uni.edu"), Some("Ada Admin"))
            .with(FACULTY_TOKEN, "faculty-1", Some("faculty@uni.edu"), Some("Fay Faculty"))
            .with(STUDENT_TOKEN, "student-1", Some("student@uni.edu"), Some("Sam Student"))
            .with(NEWCOMER_TOKEN, "newcomer-1", Some("new.comer@uni.edu"), None)
            .with("no-email-token", "anon-1", None, None);

        let context = Arc::new(ServiceContext::with_sqlite(pool, Arc::new(verifier)));

        for (uid, email, name, role) in [
            ("admin-1", "admin@uni.edu", "Ada Admin", Role::Admin),
            ("faculty-1", "faculty@uni.edu", "Fay Faculty", Role::Faculty),
            ("student-1", "student@uni.edu", "Sam Student", Role::Student),
        ] {
            context
                .user_repo
                .create(CreateUserRequest {
                    uid: uid.to_string(),
                    email: email.to_string(),
                    name: name.to_string(),
                    role,
                    department: None,
                })
                .await?;
        }

        let router = create_app(context.clone(), Arc::new(Settings::default()));

        Ok(Self { router, context })
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok((status, value))
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> anyhow::Result<(StatusCode, Value)> {
        self.request(Method::GET, uri, token, None).await
    }

    /// Inserts a notice straight through the repository.
    pub async fn notice(&self, new: NewNotice) -> anyhow::Result<Notice> {
        Ok(self.context.notice_repo.create(new).await?)
    }

    pub async fn user(&self, uid: &str) -> anyhow::Result<Option<User>> {
        Ok(self.context.user_repo.find_by_uid(uid).await?)
    }
}

pub fn new_notice(title: &str) -> NewNotice {
    NewNotice {
        title: title.to_string(),
        content: format!("{} details", title),
        category: Category::Main,
        subcategory: None,
        author_uid: "admin-1".to_string(),
        author_name: "Ada Admin".to_string(),
        priority: 0,
        expires_at: None,
        created_at: Utc::now(),
    }
}

pub fn expiring(title: &str, expires_at: DateTime<Utc>) -> NewNotice {
    NewNotice {
        expires_at: Some(expires_at),
        ..new_notice(title)
    }
}
