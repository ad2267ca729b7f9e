use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{SqlitePool, FromRow};

use crate::{
    domain::{CreateUserRequest, Role, UpdateUserRequest, User},
    error::{AppError, Result},
    repository::UserRepository,
};

// Database row struct that matches SQLite schema
#[derive(FromRow)]
struct UserRow {
    uid: String,
    email: String,
    name: String,
    role: String,
    department: Option<String>,
    is_active: i32,
    created_at: NaiveDateTime,
    last_login: Option<NaiveDateTime>,
}

const USER_COLUMNS: &str =
    "uid, email, name, role, department, is_active, created_at, last_login";

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: UserRow) -> Result<User> {
        Ok(User {
            uid: row.uid,
            email: row.email,
            name: row.name,
            role: row
                .role
                .parse()
                .map_err(|_| AppError::Database(format!("Invalid role: {}", row.role)))?,
            department: row.department,
            is_active: row.is_active != 0,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            last_login: row.last_login.map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
        })
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: CreateUserRequest) -> Result<User> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO users (uid, email, name, role, department, is_active, created_at)
            VALUES (?, ?, ?, ?, ?, 1, ?)
            "#
        )
        .bind(&user.uid)
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(&user.department)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.find_by_uid(&user.uid).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created user".to_string())
        })
    }

    async fn find_by_uid(&self, uid: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE uid = ?",
            USER_COLUMNS
        ))
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn list(&self, role: Option<Role>, limit: i64, offset: i64) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {}
            FROM users
            WHERE (?1 IS NULL OR role = ?1)
            ORDER BY created_at DESC, uid ASC
            LIMIT ?2 OFFSET ?3
            "#,
            USER_COLUMNS
        ))
        .bind(role.map(|r| r.as_str()))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_user)
            .collect()
    }

    async fn count(&self, role: Option<Role>) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE (?1 IS NULL OR role = ?1)"
        )
        .bind(role.map(|r| r.as_str()))
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn update(&self, uid: &str, update: UpdateUserRequest) -> Result<User> {
        let mut user = self
            .find_by_uid(uid)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if update.is_empty() {
            return Ok(user);
        }
        update.apply(&mut user);

        let is_active_int = if user.is_active { 1i32 } else { 0i32 };

        sqlx::query(
            r#"
            UPDATE users
            SET name = ?, role = ?, department = ?, is_active = ?
            WHERE uid = ?
            "#
        )
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(&user.department)
        .bind(is_active_int)
        .bind(uid)
        .execute(&self.pool)
        .await?;

        self.find_by_uid(uid).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated user".to_string())
        })
    }

    async fn touch_last_login(&self, uid: &str, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE users SET last_login = ? WHERE uid = ?")
            .bind(at.naive_utc())
            .bind(uid)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, uid: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE uid = ?")
            .bind(uid)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
