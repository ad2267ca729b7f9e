use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::{
    auth::TokenVerifier,
    domain::*,
    error::{AppError, Result},
    repository::UserRepository,
};

pub struct UserService {
    repo: Arc<dyn UserRepository>,
    verifier: Arc<dyn TokenVerifier>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { repo, verifier }
    }

    /// Resolves a bearer token to an active local user, provisioning the
    /// account on first sight.
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let (user, _) = self.register(token).await?;

        if !user.is_active {
            return Err(AppError::Forbidden("Account is disabled".to_string()));
        }

        Ok(user)
    }

    /// Find-or-create from a bearer token. The flag is `true` when the account
    /// was created by this call.
    pub async fn register(&self, token: &str) -> Result<(User, bool)> {
        let identity = self.verifier.verify(token).await?;
        self.find_or_provision(identity).await
    }

    pub async fn find_or_provision(&self, identity: VerifiedIdentity) -> Result<(User, bool)> {
        if let Some(user) = self.repo.find_by_uid(&identity.uid).await? {
            return Ok((user, false));
        }

        let email = identity
            .email
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| {
                AppError::BadRequest("Identity token does not carry an email address".to_string())
            })?;

        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict(
                "Email is already registered to another account".to_string(),
            ));
        }

        let request = CreateUserRequest {
            uid: identity.uid.clone(),
            name: identity.display_name(),
            email,
            role: Role::Student,
            department: None,
        };

        let user = self.repo.create(request).await?;
        tracing::info!(uid = %user.uid, email = %user.email, "Provisioned user from identity token");

        Ok((user, true))
    }

    /// Returns the caller's profile and records the read as a login heartbeat.
    pub async fn profile(&self, uid: &str) -> Result<User> {
        self.repo.touch_last_login(uid, Utc::now()).await?;
        self.get(uid).await
    }

    /// Self-service update. A non-admin's `role` is dropped from the patch;
    /// the remaining fields still apply.
    pub async fn update_self(&self, caller: &User, mut update: UpdateUserRequest) -> Result<User> {
        update.validate()?;

        if !caller.is_admin() && update.role.take().is_some() {
            tracing::debug!(uid = %caller.uid, "Ignoring self-service role change");
        }

        self.repo.update(&caller.uid, update).await
    }

    pub async fn get(&self, uid: &str) -> Result<User> {
        self.repo
            .find_by_uid(uid)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn list(&self, role: Option<Role>, page: PageRequest) -> Result<Page<User>> {
        let total = self.repo.count(role).await?;
        let users = self.repo.list(role, page.limit(), page.offset()).await?;
        Ok(Page::new(users, total, page))
    }

    /// Explicit creation by an admin.
    pub async fn create(&self, request: CreateUserRequest) -> Result<User> {
        request.validate()?;

        if self.repo.find_by_uid(&request.uid).await?.is_some() {
            return Err(AppError::Conflict("User already registered".to_string()));
        }
        if self.repo.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let user = self.repo.create(request).await?;
        tracing::info!(uid = %user.uid, role = %user.role, "Created user");
        Ok(user)
    }

    pub async fn update(&self, uid: &str, update: UpdateUserRequest) -> Result<User> {
        update.validate()?;
        self.repo.update(uid, update).await
    }

    pub async fn change_role(&self, uid: &str, role: Role) -> Result<User> {
        let update = UpdateUserRequest {
            role: Some(role),
            ..Default::default()
        };
        let user = self.repo.update(uid, update).await?;
        tracing::info!(uid = %user.uid, role = %user.role, "Changed user role");
        Ok(user)
    }

    /// Admins cannot be deleted, not even by other admins.
    pub async fn delete(&self, uid: &str) -> Result<()> {
        let user = self.get(uid).await?;

        if user.is_admin() {
            return Err(AppError::Forbidden("Cannot delete admin users".to_string()));
        }

        self.repo.delete(uid).await?;
        tracing::info!(uid = %uid, "Deleted user");
        Ok(())
    }
}
