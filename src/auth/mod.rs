use async_trait::async_trait;

use crate::{domain::VerifiedIdentity, error::Result};

pub mod firebase;

pub use firebase::FirebaseTokenVerifier;

/// Boundary to the external identity provider: turns a bearer credential into
/// the provider's view of the caller, or rejects it with `AppError::Unauthorized`.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity>;
}
