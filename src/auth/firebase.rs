use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::{
    auth::TokenVerifier,
    config::AuthConfig,
    domain::VerifiedIdentity,
    error::{AppError, Result},
};

const ISSUER_PREFIX: &str = "https://securetoken.google.com/";
const DEFAULT_KEY_TTL: Duration = Duration::from_secs(3600);
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Claims carried by a Firebase ID token that the service cares about.
#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    sub: String,
    iat: i64,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
    ttl: Duration,
}

impl CachedKeys {
    fn is_fresh(&self) -> bool {
        self.fetched_at.elapsed() < self.ttl
    }

    fn refreshed_recently(&self) -> bool {
        self.fetched_at.elapsed() < MIN_REFRESH_INTERVAL
    }
}

/// Verifies Firebase ID tokens against Google's published signing keys.
pub struct FirebaseTokenVerifier {
    project_id: String,
    jwks_url: String,
    leeway_seconds: u64,
    http: reqwest::Client,
    cache: RwLock<Option<CachedKeys>>,
}

impl FirebaseTokenVerifier {
    pub fn new(config: &AuthConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        if config.firebase_project_id.is_empty() {
            tracing::warn!("auth.firebase_project_id is not set; every bearer token will be rejected");
        }

        Ok(Self {
            project_id: config.firebase_project_id.clone(),
            jwks_url: config.jwks_url.clone(),
            leeway_seconds: config.leeway_seconds,
            http,
            cache: RwLock::new(None),
        })
    }

    async fn fetch_keys(&self) -> Result<CachedKeys> {
        tracing::debug!("Fetching identity provider keys from {}", self.jwks_url);

        let response = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AppError::External(format!("Key endpoint unreachable: {}", e)))?
            .error_for_status()
            .map_err(|e| AppError::External(format!("Key endpoint returned an error: {}", e)))?;

        let ttl = response
            .headers()
            .get(CACHE_CONTROL)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_max_age)
            .unwrap_or(DEFAULT_KEY_TTL);

        let keys = response
            .json::<JwkSet>()
            .await
            .map_err(|e| AppError::External(format!("Malformed key set: {}", e)))?;

        Ok(CachedKeys { keys, fetched_at: Instant::now(), ttl })
    }

    /// Returns the decoding key for `kid`. An unknown `kid` refetches the key
    /// set at most once per `MIN_REFRESH_INTERVAL`; a stale set is refetched by
    /// one task while the others wait on the lock.
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey> {
        if let Some(key) = cached_key(self.cache.read().await.as_ref(), kid) {
            return key;
        }

        let mut cache = self.cache.write().await;
        if let Some(key) = cached_key(cache.as_ref(), kid) {
            return key;
        }

        let fresh = self.fetch_keys().await?;
        let key = fresh.keys.find(kid).map(DecodingKey::from_jwk);
        *cache = Some(fresh);

        match key {
            Some(key) => key.map_err(invalid_token),
            None => Err(unknown_signing_key()),
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.project_id.as_str()]);
        validation.set_issuer(&[format!("{}{}", ISSUER_PREFIX, self.project_id)]);
        validation.set_required_spec_claims(&["exp", "sub", "aud", "iss"]);
        validation.leeway = self.leeway_seconds;
        validation
    }

    fn identity_from_claims(&self, claims: FirebaseClaims) -> Result<VerifiedIdentity> {
        if claims.sub.trim().is_empty() {
            return Err(AppError::Unauthorized(
                "Invalid authentication token: empty subject".to_string(),
            ));
        }

        let now = Utc::now().timestamp();
        if claims.iat > now + self.leeway_seconds as i64 {
            return Err(AppError::Unauthorized(
                "Invalid authentication token: issued in the future".to_string(),
            ));
        }

        Ok(VerifiedIdentity {
            uid: claims.sub,
            email: claims.email,
            name: claims.name,
        })
    }
}

#[async_trait]
impl TokenVerifier for FirebaseTokenVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity> {
        if self.project_id.is_empty() {
            return Err(AppError::Internal("Firebase project id is not configured".to_string()));
        }

        let header = decode_header(token).map_err(invalid_token)?;
        if header.alg != Algorithm::RS256 {
            return Err(AppError::Unauthorized(
                "Invalid authentication token: unexpected signing algorithm".to_string(),
            ));
        }
        let kid = header.kid.ok_or_else(|| {
            AppError::Unauthorized("Invalid authentication token: missing key id".to_string())
        })?;

        let key = self.decoding_key(&kid).await?;
        let data = decode::<FirebaseClaims>(token, &key, &self.validation()).map_err(invalid_token)?;

        self.identity_from_claims(data.claims)
    }
}

/// Answers from the cache when it can. `None` means the key set should be
/// refetched: the cache is empty or stale, or it lacks `kid` and was not
/// refreshed within `MIN_REFRESH_INTERVAL`. A set younger than that interval
/// is served even when its max-age has run out.
fn cached_key(cache: Option<&CachedKeys>, kid: &str) -> Option<Result<DecodingKey>> {
    let cached = cache.filter(|c| c.is_fresh() || c.refreshed_recently())?;

    match cached.keys.find(kid) {
        Some(jwk) => Some(DecodingKey::from_jwk(jwk).map_err(invalid_token)),
        None if cached.refreshed_recently() => Some(Err(unknown_signing_key())),
        None => None,
    }
}

fn unknown_signing_key() -> AppError {
    AppError::Unauthorized("Invalid authentication token: unknown signing key".to_string())
}

fn invalid_token(err: jsonwebtoken::errors::Error) -> AppError {
    AppError::Unauthorized(format!("Invalid authentication token: {}", err))
}

/// Extracts `max-age` from a Cache-Control header value.
fn parse_max_age(value: &str) -> Option<Duration> {
    value
        .split(',')
        .map(str::trim)
        .find_map(|directive| directive.strip_prefix("max-age="))
        .and_then(|secs| secs.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
