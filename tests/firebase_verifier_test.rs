use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use axum::{http::header, routing::get, Json, Router};
use noticeboard::{
    auth::{FirebaseTokenVerifier, TokenVerifier},
    config::AuthConfig,
    error::AppError,
};
use serde_json::json;

/// Header `{"alg":"RS256","kid":"forged"}`, empty claims, junk signature.
const FORGED_TOKEN: &str = "eyJhbGciOiJSUzI1NiIsImtpZCI6ImZvcmdlZCJ9.e30.c2ln";

/// Serves an empty key set with the given Cache-Control and counts fetches.
async fn key_endpoint(cache_control: &'static str) -> anyhow::Result<(SocketAddr, Arc<AtomicUsize>)> {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    let app = Router::new().route(
        "/keys",
        get(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                (
                    [(header::CACHE_CONTROL, cache_control)],
                    Json(json!({ "keys": [] })),
                )
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move { axum::serve(listener, app).await });

    Ok((addr, hits))
}

fn verifier(addr: SocketAddr) -> anyhow::Result<FirebaseTokenVerifier> {
    Ok(FirebaseTokenVerifier::new(&AuthConfig {
        firebase_project_id: "demo-project".to_string(),
        jwks_url: format!("http://{}/keys", addr),
        leeway_seconds: 60,
    })?)
}

#[tokio::test]
async fn test_unknown_kid_does_not_refetch_fresh_keys() -> anyhow::Result<()> {
    let (addr, hits) = key_endpoint("public, max-age=3600").await?;
    let verifier = verifier(addr)?;

    for _ in 0..5 {
        let result = verifier.verify(FORGED_TOKEN).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    assert_eq!(hits.load(Ordering::SeqCst), 1);

    Ok(())
}

#[tokio::test]
async fn test_concurrent_cold_start_fetches_once() -> anyhow::Result<()> {
    let (addr, hits) = key_endpoint("public, max-age=3600").await?;
    let verifier = verifier(addr)?;

    let (a, b, c, d) = tokio::join!(
        verifier.verify(FORGED_TOKEN),
        verifier.verify(FORGED_TOKEN),
        verifier.verify(FORGED_TOKEN),
        verifier.verify(FORGED_TOKEN),
    );

    for result in [a, b, c, d] {
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    Ok(())
}

#[tokio::test]
async fn test_zero_max_age_still_throttles_refetch() -> anyhow::Result<()> {
    let (addr, hits) = key_endpoint("max-age=0").await?;
    let verifier = verifier(addr)?;

    for _ in 0..3 {
        let result = verifier.verify(FORGED_TOKEN).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    assert_eq!(hits.load(Ordering::SeqCst), 1);

    Ok(())
}
