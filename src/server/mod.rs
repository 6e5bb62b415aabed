// src/server/mod.rs
//! HTTP surface: the profile read endpoint and the distribution trigger

mod handler;

use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

pub use handler::{distribute_handler, profile_handler, AppState};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/profile/{wallet}", get(profile_handler))
        .route(
            "/cron/distribute",
            get(distribute_handler).post(distribute_handler),
        );

    Router::new().nest("/api", api).with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> Result<(), ServerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    log::info!("🌐 Staking API listening on http://{}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::{DistributionError, DistributionReport, PendingDistributor, RewardDistributor};
    use crate::profile::fixtures::{populated_source, FakeSource, WALLET};
    use crate::profile::{ProfileAggregator, ProfileSource};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct FailingDistributor;

    #[async_trait]
    impl RewardDistributor for FailingDistributor {
        async fn distribute(&self) -> Result<DistributionReport, DistributionError> {
            Err(DistributionError("payout wallet empty".to_string()))
        }
    }

    fn state(source: Option<Arc<dyn ProfileSource>>) -> AppState {
        AppState::new(
            Arc::new(ProfileAggregator::new(source)),
            Arc::new(PendingDistributor),
            Some("s3cret".to_string()),
        )
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_profile_malformed_wallet() {
        let (status, body) = send(router(state(None)), get_request("/api/profile/not-a-wallet")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid wallet address");
    }

    #[tokio::test]
    async fn test_profile_without_backend_is_zeroed() {
        let uri = format!("/api/profile/{}", WALLET);
        let (status, body) = send(router(state(None)), get_request(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["wallet"], WALLET);
        assert_eq!(body["totalEarned"], 0.0);
        assert_eq!(body["totalStaked"], 0.0);
        assert_eq!(body["activeStakes"], Value::Array(vec![]));
        assert_eq!(body["payoutHistory"], Value::Array(vec![]));
        assert!(body["createdAt"].is_null());
    }

    #[tokio::test]
    async fn test_profile_with_backend_record() {
        let uri = format!("/api/profile/{}", WALLET);
        let app = router(state(Some(Arc::new(populated_source()))));
        let (status, body) = send(app, get_request(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalStaked"], 2500.0);
        assert_eq!(body["activeStakes"][0]["tier"], "AA");
        assert_eq!(body["payoutHistory"].as_array().unwrap().len(), 50);
    }

    #[tokio::test]
    async fn test_profile_backend_failure() {
        let uri = format!("/api/profile/{}", WALLET);
        let source = FakeSource { fail_user: true, ..Default::default() };
        let (status, body) = send(router(state(Some(Arc::new(source)))), get_request(&uri)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch profile");
        assert!(body["message"].as_str().unwrap().contains("500"));
    }

    #[tokio::test]
    async fn test_profile_rejects_other_methods() {
        let uri = format!("/api/profile/{}", WALLET);
        let request = Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap();
        let response = router(state(None)).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_distribute_requires_bearer_token() {
        let (status, body) = send(router(state(None)), get_request("/api/cron/distribute")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");

        let wrong = Request::builder()
            .uri("/api/cron/distribute")
            .header("Authorization", "Bearer nope")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(router(state(None)), wrong).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_distribute_with_unset_secret_always_rejects() {
        let state = AppState::new(
            Arc::new(ProfileAggregator::new(None)),
            Arc::new(PendingDistributor),
            None,
        );
        let request = Request::builder()
            .uri("/api/cron/distribute")
            .header("Authorization", "Bearer ")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(router(state), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_distribute_accepts_valid_token() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/cron/distribute")
            .header("Authorization", "Bearer s3cret")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(router(state(None)), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Rewards distributed");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_distribute_failure_is_500() {
        let state = AppState::new(
            Arc::new(ProfileAggregator::new(None)),
            Arc::new(FailingDistributor),
            Some("s3cret".to_string()),
        );
        let request = Request::builder()
            .uri("/api/cron/distribute")
            .header("Authorization", "Bearer s3cret")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(router(state), request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to distribute rewards");
        assert!(body["message"].as_str().unwrap().contains("payout wallet empty"));
    }
}
