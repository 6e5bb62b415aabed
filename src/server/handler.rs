use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;

use crate::distribution::RewardDistributor;
use crate::profile::{ProfileAggregator, ProfileError};

/// Shared state for the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<ProfileAggregator>,
    pub distributor: Arc<dyn RewardDistributor>,
    pub cron_secret: Option<String>,
}

impl AppState {
    pub fn new(
        profiles: Arc<ProfileAggregator>,
        distributor: Arc<dyn RewardDistributor>,
        cron_secret: Option<String>,
    ) -> Self {
        Self {
            profiles,
            distributor,
            cron_secret,
        }
    }

    fn is_authorized(&self, headers: &HeaderMap) -> bool {
        let Some(secret) = self.cron_secret.as_deref() else {
            return false;
        };
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .is_some_and(|token| token == secret)
    }
}

/// GET /api/profile/{wallet}
pub async fn profile_handler(
    State(state): State<AppState>,
    Path(wallet): Path<String>,
) -> Response {
    log::debug!("Profile request for {}", wallet);

    match state.profiles.profile(&wallet).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(ProfileError::InvalidWallet(_)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid wallet address" })),
        )
            .into_response(),
        Err(e) => {
            log::error!("❌ Error fetching profile for {}: {}", wallet, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to fetch profile",
                    "message": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

/// GET|POST /api/cron/distribute
pub async fn distribute_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !state.is_authorized(&headers) {
        log::warn!("⚠️ Rejected unauthorized distribution trigger");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized" })),
        )
            .into_response();
    }

    match state.distributor.distribute().await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => {
            log::error!("❌ Error distributing rewards: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to distribute rewards",
                    "message": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}
