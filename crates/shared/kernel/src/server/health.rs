use super::state::ApiState;
use axum::extract::State;
use axum::http::header;
use axum::{Extension, Json, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;
use wine_domain::constants::SYSTEM_TAG;
use wine_domain::version::ApiVersion;

/// Service status; serialized by variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum HealthStatus {
    Healthy,
}

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Status
    pub status: HealthStatus,
    /// Server build version
    pub version: &'static str,
    /// API version the request was served as
    pub api_version: String,
    /// Whether that API version is deprecated
    pub deprecated: bool,
    /// Uptime in seconds
    pub uptime: u64,
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = OK, description = "Healthcheck endpoint", body = HealthResponse)),
    tag = SYSTEM_TAG,
)]
pub(super) async fn health_handler(
    State(state): State<ApiState>,
    Extension(version): Extension<ApiVersion>,
) -> impl IntoResponse {
    let deprecated = state.versions.get(version).is_some_and(|d| d.deprecated);
    let body = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION"),
        api_version: version.to_string(),
        deprecated,
        uptime: state.started_at.elapsed().as_secs(),
    };

    (
        [
            (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(body),
    )
}
