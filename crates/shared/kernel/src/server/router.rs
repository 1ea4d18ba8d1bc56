use super::health;
use super::state::ApiState;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// A controller: unversioned, documented routes merged into the API router.
///
/// Paths are declared without a version segment; the pipeline serves them under
/// every supported `/v<major>.<minor>` prefix and documents them per version.
pub type ApiController = fn() -> OpenApiRouter<ApiState>;

pub fn system_router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(health::health_handler))
}
