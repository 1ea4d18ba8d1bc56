use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::{SwaggerUi, Url};
use wine_kernel::docs::versioned_documents;
use wine_kernel::prelude::{ApiController, ApiState};
use wine_kernel::server::{
    api_versioning, reject_version_segment, require_bearer, with_version_segments,
};

#[derive(OpenApi)]
struct ApiDoc;

#[allow(unreachable_pub)]
pub fn init(state: ApiState, controllers: &[ApiController]) -> Router {
    // Separate the controller routes and the unversioned API documentation object
    let (api_routes, api_doc) = controllers
        .iter()
        .fold(OpenApiRouter::with_openapi(ApiDoc::openapi()), |router, controller| {
            router.merge(controller())
        })
        .split_for_parts();

    let documents = versioned_documents(
        &api_doc,
        &state.versions,
        &state.config.docs,
        state.comments.as_ref(),
    );

    // One Swagger UI entry and JSON endpoint per version
    let swagger_ui = documents.into_iter().fold(SwaggerUi::new("/"), |ui, doc| {
        // Built once per process; the UI keeps them for its whole lifetime.
        let label: &'static str = doc.description.label().leak();
        let path: &'static str = doc.description.document_path().leak();
        ui.url(Url::new(label, path), doc.openapi)
    });

    let api_routes = api_routes
        // Outermost runs first: the version is resolved before the token is checked
        .route_layer(from_fn_with_state(state.clone(), require_bearer))
        .route_layer(from_fn_with_state(state.clone(), api_versioning))
        .with_state(state);

    // Version segments only address controller routes
    let docs = Router::<()>::from(swagger_ui).route_layer(from_fn(reject_version_segment));

    let app = Router::new().merge(api_routes).merge(docs);

    with_version_segments(app).layer(TraceLayer::new_for_http())
}
