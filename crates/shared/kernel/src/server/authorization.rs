use super::error::ApiError;
use super::state::ApiState;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Rejects requests without an accepted `Authorization: Bearer <token>` header.
pub async fn require_bearer(State(state): State<ApiState>, req: Request, next: Next) -> Response {
    match bearer_token(req.headers()) {
        Some(token) if state.accepts_token(token) => next.run(req).await,
        _ => ApiError::Unauthorized.into_response(),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
