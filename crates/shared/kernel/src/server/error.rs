use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use wine_domain::version::ApiVersion;

/// Request-level failures raised by the pipeline before a controller runs.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("An API version is required, but was not specified.")]
    ApiVersionUnspecified,
    #[error("The HTTP resource that matches the request URI does not support the API version '{requested}'.")]
    InvalidApiVersion { requested: String },
    #[error("The HTTP resource that matches the request URI does not support the API version '{requested}'.")]
    UnsupportedApiVersion { requested: ApiVersion },
    #[error("A valid bearer token is required.")]
    Unauthorized,
}

impl ApiError {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ApiVersionUnspecified => "ApiVersionUnspecified",
            Self::InvalidApiVersion { .. } => "InvalidApiVersion",
            Self::UnsupportedApiVersion { .. } => "UnsupportedApiVersion",
            Self::Unauthorized => "Unauthorized",
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "error": { "code": self.code(), "message": self.to_string() } });
        let mut response = (self.status(), Json(body)).into_response();

        if matches!(self, Self::Unauthorized) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
