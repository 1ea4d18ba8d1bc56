use super::error::ApiError;
use super::state::ApiState;
use axum::Router;
use axum::extract::{Request, State};
use axum::http::uri::PathAndQuery;
use axum::http::{HeaderName, HeaderValue, StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use tower::Layer;
use wine_domain::constants::{DEPRECATED_VERSIONS_HEADER, SUPPORTED_VERSIONS_HEADER};
use wine_domain::version::ApiVersion;

/// Version read from the leading URL segment, stored as a request extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestedVersion {
    Parsed(ApiVersion),
    Invalid(String),
}

/// Wraps `router` so that a leading `/v<major>[.<minor>]` segment is stripped before
/// routing and recorded as [`RequestedVersion`].
///
/// Rewriting has to happen outside the router: layers added with `Router::layer`
/// run after a route has been matched.
pub fn with_version_segments(router: Router) -> Router {
    Router::new().fallback_service(middleware::from_fn(strip_version_segment).layer(router))
}

async fn strip_version_segment(mut req: Request, next: Next) -> Response {
    if let Some((requested, uri)) = split_version_segment(req.uri()) {
        *req.uri_mut() = uri;
        req.extensions_mut().insert(requested);
    }
    next.run(req).await
}

fn split_version_segment(uri: &Uri) -> Option<(RequestedVersion, Uri)> {
    let trimmed = uri.path().strip_prefix('/')?;
    let (segment, rest) = trimmed.split_once('/').unwrap_or((trimmed, ""));

    let mut chars = segment.chars();
    let is_version = matches!(chars.next(), Some('v' | 'V'))
        && chars.next().is_some_and(|c| c.is_ascii_digit());
    if !is_version {
        return None;
    }

    let requested = segment
        .parse::<ApiVersion>()
        .map_or_else(|_| RequestedVersion::Invalid(segment.to_owned()), RequestedVersion::Parsed);

    let path_and_query = match uri.query() {
        Some(query) => format!("/{rest}?{query}"),
        None => format!("/{rest}"),
    };
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query).ok()?);

    Some((requested, Uri::from_parts(parts).ok()?))
}

/// Answers `404` for non-controller routes reached through a version segment
/// (`/v1.0/` must not serve the documentation UI).
pub async fn reject_version_segment(req: Request, next: Next) -> Response {
    if req.extensions().get::<RequestedVersion>().is_some() {
        return StatusCode::NOT_FOUND.into_response();
    }
    next.run(req).await
}

/// Resolves the API version of a matched controller route.
///
/// The resolved [`ApiVersion`] is inserted as a request extension. Supported and
/// deprecated versions are reported on every response, errors included.
pub async fn api_versioning(State(state): State<ApiState>, mut req: Request, next: Next) -> Response {
    let versions = &state.versions;

    let resolved = match req.extensions().get::<RequestedVersion>().cloned() {
        None if versions.assume_default() => Ok(versions.default_version()),
        None => Err(ApiError::ApiVersionUnspecified),
        Some(RequestedVersion::Invalid(requested)) => Err(ApiError::InvalidApiVersion { requested }),
        Some(RequestedVersion::Parsed(version)) if versions.get(version).is_some() => Ok(version),
        Some(RequestedVersion::Parsed(requested)) => {
            Err(ApiError::UnsupportedApiVersion { requested })
        },
    };

    let mut response = match resolved {
        Ok(version) => {
            req.extensions_mut().insert(version);
            next.run(req).await
        },
        Err(e) => e.into_response(),
    };

    if versions.reports_versions() {
        let headers = response.headers_mut();
        let reported = [
            (SUPPORTED_VERSIONS_HEADER, versions.supported_header()),
            (DEPRECATED_VERSIONS_HEADER, versions.deprecated_header()),
        ];
        for (name, value) in reported {
            if let Some(value) = value.and_then(|v| HeaderValue::from_str(&v).ok()) {
                headers.insert(HeaderName::from_static(name), value);
            }
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(raw: &str) -> Option<(RequestedVersion, String)> {
        let uri: Uri = raw.parse().expect("valid uri");
        split_version_segment(&uri).map(|(v, uri)| (v, uri.to_string()))
    }

    #[test]
    fn strips_version_segments() {
        assert_eq!(
            split("/v1.0/health"),
            Some((RequestedVersion::Parsed(ApiVersion::new(1, 0)), "/health".to_owned()))
        );
        assert_eq!(
            split("/V2/grapes/7?lang=de"),
            Some((RequestedVersion::Parsed(ApiVersion::new(2, 0)), "/grapes/7?lang=de".to_owned()))
        );
        assert_eq!(
            split("/v3.1"),
            Some((RequestedVersion::Parsed(ApiVersion::new(3, 1)), "/".to_owned()))
        );
    }

    #[test]
    fn flags_malformed_versions() {
        assert_eq!(
            split("/v1.x/health"),
            Some((RequestedVersion::Invalid("v1.x".to_owned()), "/health".to_owned()))
        );
    }

    #[test]
    fn leaves_other_paths_alone() {
        for raw in ["/", "/health", "/swagger/v1.0/swagger.json", "/varieties", "/v"] {
            assert_eq!(split(raw), None, "{raw} must not be rewritten");
        }
    }

    #[test]
    fn keeps_scheme_and_authority() {
        assert_eq!(
            split("https://example.com/v1.0/health"),
            Some((
                RequestedVersion::Parsed(ApiVersion::new(1, 0)),
                "https://example.com/health".to_owned()
            ))
        );
    }
}
