use axum::Router;
use axum::http::uri::PathAndQuery;
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{IntoResponse, Redirect, Response};

const DEFAULT_HTTPS_PORT: u16 = 443;

/// Router for the plain HTTP listener: every request gets a `307` to the same
/// host, path and query on `https_port`.
pub fn https_redirect_router(https_port: u16) -> Router {
    Router::new().fallback(move |headers: HeaderMap, uri: Uri| async move {
        redirect_to_https(&headers, &uri, https_port)
    })
}

fn redirect_to_https(headers: &HeaderMap, uri: &Uri, https_port: u16) -> Response {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .map(host_without_port);

    let Some(host) = host.filter(|h| !h.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Missing Host header").into_response();
    };

    let authority = if https_port == DEFAULT_HTTPS_PORT {
        host.to_owned()
    } else {
        format!("{host}:{https_port}")
    };
    let path = uri.path_and_query().map_or("/", PathAndQuery::as_str);

    Redirect::temporary(&format!("https://{authority}{path}")).into_response()
}

/// `example.com:80` -> `example.com`, `[::1]:80` -> `[::1]`.
fn host_without_port(host: &str) -> &str {
    if host.starts_with('[') {
        return host.find(']').map_or(host, |end| &host[..=end]);
    }
    host.rsplit_once(':').map_or(host, |(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[test]
    fn strips_ports() {
        assert_eq!(host_without_port("example.com"), "example.com");
        assert_eq!(host_without_port("example.com:8080"), "example.com");
        assert_eq!(host_without_port("[::1]:8080"), "[::1]");
        assert_eq!(host_without_port("[::1]"), "[::1]");
    }

    #[tokio::test]
    async fn redirects_to_https_port() {
        let req = Request::builder()
            .uri("/v1.0/health?verbose=1")
            .header(header::HOST, "grapes.example:8080")
            .body(Body::empty())
            .expect("request");

        let res = https_redirect_router(8443).oneshot(req).await.expect("response");

        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            res.headers()[header::LOCATION],
            "https://grapes.example:8443/v1.0/health?verbose=1"
        );
    }

    #[tokio::test]
    async fn omits_default_port() {
        let req = Request::builder()
            .uri("/")
            .header(header::HOST, "grapes.example")
            .body(Body::empty())
            .expect("request");

        let res = https_redirect_router(443).oneshot(req).await.expect("response");

        assert_eq!(res.headers()[header::LOCATION], "https://grapes.example/");
    }

    #[tokio::test]
    async fn missing_host_is_a_bad_request() {
        let req = Request::builder().uri("/").body(Body::empty()).expect("request");
        let res = https_redirect_router(443).oneshot(req).await.expect("response");
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
