//! Request pipeline stages that run before routing.
//!
//! Stages, outermost first:
//!
//! 1. [`serve_static`]: `GET`/`HEAD` requests naming a file under the asset
//!    directory are answered from disk and never reach the router.
//! 2. [`parse_json_body`]: buffers the body and stores it as [`ParsedBody`].
//!    JSON content types are parsed; anything else yields `{}`.
//! 3. [`cors_layer`]: permissive cross-origin headers and preflight answers.
//! 4. [`AccessLogLayer`]: one log line and a set of metrics per request.
//!
//! # Example
//!
//! ```ignore
//! use axum::{middleware, Router};
//! use phonebook_web::middleware::{access_log_layer, cors_layer, parse_json_body};
//!
//! let app = Router::new()
//!     .route("/api/persons", get(list_persons))
//!     .layer(access_log_layer())
//!     .layer(cors_layer())
//!     .layer(middleware::from_fn(parse_json_body));
//! ```

use crate::error::AppError;
use crate::extractors::ParsedBody;
use axum::{
    body::{Body, HttpBody},
    extract::{Request, State},
    http::{header, HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use http_body_util::LengthLimitError;
use serde_json::{Map, Value};
use std::path::{Component, Path, PathBuf};
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service, ServiceExt};
use tower_http::{cors::CorsLayer, services::ServeFile};

/// Largest request body the parser buffers.
pub const MAX_BODY_BYTES: usize = 100 * 1024;

/// Asset directory served by [`serve_static`].
#[derive(Clone, Debug)]
pub struct StaticAssets {
    root: PathBuf,
}

impl StaticAssets {
    /// Serve files from `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The asset directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a URL path onto the asset directory.
    ///
    /// Segments are percent-decoded. `/` and paths ending in `/` map to
    /// `index.html`. Returns `None` for any path that would escape the
    /// directory, including through encoded separators or dot segments.
    #[must_use]
    pub fn resolve(&self, url_path: &str) -> Option<PathBuf> {
        let mut path = self.root.clone();
        for raw in url_path.split('/') {
            let segment = urlencoding::decode(raw).ok()?;
            match segment.as_ref() {
                "" | "." => {}
                ".." => return None,
                s if s.contains(['/', '\\', '\0']) => return None,
                s => {
                    let mut components = Path::new(s).components();
                    match (components.next(), components.next()) {
                        (Some(Component::Normal(name)), None) => path.push(name),
                        _ => return None,
                    }
                }
            }
        }
        if url_path.is_empty() || url_path.ends_with('/') {
            path.push("index.html");
        }
        Some(path)
    }

    /// Resolve `url_path` to an existing regular file.
    pub async fn lookup(&self, url_path: &str) -> Option<PathBuf> {
        let path = self.resolve(url_path)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Some(path),
            Ok(meta) if meta.is_dir() => {
                let index = path.join("index.html");
                match tokio::fs::metadata(&index).await {
                    Ok(meta) if meta.is_file() => Some(index),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// Answer `GET`/`HEAD` requests for files under the asset directory.
///
/// Everything else, including a missing or unreadable asset directory, falls
/// through to the next stage.
pub async fn serve_static(
    State(assets): State<StaticAssets>,
    req: Request,
    next: Next,
) -> Response {
    if !matches!(*req.method(), Method::GET | Method::HEAD) {
        return next.run(req).await;
    }

    let Some(path) = assets.lookup(req.uri().path()).await else {
        return next.run(req).await;
    };

    tracing::trace!(path = %path.display(), "Serving static asset");
    match ServeFile::new(path).oneshot(req).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Buffer the request body and parse it as JSON when the content type says so.
///
/// Requests without a JSON content type, or with an empty body, are treated
/// as carrying `{}`. The raw bytes are put back so later stages can still read
/// them.
///
/// # Errors
///
/// - 400 `malformatted json` when a JSON body fails to parse
/// - 413 when the body exceeds [`MAX_BODY_BYTES`]
/// - 400 when the body cannot be read for any other reason
pub async fn parse_json_body(req: Request, next: Next) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(body_read_error)?;

    let value = if is_json(&parts.headers) && !bytes.is_empty() {
        serde_json::from_slice(&bytes).map_err(AppError::malformed_body)?
    } else {
        Value::Object(Map::new())
    };

    parts.extensions.insert(ParsedBody(value));
    Ok(next
        .run(Request::from_parts(parts, Body::from(bytes)))
        .await)
}

/// 413 when the size limit tripped, 400 for any other read failure.
fn body_read_error(err: axum::Error) -> AppError {
    let inner = err.into_inner();
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(inner.as_ref());
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return AppError::payload_too_large(e);
        }
        current = e.source();
    }
    AppError::unreadable_body(inner)
}

/// Cross-origin policy: any origin, method and header.
#[must_use]
pub fn cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}

/// Create a layer that writes one access log line per request.
///
/// The line carries method, URL, status, response length, latency and the
/// parsed request body, pretty-printed.
#[must_use]
pub const fn access_log_layer() -> AccessLogLayer {
    AccessLogLayer
}

/// Layer for access logging.
#[derive(Clone, Copy, Debug)]
pub struct AccessLogLayer;

impl<S> Layer<S> for AccessLogLayer {
    type Service = AccessLogMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AccessLogMiddleware { inner }
    }
}

/// Middleware service for access logging.
#[derive(Clone, Debug)]
pub struct AccessLogMiddleware<S> {
    inner: S,
}

impl<S> Service<Request> for AccessLogMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let start = Instant::now();
        let method = req.method().clone();
        let uri = req.uri().clone();
        let body = req
            .extensions()
            .get::<ParsedBody>()
            .and_then(|parsed| serde_json::to_string_pretty(&parsed.0).ok())
            .unwrap_or_default();

        let fut = self.inner.call(req);

        Box::pin(async move {
            let response = fut.await?;
            let elapsed = start.elapsed();
            let status = response.status();
            let content_length = response_length(&response)
                .map_or_else(|| "-".to_string(), |len| len.to_string());

            tracing::info!(
                target: "phonebook::access",
                method = %method,
                url = %uri,
                status = status.as_u16(),
                content_length = %content_length,
                latency_ms = elapsed.as_secs_f64() * 1000.0,
                body = %body,
                "{method} {uri} {} {content_length} - {:.3} ms {body}",
                status.as_u16(),
                elapsed.as_secs_f64() * 1000.0,
            );

            metrics::counter!(
                "phonebook_http_requests_total",
                "method" => method.to_string(),
                "status" => status.as_u16().to_string(),
            )
            .increment(1);
            metrics::histogram!("phonebook_http_request_duration_seconds")
                .record(elapsed.as_secs_f64());

            Ok(response)
        })
    }
}

fn response_length(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .or_else(|| response.body().size_hint().exact())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use axum::{
        http::{Request, StatusCode},
        routing::post,
        Router,
    };

    fn assets() -> StaticAssets {
        StaticAssets::new("/srv/build")
    }

    #[test]
    fn test_resolve_maps_root_to_index() {
        assert_eq!(
            assets().resolve("/"),
            Some(PathBuf::from("/srv/build/index.html"))
        );
    }

    #[test]
    fn test_resolve_nested_path() {
        assert_eq!(
            assets().resolve("/static/js/main.js"),
            Some(PathBuf::from("/srv/build/static/js/main.js"))
        );
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        assert_eq!(assets().resolve("/../etc/passwd"), None);
        assert_eq!(assets().resolve("/static/../../secret"), None);
    }

    #[test]
    fn test_resolve_decodes_segments() {
        assert_eq!(
            assets().resolve("/my%20file.js"),
            Some(PathBuf::from("/srv/build/my file.js"))
        );
    }

    #[test]
    fn test_resolve_rejects_encoded_traversal() {
        assert_eq!(assets().resolve("/%2e%2e/secret"), None);
        assert_eq!(assets().resolve("/static/..%2F..%2Fsecret"), None);
        assert_eq!(assets().resolve("/a%5Cb"), None);
        assert_eq!(assets().resolve("/%FF"), None);
    }

    #[tokio::test]
    async fn test_body_over_limit_is_payload_too_large() {
        let err = axum::body::to_bytes(Body::from(vec![b'x'; 16]), 8)
            .await
            .unwrap_err();
        assert_eq!(body_read_error(err).status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_other_read_failures_are_bad_request() {
        let err = axum::Error::new(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset by peer",
        ));
        let err = body_read_error(err);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), Some("request body could not be read"));
    }

    #[test]
    fn test_is_json_content_types() {
        let mut headers = HeaderMap::new();
        assert!(!is_json(&headers));

        headers.insert(header::CONTENT_TYPE, "application/json; charset=utf-8".parse().unwrap());
        assert!(is_json(&headers));

        headers.insert(header::CONTENT_TYPE, "application/merge-patch+json".parse().unwrap());
        assert!(is_json(&headers));

        headers.insert(header::CONTENT_TYPE, "text/plain".parse().unwrap());
        assert!(!is_json(&headers));
    }

    fn echo_app() -> Router {
        async fn echo(ParsedBody(value): ParsedBody) -> String {
            value.to_string()
        }

        Router::new()
            .route("/echo", post(echo))
            .layer(axum::middleware::from_fn(parse_json_body))
    }

    async fn send(app: Router, content_type: Option<&str>, body: impl Into<Body>) -> (StatusCode, String) {
        let mut builder = Request::builder().method(Method::POST).uri("/echo");
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let response = app
            .oneshot(builder.body(body.into()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_json_body_is_parsed() {
        let (status, body) = send(echo_app(), Some("application/json"), r#"{"name":"Ada"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"name":"Ada"}"#);
    }

    #[tokio::test]
    async fn test_non_json_body_becomes_empty_object() {
        let (status, body) = send(echo_app(), Some("text/plain"), "name=Ada").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "{}");

        let (_, body) = send(echo_app(), None, "").await;
        assert_eq!(body, "{}");
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let oversized = "x".repeat(MAX_BODY_BYTES + 1);
        let (status, body) = send(echo_app(), Some("application/json"), oversized).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body, r#"{"error":"request entity too large"}"#);
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let (status, body) = send(echo_app(), Some("application/json"), "{\"name\":").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, r#"{"error":"malformatted json"}"#);
    }

    #[tokio::test]
    async fn test_access_log_passes_response_through() {
        let app = Router::new()
            .route("/echo", post(|| async { (StatusCode::CREATED, "made") }))
            .layer(access_log_layer());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/echo")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response_length(&response), Some(4));
    }
}
