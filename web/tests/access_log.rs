//! Access log output, captured from a thread-local subscriber.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code uses unwrap/expect for brevity

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use phonebook_testing::{test_clock, InMemoryPersonStore};
use phonebook_web::{build_router, AppState, StaticAssets};
use std::io;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Shared buffer the fmt subscriber writes into.
#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    /// Everything from the first access log event on; the pretty body spans lines.
    fn access_lines(&self) -> String {
        let contents = self.contents();
        contents
            .find("phonebook::access")
            .map(|start| contents[start..].to_string())
            .unwrap_or_default()
    }
}

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn app() -> Router {
    let state = AppState::with_clock(Arc::new(InMemoryPersonStore::new()), Arc::new(test_clock()));
    build_router(state, StaticAssets::new("does-not-exist"))
}

/// Run one request with a capturing subscriber installed on this thread.
async fn logged(request: Request<Body>) -> (StatusCode, CapturedLog) {
    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_target(true)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, log)
}

#[tokio::test]
async fn test_rejected_post_is_logged_with_body() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/persons")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name":"Al","number":"123"}"#))
        .unwrap();

    let (status, log) = logged(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let access = log.access_lines();
    assert!(access.contains("phonebook::access"), "{}", log.contents());
    assert!(access.contains("POST /api/persons 400"), "{access}");
    assert!(access.contains(r#""name": "Al""#), "{access}");
    assert!(access.contains(r#""number": "123""#), "{access}");
}

#[tokio::test]
async fn test_unknown_endpoint_is_logged_without_body() {
    let request = Request::builder()
        .uri("/api/nothing-here")
        .body(Body::empty())
        .unwrap();

    let (status, log) = logged(request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let access = log.access_lines();
    assert!(access.contains("GET /api/nothing-here 404"), "{}", log.contents());
    assert!(!access.contains("\"name\""), "{access}");
}
