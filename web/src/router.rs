//! Router composition.
//!
//! Assembles the request pipeline around the route table:
//!
//! ```text
//! serve_static -> parse_json_body -> cors -> access log -> routes | unknown_endpoint
//! ```
//!
//! Failures at any stage become responses through [`AppError`](crate::AppError).

use crate::handlers::{health, info, persons, unknown_endpoint};
use crate::middleware::{access_log_layer, cors_layer, parse_json_body, serve_static, StaticAssets};
use crate::AppState;
use axum::{middleware, routing::get, Router};

/// Build the route table without the pipeline stages.
///
/// Unsupported methods on a known path fall through to [`unknown_endpoint`]
/// rather than producing a 405.
#[must_use]
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/persons",
            get(persons::list_persons)
                .post(persons::create_person)
                .fallback(unknown_endpoint),
        )
        .route(
            "/api/persons/:id",
            get(persons::get_person)
                .put(persons::update_person)
                .delete(persons::delete_person)
                .fallback(unknown_endpoint),
        )
        .route("/info", get(info::info).fallback(unknown_endpoint))
        .route("/health", get(health::health_check).fallback(unknown_endpoint))
        .fallback(unknown_endpoint)
}

/// Build the complete application.
///
/// # Example
///
/// ```ignore
/// let app = build_router(AppState::new(store), StaticAssets::new("build"));
/// axum::serve(listener, app).await?;
/// ```
#[must_use]
pub fn build_router(state: AppState, assets: StaticAssets) -> Router {
    routes()
        .with_state(state)
        .layer(access_log_layer())
        .layer(cors_layer())
        .layer(middleware::from_fn(parse_json_body))
        .layer(middleware::from_fn_with_state(assets, serve_static))
}
