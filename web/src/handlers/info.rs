//! Human-readable summary page.

use crate::{AppState, WebResult};
use axum::{extract::State, response::Html};
use chrono::{DateTime, Utc};

/// Render the info fragment for `count` persons at `now`.
#[must_use]
pub fn render_info(count: usize, now: DateTime<Utc>) -> String {
    format!(
        "<p>This phonebook has {count} people</p> <p>{}</p>",
        now.format("%a %b %d %Y %H:%M:%S GMT%z (Coordinated Universal Time)")
    )
}

/// `GET /info`: number of stored persons and the current server time.
///
/// # Errors
///
/// Fails with a 500 when the store cannot be counted.
pub async fn info(State(state): State<AppState>) -> WebResult<Html<String>> {
    let count = state.store.count().await?;
    Ok(Html(render_info(count, state.clock.now())))
}
