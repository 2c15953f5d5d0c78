use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::error::Result;
use crate::preview::{Details, detail_url, render};
use crate::state::AppState;
use crate::upstream::discogs_headers;

// GET /{entity_type}/{discogs_id}/preview
pub async fn preview_handler(
    State(state): State<AppState>,
    Path((entity_type, discogs_id)): Path<(String, String)>,
) -> Response {
    match fetch_preview(&state, &entity_type, &discogs_id).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::warn!(%entity_type, %discogs_id, "Preview failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error fetching preview: {e}"),
            )
                .into_response()
        }
    }
}

async fn fetch_preview(state: &AppState, entity_type: &str, discogs_id: &str) -> Result<String> {
    let url = detail_url(&state.config.api_base, entity_type, discogs_id);
    let response = state
        .gate
        .execute(url, discogs_headers(&state.config.token))
        .await?;
    let details: Details = response.json()?;
    tracing::debug!(entity_type, discogs_id, title = ?details.title, "Discogs details answered");
    render(&details)
}
