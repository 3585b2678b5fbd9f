//! Import page

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;

use crate::fields::FormFields;
use crate::{page_response, render_islands, ApiResult, AppState};

/// `GET /import`
pub async fn page_import(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Html<String>> {
    let snapshot = state.snapshot().await;
    let content = render_islands(&state, &snapshot, &FormFields::default(), &["import"])?;
    Ok(Html(page_response(&headers, "Import", "/import", &content)))
}
