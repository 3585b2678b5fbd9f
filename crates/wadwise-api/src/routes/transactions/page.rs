//! Transaction editor page

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Html;

use crate::fields::FormFields;
use crate::{page_response, render_islands, ApiResult, AppState};

/// `GET /transaction/edit?dest&tid&split`
pub async fn page_transaction_edit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Html<String>> {
    let snapshot = state.snapshot().await;
    let params = FormFields::from_query(&params);
    let title = if params.non_empty("tid").is_some() { "Edit transaction" } else { "New transaction" };
    let content = render_islands(&state, &snapshot, &params, &["transaction"])?;
    Ok(Html(page_response(&headers, title, "/transaction/edit", &content)))
}
