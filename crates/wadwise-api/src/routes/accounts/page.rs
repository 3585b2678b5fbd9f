//! Account overview and edit pages

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Html;

use crate::fields::FormFields;
use crate::{page_response, render_islands, ApiResult, AppState};

/// `GET /account/edit?aid&parent`
pub async fn page_account_edit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Html<String>> {
    let snapshot = state.snapshot().await;
    let params = FormFields::from_query(&params);
    let content = render_islands(&state, &snapshot, &params, &["account-edit"])?;
    Ok(Html(page_response(&headers, "Account", "/account/edit", &content)))
}

/// `GET /account?aid`, and `GET /` for the home overview
pub async fn page_account_view(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Html<String>> {
    let snapshot = state.snapshot().await;
    let params = FormFields::from_query(&params);
    let title = params
        .non_empty("aid")
        .and_then(|aid| snapshot.accounts.get(aid))
        .map_or_else(|| "Accounts".to_string(), |account| account.name.clone());
    let content = render_islands(&state, &snapshot, &params, &["account-view"])?;
    Ok(Html(page_response(&headers, &title, "/account", &content)))
}
