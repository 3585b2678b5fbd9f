//! Import island round-trips

use axum::extract::State;
use axum::response::Html;
use log::info;

use crate::fields::FormFields;
use crate::views::{import, ViewContext};
use crate::{relay_page, ApiResult, AppState};

/// `POST /import/form` with `toggle:<i>`, `similar:<i>` or a selection
pub async fn htmx_import_form(State(state): State<AppState>, body: String) -> ApiResult<Html<String>> {
    let mut fields = FormFields::from_body(&body);
    let action = fields.action();
    fields.apply_select(&action);

    let snapshot = state.snapshot().await;
    let view = ViewContext::new(&snapshot, &state.config);
    Ok(Html(import::round_trip(&view, &fields, &action).render()))
}

/// `POST /import/submit`: a native submit of the reconciliation list
pub async fn import_submit(State(state): State<AppState>, body: String) -> ApiResult<Html<String>> {
    let fields = FormFields::from_body(&body);
    let snapshot = state.snapshot().await;
    let view = ViewContext::new(&snapshot, &state.config);
    let (url, submitted) = import::submission(&view, &fields)?;
    info!("Submitting import to {}", url);
    Ok(Html(relay_page(&url, &submitted)))
}
