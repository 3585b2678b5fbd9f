//! Settings island round-trips

use axum::extract::State;
use axum::response::Html;

use crate::fields::FormFields;
use crate::views::{settings, ViewContext};
use crate::{ApiResult, AppState};

/// `POST /settings/form`; the hidden `section` names the posting island
pub async fn htmx_settings_form(State(state): State<AppState>, body: String) -> ApiResult<Html<String>> {
    let mut fields = FormFields::from_body(&body);
    let action = fields.action();
    fields.apply_select(&action);

    let snapshot = state.snapshot().await;
    let view = ViewContext::new(&snapshot, &state.config);
    Ok(Html(settings::round_trip(&view, &fields, &action)?.render()))
}
