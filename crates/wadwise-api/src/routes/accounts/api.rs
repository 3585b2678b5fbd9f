//! Selector dialog and account delete endpoints

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use log::info;
use wadwise_core::CoreError;

use crate::fields::FormFields;
use crate::views::account_edit::{delete_prompt, delete_url, form_for};
use crate::views::selector::{dialog, SelectorRequest};
use crate::views::ViewContext;
use crate::{ApiResult, AppState};

/// `GET /accounts/select?island&field&value&q&toggle&open&place&special&close`
pub async fn htmx_account_select(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Html<String>> {
    let request = SelectorRequest::from_params(&FormFields::from_query(&params))?;
    let snapshot = state.snapshot().await;
    let view = ViewContext::new(&snapshot, &state.config);
    Ok(Html(dialog(&view, &request).render()))
}

/// `POST /account/edit/delete`
///
/// Without `confirm=yes` this answers the confirmation prompt; `cancel`
/// clears it. A confirmed delete is redirected (keeping the POST) to the
/// backend.
pub async fn htmx_account_delete(State(state): State<AppState>, body: String) -> ApiResult<Response> {
    let fields = FormFields::from_body(&body);
    let snapshot = state.snapshot().await;
    let view = ViewContext::new(&snapshot, &state.config);

    let form = form_for(&view, &fields)?;
    let confirmation = form.request_delete(view.accounts())?;
    if fields.flag("cancel") {
        confirmation.cancel();
        return Ok(Html(String::new()).into_response());
    }

    match confirmation.clone().resolve(fields.value("confirm") == "yes") {
        Ok(request) => {
            info!("Deleting account {}", request.aid);
            Ok(Redirect::temporary(&delete_url(&view, &request)).into_response())
        }
        Err(CoreError::ConfirmationRequired { .. }) => Ok(Html(delete_prompt(&view, &confirmation).render()).into_response()),
        Err(e) => Err(e.into()),
    }
}
