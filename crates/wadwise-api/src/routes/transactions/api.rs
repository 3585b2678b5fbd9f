//! Transaction island round-trips

use axum::extract::State;
use axum::response::Html;
use log::info;

use crate::fields::FormFields;
use crate::views::{transaction, ViewContext};
use crate::{relay_page, ApiResult, AppState};

/// `POST /transaction/form`
///
/// Entering target mode needs the source balance: the form is restored
/// once to learn the query, the balance is fetched, and the form is
/// restored again to apply it. Reactive state never crosses the await.
pub async fn htmx_transaction_form(State(state): State<AppState>, body: String) -> ApiResult<Html<String>> {
    let mut fields = FormFields::from_body(&body);
    let action = fields.action();
    fields.apply_select(&action);
    let snapshot = state.snapshot().await;

    let query = {
        let view = ViewContext::new(&snapshot, &state.config);
        let form = transaction::restore(&view, &fields);
        transaction::pending_query(&form, &action)
    };
    let balance = match query {
        Some(query) => Some(state.balance.balance(query.date, &query.aid).await),
        None => None,
    };

    let view = ViewContext::new(&snapshot, &state.config);
    Ok(Html(transaction::round_trip(&view, &fields, &action, balance).render()))
}

/// `POST /transaction/submit`: a native submit of the editor
pub async fn transaction_submit(State(state): State<AppState>, body: String) -> ApiResult<Html<String>> {
    let fields = FormFields::from_body(&body);
    let snapshot = state.snapshot().await;
    let view = ViewContext::new(&snapshot, &state.config);
    let (url, submission) = transaction::submission(&view, &fields)?;
    info!("Submitting transaction ({}) to {}", submission.action, url);
    Ok(Html(relay_page(&url, &submission.to_fields())))
}

#[cfg(test)]
mod tests {
    use crate::tests::{form_post, send, test_state};
    use axum::http::StatusCode;

    const SIMPLE: &str = "src=bank&dest=food&amount=12.5&cur=GBP&mode=simple&date=2024-03-01";

    #[tokio::test]
    async fn test_target_mode_fetches_balance() {
        let body = format!("{}&action=mode%3Atarget&target=70", SIMPLE);
        let (status, html) = send(test_state(), form_post("/transaction/form", &body)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(r#"name="mode" value="target""#));
        assert!(html.contains(r#"name="current" value="120""#));
        assert!(html.contains(r#"{&quot;simple&quot;:[&quot;bank&quot;,&quot;food&quot;,50.0,&quot;GBP&quot;]}"#));
    }

    #[tokio::test]
    async fn test_submit_serializes_posted_inputs() {
        let stale = r#"{"simple":["bank","food",12.5,"GBP"]}"#;
        let body = format!(
            "src=bank&dest=food&amount=30&cur=GBP&mode=simple&date=2024-03-01&desc=Lunch&ops={}",
            urlencoding::encode(stale)
        );
        let (status, html) = send(test_state(), form_post("/transaction/submit", &body)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(r#"action="http://127.0.0.1:5000/transaction/edit?dest=food""#));
        assert!(html.contains(r#"{&quot;simple&quot;:[&quot;bank&quot;,&quot;food&quot;,30.0,&quot;GBP&quot;]}"#));
        assert!(!html.contains("12.5"));
        assert!(html.contains(r#"name="desc" value="Lunch""#));
    }

    #[tokio::test]
    async fn test_submit_rejects_form_in_error() {
        let body = "src=food&dest=food&amount=30&cur=GBP&mode=simple&date=2024-03-01";
        let (status, _) = send(test_state(), form_post("/transaction/submit", body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let body = "src=bank&dest=food&amount=30&cur=GBP&mode=simple&action=delete";
        let (status, _) = send(test_state(), form_post("/transaction/submit", body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let body = "src=bank&dest=food&amount=30&cur=GBP&mode=simple&action=explode";
        let (status, _) = send(test_state(), form_post("/transaction/submit", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    const SPLIT: &str = "dest=food&split=1&date=2024-03-01\
        &account.0=bank&amount.0=-10&cur.0=GBP\
        &account.1=cash&amount.1=-5&cur.1=GBP\
        &account.2=food&amount.2=15&cur.2=GBP";

    #[tokio::test]
    async fn test_remove_shifts_split_rows() {
        let body = format!("{}&action=remove%3A0", SPLIT);
        let (status, html) = send(test_state(), form_post("/transaction/form", &body)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(r#"name="account.0" value="cash""#));
        assert!(html.contains(r#"name="amount.0" value="-5""#));
        assert!(html.contains(r#"name="account.1" value="food""#));
        assert!(!html.contains("account.2"));
        assert!(html.contains(r#"value="remove:1""#));
        assert!(!html.contains(r#"value="remove:2""#));
    }

    #[tokio::test]
    async fn test_select_on_split_row() {
        let body = format!("{}&action=select%3Aaccount.1%3Abank", SPLIT);
        let (_, html) = send(test_state(), form_post("/transaction/form", &body)).await;
        assert!(html.contains(r#"name="account.1" value="bank""#));
        assert!(!html.contains(r#"name="account.1" value="cash""#));
        assert!(html.contains(r#"name="account.0" value="bank""#));
    }

    #[tokio::test]
    async fn test_select_action_sets_field() {
        let body = format!("{}&action=select%3Asrc%3Acash", SIMPLE);
        let (_, html) = send(test_state(), form_post("/transaction/form", &body)).await;
        assert!(html.contains(r#"name="src" value="cash""#));
        assert!(html.contains(r#"value="Assets:Cash""#));
        assert!(html.contains(r#"hx-swap-oob="true""#));
    }
}
