//! Settings page

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;

use crate::fields::FormFields;
use crate::{page_response, render_islands, ApiResult, AppState};

/// `GET /settings`
pub async fn page_settings(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Html<String>> {
    let snapshot = state.snapshot().await;
    let content = render_islands(&state, &snapshot, &FormFields::default(), &["favs", "joints", "currencies"])?;
    Ok(Html(page_response(&headers, "Settings", "/settings", &content)))
}

#[cfg(test)]
mod tests {
    use crate::tests::{send, test_state};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    #[tokio::test]
    async fn test_settings_page_mounts_three_islands() {
        let (status, html) = send(test_state(), Request::get("/settings").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(r#"id="favs-form""#));
        assert!(html.contains(r#"id="joints-form""#));
        assert!(html.contains(r#"id="currencies-form""#));
    }
}
