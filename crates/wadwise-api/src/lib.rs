//! HTTP server rendering wadwise islands with HTMX support
//!
//! Routes are organized into modules:
//! - routes::transactions: Transaction editor page and its island round-trips
//! - routes::accounts: Account overview, selector dialog, account edit and delete
//! - routes::import: Import reconciliation
//! - routes::settings: Favorites, joint accounts and currencies
//!
//! Every island is stateless: a round-trip posts all its fields, the handler
//! rebuilds the reactive form, applies the `action` and answers the
//! re-rendered island.

pub mod balance;
pub mod components;
pub mod error;
pub mod fields;
pub mod html;
pub mod islands;
pub mod routes;
pub mod views;

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{info, warn};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use wadwise_config::Config;
use wadwise_core::{AccountMap, AppData, BalanceSheet, BalanceSource};
use wadwise_utils::generate_id;

pub use balance::HttpBalanceSource;
pub use error::{ApiError, ApiResult};

use fields::FormFields;
use html::Node;
use islands::{IslandContext, MountTable};

/// Bootstrap payload with its derived account map
#[derive(Debug)]
pub struct Snapshot {
    pub data: AppData,
    pub accounts: Arc<AccountMap>,
}

impl Snapshot {
    pub fn new(mut data: AppData) -> Self {
        // Import rows need ids that survive round-trips
        if let Some(import) = data.import.as_mut() {
            for record in import.transactions.iter_mut().filter(|r| r.id.is_none()) {
                record.id = Some(generate_id());
            }
        }
        let accounts = Arc::new(data.account_map());
        Self { data, accounts }
    }
}

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub snapshot: Arc<RwLock<Arc<Snapshot>>>,
    pub balance: Arc<dyn BalanceSource>,
    pub islands: Arc<MountTable>,
}

impl AppState {
    pub fn new(config: Config, data: AppData) -> Self {
        let balance = Arc::new(HttpBalanceSource::new(&config.backend));
        Self {
            config: Arc::new(config),
            snapshot: Arc::new(RwLock::new(Arc::new(Snapshot::new(data)))),
            balance,
            islands: Arc::new(MountTable::standard()),
        }
    }

    pub fn with_balance_source(mut self, balance: Arc<dyn BalanceSource>) -> Self {
        self.balance = balance;
        self
    }

    /// Current snapshot; requests keep theirs even if a reload swaps it
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.read().await.clone()
    }

    pub async fn replace_data(&self, data: AppData) {
        *self.snapshot.write().await = Arc::new(Snapshot::new(data));
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::accounts::{htmx_account_delete, htmx_account_select, page_account_edit, page_account_view};
    use routes::import::{htmx_import_form, import_submit, page_import};
    use routes::settings::{htmx_settings_form, page_settings};
    use routes::transactions::{htmx_transaction_form, page_transaction_edit, transaction_submit};

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/balance/proxy", get(api_balance_proxy))
        .route("/api/reload", post(api_reload))
        // Pages
        .route("/", get(page_account_view))
        .route("/account", get(page_account_view))
        .route("/transaction/edit", get(page_transaction_edit))
        .route("/import", get(page_import))
        .route("/settings", get(page_settings))
        .route("/account/edit", get(page_account_edit))
        // Island round-trips
        .route("/transaction/form", post(htmx_transaction_form))
        .route("/import/form", post(htmx_import_form))
        .route("/settings/form", post(htmx_settings_form))
        .route("/accounts/select", get(htmx_account_select))
        // Native submits, forwarded to the backend
        .route("/transaction/submit", post(transaction_submit))
        .route("/import/submit", post(import_submit))
        .route("/account/edit/delete", post(htmx_account_delete))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Balance of `aid` on `date`, forwarded from the backend
async fn api_balance_proxy(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<BalanceSheet>> {
    let params = FormFields::from_query(&params);
    let aid = params
        .non_empty("aid")
        .ok_or_else(|| ApiError::bad_request("missing aid"))?;
    let date = params
        .date("date")
        .ok_or_else(|| ApiError::bad_request("date must be YYYY-MM-DD"))?;
    let sheet = state.balance.balance(date, aid).await.map_err(|e| ApiError::BadGateway {
        message: e.to_string(),
    })?;
    Ok(Json(sheet))
}

/// Reload the bootstrap payload
async fn api_reload(State(state): State<AppState>) -> Json<serde_json::Value> {
    match AppData::load_configured(&state.config) {
        Ok(data) => {
            let accounts = data.accounts.len();
            state.replace_data(data).await;
            info!("Reloaded bootstrap payload with {} accounts", accounts);
            Json(serde_json::json!({ "success": true, "message": format!("Loaded {} accounts", accounts) }))
        }
        Err(e) => {
            warn!("Reload failed: {}", e);
            Json(serde_json::json!({ "success": false, "message": e.to_string() }))
        }
    }
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - wadwise</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <link href="https://cdn.jsdelivr.net/npm/daisyui@5" rel="stylesheet" type="text/css">
    <script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4"></script>
</head>
<body class="bg-base-200">
    {}
</body>
</html>"#,
        html::escape_text(title),
        content
    )
}

/// Top navigation bar
pub fn nav_bar(current_path: &str) -> Node {
    let links = [
        ("/account", "Accounts"),
        ("/transaction/edit", "Transaction"),
        ("/import", "Import"),
        ("/settings", "Settings"),
        ("/account/edit", "New account"),
    ];
    let items = links
        .iter()
        .map(|(href, label)| {
            html::tag("a", "btn btn-ghost btn-sm")
                .class_if("btn-active", *href == current_path)
                .attr("href", *href)
                .text(*label)
        })
        .collect::<Vec<_>>();
    html::tag("nav", "navbar bg-base-100 shadow-sm gap-1").build(items)
}

pub fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers.get("HX-Request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(headers: &HeaderMap, title: &str, current_path: &str, inner_content: &str) -> String {
    let main = format!(r#"<main class="max-w-3xl mx-auto p-4 flex flex-col gap-4">{}</main>"#, inner_content);
    if is_htmx_request(headers) {
        main
    } else {
        base_html(title, &format!("{}{}", nav_bar(current_path).render(), main))
    }
}

/// Page that forwards a freshly built submission to the backend
pub fn relay_page(backend_url: &str, fields: &[(&'static str, String)]) -> String {
    base_html("Submitting", &components::relay_form(backend_url, fields).render())
}

/// Mount the named islands for a page, followed by the (closed) selector
/// dialog container they share
pub fn render_islands(state: &AppState, snapshot: &Snapshot, params: &FormFields, names: &[&str]) -> ApiResult<String> {
    let ctx = IslandContext {
        snapshot,
        config: &state.config,
        params,
    };
    let islands = state.islands.mount_all(names, &ctx)?;
    Ok(Node::Fragment(vec![islands, views::selector::closed()]).render())
}

pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.listen_addr();
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("Starting wadwise server on http://{}", addr);
    info!("Available routes:");
    info!("  - /account (Account overview)");
    info!("  - /transaction/edit (Transaction editor)");
    info!("  - /import (Import reconciliation)");
    info!("  - /settings (Favorites, joint accounts, currencies)");
    info!("  - /account/edit (Account editor)");
    info!("  - /api/* (JSON API endpoints)");

    axum::serve(listener, router).await?;
    info!("Server stopped gracefully");
    Ok(())
}
