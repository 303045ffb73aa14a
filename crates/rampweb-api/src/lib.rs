//! HTTP server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::transactions: transaction list, employee picker, View More, approvals
//! - routes::gateway: JSON endpoint serving the local data gateway

pub mod error;
pub mod routes;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use rampweb_config::Config;
use rampweb_core::{GatewayRef, TransactionsApp};
use std::sync::Arc;
use tokio::net::TcpListener;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub app: Arc<TransactionsApp>,
    pub gateway: GatewayRef,
    pub config: Config,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::gateway::api_gateway;
    use routes::transactions::{
        api_approvals, htmx_employee_select, htmx_transaction_approval, htmx_transactions_list, htmx_view_more,
        page_transactions,
    };

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/approvals", get(api_approvals))
        .route("/api/gateway", post(api_gateway))
        // HTMX page routes
        .route("/", get(page_transactions))
        // HTMX partial routes
        .route("/transactions/list", get(htmx_transactions_list))
        .route("/transactions/more", post(htmx_view_more))
        .route("/transactions/:id/approval", post(htmx_transaction_approval))
        .route("/employees/select", post(htmx_employee_select))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
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
    <title>{} - Rampweb</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        escape_html(title),
        content
    )
}

/// Check if request is from HTMX (partial page update)
fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(headers: &axum::http::HeaderMap, title: &str, inner_content: &str) -> String {
    if is_htmx_request(headers) {
        inner_content.to_string()
    } else {
        base_html(
            title,
            &format!("<main class='max-w-3xl mx-auto p-6'>{}</main>", inner_content),
        )
    }
}

/// Escape text for HTML bodies and single- or double-quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Start the HTTP server
///
/// Binds `server.host:server.port`, serves until Ctrl-C, then drains
/// in-flight requests.
pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.server.bind_address();
    let router = create_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!("Starting Rampweb server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - / (Transactions)");
    log::info!("  - /api/approvals (Approval overlay, JSON)");
    log::info!("  - /api/gateway (Data gateway, JSON)");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}
