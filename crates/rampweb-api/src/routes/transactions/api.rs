//! Transactions API endpoints - JSON API and HTMX partial responses
//!
//! Endpoints:
//! - api_approvals: approval overlay (JSON)
//! - htmx_transactions_list: list plus View More (HTML fragment)
//! - htmx_employee_select: apply the picker selection (HTML fragment)
//! - htmx_view_more: append the next page (HTML fragment)
//! - htmx_transaction_approval: toggle one approval, returns its row

use super::page::{render_transaction_row, render_transactions_section};
use crate::error::ApiError;
use crate::AppState;
use axum::extract::{Path, State};
use axum::response::Html;
use axum::{Form, Json};
use rampweb_core::{
    display_approval, ApprovalMap, CoreError, DefaultErrorLogger, ErrorContext, ErrorLogger, TransactionView,
    TransactionsApp,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SelectEmployeeForm {
    pub employee_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApprovalForm {
    pub value: bool,
}

/// Current view with a freshly hydrated overlay.
///
/// If hydration fails the error is logged and rows show their own flags.
pub(crate) fn synced_view(app: &TransactionsApp) -> (TransactionView, ApprovalMap) {
    match app.sync_approvals() {
        Ok(_) => app.view(),
        Err(e) => {
            DefaultErrorLogger.log_error(&e, &ErrorContext::new("sync_approvals"));
            (app.controller().view(), ApprovalMap::new())
        }
    }
}

/// Startup load if it has not happened yet. A failure is logged and leaves
/// the list on its loading placeholder until the next render retries.
pub(crate) async fn ensure_loaded(app: &TransactionsApp) {
    if let Err(e) = app.controller().initialize().await {
        DefaultErrorLogger.log_error(&e, &ErrorContext::new("initialize"));
    }
}

pub(crate) fn report(context: ErrorContext, error: CoreError) -> ApiError {
    DefaultErrorLogger.log_error(&error, &context);
    error.into()
}

fn section(app: &TransactionsApp) -> Html<String> {
    let (view, overlay) = synced_view(app);
    Html(render_transactions_section(&view, &overlay, app.approvals().loading()))
}

/// Approval overlay as `{ transactionId: approved }`
pub async fn api_approvals(state: State<AppState>) -> Json<ApprovalMap> {
    Json(state.app.approvals().snapshot())
}

pub async fn htmx_transactions_list(state: State<AppState>) -> Html<String> {
    ensure_loaded(&state.app).await;
    section(&state.app)
}

/// HTMX: picker change. A missing field is a no-op, an empty id means "All Employees".
pub async fn htmx_employee_select(
    state: State<AppState>,
    Form(form): Form<SelectEmployeeForm>,
) -> Result<Html<String>, ApiError> {
    state
        .app
        .controller()
        .select_employee_id(form.employee_id.as_deref())
        .await
        .map_err(|e| {
            report(
                ErrorContext::new("select_employee").with_data("employee_id", serde_json::json!(form.employee_id)),
                e,
            )
        })?;
    Ok(section(&state.app))
}

/// HTMX: "View More"
pub async fn htmx_view_more(state: State<AppState>) -> Result<Html<String>, ApiError> {
    state
        .app
        .controller()
        .view_more()
        .await
        .map_err(|e| report(ErrorContext::new("view_more"), e))?;
    Ok(section(&state.app))
}

/// HTMX: set one transaction's approval, answer with the re-rendered row
pub async fn htmx_transaction_approval(
    state: State<AppState>,
    Path(transaction_id): Path<String>,
    Form(form): Form<ApprovalForm>,
) -> Result<Html<String>, ApiError> {
    let approvals = state.app.approvals();
    approvals
        .set_transaction_approval(&transaction_id, form.value)
        .await
        .map_err(|e| {
            report(
                ErrorContext::new("set_transaction_approval")
                    .with_data("transaction_id", serde_json::json!(transaction_id))
                    .with_data("value", serde_json::json!(form.value)),
                e,
            )
        })?;

    let (view, overlay) = state.app.view();
    let Some(transaction) = view
        .transactions
        .as_deref()
        .and_then(|list| list.iter().find(|t| t.id == transaction_id))
    else {
        DefaultErrorLogger.log_warning(
            "Approved transaction is not in the current view",
            &ErrorContext::new("set_transaction_approval").with_data("transaction_id", serde_json::json!(transaction_id)),
        );
        return Err(ApiError::NotFound {
            resource: format!("transaction {}", transaction_id),
        });
    };
    let employee_name = view.employee_name(&transaction.employee_id).unwrap_or_default();

    Ok(Html(render_transaction_row(
        transaction,
        &employee_name,
        display_approval(&overlay, transaction),
        approvals.loading(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_router;
    use crate::test_support::{started_state, state, state_with, FlakyGateway, JAMES};
    use std::sync::Arc;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    const SEEDED_TX: &str = "c2b1e6f0-5a01-4d0b-8f6e-000000000002";

    fn form_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("hx-request", "true")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_list_before_start_triggers_initial_load() {
        let state = state();
        let response = create_router(state.clone()).oneshot(get("/transactions/list")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert_eq!(html.matches("transaction-row").count(), 5);
        assert!(html.contains("View More"));
        assert!(state.app.controller().view().employees.is_some());
    }

    #[tokio::test]
    async fn test_page_render_retries_failed_startup() {
        let gateway = Arc::new(FlakyGateway::down());
        let state = state_with(gateway.clone());
        assert!(state.app.start().await.is_err());

        let html = body_text(create_router(state.clone()).oneshot(get("/")).await.unwrap()).await;
        assert!(html.contains("Loading..."));
        assert!(!html.contains("transaction-row"));

        gateway.recover();
        let html = body_text(create_router(state.clone()).oneshot(get("/")).await.unwrap()).await;
        assert_eq!(html.matches("transaction-row").count(), 5);
        assert!(html.contains("James Smith"));
        assert!(html.contains("View More"));
    }

    #[tokio::test]
    async fn test_page_reload_keeps_picker_selection() {
        let state = started_state().await;
        create_router(state.clone())
            .oneshot(form_post("/employees/select", &format!("employee_id={}", JAMES)))
            .await
            .unwrap();

        let html = body_text(create_router(state.clone()).oneshot(get("/")).await.unwrap()).await;
        assert!(html.contains(&format!("<option value='{}' selected>", JAMES)));
        assert!(html.contains("<option value=''>All Employees</option>"));
        assert_eq!(html.matches("transaction-row").count(), 4);
        assert!(!html.contains("View More"));

        create_router(state.clone())
            .oneshot(form_post("/employees/select", "employee_id="))
            .await
            .unwrap();
        let html = body_text(create_router(state).oneshot(get("/")).await.unwrap()).await;
        assert!(html.contains("<option value='' selected>All Employees</option>"));
        assert!(!html.contains(&format!("<option value='{}' selected>", JAMES)));
    }

    #[tokio::test]
    async fn test_view_more_appends_page() {
        let state = started_state().await;
        let router = create_router(state.clone());

        let response = router.oneshot(form_post("/transactions/more", "")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await.matches("transaction-row").count(), 10);
        assert_eq!(state.app.approvals().snapshot().len(), 10);
    }

    #[tokio::test]
    async fn test_select_employee_hides_view_more() {
        let state = started_state().await;

        let response = create_router(state.clone())
            .oneshot(form_post("/employees/select", &format!("employee_id={}", JAMES)))
            .await
            .unwrap();
        let html = body_text(response).await;
        assert_eq!(html.matches("transaction-row").count(), 4);
        assert!(!html.contains("View More"));

        let response = create_router(state)
            .oneshot(form_post("/employees/select", "employee_id="))
            .await
            .unwrap();
        let html = body_text(response).await;
        assert_eq!(html.matches("transaction-row").count(), 5);
        assert!(html.contains("View More"));
    }

    #[tokio::test]
    async fn test_approval_toggle_returns_row_and_persists() {
        let state = started_state().await;

        let response = create_router(state.clone())
            .oneshot(form_post(&format!("/transactions/{}/approval", SEEDED_TX), "value=true"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let row = body_text(response).await;
        assert!(row.starts_with(&format!("<div id='transaction-{}'", SEEDED_TX)));
        assert!(row.contains(" checked"));

        let response = create_router(state).oneshot(get("/api/approvals")).await.unwrap();
        let overlay: ApprovalMap = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(overlay.get(SEEDED_TX), Some(&true));
    }

    #[tokio::test]
    async fn test_approving_row_outside_view_is_not_found() {
        let state = started_state().await;
        let off_page = "c2b1e6f0-5a01-4d0b-8f6e-000000000013";
        let response = create_router(state.clone())
            .oneshot(form_post(&format!("/transactions/{}/approval", off_page), "value=true"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(state.app.approvals().snapshot().get(off_page), Some(&true));
    }

    #[tokio::test]
    async fn test_unknown_transaction_is_bad_request() {
        let state = started_state().await;
        let response = create_router(state.clone())
            .oneshot(form_post("/transactions/missing/approval", "value=true"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("Invalid transaction to approve"));
        assert!(state.app.approvals().snapshot().get("missing").is_none());
    }
}
