//! JSON gateway endpoint
//!
//! Serves the process-local data gateway to remote `HttpGateway` clients.
//! Rejected requests answer 400 with the plain rejection message.

use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rampweb_core::{CoreError, DefaultErrorLogger, ErrorContext, ErrorLogger, GatewayError, Request};

pub async fn api_gateway(state: State<AppState>, Json(request): Json<Request>) -> Response {
    let endpoint = request.endpoint();
    log::debug!("Gateway request: {}", endpoint);

    match state.gateway.request(&request).await {
        Ok(payload) => Json(payload).into_response(),
        Err(source) => {
            let status = match source {
                GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::BAD_GATEWAY,
            };
            let message = source.to_string();
            let context = ErrorContext::new("api_gateway")
                .with_data("request", serde_json::to_value(&request).unwrap_or_default());
            DefaultErrorLogger.log_error(&CoreError::Gateway { endpoint, source }, &context);
            (status, message).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::create_router;
    use crate::test_support::state;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    async fn post_json(body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/gateway")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = create_router(state()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_gateway_serves_pages() {
        let (status, body) = post_json(r#"{"endpoint": "paginatedTransactions", "params": {"page": 2}}"#).await;
        assert_eq!(status, StatusCode::OK);

        let page: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(page["data"].as_array().unwrap().len(), 3);
        assert!(page["nextPage"].is_null());
    }

    #[tokio::test]
    async fn test_gateway_rejection_is_bad_request() {
        let (status, body) = post_json(r#"{"endpoint": "paginatedTransactions", "params": {"page": 9}}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Invalid page 9");

        let (status, body) = post_json(r#"{"endpoint": "transactionsByEmployee", "params": {"employeeId": ""}}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Employee id cannot be empty");
    }
}
