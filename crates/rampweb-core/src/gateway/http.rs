use super::{DataGateway, GatewayError, Request};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use reqwest::StatusCode;

/// Gateway posting requests to a remote `/api/gateway` endpoint
pub struct HttpGateway {
    http_client: HttpClient,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.into(),
        }
    }

    fn endpoint_url(&self) -> String {
        format!("{}/api/gateway", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl DataGateway for HttpGateway {
    async fn request(&self, request: &Request) -> Result<serde_json::Value, GatewayError> {
        let response = self
            .http_client
            .post(self.endpoint_url())
            .json(request)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("Gateway {} returned {}: {}", request.endpoint(), status, body);
            return Err(if status == StatusCode::BAD_REQUEST {
                GatewayError::InvalidRequest(body)
            } else {
                GatewayError::Status {
                    status: status.as_u16(),
                    body,
                }
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| GatewayError::Serialization(e.to_string()))
    }
}
