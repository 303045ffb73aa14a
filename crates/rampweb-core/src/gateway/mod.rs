//! Remote data gateway
//!
//! The application only ever talks to its data source through
//! [`DataGateway::request`]. A [`Request`] names the endpoint and carries its
//! params; the response is untyped JSON that the fetch layer decodes.
//!
//! Implementations:
//! - [`MockGateway`]: in-process seeded dataset
//! - [`HttpGateway`]: JSON over HTTP to another rampweb instance

pub mod http;
pub mod mock;

use crate::error::CoreResult;
use crate::models::{PaginatedRequestParams, RequestByEmployeeParams, SetTransactionApprovalParams};
use async_trait::async_trait;
use rampweb_config::{GatewayConfig, GatewayKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use http::HttpGateway;
pub use mock::{MockGateway, SeedData};

/// Logical datasets exposed by the data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Endpoint {
    Employees,
    PaginatedTransactions,
    TransactionsByEmployee,
    SetTransactionApproval,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Employees => "employees",
            Endpoint::PaginatedTransactions => "paginatedTransactions",
            Endpoint::TransactionsByEmployee => "transactionsByEmployee",
            Endpoint::SetTransactionApproval => "setTransactionApproval",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to the data source: endpoint name plus params
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "endpoint", content = "params", rename_all = "camelCase")]
pub enum Request {
    Employees,
    PaginatedTransactions(PaginatedRequestParams),
    TransactionsByEmployee(RequestByEmployeeParams),
    SetTransactionApproval(SetTransactionApprovalParams),
}

impl Request {
    pub fn paginated_transactions(page: u32) -> Self {
        Request::PaginatedTransactions(PaginatedRequestParams { page: Some(page) })
    }

    pub fn transactions_by_employee(employee_id: impl Into<String>) -> Self {
        Request::TransactionsByEmployee(RequestByEmployeeParams {
            employee_id: employee_id.into(),
        })
    }

    pub fn set_transaction_approval(transaction_id: impl Into<String>, value: bool) -> Self {
        Request::SetTransactionApproval(SetTransactionApprovalParams {
            transaction_id: transaction_id.into(),
            value,
        })
    }

    pub fn endpoint(&self) -> Endpoint {
        match self {
            Request::Employees => Endpoint::Employees,
            Request::PaginatedTransactions(_) => Endpoint::PaginatedTransactions,
            Request::TransactionsByEmployee(_) => Endpoint::TransactionsByEmployee,
            Request::SetTransactionApproval(_) => Endpoint::SetTransactionApproval,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// The data source rejected the request
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// The external data source
#[async_trait]
pub trait DataGateway: Send + Sync {
    async fn request(&self, request: &Request) -> Result<serde_json::Value, GatewayError>;
}

/// Gateway reference type
pub type GatewayRef = Arc<dyn DataGateway>;

/// Build the gateway selected by the configuration
pub fn build_gateway(config: &GatewayConfig) -> CoreResult<GatewayRef> {
    match config.kind {
        GatewayKind::Mock => {
            let gateway = match config.seed_file {
                Some(ref path) => MockGateway::from_file(path, config.page_size)?,
                None => MockGateway::seeded(config.page_size)?,
            };
            log::info!(
                "Using mock gateway: {} employees, {} transactions, page size {}",
                gateway.employee_count(),
                gateway.transaction_count(),
                config.page_size
            );
            Ok(Arc::new(gateway.with_latency(Duration::from_millis(config.latency_ms))))
        }
        GatewayKind::Http => {
            let base_url = config.base_url.clone().unwrap_or_default();
            log::info!("Using HTTP gateway at {}", base_url);
            Ok(Arc::new(HttpGateway::new(base_url)))
        }
    }
}
