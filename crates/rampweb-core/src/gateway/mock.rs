//! In-process data source backed by a seeded employee/transaction dataset

use super::{DataGateway, GatewayError, Request};
use crate::error::{CoreError, CoreResult};
use crate::models::{Employee, PaginatedResponse, Transaction};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

const EMBEDDED_SEED: &str = include_str!("../../data/seed.json");

/// Dataset served by [`MockGateway`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl SeedData {
    pub fn from_json(content: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

pub struct MockGateway {
    data: RwLock<SeedData>,
    page_size: usize,
    latency: Duration,
}

impl MockGateway {
    pub fn new(data: SeedData, page_size: usize) -> Self {
        Self {
            data: RwLock::new(data),
            page_size: page_size.max(1),
            latency: Duration::ZERO,
        }
    }

    /// Gateway over the dataset bundled with the crate
    pub fn seeded(page_size: usize) -> CoreResult<Self> {
        Ok(Self::new(SeedData::from_json(EMBEDDED_SEED)?, page_size))
    }

    pub fn from_file(path: &Path, page_size: usize) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let data = SeedData::from_json(&content).map_err(|e| CoreError::InternalError {
            message: format!("Invalid seed file {}: {}", path.display(), e),
        })?;
        Ok(Self::new(data, page_size))
    }

    /// Delay every response, to make loading states observable
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn employee_count(&self) -> usize {
        self.data.read().unwrap_or_else(PoisonError::into_inner).employees.len()
    }

    pub fn transaction_count(&self) -> usize {
        self.data.read().unwrap_or_else(PoisonError::into_inner).transactions.len()
    }

    fn employees(&self) -> Vec<Employee> {
        self.data.read().unwrap_or_else(PoisonError::into_inner).employees.clone()
    }

    fn transactions_paginated(&self, page: Option<u32>) -> Result<PaginatedResponse<Transaction>, GatewayError> {
        let page = page.ok_or_else(|| GatewayError::InvalidRequest("Page cannot be null".to_string()))?;
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        let total = data.transactions.len();

        let start = page as usize * self.page_size;
        let end = start + self.page_size;
        if start > total {
            return Err(GatewayError::InvalidRequest(format!("Invalid page {}", page)));
        }

        Ok(PaginatedResponse {
            data: data.transactions[start..end.min(total)].to_vec(),
            next_page: if end < total { Some(page + 1) } else { None },
        })
    }

    fn transactions_by_employee(&self, employee_id: &str) -> Result<Vec<Transaction>, GatewayError> {
        if employee_id.is_empty() {
            return Err(GatewayError::InvalidRequest("Employee id cannot be empty".to_string()));
        }

        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        Ok(data
            .transactions
            .iter()
            .filter(|t| t.employee_id == employee_id)
            .cloned()
            .collect())
    }

    fn set_transaction_approval(&self, transaction_id: &str, value: bool) -> Result<(), GatewayError> {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        let transaction = data
            .transactions
            .iter_mut()
            .find(|t| t.id == transaction_id)
            .ok_or_else(|| GatewayError::InvalidRequest("Invalid transaction to approve".to_string()))?;
        transaction.approved = value;
        Ok(())
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, GatewayError> {
    serde_json::to_value(value).map_err(|e| GatewayError::Serialization(e.to_string()))
}

#[async_trait]
impl DataGateway for MockGateway {
    async fn request(&self, request: &Request) -> Result<serde_json::Value, GatewayError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        log::debug!("Mock gateway serving {}", request.endpoint());

        match request {
            Request::Employees => to_json(&self.employees()),
            Request::PaginatedTransactions(params) => to_json(&self.transactions_paginated(params.page)?),
            Request::TransactionsByEmployee(params) => {
                to_json(&self.transactions_by_employee(&params.employee_id)?)
            }
            Request::SetTransactionApproval(params) => {
                self.set_transaction_approval(&params.transaction_id, params.value)?;
                Ok(serde_json::Value::Null)
            }
        }
    }
}
