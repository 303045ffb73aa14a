//! Data models shared by the gateway, the view state and the renderers

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Id of the synthesized "all employees" picker entry
pub const EMPTY_EMPLOYEE_ID: &str = "";

/// An employee as returned by the data gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

impl Employee {
    /// The sentinel meaning "no employee filter selected"
    pub fn empty() -> Self {
        Self {
            id: EMPTY_EMPLOYEE_ID.to_string(),
            first_name: "All".to_string(),
            last_name: "Employees".to_string(),
        }
    }

    pub fn is_empty_employee(&self) -> bool {
        self.id == EMPTY_EMPLOYEE_ID
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A card transaction. Only `approved` ever changes, and only on the data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub employee_id: String,
    pub amount: Decimal,
    pub merchant: String,
    pub date: NaiveDate,
    pub approved: bool,
}

/// One page of results plus the cursor of the following page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub next_page: Option<u32>,
}

impl<T> PaginatedResponse<T> {
    pub fn has_next_page(&self) -> bool {
        self.next_page.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedRequestParams {
    pub page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestByEmployeeParams {
    pub employee_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTransactionApprovalParams {
    pub transaction_id: String,
    pub value: bool,
}
