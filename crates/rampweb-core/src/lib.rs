//! Transaction review state
//!
//! Leaf-first:
//! - gateway: the remote data source ([`DataGateway`]) and its implementations
//! - fetch: shared response cache and per-component fetch clients
//! - state: employees, paginated and per-employee transaction slots
//! - controller: picks the displayed dataset and owns "View More"
//! - approval: approval overlay persisted through a [`KeyValueStore`]
//!
//! [`TransactionsApp`] wires them together the way the page uses them.

pub mod approval;
pub mod controller;
pub mod error;
pub mod fetch;
pub mod gateway;
pub mod models;
pub mod state;
pub mod storage;

#[cfg(test)]
mod test_support;

use std::sync::{Arc, Mutex, PoisonError};

pub use approval::{display_approval, ApprovalMap, ApprovalOverlay, Hydration};
pub use controller::{TransactionView, ViewController};
pub use error::{CoreError, CoreResult, DefaultErrorLogger, ErrorCode, ErrorContext, ErrorLogger, ErrorSeverity};
pub use fetch::{FetchClient, ResponseCache};
pub use gateway::{build_gateway, DataGateway, Endpoint, GatewayError, GatewayRef, HttpGateway, MockGateway, Request};
pub use models::{Employee, PaginatedResponse, Transaction, EMPTY_EMPLOYEE_ID};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError, StoreRef};

/// Controller and approval overlay over one shared cache
pub struct TransactionsApp {
    controller: ViewController,
    approvals: ApprovalOverlay,
    /// Visible list at the last hydration; outer `None` until the first one
    hydrated_for: Mutex<Option<Option<Vec<Transaction>>>>,
}

impl TransactionsApp {
    pub fn new(gateway: GatewayRef, store: StoreRef, approvals_key: impl Into<String>) -> Self {
        let cache = Arc::new(ResponseCache::new());
        Self {
            controller: ViewController::new(gateway.clone(), cache.clone()),
            approvals: ApprovalOverlay::new(gateway, cache, store, approvals_key),
            hydrated_for: Mutex::new(None),
        }
    }

    pub fn controller(&self) -> &ViewController {
        &self.controller
    }

    pub fn approvals(&self) -> &ApprovalOverlay {
        &self.approvals
    }

    /// Startup: run the one-shot initial load, then hydrate for it.
    ///
    /// The data stays loaded even if hydration fails afterwards.
    pub async fn start(&self) -> CoreResult<()> {
        self.controller.initialize().await?;
        self.sync_approvals()?;
        Ok(())
    }

    /// Re-hydrate the overlay if the visible list changed since last time
    pub fn sync_approvals(&self) -> CoreResult<Option<Hydration>> {
        let visible = self.controller.transactions();
        let mut hydrated_for = self.hydrated_for.lock().unwrap_or_else(PoisonError::into_inner);
        if hydrated_for.as_ref() == Some(&visible) {
            return Ok(None);
        }

        let outcome = self.approvals.hydrate(visible.as_deref())?;
        *hydrated_for = Some(visible);
        Ok(Some(outcome))
    }

    /// Current view plus the overlay to render it with
    pub fn view(&self) -> (TransactionView, ApprovalMap) {
        (self.controller.view(), self.approvals.snapshot())
    }
}
