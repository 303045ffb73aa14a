//! View controller
//!
//! Decides whether the displayed list comes from pagination or from the
//! employee filter, and owns the "View More" affordance. It is the only
//! writer of the three state slots.

use crate::error::CoreResult;
use crate::fetch::{FetchClient, ResponseCache};
use crate::gateway::{Endpoint, GatewayRef};
use crate::models::{Employee, Transaction, EMPTY_EMPLOYEE_ID};
use crate::state::{EmployeesState, PaginatedTransactionsState, TransactionsByEmployeeState};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Snapshot of everything a renderer needs
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionView {
    /// `None` while the active dataset is not loaded
    pub transactions: Option<Vec<Transaction>>,
    pub employees: Option<Vec<Employee>>,
    pub picker_items: Vec<Employee>,
    pub filtered_by_employee: bool,
    /// Picker value behind the list; the sentinel when unfiltered
    pub selected_employee_id: String,
    pub has_more_data: bool,
    pub employees_loading: bool,
    pub transactions_loading: bool,
}

impl TransactionView {
    pub fn show_view_more(&self) -> bool {
        self.has_more_data && !self.filtered_by_employee
    }

    pub fn employee_name(&self, employee_id: &str) -> Option<String> {
        self.employees
            .as_ref()?
            .iter()
            .find(|e| e.id == employee_id)
            .map(Employee::full_name)
    }
}

pub struct ViewController {
    employees: EmployeesState,
    paginated: PaginatedTransactionsState,
    by_employee: TransactionsByEmployeeState,
    cache: Arc<ResponseCache>,
    filtered_by_employee: AtomicBool,
    selected_employee_id: Mutex<String>,
    /// Bumped by every selection; a load only touches the filter flag if it is still current
    selection: AtomicU64,
    initialized: AtomicBool,
}

impl ViewController {
    pub fn new(gateway: GatewayRef, cache: Arc<ResponseCache>) -> Self {
        Self {
            employees: EmployeesState::new(FetchClient::new(gateway.clone(), cache.clone())),
            paginated: PaginatedTransactionsState::new(FetchClient::new(gateway.clone(), cache.clone())),
            by_employee: TransactionsByEmployeeState::new(FetchClient::new(gateway, cache.clone())),
            cache,
            filtered_by_employee: AtomicBool::new(false),
            selected_employee_id: Mutex::new(EMPTY_EMPLOYEE_ID.to_string()),
            selection: AtomicU64::new(0),
            initialized: AtomicBool::new(false),
        }
    }

    /// Startup load. Returns true if this call triggered it.
    ///
    /// Runs once; a failed load re-arms it so the next call retries.
    pub async fn initialize(&self) -> CoreResult<bool> {
        if self.employees.is_loaded() || self.employees.loading() {
            return Ok(false);
        }
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Ok(false);
        }

        log::info!("Initial load of employees and transactions");
        if let Err(e) = self.load_all_transactions().await {
            self.initialized.store(false, Ordering::SeqCst);
            return Err(e);
        }
        Ok(true)
    }

    /// Reset to the unfiltered, paginated view: employees first, then page one
    pub async fn load_all_transactions(&self) -> CoreResult<()> {
        let selection = self.next_selection();
        self.filtered_by_employee.store(false, Ordering::SeqCst);
        self.set_selected(EMPTY_EMPLOYEE_ID);

        self.by_employee.invalidate_data();
        self.paginated.invalidate_data();
        let removed = self
            .cache
            .clear_by_endpoint(&[Endpoint::PaginatedTransactions, Endpoint::TransactionsByEmployee]);
        log::debug!("Reset transaction view, dropped {} cached responses", removed);

        self.employees.fetch_all().await?;
        if !self.is_current(selection) {
            log::debug!("Selection changed while loading employees, skipping first page");
            return Ok(());
        }
        self.paginated.fetch_all().await
    }

    pub async fn load_transactions_by_employee(&self, employee_id: &str) -> CoreResult<()> {
        if employee_id == EMPTY_EMPLOYEE_ID {
            return self.load_all_transactions().await;
        }

        let selection = self.next_selection();
        self.paginated.invalidate_data();
        self.by_employee.fetch_by_id(employee_id).await?;

        if self.is_current(selection) {
            self.set_selected(employee_id);
            self.filtered_by_employee.store(true, Ordering::SeqCst);
        } else {
            log::debug!("Ignoring superseded selection of employee {}", employee_id);
        }
        Ok(())
    }

    /// Apply a picker change; `None` means nothing was picked
    pub async fn select_employee(&self, employee: Option<&Employee>) -> CoreResult<()> {
        match employee {
            None => Ok(()),
            Some(employee) if employee.is_empty_employee() => self.load_all_transactions().await,
            Some(employee) => self.load_transactions_by_employee(&employee.id).await,
        }
    }

    /// Picker change by id, as submitted by a form
    pub async fn select_employee_id(&self, employee_id: Option<&str>) -> CoreResult<()> {
        let Some(employee_id) = employee_id else {
            return Ok(());
        };
        if employee_id == EMPTY_EMPLOYEE_ID {
            return self.select_employee(Some(&Employee::empty())).await;
        }
        let employee = self
            .employees
            .data()
            .and_then(|list| list.into_iter().find(|e| e.id == employee_id));
        match employee {
            Some(employee) => self.select_employee(Some(&employee)).await,
            None => {
                log::warn!("Unknown employee selected: {}", employee_id);
                Ok(())
            }
        }
    }

    /// "View More": append the next page when there is one
    pub async fn view_more(&self) -> CoreResult<()> {
        if !self.has_more_data() {
            return Ok(());
        }
        self.paginated.fetch_all().await
    }

    pub fn is_filtered(&self) -> bool {
        self.filtered_by_employee.load(Ordering::SeqCst)
    }

    /// The list currently on screen
    pub fn transactions(&self) -> Option<Vec<Transaction>> {
        if self.is_filtered() {
            self.by_employee.data()
        } else {
            self.paginated.transactions()
        }
    }

    pub fn has_more_data(&self) -> bool {
        !self.is_filtered() && self.paginated.has_next_page()
    }

    pub fn employees(&self) -> Option<Vec<Employee>> {
        self.employees.data()
    }

    /// Employee id the displayed list belongs to, or the sentinel
    pub fn selected_employee_id(&self) -> String {
        self.selected_employee_id.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Picker entries: nothing until employees load, then the sentinel first
    pub fn picker_items(&self) -> Vec<Employee> {
        match self.employees.data() {
            None => vec![],
            Some(employees) => std::iter::once(Employee::empty()).chain(employees).collect(),
        }
    }

    pub fn employees_loading(&self) -> bool {
        self.employees.loading()
    }

    pub fn transactions_loading(&self) -> bool {
        self.paginated.loading()
    }

    pub fn view(&self) -> TransactionView {
        TransactionView {
            transactions: self.transactions(),
            employees: self.employees(),
            picker_items: self.picker_items(),
            filtered_by_employee: self.is_filtered(),
            selected_employee_id: self.selected_employee_id(),
            has_more_data: self.has_more_data(),
            employees_loading: self.employees_loading(),
            transactions_loading: self.transactions_loading(),
        }
    }

    fn set_selected(&self, employee_id: &str) {
        *self.selected_employee_id.lock().unwrap_or_else(PoisonError::into_inner) = employee_id.to_string();
    }

    fn next_selection(&self) -> u64 {
        self.selection.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, selection: u64) -> bool {
        self.selection.load(Ordering::SeqCst) == selection
    }
}
