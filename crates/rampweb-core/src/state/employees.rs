use super::slot::Slot;
use crate::error::CoreResult;
use crate::fetch::FetchClient;
use crate::gateway::Request;
use crate::models::Employee;

/// Employee list used by the picker
pub struct EmployeesState {
    fetch: FetchClient,
    slot: Slot<Vec<Employee>>,
}

impl EmployeesState {
    pub fn new(fetch: FetchClient) -> Self {
        Self {
            fetch,
            slot: Slot::new(),
        }
    }

    pub fn data(&self) -> Option<Vec<Employee>> {
        self.slot.get()
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.read(|data| data.is_some())
    }

    pub fn loading(&self) -> bool {
        self.fetch.loading()
    }

    /// Fetch (or reuse the cached) employee list; an absent list is empty
    pub async fn fetch_all(&self) -> CoreResult<()> {
        let ticket = self.slot.issue();
        let employees: Option<Vec<Employee>> = self.fetch.fetch_with_cache(Request::Employees).await?;
        let employees = employees.unwrap_or_default();
        let count = employees.len();

        if self.slot.commit(ticket, |_| employees) {
            log::debug!("Loaded {} employees", count);
        }
        Ok(())
    }

    pub fn invalidate_data(&self) {
        self.slot.invalidate();
    }
}
