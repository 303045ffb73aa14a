use super::slot::Slot;
use crate::error::CoreResult;
use crate::fetch::FetchClient;
use crate::gateway::Request;
use crate::models::Transaction;

/// All transactions of one employee, unpaginated
pub struct TransactionsByEmployeeState {
    fetch: FetchClient,
    slot: Slot<Vec<Transaction>>,
}

impl TransactionsByEmployeeState {
    pub fn new(fetch: FetchClient) -> Self {
        Self {
            fetch,
            slot: Slot::new(),
        }
    }

    pub fn data(&self) -> Option<Vec<Transaction>> {
        self.slot.get()
    }

    pub fn loading(&self) -> bool {
        self.fetch.loading()
    }

    /// Replace the held list with `employee_id`'s transactions.
    ///
    /// Returns false when a newer fetch or an invalidation superseded this one.
    pub async fn fetch_by_id(&self, employee_id: &str) -> CoreResult<bool> {
        let ticket = self.slot.issue();
        let transactions: Vec<Transaction> = self
            .fetch
            .fetch_with_cache(Request::transactions_by_employee(employee_id))
            .await?;

        let applied = self.slot.commit(ticket, |_| transactions);
        if !applied {
            log::debug!("Discarded stale transactions for employee {}", employee_id);
        }
        Ok(applied)
    }

    pub fn invalidate_data(&self) {
        self.slot.invalidate();
    }
}
