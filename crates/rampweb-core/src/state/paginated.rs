use super::slot::Slot;
use crate::error::CoreResult;
use crate::fetch::FetchClient;
use crate::gateway::Request;
use crate::models::{PaginatedResponse, Transaction};

/// Every page fetched so far, in fetch order, plus the next-page cursor
pub struct PaginatedTransactionsState {
    fetch: FetchClient,
    slot: Slot<PaginatedResponse<Transaction>>,
}

impl PaginatedTransactionsState {
    pub fn new(fetch: FetchClient) -> Self {
        Self {
            fetch,
            slot: Slot::new(),
        }
    }

    pub fn data(&self) -> Option<PaginatedResponse<Transaction>> {
        self.slot.get()
    }

    pub fn transactions(&self) -> Option<Vec<Transaction>> {
        self.slot.read(|data| data.map(|page| page.data.clone()))
    }

    pub fn next_page(&self) -> Option<u32> {
        self.slot.read(|data| data.and_then(|page| page.next_page))
    }

    pub fn has_next_page(&self) -> bool {
        self.slot.read(|data| data.is_some_and(PaginatedResponse::has_next_page))
    }

    pub fn loading(&self) -> bool {
        self.fetch.loading()
    }

    /// Load the first page, or append the next one.
    ///
    /// Once the cursor is exhausted this returns without a request.
    pub async fn fetch_all(&self) -> CoreResult<()> {
        let planned = self.slot.try_issue(|current| match current {
            None => Some(0),
            Some(page) => page.next_page,
        });
        let Some((ticket, page)) = planned else {
            log::debug!("No more transaction pages to fetch");
            return Ok(());
        };

        let response: PaginatedResponse<Transaction> =
            self.fetch.fetch_with_cache(Request::paginated_transactions(page)).await?;

        let applied = self.slot.commit(ticket, |previous| match previous {
            None => response,
            Some(previous) => {
                let mut data = previous.data;
                data.extend(response.data);
                PaginatedResponse {
                    data,
                    next_page: response.next_page,
                }
            }
        });

        if !applied {
            log::debug!("Discarded stale transactions page {}", page);
        }
        Ok(())
    }

    /// Back to "not loaded"; no request is made
    pub fn invalidate_data(&self) {
        self.slot.invalidate();
    }
}
