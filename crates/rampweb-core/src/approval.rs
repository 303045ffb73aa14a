//! Approval overlay
//!
//! Per-transaction approval values layered over whatever list is displayed.
//! The overlay is mirrored as one JSON object into durable storage after
//! every successful approval change, and restored from there whenever the
//! visible list changes. The transaction records themselves are never
//! touched.

use crate::error::{CoreError, CoreResult};
use crate::fetch::{FetchClient, ResponseCache};
use crate::gateway::{GatewayRef, Request};
use crate::models::Transaction;
use crate::storage::StoreRef;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

pub type ApprovalMap = HashMap<String, bool>;

/// What a hydration pass did to the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hydration {
    /// Replaced by the stored snapshot (entry count)
    Restored(usize),
    /// No snapshot; seeded from the visible transactions (entry count)
    Seeded(usize),
    /// No snapshot and nothing visible
    Unchanged,
}

/// Shown approval state: overlay entry if present, else the record's own flag
pub fn display_approval(overlay: &ApprovalMap, transaction: &Transaction) -> bool {
    overlay.get(&transaction.id).copied().unwrap_or(transaction.approved)
}

/// Decode a stored snapshot. Anything but a JSON object of booleans is an error.
pub fn decode_snapshot(key: &str, raw: &str) -> CoreResult<ApprovalMap> {
    serde_json::from_str(raw).map_err(|e| CoreError::CorruptSnapshot {
        key: key.to_string(),
        message: e.to_string(),
    })
}

pub struct ApprovalOverlay {
    fetch: FetchClient,
    store: StoreRef,
    key: String,
    approvals: Mutex<ApprovalMap>,
}

impl ApprovalOverlay {
    pub fn new(gateway: GatewayRef, cache: Arc<ResponseCache>, store: StoreRef, key: impl Into<String>) -> Self {
        Self {
            fetch: FetchClient::new(gateway, cache),
            store,
            key: key.into(),
            approvals: Mutex::new(HashMap::new()),
        }
    }

    /// True while any approval change is in flight; gates every row's toggle
    pub fn loading(&self) -> bool {
        self.fetch.loading()
    }

    pub fn snapshot(&self) -> ApprovalMap {
        self.lock().clone()
    }

    pub fn is_approved(&self, transaction: &Transaction) -> bool {
        display_approval(&self.lock(), transaction)
    }

    /// Rebuild the overlay for a newly visible list.
    ///
    /// A stored snapshot always wins over the in-memory state. Without one,
    /// the visible rows' own flags seed it; seeding never writes storage.
    pub fn hydrate(&self, visible: Option<&[Transaction]>) -> CoreResult<Hydration> {
        let stored = self.store.get(&self.key)?.filter(|raw| !raw.is_empty());

        if let Some(raw) = stored {
            let restored = decode_snapshot(&self.key, &raw)?;
            let count = restored.len();
            *self.lock() = restored;
            log::debug!("Restored {} approvals from storage", count);
            return Ok(Hydration::Restored(count));
        }

        match visible {
            Some(transactions) => {
                let seeded: ApprovalMap = transactions
                    .iter()
                    .map(|t| (t.id.clone(), t.approved))
                    .collect();
                let count = seeded.len();
                *self.lock() = seeded;
                Ok(Hydration::Seeded(count))
            }
            None => Ok(Hydration::Unchanged),
        }
    }

    /// Persist a new approval value remotely, then in memory and storage.
    ///
    /// Nothing local changes unless the remote call succeeds.
    pub async fn set_transaction_approval(&self, transaction_id: &str, new_value: bool) -> CoreResult<()> {
        self.fetch
            .fetch_without_cache::<()>(Request::set_transaction_approval(transaction_id, new_value))
            .await?;

        let mut approvals = self.lock();
        let mut updated = approvals.clone();
        updated.insert(transaction_id.to_string(), new_value);
        let encoded = serde_json::to_string(&updated)?;
        self.store.set(&self.key, &encoded)?;
        *approvals = updated;

        log::info!("Transaction {} approval set to {}", transaction_id, new_value);
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ApprovalMap> {
        self.approvals.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Endpoint;
    use crate::storage::{KeyValueStore, MemoryStore};
    use crate::test_support::RecordingGateway;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    const KEY: &str = "approvedTransactions";
    const SEEDED_TX: &str = "c2b1e6f0-5a01-4d0b-8f6e-000000000002";

    fn tx(id: &str, approved: bool) -> Transaction {
        Transaction {
            id: id.to_string(),
            employee_id: "e1".to_string(),
            amount: Decimal::new(1250, 2),
            merchant: "Coffee Co".to_string(),
            date: NaiveDate::from_ymd_opt(2022, 1, 3).unwrap(),
            approved,
        }
    }

    fn overlay(gateway: &Arc<RecordingGateway>, store: &Arc<MemoryStore>) -> ApprovalOverlay {
        ApprovalOverlay::new(gateway.clone(), Arc::new(ResponseCache::new()), store.clone(), KEY)
    }

    #[test]
    fn test_stored_snapshot_wins_over_record() {
        let gateway = Arc::new(RecordingGateway::seeded());
        let store = Arc::new(MemoryStore::with_entry(KEY, r#"{"t1": true}"#));
        let overlay = overlay(&gateway, &store);
        let visible = vec![tx("t1", false), tx("t2", true)];

        assert_eq!(overlay.hydrate(Some(visible.as_slice())).unwrap(), Hydration::Restored(1));
        assert!(overlay.is_approved(&visible[0]));
        assert!(overlay.is_approved(&visible[1]));
        assert!(!visible[0].approved);
    }

    #[test]
    fn test_seeding_without_snapshot_does_not_write() {
        let gateway = Arc::new(RecordingGateway::seeded());
        let store = Arc::new(MemoryStore::new());
        let overlay = overlay(&gateway, &store);

        let visible = vec![tx("t3", true)];
        assert_eq!(overlay.hydrate(Some(visible.as_slice())).unwrap(), Hydration::Seeded(1));
        assert_eq!(overlay.snapshot(), HashMap::from([("t3".to_string(), true)]));
        assert_eq!(store.get(KEY).unwrap(), None);
    }

    #[test]
    fn test_hydrate_without_list_or_snapshot() {
        let gateway = Arc::new(RecordingGateway::seeded());
        let store = Arc::new(MemoryStore::with_entry(KEY, ""));
        let overlay = overlay(&gateway, &store);

        assert_eq!(overlay.hydrate(None).unwrap(), Hydration::Unchanged);
        assert!(overlay.snapshot().is_empty());
    }

    #[test]
    fn test_corrupt_snapshot_is_an_error() {
        let gateway = Arc::new(RecordingGateway::seeded());
        let store = Arc::new(MemoryStore::with_entry(KEY, "{not json"));
        let overlay = overlay(&gateway, &store);

        let err = overlay.hydrate(Some(&[tx("t1", true)][..])).unwrap_err();
        assert!(matches!(err, CoreError::CorruptSnapshot { .. }));
        assert!(overlay.snapshot().is_empty());

        assert!(decode_snapshot(KEY, r#"{"t1": "yes"}"#).is_err());
        assert!(decode_snapshot(KEY, "[true]").is_err());
    }

    #[test]
    fn test_display_approval_rule() {
        let overlay = HashMap::from([("t1".to_string(), false)]);
        assert!(!display_approval(&overlay, &tx("t1", true)));
        assert!(display_approval(&overlay, &tx("t2", true)));
        assert!(!display_approval(&overlay, &tx("t3", false)));
    }

    #[tokio::test]
    async fn test_successful_approval_writes_whole_map() {
        let gateway = Arc::new(RecordingGateway::seeded());
        let store = Arc::new(MemoryStore::new());
        let overlay = overlay(&gateway, &store);
        overlay.hydrate(Some(&[tx("t3", true)][..])).unwrap();
        assert_eq!(store.get(KEY).unwrap(), None);

        overlay.set_transaction_approval(SEEDED_TX, true).await.unwrap();

        let stored = decode_snapshot(KEY, &store.get(KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored.get("t3"), Some(&true));
        assert_eq!(stored.get(SEEDED_TX), Some(&true));
        assert_eq!(overlay.snapshot(), stored);
        assert!(!overlay.loading());
    }

    #[tokio::test]
    async fn test_failed_approval_changes_nothing() {
        let gateway = Arc::new(RecordingGateway::seeded());
        let store = Arc::new(MemoryStore::new());
        let overlay = overlay(&gateway, &store);
        overlay.hydrate(Some(&[tx("t3", true)][..])).unwrap();

        gateway.fail(Endpoint::SetTransactionApproval);
        assert!(overlay.set_transaction_approval(SEEDED_TX, true).await.is_err());
        assert_eq!(store.get(KEY).unwrap(), None);
        assert_eq!(overlay.snapshot().len(), 1);

        gateway.recover(Endpoint::SetTransactionApproval);
        assert!(overlay.set_transaction_approval("unknown", true).await.is_err());
        assert_eq!(store.get(KEY).unwrap(), None);
        assert!(!overlay.loading());
    }

    #[tokio::test]
    async fn test_approval_is_never_cached() {
        let gateway = Arc::new(RecordingGateway::seeded());
        let store = Arc::new(MemoryStore::new());
        let overlay = overlay(&gateway, &store);

        overlay.set_transaction_approval(SEEDED_TX, true).await.unwrap();
        overlay.set_transaction_approval(SEEDED_TX, true).await.unwrap();
        assert_eq!(gateway.calls(Endpoint::SetTransactionApproval), 2);
        assert!(overlay.fetch.cache().is_empty());
    }

    #[tokio::test]
    async fn test_restored_snapshot_replaces_memory() {
        let gateway = Arc::new(RecordingGateway::seeded());
        let store = Arc::new(MemoryStore::new());
        let overlay = overlay(&gateway, &store);
        overlay.set_transaction_approval(SEEDED_TX, true).await.unwrap();

        store.set(KEY, r#"{"other": false}"#).unwrap();
        assert_eq!(overlay.hydrate(None).unwrap(), Hydration::Restored(1));
        assert_eq!(overlay.snapshot(), HashMap::from([("other".to_string(), false)]));
    }
}
