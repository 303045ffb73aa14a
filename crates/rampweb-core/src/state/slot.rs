use std::sync::{Mutex, PoisonError};

/// Proof that a fetch was issued for a slot; stale once the slot moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Ticket(u64);

struct SlotInner<T> {
    data: Option<T>,
    latest: u64,
}

/// Held data plus the token of the most recently issued fetch.
///
/// A fetch result is applied only if its ticket is still the latest one.
/// Invalidation advances the token too, so nothing issued before an
/// invalidation can ever land after it.
pub(crate) struct Slot<T> {
    inner: Mutex<SlotInner<T>>,
}

impl<T: Clone> Slot<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SlotInner { data: None, latest: 0 }),
        }
    }

    pub fn get(&self) -> Option<T> {
        self.lock().data.clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        f(self.lock().data.as_ref())
    }

    pub fn issue(&self) -> Ticket {
        let mut inner = self.lock();
        inner.latest += 1;
        Ticket(inner.latest)
    }

    /// Issue a ticket only when `plan` returns something to fetch
    pub fn try_issue<R>(&self, plan: impl FnOnce(Option<&T>) -> Option<R>) -> Option<(Ticket, R)> {
        let mut inner = self.lock();
        let planned = plan(inner.data.as_ref())?;
        inner.latest += 1;
        Some((Ticket(inner.latest), planned))
    }

    pub fn invalidate(&self) {
        let mut inner = self.lock();
        inner.latest += 1;
        inner.data = None;
    }

    /// Replace the data via `update` if `ticket` is current; false when discarded
    pub fn commit(&self, ticket: Ticket, update: impl FnOnce(Option<T>) -> T) -> bool {
        let mut inner = self.lock();
        if inner.latest != ticket.0 {
            return false;
        }
        let previous = inner.data.take();
        inner.data = Some(update(previous));
        true
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SlotInner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
