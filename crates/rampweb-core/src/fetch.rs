//! Fetch cache layer
//!
//! One [`ResponseCache`] is shared by the whole application. Each component
//! owns a [`FetchClient`] over that cache, which carries its own in-flight
//! counter so loading indicators stay per component.

use crate::error::{CoreError, CoreResult};
use crate::gateway::{Endpoint, GatewayRef, Request};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Endpoint plus the serialized request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    endpoint: Endpoint,
    request: String,
}

impl CacheKey {
    pub fn for_request(request: &Request) -> CoreResult<Self> {
        Ok(Self {
            endpoint: request.endpoint(),
            request: serde_json::to_string(request)?,
        })
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<CacheKey, serde_json::Value>,
    /// Bumped by `clear`
    epoch: u64,
    /// Bumped per endpoint by `clear_by_endpoint`
    cleared: HashMap<Endpoint, u64>,
}

impl CacheInner {
    fn generation(&self, endpoint: Endpoint) -> u64 {
        self.epoch + self.cleared.get(&endpoint).copied().unwrap_or(0)
    }
}

/// Successful gateway responses, keyed by request
#[derive(Debug, Default)]
pub struct ResponseCache {
    inner: Mutex<CacheInner>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<serde_json::Value> {
        self.lock().entries.get(key).cloned()
    }

    /// Changes whenever entries of `endpoint` are cleared
    pub fn generation(&self, endpoint: Endpoint) -> u64 {
        self.lock().generation(endpoint)
    }

    /// Insert unless the key's endpoint was cleared since `generation` was read
    pub fn insert_if_current(&self, key: CacheKey, value: serde_json::Value, generation: u64) -> bool {
        let mut inner = self.lock();
        if inner.generation(key.endpoint) != generation {
            return false;
        }
        inner.entries.insert(key, value);
        true
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.epoch += 1;
    }

    /// Drop every entry belonging to the given datasets, returning how many went
    pub fn clear_by_endpoint(&self, endpoints: &[Endpoint]) -> usize {
        let mut inner = self.lock();
        for endpoint in endpoints {
            *inner.cleared.entry(*endpoint).or_insert(0) += 1;
        }
        let before = inner.entries.len();
        inner.entries.retain(|key, _| !endpoints.contains(&key.endpoint));
        before - inner.entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Decrements the in-flight counter when the request settles, success or not
struct InFlightGuard<'a>(&'a AtomicUsize);

impl<'a> InFlightGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct FetchClient {
    gateway: GatewayRef,
    cache: Arc<ResponseCache>,
    in_flight: AtomicUsize,
}

impl FetchClient {
    pub fn new(gateway: GatewayRef, cache: Arc<ResponseCache>) -> Self {
        Self {
            gateway,
            cache,
            in_flight: AtomicUsize::new(0),
        }
    }

    /// True while any request issued through this client is outstanding
    pub fn loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    pub async fn fetch_with_cache<T: DeserializeOwned>(&self, request: Request) -> CoreResult<T> {
        let key = CacheKey::for_request(&request)?;
        if let Some(cached) = self.cache.get(&key) {
            log::debug!("Cache hit for {}", key.request);
            return Ok(serde_json::from_value(cached)?);
        }

        log::debug!("Cache miss for {}", key.request);
        let generation = self.cache.generation(key.endpoint);
        let value = self.call(&request).await?;
        let decoded = serde_json::from_value(value.clone())?;
        if !self.cache.insert_if_current(key, value, generation) {
            log::debug!("Cache cleared during {} request, not storing the response", request.endpoint());
        }
        Ok(decoded)
    }

    /// Always hits the gateway; the cache is neither read nor written
    pub async fn fetch_without_cache<T: DeserializeOwned>(&self, request: Request) -> CoreResult<T> {
        let value = self.call(&request).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn clear_cache_by_endpoint(&self, endpoints: &[Endpoint]) {
        let removed = self.cache.clear_by_endpoint(endpoints);
        log::debug!("Cleared {} cached responses for {:?}", removed, endpoints);
    }

    async fn call(&self, request: &Request) -> CoreResult<serde_json::Value> {
        let _guard = InFlightGuard::enter(&self.in_flight);
        self.gateway
            .request(request)
            .await
            .map_err(|source| CoreError::Gateway {
                endpoint: request.endpoint(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Held, RecordingGateway};
    use crate::models::Employee;

    fn client(gateway: &Arc<RecordingGateway>) -> FetchClient {
        FetchClient::new(gateway.clone(), Arc::new(ResponseCache::new()))
    }

    #[tokio::test]
    async fn test_fetch_with_cache_memoizes_success() {
        let gateway = Arc::new(RecordingGateway::seeded());
        let client = client(&gateway);

        let first: Vec<Employee> = client.fetch_with_cache(Request::Employees).await.unwrap();
        let second: Vec<Employee> = client.fetch_with_cache(Request::Employees).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(gateway.calls(Endpoint::Employees), 1);
        assert_eq!(client.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_different_params_are_different_keys() {
        let gateway = Arc::new(RecordingGateway::seeded());
        let client = client(&gateway);

        let _: serde_json::Value = client.fetch_with_cache(Request::paginated_transactions(0)).await.unwrap();
        let _: serde_json::Value = client.fetch_with_cache(Request::paginated_transactions(1)).await.unwrap();
        let _: serde_json::Value = client.fetch_with_cache(Request::paginated_transactions(0)).await.unwrap();

        assert_eq!(gateway.calls(Endpoint::PaginatedTransactions), 2);
    }

    #[tokio::test]
    async fn test_fetch_without_cache_never_touches_cache() {
        let gateway = Arc::new(RecordingGateway::seeded());
        let client = client(&gateway);

        let _: Vec<Employee> = client.fetch_with_cache(Request::Employees).await.unwrap();
        let _: Vec<Employee> = client.fetch_without_cache(Request::Employees).await.unwrap();
        let _: Vec<Employee> = client.fetch_without_cache(Request::Employees).await.unwrap();

        assert_eq!(gateway.calls(Endpoint::Employees), 3);
        assert_eq!(client.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let gateway = Arc::new(RecordingGateway::seeded());
        gateway.fail(Endpoint::Employees);
        let client = client(&gateway);

        let result: CoreResult<Vec<Employee>> = client.fetch_with_cache(Request::Employees).await;
        assert!(matches!(result, Err(CoreError::Gateway { endpoint: Endpoint::Employees, .. })));
        assert!(client.cache().is_empty());
        assert!(!client.loading());

        gateway.recover(Endpoint::Employees);
        let employees: Vec<Employee> = client.fetch_with_cache(Request::Employees).await.unwrap();
        assert!(!employees.is_empty());
        assert_eq!(gateway.calls(Endpoint::Employees), 2);
    }

    #[tokio::test]
    async fn test_clear_cache_by_endpoint() {
        let gateway = Arc::new(RecordingGateway::seeded());
        let client = client(&gateway);

        let _: Vec<Employee> = client.fetch_with_cache(Request::Employees).await.unwrap();
        let _: serde_json::Value = client.fetch_with_cache(Request::paginated_transactions(0)).await.unwrap();
        let _: serde_json::Value = client.fetch_with_cache(Request::paginated_transactions(1)).await.unwrap();

        client.clear_cache_by_endpoint(&[Endpoint::PaginatedTransactions, Endpoint::TransactionsByEmployee]);
        assert_eq!(client.cache().len(), 1);

        let _: serde_json::Value = client.fetch_with_cache(Request::paginated_transactions(0)).await.unwrap();
        assert_eq!(gateway.calls(Endpoint::PaginatedTransactions), 3);

        client.clear_cache();
        assert!(client.cache().is_empty());
    }

    #[tokio::test]
    async fn test_response_landing_after_clear_is_not_cached() {
        let gateway = Arc::new(RecordingGateway::seeded());
        let client = client(&gateway);

        let Held { started, release } = gateway.hold(Endpoint::PaginatedTransactions);
        let fetch = client.fetch_with_cache::<serde_json::Value>(Request::paginated_transactions(0));
        let clear = async {
            started.await.unwrap();
            client.clear_cache_by_endpoint(&[Endpoint::PaginatedTransactions]);
            release.send(()).unwrap();
        };
        let (fetched, ()) = tokio::join!(fetch, clear);

        assert!(fetched.unwrap()["data"].is_array());
        assert!(client.cache().is_empty());

        let _: serde_json::Value = client.fetch_with_cache(Request::paginated_transactions(0)).await.unwrap();
        assert_eq!(client.cache().len(), 1);
        assert_eq!(gateway.calls(Endpoint::PaginatedTransactions), 2);
    }

    #[test]
    fn test_clear_of_other_endpoint_keeps_generation() {
        let cache = ResponseCache::new();
        let generation = cache.generation(Endpoint::Employees);
        cache.clear_by_endpoint(&[Endpoint::PaginatedTransactions]);

        let key = CacheKey::for_request(&Request::Employees).unwrap();
        assert!(cache.insert_if_current(key.clone(), serde_json::json!([]), generation));

        cache.clear();
        assert!(cache.is_empty());
        assert!(!cache.insert_if_current(key, serde_json::json!([]), generation));
    }

    #[tokio::test]
    async fn test_shared_cache_between_clients() {
        let gateway = Arc::new(RecordingGateway::seeded());
        let cache = Arc::new(ResponseCache::new());
        let a = FetchClient::new(gateway.clone(), cache.clone());
        let b = FetchClient::new(gateway.clone(), cache);

        let _: Vec<Employee> = a.fetch_with_cache(Request::Employees).await.unwrap();
        let _: Vec<Employee> = b.fetch_with_cache(Request::Employees).await.unwrap();
        assert_eq!(gateway.calls(Endpoint::Employees), 1);
    }
}
