use crate::domain::{
    errors::DataAccessError,
    models::{DataAccess, Employee, PaginatedResponse, SetTransactionApprovalParams, Transaction},
};
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    future::Future,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Employees,
    PaginatedTransactions,
    TransactionsByEmployee,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Employees => "employees",
            Endpoint::PaginatedTransactions => "paginatedTransactions",
            Endpoint::TransactionsByEmployee => "transactionsByEmployee",
        }
    }
}

/// Response cache shared by every fetcher of a session.
///
/// Entries are keyed by endpoint plus the JSON form of the request params and
/// stored as JSON, so any serializable response can be cached.
#[derive(Default)]
pub struct RequestCache {
    entries: DashMap<String, serde_json::Value>,
}

impl RequestCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn key<P: Serialize>(endpoint: Endpoint, params: &P) -> Result<String, serde_json::Error> {
        Ok(format!(
            "{}@{}",
            endpoint.as_str(),
            serde_json::to_string(params)?
        ))
    }

    fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.entries.get(key)?.value().clone();
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Dropping unreadable cache entry {}: {}", key, e);
                self.entries.remove(key);
                None
            }
        }
    }

    fn insert<T: Serialize>(&self, key: String, value: &T) {
        match serde_json::to_value(value) {
            Ok(v) => {
                self.entries.insert(key, v);
            }
            Err(e) => tracing::warn!("Not caching response for {}: {}", key, e),
        }
    }

    /// Drops every entry that belongs to one of `endpoints`.
    pub fn clear_by_endpoint(&self, endpoints: &[Endpoint]) {
        self.entries.retain(|key, _| {
            !endpoints
                .iter()
                .any(|e| key.split('@').next() == Some(e.as_str()))
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn start(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Access to the backend for a single consumer, with its own loading flag.
pub struct Fetcher<D> {
    api: Arc<D>,
    cache: Arc<RequestCache>,
    in_flight: AtomicUsize,
}

impl<D> Fetcher<D>
where
    D: DataAccess + Send + Sync,
{
    pub fn new(api: Arc<D>, cache: Arc<RequestCache>) -> Self {
        Self {
            api,
            cache,
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Whether a request issued through this fetcher has not resolved yet.
    pub fn loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn clear_cache_by_endpoint(&self, endpoints: &[Endpoint]) {
        self.cache.clear_by_endpoint(endpoints);
    }

    async fn fetch_with_cache<T, P, F>(
        &self,
        endpoint: Endpoint,
        params: &P,
        request: F,
    ) -> Result<T, DataAccessError>
    where
        T: Serialize + DeserializeOwned,
        P: Serialize,
        F: Future<Output = Result<T, DataAccessError>>,
    {
        let _in_flight = InFlight::start(&self.in_flight);

        let key = match RequestCache::key(endpoint, params) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!("Bypassing cache for {}: {}", endpoint.as_str(), e);
                return request.await;
            }
        };

        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!("Cache hit for {}", key);
            return Ok(cached);
        }

        tracing::debug!("Cache miss for {}", key);
        let response = request.await?;
        self.cache.insert(key, &response);
        Ok(response)
    }

    async fn fetch_without_cache<T, F>(&self, request: F) -> Result<T, DataAccessError>
    where
        F: Future<Output = Result<T, DataAccessError>>,
    {
        let _in_flight = InFlight::start(&self.in_flight);
        request.await
    }

    pub async fn get_employees(&self) -> Result<Vec<Employee>, DataAccessError> {
        self.fetch_with_cache(Endpoint::Employees, &(), self.api.get_employees())
            .await
    }

    pub async fn get_transactions_by_page(
        &self,
        page: u32,
    ) -> Result<PaginatedResponse<Vec<Transaction>>, DataAccessError> {
        self.fetch_with_cache(
            Endpoint::PaginatedTransactions,
            &page,
            self.api.get_transactions_by_page(page),
        )
        .await
    }

    pub async fn get_transactions_by_employee(
        &self,
        employee_id: &str,
    ) -> Result<Vec<Transaction>, DataAccessError> {
        self.fetch_with_cache(
            Endpoint::TransactionsByEmployee,
            &employee_id,
            self.api.get_transactions_by_employee(employee_id),
        )
        .await
    }

    /// Writes are never cached; a confirmed write invalidates the listings
    /// that embed approval flags.
    pub async fn set_transaction_approval(
        &self,
        params: SetTransactionApprovalParams,
    ) -> Result<(), DataAccessError> {
        self.fetch_without_cache(self.api.set_transaction_approval(params))
            .await?;
        self.clear_cache_by_endpoint(&[
            Endpoint::PaginatedTransactions,
            Endpoint::TransactionsByEmployee,
        ]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ReviewConfig,
        domain::models::MockDataAccess,
        infrastructure::{fixtures::MockData, mock_api::MockApi},
    };
    use std::time::Duration;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn repeated_reads_hit_the_cache() {
        let mut api = MockDataAccess::new();
        api.expect_get_employees().times(1).returning(|| {
            Ok(vec![Employee {
                id: "e1".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
            }])
        });

        let fetcher = Fetcher::new(Arc::new(api), Arc::new(RequestCache::new()));
        let first = assert_ok!(fetcher.get_employees().await);
        let second = assert_ok!(fetcher.get_employees().await);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn failed_reads_are_not_cached() {
        let mut api = MockDataAccess::new();
        api.expect_get_transactions_by_page()
            .times(2)
            .returning(|_| Err(DataAccessError::Unavailable("down".to_string())));

        let fetcher = Fetcher::new(Arc::new(api), Arc::new(RequestCache::new()));
        assert!(fetcher.get_transactions_by_page(0).await.is_err());
        assert!(fetcher.get_transactions_by_page(0).await.is_err());
        assert!(!fetcher.loading());
    }

    #[tokio::test]
    async fn approval_clears_transaction_listings_only() {
        let config = ReviewConfig::builder().latency(Duration::ZERO).build();
        let api = Arc::new(MockApi::new(MockData::bundled().unwrap(), &config));
        let cache = Arc::new(RequestCache::new());
        let fetcher = Fetcher::new(api, cache.clone());

        assert_ok!(fetcher.get_employees().await);
        assert_ok!(fetcher.get_transactions_by_page(0).await);
        assert_ok!(fetcher.get_transactions_by_employee("e1").await);
        assert_eq!(cache.len(), 3);

        assert_ok!(
            fetcher
                .set_transaction_approval(SetTransactionApprovalParams {
                    transaction_id: "t1".to_string(),
                    value: true,
                })
                .await
        );
        assert_eq!(cache.len(), 1);

        let page = assert_ok!(fetcher.get_transactions_by_page(0).await);
        assert!(page.data[0].approved);
    }

    #[tokio::test]
    async fn failed_write_keeps_cache() {
        let config = ReviewConfig::builder().latency(Duration::ZERO).build();
        let api = Arc::new(MockApi::new(MockData::bundled().unwrap(), &config));
        let cache = Arc::new(RequestCache::new());
        let fetcher = Fetcher::new(api, cache.clone());

        assert_ok!(fetcher.get_transactions_by_page(0).await);
        let result = fetcher
            .set_transaction_approval(SetTransactionApprovalParams {
                transaction_id: "nope".to_string(),
                value: true,
            })
            .await;
        assert_eq!(
            result,
            Err(DataAccessError::InvalidTransaction("nope".to_string()))
        );
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn loading_tracks_in_flight_requests() {
        let config = ReviewConfig::builder()
            .latency(Duration::from_millis(100))
            .build();
        let api = Arc::new(MockApi::new(MockData::bundled().unwrap(), &config));
        let fetcher = Fetcher::new(api, Arc::new(RequestCache::new()));

        assert!(!fetcher.loading());
        let (result, observed) = tokio::join!(fetcher.get_employees(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            fetcher.loading()
        });
        assert_ok!(result);
        assert!(observed);
        assert!(!fetcher.loading());
    }
}
