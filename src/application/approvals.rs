use crate::{
    domain::{
        errors::ReviewError,
        models::{DataAccess, SetTransactionApprovalParams, Transaction},
    },
    infrastructure::request_cache::Fetcher,
};
use dashmap::DashMap;
use tokio::sync::RwLock;

/// Approval state of the rendered transaction list.
///
/// Holds the approval values the backend has confirmed during this session.
/// An override is only recorded once its write has resolved successfully, and
/// takes precedence over the flag the transaction was fetched with. Overrides
/// are never evicted.
pub struct TransactionList<D> {
    fetcher: Fetcher<D>,
    overrides: DashMap<String, bool>,
    last_write_error: RwLock<Option<String>>,
}

impl<D> TransactionList<D>
where
    D: DataAccess + Send + Sync,
{
    pub fn new(fetcher: Fetcher<D>) -> Self {
        Self {
            fetcher,
            overrides: DashMap::new(),
            last_write_error: RwLock::new(None),
        }
    }

    /// The approval value a row should display.
    pub fn is_approved(&self, transaction: &Transaction) -> bool {
        self.override_for(&transaction.id)
            .unwrap_or(transaction.approved)
    }

    pub fn override_for(&self, transaction_id: &str) -> Option<bool> {
        self.overrides.get(transaction_id).map(|v| *v.value())
    }

    /// Whether an approval write is in flight anywhere in the list.
    pub fn loading(&self) -> bool {
        self.fetcher.loading()
    }

    pub async fn last_write_error(&self) -> Option<String> {
        self.last_write_error.read().await.clone()
    }

    /// Writes `new_value` to the backend, then records it locally.
    ///
    /// On failure nothing local changes besides `last_write_error`.
    pub async fn set_approval(
        &self,
        transaction_id: &str,
        new_value: bool,
    ) -> Result<(), ReviewError> {
        tracing::info!(
            "Setting approval of transaction {} to {}",
            transaction_id,
            new_value
        );

        let params = SetTransactionApprovalParams {
            transaction_id: transaction_id.to_string(),
            value: new_value,
        };
        if let Err(e) = self.fetcher.set_transaction_approval(params).await {
            tracing::warn!(
                "Approval write for transaction {} failed: {}",
                transaction_id,
                e
            );
            *self.last_write_error.write().await =
                Some(format!("Could not update {}: {}", transaction_id, e));
            return Err(e.into());
        }

        self.overrides.insert(transaction_id.to_string(), new_value);
        *self.last_write_error.write().await = None;
        Ok(())
    }

    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            errors::DataAccessError,
            models::{Employee, MockDataAccess},
        },
        infrastructure::request_cache::RequestCache,
    };
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::{sync::Arc, time::Duration};
    use tokio_test::{assert_err, assert_ok};

    fn transaction(id: &str, approved: bool) -> Transaction {
        Transaction {
            id: id.to_string(),
            amount: Decimal::new(1250, 2),
            merchant: "Acme".to_string(),
            employee: Employee {
                id: "e1".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
            },
            date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            approved,
        }
    }

    fn list(api: MockDataAccess) -> TransactionList<MockDataAccess> {
        TransactionList::new(Fetcher::new(Arc::new(api), Arc::new(RequestCache::new())))
    }

    #[tokio::test]
    async fn confirmed_write_overrides_flag() {
        let mut api = MockDataAccess::new();
        api.expect_set_transaction_approval()
            .withf(|params| params.transaction_id == "t1" && params.value)
            .times(1)
            .returning(|_| Ok(()));
        let list = list(api);

        let t1 = transaction("t1", false);
        let t2 = transaction("t2", false);
        assert!(!list.is_approved(&t1));

        assert_ok!(list.set_approval("t1", true).await);
        assert_eq!(list.override_for("t1"), Some(true));
        assert!(list.is_approved(&t1));
        assert!(!list.is_approved(&t2));
        assert!(list.last_write_error().await.is_none());
    }

    #[tokio::test]
    async fn override_wins_over_refetched_flag() {
        let mut api = MockDataAccess::new();
        api.expect_set_transaction_approval().returning(|_| Ok(()));
        let list = list(api);

        assert_ok!(list.set_approval("t1", false).await);
        assert!(!list.is_approved(&transaction("t1", true)));
    }

    #[tokio::test]
    async fn failed_write_changes_nothing() {
        let mut api = MockDataAccess::new();
        api.expect_set_transaction_approval()
            .returning(|params| Err(DataAccessError::InvalidTransaction(params.transaction_id)));
        let list = list(api);

        let result = list.set_approval("t1", true).await;
        assert!(matches!(
            assert_err!(result),
            ReviewError::DataAccess(DataAccessError::InvalidTransaction(_))
        ));
        assert_eq!(list.override_for("t1"), None);
        assert_eq!(list.override_count(), 0);
        assert!(!list.is_approved(&transaction("t1", false)));
        assert!(list
            .last_write_error()
            .await
            .unwrap()
            .contains("Could not update t1"));
    }

    #[tokio::test]
    async fn success_clears_previous_write_error() {
        let mut api = MockDataAccess::new();
        let mut calls = 0;
        api.expect_set_transaction_approval().returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(DataAccessError::Unavailable("flaky".to_string()))
            } else {
                Ok(())
            }
        });
        let list = list(api);

        assert_err!(list.set_approval("t1", true).await);
        assert!(list.last_write_error().await.is_some());
        assert_ok!(list.set_approval("t1", true).await);
        assert!(list.last_write_error().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn row_keeps_old_value_until_write_resolves() {
        use crate::{
            config::ReviewConfig,
            infrastructure::{fixtures::MockData, mock_api::MockApi},
        };

        let config = ReviewConfig::builder()
            .latency(Duration::from_millis(200))
            .build();
        let api = Arc::new(MockApi::new(MockData::bundled().unwrap(), &config));
        let list = TransactionList::new(Fetcher::new(api, Arc::new(RequestCache::new())));
        let t1 = transaction("t1", false);

        let (result, (approved_mid_flight, loading_mid_flight)) =
            tokio::join!(list.set_approval("t1", true), async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                (list.is_approved(&t1), list.loading())
            });

        assert_ok!(result);
        assert!(!approved_mid_flight);
        assert!(loading_mid_flight);
        assert!(list.is_approved(&t1));
        assert!(!list.loading());
    }
}
