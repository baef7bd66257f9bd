use crate::{
    config::ReviewConfig,
    domain::{
        errors::DataAccessError,
        models::{DataAccess, Employee, PaginatedResponse, SetTransactionApprovalParams, Transaction},
    },
};
use dashmap::DashMap;
use std::time::Duration;

use super::fixtures::MockData;

/// In-memory backend that answers after a simulated network delay.
pub struct MockApi {
    employees: Vec<Employee>,
    transactions: DashMap<String, Transaction>,
    // listing order of the fixture, pages are cut from this
    transaction_order: Vec<String>,
    // employee_id -> [transaction_id]
    transactions_by_employee: DashMap<String, Vec<String>>,
    page_size: usize,
    latency: Duration,
}

impl MockApi {
    pub fn new(data: MockData, config: &ReviewConfig) -> Self {
        let transactions = DashMap::new();
        let transactions_by_employee: DashMap<String, Vec<String>> = DashMap::new();
        let mut transaction_order = Vec::with_capacity(data.transactions.len());

        for transaction in data.transactions {
            if transactions.contains_key(&transaction.id) {
                tracing::warn!("Duplicate transaction in fixture: {}", transaction.id);
                continue;
            }
            transaction_order.push(transaction.id.clone());
            transactions_by_employee
                .entry(transaction.employee.id.clone())
                .or_default()
                .push(transaction.id.clone());
            transactions.insert(transaction.id.clone(), transaction);
        }

        Self {
            employees: data.employees,
            transactions,
            transaction_order,
            transactions_by_employee,
            page_size: config.page_size.max(1),
            latency: config.latency,
        }
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn resolve(&self, ids: &[String]) -> Vec<Transaction> {
        ids.iter()
            .filter_map(|id| self.transactions.get(id).map(|v| v.value().clone()))
            .collect()
    }
}

#[async_trait::async_trait]
impl DataAccess for MockApi {
    async fn get_employees(&self) -> Result<Vec<Employee>, DataAccessError> {
        self.simulate_latency().await;
        Ok(self.employees.clone())
    }

    async fn get_transactions_by_page(
        &self,
        page: u32,
    ) -> Result<PaginatedResponse<Vec<Transaction>>, DataAccessError> {
        self.simulate_latency().await;

        let total = self.transaction_order.len();
        let start = page as usize * self.page_size;
        if start > total {
            return Err(DataAccessError::InvalidPage(page));
        }
        let end = (start + self.page_size).min(total);
        let next_page = if end < total { Some(page + 1) } else { None };

        Ok(PaginatedResponse {
            data: self.resolve(&self.transaction_order[start..end]),
            next_page,
        })
    }

    async fn get_transactions_by_employee(
        &self,
        employee_id: &str,
    ) -> Result<Vec<Transaction>, DataAccessError> {
        self.simulate_latency().await;

        if employee_id.is_empty() {
            return Err(DataAccessError::EmptyEmployeeId);
        }
        Ok(self
            .transactions_by_employee
            .get(employee_id)
            .map(|v| self.resolve(v.value()))
            .unwrap_or_default())
    }

    async fn set_transaction_approval(
        &self,
        params: SetTransactionApprovalParams,
    ) -> Result<(), DataAccessError> {
        self.simulate_latency().await;

        let mut transaction = self
            .transactions
            .get_mut(&params.transaction_id)
            .ok_or_else(|| DataAccessError::InvalidTransaction(params.transaction_id.clone()))?;
        transaction.approved = params.value;
        tracing::debug!(
            "Stored approval {} for transaction {}",
            params.value,
            params.transaction_id
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn api(page_size: usize) -> MockApi {
        let config = ReviewConfig::builder()
            .page_size(page_size)
            .latency(Duration::ZERO)
            .build();
        MockApi::new(MockData::bundled().unwrap(), &config)
    }

    #[tokio::test]
    async fn pages_follow_fixture_order() {
        let api = api(5);

        let first = assert_ok!(api.get_transactions_by_page(0).await);
        let ids: Vec<_> = first.data.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["t1", "t2", "t3", "t4", "t5"]);
        assert_eq!(first.next_page, Some(1));

        let last = assert_ok!(api.get_transactions_by_page(2).await);
        let ids: Vec<_> = last.data.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["t11", "t12"]);
        assert_eq!(last.next_page, None);
    }

    #[tokio::test]
    async fn exact_multiple_has_no_next_page() {
        let api = api(4);
        let last = assert_ok!(api.get_transactions_by_page(2).await);
        assert_eq!(last.data.len(), 4);
        assert_eq!(last.next_page, None);

        // start == total is an empty but valid page
        let empty = assert_ok!(api.get_transactions_by_page(3).await);
        assert!(empty.data.is_empty());
        assert_eq!(
            api.get_transactions_by_page(4).await,
            Err(DataAccessError::InvalidPage(4))
        );
    }

    #[tokio::test]
    async fn transactions_by_employee() {
        let api = api(5);
        let ada = assert_ok!(api.get_transactions_by_employee("e1").await);
        let ids: Vec<_> = ada.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["t1", "t4", "t9"]);

        let nobody = assert_ok!(api.get_transactions_by_employee("e99").await);
        assert!(nobody.is_empty());

        assert_eq!(
            api.get_transactions_by_employee("").await,
            Err(DataAccessError::EmptyEmployeeId)
        );
    }

    #[tokio::test]
    async fn approval_is_visible_to_later_reads() {
        let api = api(5);
        assert_ok!(
            api.set_transaction_approval(SetTransactionApprovalParams {
                transaction_id: "t1".to_string(),
                value: true,
            })
            .await
        );

        let page = assert_ok!(api.get_transactions_by_page(0).await);
        assert!(page.data[0].approved);
        let ada = assert_ok!(api.get_transactions_by_employee("e1").await);
        assert!(ada[0].approved);

        assert_err!(
            api.set_transaction_approval(SetTransactionApprovalParams {
                transaction_id: "missing".to_string(),
                value: true,
            })
            .await
        );
    }

    #[tokio::test(start_paused = true)]
    async fn calls_wait_for_configured_latency() {
        let config = ReviewConfig::builder()
            .latency(Duration::from_millis(250))
            .build();
        let api = MockApi::new(MockData::bundled().unwrap(), &config);

        let started = tokio::time::Instant::now();
        assert_ok!(api.get_employees().await);
        assert!(started.elapsed() >= Duration::from_millis(250));
    }
}
