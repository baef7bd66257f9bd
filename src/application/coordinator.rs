use std::sync::Arc;

use super::approvals::TransactionList;
use super::resources::{
    EmployeesResource, PaginatedTransactionsResource, TransactionsByEmployeeResource,
};
use crate::config::ReviewConfig;
use crate::domain::errors::ReviewError;
use crate::domain::models::{DataAccess, Employee, Transaction};
use crate::infrastructure::fixtures::MockData;
use crate::infrastructure::mock_api::MockApi;
use crate::infrastructure::request_cache::{Fetcher, RequestCache};
use tokio::sync::RwLock;

/// Which listing the screen is showing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewMode {
    /// All transactions, paged. `pagination_used` flips on once a page load
    /// started by `load_all` has completed.
    All { pagination_used: bool },
    /// The full list of a single employee.
    ByEmployee { employee_id: String },
}

impl Default for ViewMode {
    fn default() -> Self {
        ViewMode::All {
            pagination_used: false,
        }
    }
}

/// Top-level state of the review screen.
///
/// Owns the three read resources, the approval list, and the current
/// [`ViewMode`]. Every operation takes `&self`, so a second action can start
/// while an earlier one is still waiting on the backend; whichever resolves
/// last wins.
pub struct ViewController<D> {
    employees: EmployeesResource<D>,
    paginated: PaginatedTransactionsResource<D>,
    by_employee: TransactionsByEmployeeResource<D>,
    transaction_list: TransactionList<D>,
    mode: RwLock<ViewMode>,
}

impl ViewController<MockApi> {
    /// Builds a controller over the in-memory backend described by `config`.
    pub async fn from_config(config: &ReviewConfig) -> Result<Self, ReviewError> {
        let data = MockData::load(config.fixture.as_deref()).await?;
        tracing::info!(
            "Seeded backend with {} employees and {} transactions",
            data.employees.len(),
            data.transactions.len()
        );
        Ok(Self::new(Arc::new(MockApi::new(data, config))))
    }
}

impl<D> ViewController<D>
where
    D: DataAccess + Send + Sync,
{
    pub fn new(api: Arc<D>) -> Self {
        let cache = Arc::new(RequestCache::new());
        Self {
            employees: EmployeesResource::new(Fetcher::new(api.clone(), cache.clone())),
            paginated: PaginatedTransactionsResource::new(Fetcher::new(
                api.clone(),
                cache.clone(),
            )),
            by_employee: TransactionsByEmployeeResource::new(Fetcher::new(
                api.clone(),
                cache.clone(),
            )),
            transaction_list: TransactionList::new(Fetcher::new(api, cache)),
            mode: RwLock::new(ViewMode::default()),
        }
    }

    /// Runs the initial load when the screen first appears.
    ///
    /// Only fires while the employee list is missing and no read of any kind
    /// is in flight. Returns whether a load was started.
    pub async fn mount(&self) -> Result<bool, ReviewError> {
        if self.employees.data().await.is_some()
            || self.employees_loading()
            || self.transactions_loading()
        {
            return Ok(false);
        }
        self.load_all().await?;
        Ok(true)
    }

    /// Clears the employee filter and loads the first page of all transactions.
    pub async fn load_all(&self) -> Result<(), ReviewError> {
        tracing::info!("Loading all transactions");
        *self.mode.write().await = ViewMode::All {
            pagination_used: false,
        };
        self.by_employee.invalidate().await;
        self.paginated.invalidate().await;

        // a missing employee list must not keep transactions from loading
        let employees = self.employees.fetch_all().await;
        let page = self.paginated.fetch_all().await;

        if let ViewMode::All { pagination_used } = &mut *self.mode.write().await {
            *pagination_used = true;
        }

        employees?;
        page?;
        Ok(())
    }

    /// Filters the list down to one employee's transactions.
    pub async fn load_for_employee(&self, employee_id: &str) -> Result<(), ReviewError> {
        tracing::info!("Loading transactions for employee {}", employee_id);
        *self.mode.write().await = ViewMode::ByEmployee {
            employee_id: employee_id.to_string(),
        };
        self.paginated.invalidate().await;
        self.by_employee.fetch_by_id(employee_id).await?;
        Ok(())
    }

    /// Handles a pick in the employee filter. The empty-employee placeholder
    /// means "everyone".
    pub async fn select_employee(&self, employee: &Employee) -> Result<(), ReviewError> {
        if employee.is_empty_sentinel() {
            self.load_all().await
        } else {
            self.load_for_employee(&employee.id).await
        }
    }

    /// "View More": reloads the selected employee, or fetches the next page.
    pub async fn view_more(&self) -> Result<(), ReviewError> {
        match self.selected_employee_id().await {
            Some(employee_id) => self.load_for_employee(&employee_id).await,
            None => {
                tracing::info!("Loading next page of transactions");
                self.paginated.fetch_all().await?;
                Ok(())
            }
        }
    }

    /// Flips the displayed approval of a visible transaction.
    pub async fn toggle_approval(&self, transaction_id: &str) -> Result<bool, ReviewError> {
        let transaction = self
            .visible_transactions()
            .await
            .and_then(|rows| rows.into_iter().find(|t| t.id == transaction_id))
            .ok_or_else(|| ReviewError::UnknownTransaction(transaction_id.to_string()))?;

        let new_value = !self.transaction_list.is_approved(&transaction);
        self.transaction_list
            .set_approval(transaction_id, new_value)
            .await?;
        Ok(new_value)
    }

    pub async fn mode(&self) -> ViewMode {
        self.mode.read().await.clone()
    }

    pub async fn selected_employee_id(&self) -> Option<String> {
        match &*self.mode.read().await {
            ViewMode::ByEmployee { employee_id } => Some(employee_id.clone()),
            ViewMode::All { .. } => None,
        }
    }

    pub async fn is_pagination_used(&self) -> bool {
        matches!(
            *self.mode.read().await,
            ViewMode::All {
                pagination_used: true
            }
        )
    }

    pub async fn has_next_page(&self) -> bool {
        self.paginated.has_next_page().await
    }

    /// The rows of the active listing, `None` while it has nothing to show.
    pub async fn visible_transactions(&self) -> Option<Vec<Transaction>> {
        match self.mode().await {
            ViewMode::All { .. } => self.paginated.data().await.map(|page| page.data),
            ViewMode::ByEmployee { employee_id } => self.by_employee.data_for(&employee_id).await,
        }
    }

    /// Choices of the employee filter: the placeholder first, then everyone.
    /// Empty until the employee list has loaded.
    pub async fn employee_options(&self) -> Vec<Employee> {
        match self.employees.data().await {
            Some(employees) => std::iter::once(Employee::empty()).chain(employees).collect(),
            None => Vec::new(),
        }
    }

    pub async fn find_employee(&self, employee_id: &str) -> Result<Employee, ReviewError> {
        self.employee_options()
            .await
            .into_iter()
            .find(|e| e.id == employee_id)
            .ok_or_else(|| ReviewError::UnknownEmployee(employee_id.to_string()))
    }

    pub fn employees_loading(&self) -> bool {
        self.employees.loading()
    }

    pub fn transactions_loading(&self) -> bool {
        self.paginated.loading() || self.by_employee.loading()
    }

    pub fn employees(&self) -> &EmployeesResource<D> {
        &self.employees
    }

    pub fn paginated(&self) -> &PaginatedTransactionsResource<D> {
        &self.paginated
    }

    pub fn by_employee(&self) -> &TransactionsByEmployeeResource<D> {
        &self.by_employee
    }

    pub fn transaction_list(&self) -> &TransactionList<D> {
        &self.transaction_list
    }
}
