use crate::{
    domain::{
        errors::DataAccessError,
        models::{DataAccess, Employee, PaginatedResponse, Transaction},
    },
    infrastructure::request_cache::Fetcher,
};
use tokio::sync::RwLock;

/// Explicit status of a read, as seen by the views.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadState<T> {
    NotYetLoaded,
    Loading,
    LoadFailed(String),
    Loaded(T),
}

struct Loadable<T> {
    data: Option<T>,
    error: Option<String>,
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
        }
    }
}

impl<T: Clone> Loadable<T> {
    fn state(&self, loading: bool) -> LoadState<T> {
        if loading {
            return LoadState::Loading;
        }
        match (&self.data, &self.error) {
            (_, Some(error)) => LoadState::LoadFailed(error.clone()),
            (Some(data), None) => LoadState::Loaded(data.clone()),
            (None, None) => LoadState::NotYetLoaded,
        }
    }

    fn fail(&mut self, error: &DataAccessError) {
        self.error = Some(error.to_string());
    }

    fn clear(&mut self) {
        self.data = None;
        self.error = None;
    }
}

/// The employee list used to populate the filter.
pub struct EmployeesResource<D> {
    fetcher: Fetcher<D>,
    slot: RwLock<Loadable<Vec<Employee>>>,
}

impl<D> EmployeesResource<D>
where
    D: DataAccess + Send + Sync,
{
    pub fn new(fetcher: Fetcher<D>) -> Self {
        Self {
            fetcher,
            slot: RwLock::new(Loadable::default()),
        }
    }

    /// Fetches the employee list unless it is already loaded.
    pub async fn fetch_all(&self) -> Result<(), DataAccessError> {
        if self.slot.read().await.data.is_some() {
            return Ok(());
        }

        match self.fetcher.get_employees().await {
            Ok(employees) => {
                tracing::info!("Loaded {} employees", employees.len());
                let mut slot = self.slot.write().await;
                slot.data = Some(employees);
                slot.error = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to load employees: {}", e);
                self.slot.write().await.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn data(&self) -> Option<Vec<Employee>> {
        self.slot.read().await.data.clone()
    }

    pub async fn state(&self) -> LoadState<Vec<Employee>> {
        self.slot.read().await.state(self.loading())
    }

    pub fn loading(&self) -> bool {
        self.fetcher.loading()
    }

    pub async fn invalidate(&self) {
        self.slot.write().await.clear();
    }
}

/// All transactions, fetched a page at a time and accumulated.
pub struct PaginatedTransactionsResource<D> {
    fetcher: Fetcher<D>,
    slot: RwLock<Loadable<PaginatedResponse<Vec<Transaction>>>>,
}

impl<D> PaginatedTransactionsResource<D>
where
    D: DataAccess + Send + Sync,
{
    pub fn new(fetcher: Fetcher<D>) -> Self {
        Self {
            fetcher,
            slot: RwLock::new(Loadable::default()),
        }
    }

    /// Fetches the page after the last one loaded, or the first page when
    /// nothing is loaded. Does nothing once the last page is in.
    pub async fn fetch_all(&self) -> Result<(), DataAccessError> {
        let page = match &self.slot.read().await.data {
            None => 0,
            Some(current) => match current.next_page {
                Some(next) => next,
                None => {
                    tracing::debug!("No further transaction pages");
                    return Ok(());
                }
            },
        };

        match self.fetcher.get_transactions_by_page(page).await {
            Ok(response) => {
                tracing::info!(
                    "Loaded page {} with {} transactions",
                    page,
                    response.data.len()
                );
                let mut slot = self.slot.write().await;
                slot.data = Some(match slot.data.take() {
                    None => response,
                    Some(mut current) => {
                        current.data.extend(response.data);
                        current.next_page = response.next_page;
                        current
                    }
                });
                slot.error = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to load transaction page {}: {}", page, e);
                self.slot.write().await.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn data(&self) -> Option<PaginatedResponse<Vec<Transaction>>> {
        self.slot.read().await.data.clone()
    }

    pub async fn state(&self) -> LoadState<PaginatedResponse<Vec<Transaction>>> {
        self.slot.read().await.state(self.loading())
    }

    /// True until a page without a successor has been fetched.
    pub async fn has_next_page(&self) -> bool {
        self.slot
            .read()
            .await
            .data
            .as_ref()
            .map_or(true, |page| page.next_page.is_some())
    }

    pub fn loading(&self) -> bool {
        self.fetcher.loading()
    }

    pub async fn invalidate(&self) {
        self.slot.write().await.clear();
    }
}

/// Every transaction of one employee, unpaged.
pub struct TransactionsByEmployeeResource<D> {
    fetcher: Fetcher<D>,
    // rows are tagged with the employee they were fetched for
    slot: RwLock<Loadable<(String, Vec<Transaction>)>>,
}

impl<D> TransactionsByEmployeeResource<D>
where
    D: DataAccess + Send + Sync,
{
    pub fn new(fetcher: Fetcher<D>) -> Self {
        Self {
            fetcher,
            slot: RwLock::new(Loadable::default()),
        }
    }

    pub async fn fetch_by_id(&self, employee_id: &str) -> Result<(), DataAccessError> {
        match self.fetcher.get_transactions_by_employee(employee_id).await {
            Ok(transactions) => {
                tracing::info!(
                    "Loaded {} transactions for employee {}",
                    transactions.len(),
                    employee_id
                );
                let mut slot = self.slot.write().await;
                slot.data = Some((employee_id.to_string(), transactions));
                slot.error = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to load transactions for employee {}: {}",
                    employee_id,
                    e
                );
                self.slot.write().await.fail(&e);
                Err(e)
            }
        }
    }

    /// Rows last fetched for `employee_id`, if those are the ones held.
    pub async fn data_for(&self, employee_id: &str) -> Option<Vec<Transaction>> {
        match &self.slot.read().await.data {
            Some((id, transactions)) if id == employee_id => Some(transactions.clone()),
            _ => None,
        }
    }

    pub async fn state(&self) -> LoadState<Vec<Transaction>> {
        match self.slot.read().await.state(self.loading()) {
            LoadState::Loaded((_, transactions)) => LoadState::Loaded(transactions),
            LoadState::LoadFailed(e) => LoadState::LoadFailed(e),
            LoadState::Loading => LoadState::Loading,
            LoadState::NotYetLoaded => LoadState::NotYetLoaded,
        }
    }

    pub fn loading(&self) -> bool {
        self.fetcher.loading()
    }

    pub async fn invalidate(&self) {
        self.slot.write().await.clear();
    }
}
