use super::errors::DataAccessError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents an employee whose spending is under review.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Unique identifier of the employee
    pub id: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
}

impl Employee {
    /// The placeholder employee meaning "no filter selected".
    pub fn empty() -> Self {
        Self {
            id: String::new(),
            first_name: "All".to_string(),
            last_name: "Employees".to_string(),
        }
    }

    /// Whether this is the "no filter" placeholder rather than a real record.
    pub fn is_empty_sentinel(&self) -> bool {
        self.id.is_empty()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Represents a card transaction made by an employee.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique identifier for the transaction
    pub id: String,
    /// Amount charged, in USD
    pub amount: Decimal,
    /// Merchant that issued the charge
    pub merchant: String,
    /// Copy of the employee record at fetch time
    pub employee: Employee,
    /// Day the charge was made
    pub date: NaiveDate,
    /// Approval flag as reported by the backend
    pub approved: bool,
}

/// One page of a paginated listing.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    /// Items of this page, in listing order
    pub data: T,
    /// Index of the following page, `None` when this is the last one
    pub next_page: Option<u32>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SetTransactionApprovalParams {
    /// Transaction whose flag is being written
    pub transaction_id: String,
    /// New approval flag
    pub value: bool,
}

/// Trait for the backend the review screen reads from and writes to.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DataAccess {
    /// Retrieves every employee.
    async fn get_employees(&self) -> Result<Vec<Employee>, DataAccessError>;

    /// Retrieves one page of all transactions, starting at page `0`.
    async fn get_transactions_by_page(
        &self,
        page: u32,
    ) -> Result<PaginatedResponse<Vec<Transaction>>, DataAccessError>;

    /// Retrieves every transaction made by a specific employee.
    async fn get_transactions_by_employee(
        &self,
        employee_id: &str,
    ) -> Result<Vec<Transaction>, DataAccessError>;

    /// Sets the approval flag of a transaction.
    async fn set_transaction_approval(
        &self,
        params: SetTransactionApprovalParams,
    ) -> Result<(), DataAccessError>;
}
