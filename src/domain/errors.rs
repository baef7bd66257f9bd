use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataAccessError {
    #[error("Invalid page {0}")]
    InvalidPage(u32),
    #[error("Employee id cannot be empty")]
    EmptyEmployeeId,
    #[error("Invalid transaction to approve: {0}")]
    InvalidTransaction(String),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Failed to read fixture file")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse fixture")]
    Parse(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Data access failed: {0}")]
    DataAccess(#[from] DataAccessError),
    #[error("Failed to load fixture")]
    Fixture(#[from] FixtureError),
    #[error("Transaction {0} is not in the current view")]
    UnknownTransaction(String),
    #[error("Employee {0} not found")]
    UnknownEmployee(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown command: {0}")]
    Unknown(String),
    #[error("`{0}` expects an argument")]
    MissingArgument(&'static str),
}
