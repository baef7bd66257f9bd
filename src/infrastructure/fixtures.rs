use crate::domain::{
    errors::FixtureError,
    models::{Employee, Transaction},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

const BUNDLED_FIXTURE: &str = include_str!("../../data/mock.json");

/// Seed data for the in-memory backend.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MockData {
    pub employees: Vec<Employee>,
    pub transactions: Vec<Transaction>,
}

impl MockData {
    pub fn bundled() -> Result<Self, FixtureError> {
        Self::from_json(BUNDLED_FIXTURE)
    }

    pub fn from_json(raw: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub async fn from_file(path: &Path) -> Result<Self, FixtureError> {
        tracing::info!("Loading fixture from {}", path.display());
        let raw = tokio::fs::read_to_string(path).await?;
        Self::from_json(&raw)
    }

    /// Loads `path` when given, the bundled fixture otherwise.
    pub async fn load(path: Option<&Path>) -> Result<Self, FixtureError> {
        match path {
            Some(path) => Self::from_file(path).await,
            None => Self::bundled(),
        }
    }
}
