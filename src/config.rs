use std::path::PathBuf;
use std::time::Duration;
use typed_builder::TypedBuilder;

pub const DEFAULT_PAGE_SIZE: usize = 5;
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(300);

/// Settings for the in-memory review backend.
#[derive(Clone, Debug, TypedBuilder)]
pub struct ReviewConfig {
    /// Transactions per page of the "all transactions" listing
    #[builder(default = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,
    /// Simulated round trip applied to every backend call
    #[builder(default = DEFAULT_LATENCY)]
    pub latency: Duration,
    /// JSON fixture to seed the backend with; the bundled one when absent
    #[builder(default)]
    pub fixture: Option<PathBuf>,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let config = ReviewConfig::default();
        assert_eq!(config.page_size, 5);
        assert_eq!(config.latency, Duration::from_millis(300));
        assert!(config.fixture.is_none());
    }

    #[test]
    fn builder_overrides() {
        let config = ReviewConfig::builder()
            .page_size(2)
            .latency(Duration::ZERO)
            .fixture(Some(PathBuf::from("data.json")))
            .build();
        assert_eq!(config.page_size, 2);
        assert_eq!(config.latency, Duration::ZERO);
        assert_eq!(config.fixture, Some(PathBuf::from("data.json")));
    }
}
