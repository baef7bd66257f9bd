pub mod fixtures;
pub mod mock_api;
pub mod request_cache;
