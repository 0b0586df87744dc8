pub mod api;
pub mod caching;
pub mod service;

pub use api::ApiClient;
pub use caching::{RateCacheClient, RatesOutcome};
pub use service::ValertService;
