//! Core business logic abstractions

pub mod alert;
pub mod analytics;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod log;
pub mod rate;

// Re-export main types for cleaner imports
pub use alert::{Alert, Direction, NewAlert};
pub use cache::{CacheState, RateCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{FetchError, FetchErrorKind};
pub use rate::{HistoryPoint, RateSet, RateSnapshot, RatesSource, ServerCacheStatus};
