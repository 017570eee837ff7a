//! Bulk synchronization
//!
//! [`BulkSynchronizer`] drives chunked, paced runs over the seller store;
//! [`RateLimiter`] bounds the primary provider's upstream quota.

pub mod bulk;
pub mod rate_limit;

pub use bulk::{BulkSynchronizer, SyncMode};
pub use rate_limit::RateLimiter;
