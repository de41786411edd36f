//! Alert state storage for the relay.
//!
//! Two interchangeable backends implement [`AlertStateStore`]:
//! - [`RedisStateStore`]: a remote Redis keyspace, suitable for multiple
//!   relay replicas sharing state
//! - [`SqliteStateStore`]: an embedded SQLite file, suitable for a single
//!   instance with no external dependencies
//!
//! [`RetentionCleaner`] is the background task that prunes resolved records
//! from backends that support retention sweeps.

#![forbid(unsafe_code)]

mod cleaner;
mod error;
mod redis_store;
mod sqlite;
mod store;

pub use cleaner::{RetentionCleaner, RetentionPolicy};
pub use error::{Result, StoreError};
pub use redis_store::RedisStateStore;
pub use sqlite::SqliteStateStore;
pub use store::AlertStateStore;
