//! # Adapters Layer
//!
//! Concrete implementations of the outbound ports.
//!
//! - `storage/`: key/value mechanisms (in-memory, file-backed)
//! - `cookie_jar`: attribute-carrying mechanism under the backup tier
//! - `infra/`: time sources
//! - `tiers/`: the four `StorageTier` adapters

pub mod cookie_jar;
pub mod infra;
pub mod storage;
pub mod tiers;

pub use cookie_jar::{CookieJar, EntryAttributes};
pub use infra::{FixedTimeSource, SystemTimeSource};
pub use storage::{FileBackedKVStore, InMemoryKVStore};
pub use tiers::{DiagnosticTier, LargeCapacityTier, SmallCapacityTier, VolatileTier};
