//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the persistence service.
//!
//! These are the interfaces the host application implements, or picks from
//! the adapters shipped with this crate.

use crate::domain::errors::{MechanismError, TierError};
use async_trait::async_trait;
use shared_types::{ApplicationState, TierKind, Timestamp};

/// Result of a prefix scan.
pub type ScanResult = Vec<(Vec<u8>, Vec<u8>)>;

/// Abstract interface for a key-value mechanism underneath a tier.
///
/// Production: `FileBackedKVStore`
/// Testing: `InMemoryKVStore`
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, MechanismError>;

    /// Put a single key-value pair.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), MechanismError>;

    /// Delete a key.
    fn delete(&mut self, key: &[u8]) -> Result<(), MechanismError>;

    /// Execute an atomic batch write.
    ///
    /// Either ALL operations in the batch succeed, or NONE are applied.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), MechanismError>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> Result<bool, MechanismError>;

    /// Iterate over keys with a prefix.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, MechanismError>;

    /// Sum of stored key and value lengths.
    fn size_bytes(&self) -> Result<u64, MechanismError> {
        Ok(self
            .prefix_scan(b"")?
            .iter()
            .map(|(k, v)| (k.len() + v.len()) as u64)
            .sum())
    }
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put { key: Vec<u8>, value: Vec<u8> },
    /// Delete a key.
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Get current timestamp in milliseconds since epoch.
    fn now(&self) -> Timestamp;
}

/// Data-classification gate consulted before every save.
pub trait CompliancePolicy: Send + Sync {
    /// Whether the state may be persisted at all.
    fn is_compliant(&self, state: &ApplicationState) -> bool;

    /// Human-readable reasons for a rejection.
    fn violations(&self, _state: &ApplicationState) -> Vec<String> {
        Vec::new()
    }

    /// Copy of the state with disallowed content redacted. Must be idempotent.
    fn sanitize(&self, state: ApplicationState) -> ApplicationState;
}

/// Availability and size of a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TierProbe {
    pub available: bool,
    pub used_bytes: u64,
    pub capacity_bytes: u64,
}

impl TierProbe {
    pub fn unavailable(capacity_bytes: u64) -> Self {
        Self {
            available: false,
            used_bytes: 0,
            capacity_bytes,
        }
    }
}

/// What a successful tier write stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteReceipt {
    /// Bytes handed to the tier.
    pub bytes_in: usize,
    /// Payload bytes after any compression stage.
    pub payload_bytes: usize,
    /// Bytes of the stored entry.
    pub stored_bytes: usize,
    /// Whether the payload was compressed.
    pub compressed: bool,
}

impl WriteReceipt {
    /// Receipt for a tier that stores bytes verbatim.
    pub fn verbatim(len: usize) -> Self {
        Self {
            bytes_in: len,
            payload_bytes: len,
            stored_bytes: len,
            compressed: false,
        }
    }

    /// Payload size over input size.
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_in == 0 {
            return 1.0;
        }
        self.payload_bytes as f64 / self.bytes_in as f64
    }
}

/// Uniform contract of a storage tier.
///
/// Failures are returned as `TierError` and recovered by the orchestrator.
#[async_trait]
pub trait StorageTier: Send + Sync {
    /// Which tier this adapter implements.
    fn kind(&self) -> TierKind;

    /// Store bytes under a key.
    async fn write(&self, key: &str, bytes: &[u8]) -> Result<WriteReceipt, TierError>;

    /// Read bytes under a key; `Ok(None)` is a miss.
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, TierError>;

    /// Remove a key. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), TierError>;

    /// Availability and size estimate.
    async fn probe(&self) -> TierProbe;

    /// The tier's own attribute-policy self-check.
    fn policy_compliant(&self) -> bool {
        true
    }
}
