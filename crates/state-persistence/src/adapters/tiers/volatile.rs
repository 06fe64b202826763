use crate::domain::errors::TierError;
use crate::ports::outbound::{StorageTier, TierProbe, WriteReceipt};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::TierKind;
use std::collections::HashMap;

/// In-process cache. Always available; lost on restart.
#[derive(Debug, Default)]
pub struct VolatileTier {
    entries: RwLock<HashMap<String, Vec<u8>>>,
    capacity_bytes: u64,
}

impl VolatileTier {
    pub fn new(capacity_bytes: u64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity_bytes,
        }
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl StorageTier for VolatileTier {
    fn kind(&self) -> TierKind {
        TierKind::Volatile
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<WriteReceipt, TierError> {
        self.entries.write().insert(key.to_string(), bytes.to_vec());
        Ok(WriteReceipt::verbatim(bytes.len()))
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, TierError> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<(), TierError> {
        self.entries.write().remove(key);
        Ok(())
    }

    async fn probe(&self) -> TierProbe {
        let used_bytes = self
            .entries
            .read()
            .iter()
            .map(|(k, v)| (k.len() + v.len()) as u64)
            .sum();
        TierProbe {
            available: true,
            used_bytes,
            capacity_bytes: self.capacity_bytes,
        }
    }
}
