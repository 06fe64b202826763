use crate::domain::errors::MechanismError;
use crate::ports::outbound::{BatchOperation, KeyValueStore, ScanResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// In-memory key-value store.
///
/// Clones share the same map, so a handle kept outside a tier observes and
/// can modify what the tier stores. The availability switch simulates a
/// mechanism that is absent from the execution context.
#[derive(Clone, Debug)]
pub struct InMemoryKVStore {
    data: Arc<RwLock<HashMap<Vec<u8>, Vec<u8>>>>,
    available: Arc<AtomicBool>,
}

impl Default for InMemoryKVStore {
    fn default() -> Self {
        Self {
            data: Arc::default(),
            available: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl InMemoryKVStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch the mechanism on or off for every clone.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Drop every entry, bypassing the availability switch.
    pub fn wipe(&self) {
        self.data.write().clear();
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    fn check(&self) -> Result<(), MechanismError> {
        if self.is_available() {
            Ok(())
        } else {
            Err(MechanismError::Unavailable)
        }
    }
}

impl KeyValueStore for InMemoryKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, MechanismError> {
        self.check()?;
        Ok(self.data.read().get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), MechanismError> {
        self.check()?;
        self.data.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), MechanismError> {
        self.check()?;
        self.data.write().remove(key);
        Ok(())
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), MechanismError> {
        self.check()?;
        // Single write guard held for the whole batch
        let mut data = self.data.write();
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    data.insert(key, value);
                }
                BatchOperation::Delete { key } => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn exists(&self, key: &[u8]) -> Result<bool, MechanismError> {
        self.check()?;
        Ok(self.data.read().contains_key(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, MechanismError> {
        self.check()?;
        let results: Vec<_> = self
            .data
            .read()
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(results)
    }
}
