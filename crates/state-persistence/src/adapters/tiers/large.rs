use super::PROBE_KEY;
use crate::domain::errors::TierError;
use crate::ports::outbound::{KeyValueStore, StorageTier, TierProbe, WriteReceipt};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::TierKind;
use tracing::debug;

/// Durable origin-scoped store holding the full document.
pub struct LargeCapacityTier<S: KeyValueStore> {
    store: Mutex<S>,
    capacity_bytes: u64,
}

impl<S: KeyValueStore> LargeCapacityTier<S> {
    pub fn new(store: S, capacity_bytes: u64) -> Self {
        Self {
            store: Mutex::new(store),
            capacity_bytes,
        }
    }
}

#[async_trait]
impl<S: KeyValueStore + 'static> StorageTier for LargeCapacityTier<S> {
    fn kind(&self) -> TierKind {
        TierKind::LargeCapacity
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<WriteReceipt, TierError> {
        let mut store = self.store.lock();

        let replaced = store
            .get(key.as_bytes())?
            .map(|old| (key.len() + old.len()) as u64)
            .unwrap_or(0);
        let projected = (store.size_bytes()? - replaced) + (key.len() + bytes.len()) as u64;
        if projected > self.capacity_bytes {
            return Err(TierError::Capacity {
                size: projected as usize,
                max: self.capacity_bytes as usize,
            });
        }

        store.put(key.as_bytes(), bytes)?;
        Ok(WriteReceipt::verbatim(bytes.len()))
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, TierError> {
        Ok(self.store.lock().get(key.as_bytes())?)
    }

    async fn delete(&self, key: &str) -> Result<(), TierError> {
        Ok(self.store.lock().delete(key.as_bytes())?)
    }

    async fn probe(&self) -> TierProbe {
        let mut store = self.store.lock();
        let round_trip = store
            .put(PROBE_KEY.as_bytes(), b"1")
            .and_then(|_| store.delete(PROBE_KEY.as_bytes()));
        if let Err(e) = round_trip {
            debug!("[persistence] large-capacity probe failed: {}", e);
            return TierProbe::unavailable(self.capacity_bytes);
        }

        match store.size_bytes() {
            Ok(used_bytes) => TierProbe {
                available: true,
                used_bytes,
                capacity_bytes: self.capacity_bytes,
            },
            Err(_) => TierProbe::unavailable(self.capacity_bytes),
        }
    }
}
