//! Diagnostic tier: a bounded audit ring stored under a single key.
//!
//! `write` takes one serialized `AuditEntry` and appends it to the ring;
//! `read` returns the whole ring as a JSON array.

use super::PROBE_KEY;
use crate::domain::audit::{AuditEntry, AuditRing};
use crate::domain::errors::TierError;
use crate::ports::outbound::{KeyValueStore, StorageTier, TierProbe, WriteReceipt};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::TierKind;
use tracing::debug;

pub struct DiagnosticTier<S: KeyValueStore> {
    store: Mutex<S>,
    ring_capacity: usize,
    capacity_bytes: u64,
}

impl<S: KeyValueStore> DiagnosticTier<S> {
    pub fn new(store: S, ring_capacity: usize, capacity_bytes: u64) -> Self {
        Self {
            store: Mutex::new(store),
            ring_capacity,
            capacity_bytes,
        }
    }

    fn load_ring(&self, store: &S, key: &str) -> Result<AuditRing, TierError> {
        let entries = match store.get(key.as_bytes())? {
            Some(raw) => serde_json::from_slice::<Vec<AuditEntry>>(&raw).unwrap_or_else(|e| {
                debug!("[persistence] discarding unreadable audit ring: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        };
        Ok(AuditRing::from_entries(self.ring_capacity, entries))
    }
}

#[async_trait]
impl<S: KeyValueStore + 'static> StorageTier for DiagnosticTier<S> {
    fn kind(&self) -> TierKind {
        TierKind::Diagnostic
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<WriteReceipt, TierError> {
        let entry: AuditEntry = serde_json::from_slice(bytes).map_err(|e| TierError::Serialization {
            message: e.to_string(),
        })?;

        let mut store = self.store.lock();
        let mut ring = self.load_ring(&store, key)?;
        ring.push(entry);

        let encoded = serde_json::to_vec(&ring.into_vec()).map_err(|e| TierError::Serialization {
            message: e.to_string(),
        })?;
        store.put(key.as_bytes(), &encoded)?;

        Ok(WriteReceipt {
            bytes_in: bytes.len(),
            payload_bytes: bytes.len(),
            stored_bytes: encoded.len(),
            compressed: false,
        })
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
        match round_trip.and_then(|_| store.size_bytes()) {
            Ok(used_bytes) => TierProbe {
                available: true,
                used_bytes,
                capacity_bytes: self.capacity_bytes,
            },
            Err(e) => {
                debug!("[persistence] diagnostic probe failed: {}", e);
                TierProbe::unavailable(self.capacity_bytes)
            }
        }
    }
}
