//! Small-capacity backup tier.
//!
//! Stores a signed, encrypted token of the critical projection in a cookie
//! jar, next to a plaintext metadata record. Both entries share expiry and
//! attributes. Tokens longer than the per-entry bound are refused.

use super::PROBE_KEY;
use crate::adapters::cookie_jar::{CookieJar, EntryAttributes};
use crate::domain::codec::SecureCodec;
use crate::domain::config::{KeyMaterial, PersistenceConfig, DEFAULT_BACKUP_MAX_AGE_SECS};
use crate::domain::errors::{IntegrityError, TierError};
use crate::domain::record::BackupMetadata;
use crate::ports::outbound::{KeyValueStore, StorageTier, TierProbe, TimeSource, WriteReceipt};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::TierKind;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct SmallCapacityTier<S: KeyValueStore> {
    jar: Mutex<CookieJar<S>>,
    codec: SecureCodec,
    attributes: EntryAttributes,
    prefix: String,
    max_entry_bytes: usize,
    time_source: Arc<dyn TimeSource>,
}

impl<S: KeyValueStore> SmallCapacityTier<S> {
    pub fn new(
        store: S,
        keys: KeyMaterial,
        config: &PersistenceConfig,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            jar: Mutex::new(CookieJar::new(store, time_source.clone())),
            codec: SecureCodec::new(keys, config.compression_threshold, config.compression_level),
            attributes: EntryAttributes::from_config(config),
            prefix: config.backup_prefix.clone(),
            max_entry_bytes: config.max_backup_entry_bytes,
            time_source,
        }
    }

    fn token_name(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    fn metadata_name(&self, key: &str) -> String {
        format!("{}{}_meta", self.prefix, key)
    }

    fn metadata(jar: &CookieJar<S>, name: &str) -> Option<BackupMetadata> {
        let raw = jar.get(name).ok().flatten()?;
        serde_json::from_str(&raw).ok()
    }

    fn encode_metadata(metadata: &BackupMetadata) -> Result<String, TierError> {
        serde_json::to_string(metadata).map_err(|e| TierError::Serialization {
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl<S: KeyValueStore + 'static> StorageTier for SmallCapacityTier<S> {
    fn kind(&self) -> TierKind {
        TierKind::SmallCapacity
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<WriteReceipt, TierError> {
        let encoded = self.codec.encode(bytes)?;
        if encoded.len() > self.max_entry_bytes {
            warn!(
                "[persistence] backup token of {} bytes exceeds {} byte entry bound",
                encoded.len(),
                self.max_entry_bytes
            );
            return Err(TierError::Capacity {
                size: encoded.len(),
                max: self.max_entry_bytes,
            });
        }

        let now = self.time_source.now();
        let token_name = self.token_name(key);
        let metadata_name = self.metadata_name(key);

        let mut jar = self.jar.lock();
        match jar.purge_expired() {
            Ok(0) => {}
            Ok(n) => debug!("[persistence] purged {} expired backup entries", n),
            Err(e) => debug!("[persistence] expired entry purge skipped: {}", e),
        }
        let metadata = match Self::metadata(&jar, &metadata_name) {
            Some(previous) => previous.rewritten(now, encoded.compressed),
            None => BackupMetadata::created(now, encoded.compressed),
        };
        let metadata = Self::encode_metadata(&metadata)?;

        jar.set_all(
            &[(token_name.as_str(), encoded.token.as_str()), (metadata_name.as_str(), metadata.as_str())],
            &self.attributes,
        )?;

        Ok(WriteReceipt {
            bytes_in: encoded.plaintext_len,
            payload_bytes: encoded.payload_len,
            stored_bytes: encoded.len(),
            compressed: encoded.compressed,
        })
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, TierError> {
        let token_name = self.token_name(key);
        let metadata_name = self.metadata_name(key);

        let mut jar = self.jar.lock();
        let Some(token) = jar.get(&token_name)? else {
            return Ok(None);
        };
        let metadata = Self::metadata(&jar, &metadata_name).ok_or(IntegrityError::Malformed {
            reason: "missing backup metadata",
        })?;

        let plaintext = self.codec.decode(&token, metadata.compressed)?;

        let accessed = Self::encode_metadata(&metadata.accessed(self.time_source.now()))?;
        if let Err(e) = jar.set(&metadata_name, &accessed, &self.attributes) {
            debug!("[persistence] backup access tracking skipped: {}", e);
        }

        Ok(Some(plaintext))
    }

    async fn delete(&self, key: &str) -> Result<(), TierError> {
        let token_name = self.token_name(key);
        let metadata_name = self.metadata_name(key);
        Ok(self
            .jar
            .lock()
            .remove_all(&[token_name.as_str(), metadata_name.as_str()])?)
    }

    async fn probe(&self) -> TierProbe {
        let capacity_bytes = self.max_entry_bytes as u64;
        let mut jar = self.jar.lock();
        if let Err(e) = jar.probe(&self.token_name(PROBE_KEY), &self.attributes) {
            debug!("[persistence] small-capacity probe failed: {}", e);
            return TierProbe::unavailable(capacity_bytes);
        }
        match jar.size_bytes() {
            Ok(used_bytes) => TierProbe {
                available: true,
                used_bytes,
                capacity_bytes,
            },
            Err(_) => TierProbe::unavailable(capacity_bytes),
        }
    }

    /// Entries must be transport-secure, first-party only, and expire
    /// within the retention window.
    fn policy_compliant(&self) -> bool {
        let attributes = &self.attributes;
        attributes.secure
            && attributes.same_site.is_restrictive()
            && attributes.max_age_secs > 0
            && attributes.max_age_secs <= DEFAULT_BACKUP_MAX_AGE_SECS
    }
}
