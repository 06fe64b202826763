//! # Configuration
//!
//! Value objects configuring the persistence subsystem and its key material.
//!
//! All configuration values have defaults matching the production profile;
//! `for_testing()` relaxes the transport attributes for local runs.

use crate::domain::errors::ConfigError;
use serde::{Deserialize, Serialize};
use shared_crypto::SecretKey;
use shared_types::STATE_SCHEMA_VERSION;

/// Thirty days, in seconds.
pub const DEFAULT_BACKUP_MAX_AGE_SECS: u64 = 30 * 24 * 60 * 60;

/// Hard per-entry bound of the small-capacity backup tier.
pub const DEFAULT_MAX_BACKUP_ENTRY_BYTES: usize = 4096;

/// Plaintext size above which the backup payload is compressed.
pub const DEFAULT_COMPRESSION_THRESHOLD: usize = 1024;

/// Maximum records kept in the diagnostic audit ring.
pub const DEFAULT_AUDIT_CAPACITY: usize = 50;

/// Minimum anonymous session id length accepted by the compliance gate.
pub const DEFAULT_MIN_SESSION_ID_LEN: usize = 16;

/// Cross-site policy attached to backup entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    #[default]
    Strict,
    Lax,
    None,
}

impl SameSite {
    /// Whether the policy restricts cross-site attachment.
    pub fn is_restrictive(&self) -> bool {
        matches!(self, SameSite::Strict | SameSite::Lax)
    }
}

/// Configuration for the persistence subsystem.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistenceConfig {
    /// Fixed key of the aggregate in the volatile and large-capacity tiers.
    pub storage_key: String,

    /// Prefix for the backup token and metadata entries.
    pub backup_prefix: String,

    /// Key of the audit ring in the diagnostic tier.
    pub audit_key: String,

    /// Expiry of backup entries (default: 30 days).
    pub backup_max_age_secs: u64,

    /// Hard bound on the encoded backup token (default: 4096 bytes).
    pub max_backup_entry_bytes: usize,

    /// Compress the backup payload above this many plaintext bytes (default: 1024).
    pub compression_threshold: usize,

    /// Zstd level for the backup payload (1-22, default 3).
    pub compression_level: i32,

    /// Audit ring capacity (default: 50).
    pub audit_capacity: usize,

    /// Minimum session id length (default: 16).
    pub min_session_id_len: usize,

    /// Whether the execution context is transport-secure.
    pub secure_context: bool,

    /// Whether backup entries carry the transport-secure attribute.
    pub secure_attribute: bool,

    /// Cross-site policy of backup entries.
    pub same_site: SameSite,

    /// Schema version tag attached to every save.
    pub schema_version: String,

    /// Minimum available tiers for the aggregate health flag (default: 2).
    pub health_quorum: usize,

    /// Estimated capacity of the volatile tier (default: 50 MB).
    pub volatile_capacity_bytes: u64,

    /// Capacity of the large-capacity tier (default: 10 MB).
    pub large_capacity_bytes: u64,

    /// Capacity of the diagnostic tier (default: 10 MB).
    pub diagnostic_capacity_bytes: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            storage_key: "app_state".to_string(),
            backup_prefix: "sp_".to_string(),
            audit_key: "sp_audit_log".to_string(),
            backup_max_age_secs: DEFAULT_BACKUP_MAX_AGE_SECS,
            max_backup_entry_bytes: DEFAULT_MAX_BACKUP_ENTRY_BYTES,
            compression_threshold: DEFAULT_COMPRESSION_THRESHOLD,
            compression_level: 3,
            audit_capacity: DEFAULT_AUDIT_CAPACITY,
            min_session_id_len: DEFAULT_MIN_SESSION_ID_LEN,
            secure_context: true,
            secure_attribute: true,
            same_site: SameSite::Strict,
            schema_version: STATE_SCHEMA_VERSION.to_string(),
            health_quorum: 2,
            volatile_capacity_bytes: 50 * 1024 * 1024,
            large_capacity_bytes: 10 * 1024 * 1024,
            diagnostic_capacity_bytes: 10 * 1024 * 1024,
        }
    }
}

impl PersistenceConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Production profile for the learning platform: secure, strict, 30 days.
    pub fn educational() -> Self {
        Self::default()
    }

    /// Local profile: insecure transport, lax cross-site policy, 1 hour expiry.
    pub fn for_testing() -> Self {
        Self {
            backup_prefix: "test_".to_string(),
            audit_key: "test_audit_log".to_string(),
            backup_max_age_secs: 60 * 60,
            secure_context: false,
            secure_attribute: false,
            same_site: SameSite::Lax,
            ..Self::default()
        }
    }

    /// Set the storage key.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Set the backup entry prefix.
    pub fn with_backup_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.backup_prefix = prefix.into();
        self
    }

    /// Set the backup entry expiry.
    pub fn with_backup_max_age(mut self, secs: u64) -> Self {
        self.backup_max_age_secs = secs;
        self
    }

    /// Set the hard bound on the backup token.
    pub fn with_max_backup_entry_bytes(mut self, bytes: usize) -> Self {
        self.max_backup_entry_bytes = bytes;
        self
    }

    /// Set the compression threshold.
    pub fn with_compression_threshold(mut self, bytes: usize) -> Self {
        self.compression_threshold = bytes;
        self
    }

    /// Set the audit ring capacity.
    pub fn with_audit_capacity(mut self, capacity: usize) -> Self {
        self.audit_capacity = capacity;
        self
    }

    /// Set whether the execution context is transport-secure.
    pub fn with_secure_context(mut self, secure: bool) -> Self {
        self.secure_context = secure;
        self
    }

    /// Set the health quorum.
    pub fn with_health_quorum(mut self, quorum: usize) -> Self {
        self.health_quorum = quorum;
        self
    }

    /// Reject values the subsystem cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "storage_key",
                reason: "must not be empty".to_string(),
            });
        }
        if self.max_backup_entry_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_backup_entry_bytes",
                reason: "must be positive".to_string(),
            });
        }
        if !(1..=22).contains(&self.compression_level) {
            return Err(ConfigError::InvalidValue {
                field: "compression_level",
                reason: format!("{} is outside 1..=22", self.compression_level),
            });
        }
        if self.audit_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "audit_capacity",
                reason: "must be positive".to_string(),
            });
        }
        if self.health_quorum == 0 || self.health_quorum > 4 {
            return Err(ConfigError::InvalidValue {
                field: "health_quorum",
                reason: format!("{} is outside 1..=4", self.health_quorum),
            });
        }
        Ok(())
    }
}

/// Encryption and signing keys for the backup tier.
///
/// Supplied by configuration so that backups survive restarts.
#[derive(Clone, Debug)]
pub struct KeyMaterial {
    pub encryption: SecretKey,
    pub signing: SecretKey,
}

impl KeyMaterial {
    /// Create from two keys.
    pub fn new(encryption: SecretKey, signing: SecretKey) -> Self {
        Self {
            encryption,
            signing,
        }
    }

    /// Parse both keys from 64-character hex strings.
    pub fn from_hex(encryption: &str, signing: &str) -> Result<Self, ConfigError> {
        let encryption = SecretKey::from_hex(encryption).map_err(|source| {
            ConfigError::InvalidKey {
                name: "encryption",
                source,
            }
        })?;
        let signing = SecretKey::from_hex(signing).map_err(|source| ConfigError::InvalidKey {
            name: "signing",
            source,
        })?;
        Ok(Self::new(encryption, signing))
    }

    /// Generate ephemeral keys.
    ///
    /// Backups written under ephemeral keys cannot be read after a restart.
    pub fn generate() -> Self {
        tracing::warn!(
            "[persistence] using ephemeral key material; backups will not survive a restart"
        );
        Self::new(SecretKey::generate(), SecretKey::generate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PersistenceConfig::default();
        assert_eq!(config.max_backup_entry_bytes, 4096);
        assert_eq!(config.compression_threshold, 1024);
        assert_eq!(config.audit_capacity, 50);
        assert_eq!(config.backup_max_age_secs, 2_592_000);
        assert_eq!(config.health_quorum, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_testing_profile() {
        let config = PersistenceConfig::for_testing();
        assert_eq!(config.backup_prefix, "test_");
        assert_eq!(config.backup_max_age_secs, 3600);
        assert!(!config.secure_attribute);
        assert_eq!(config.same_site, SameSite::Lax);
    }

    #[test]
    fn test_validate_rejects_bad_quorum() {
        let config = PersistenceConfig::default().with_health_quorum(5);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "health_quorum",
                ..
            })
        ));
    }

    #[test]
    fn test_key_material_from_hex() {
        let enc = "11".repeat(32);
        let sig = "22".repeat(32);
        let keys = KeyMaterial::from_hex(&enc, &sig).unwrap();
        assert_eq!(keys.encryption.as_bytes(), &[0x11; 32]);
        assert_eq!(keys.signing.as_bytes(), &[0x22; 32]);

        let err = KeyMaterial::from_hex(&enc, "22").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidKey { name: "signing", .. }));
    }

    #[test]
    fn test_same_site_restrictive() {
        assert!(SameSite::Strict.is_restrictive());
        assert!(SameSite::Lax.is_restrictive());
        assert!(!SameSite::None.is_restrictive());
    }
}
