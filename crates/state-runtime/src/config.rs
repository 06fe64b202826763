//! # Runtime Configuration
//!
//! Environment-driven configuration of the `stated` binary.

use state_persistence::{ConfigError, KeyMaterial, PersistenceConfig};
use std::env;
use std::path::PathBuf;

/// Environment variable names.
pub mod vars {
    pub const DATA_DIR: &str = "SP_DATA_DIR";
    pub const SECURE_CONTEXT: &str = "SP_SECURE_CONTEXT";
    pub const ENCRYPTION_KEY: &str = "SP_ENCRYPTION_KEY";
    pub const SIGNING_KEY: &str = "SP_SIGNING_KEY";
    pub const PROFILE: &str = "SP_PROFILE";
}

/// File names of the durable mechanisms under the data directory.
pub const LARGE_STORE_FILE: &str = "large.db";
pub const BACKUP_STORE_FILE: &str = "backup.db";
pub const DIAGNOSTIC_STORE_FILE: &str = "audit.db";

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Directory holding the file-backed mechanisms.
    pub data_dir: PathBuf,
    pub persistence: PersistenceConfig,
    pub keys: KeyMaterial,
}

impl RuntimeConfig {
    /// Load configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `SP_DATA_DIR`: data directory (default: ./.state)
    /// - `SP_PROFILE`: `educational` or `testing` (default: educational)
    /// - `SP_SECURE_CONTEXT`: transport-secure context (default: profile value)
    /// - `SP_ENCRYPTION_KEY`, `SP_SIGNING_KEY`: 64 hex chars each (required)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut persistence = match lookup(vars::PROFILE).as_deref() {
            None | Some("educational") => PersistenceConfig::educational(),
            Some("testing") => PersistenceConfig::for_testing(),
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    field: "profile",
                    reason: format!("unknown profile '{other}'"),
                })
            }
        };

        if let Some(secure) = lookup(vars::SECURE_CONTEXT) {
            persistence = persistence.with_secure_context(parse_flag(&secure));
        }
        persistence.validate()?;

        let encryption = lookup(vars::ENCRYPTION_KEY).ok_or(ConfigError::MissingKey {
            name: vars::ENCRYPTION_KEY,
        })?;
        let signing = lookup(vars::SIGNING_KEY).ok_or(ConfigError::MissingKey {
            name: vars::SIGNING_KEY,
        })?;

        Ok(Self {
            data_dir: lookup(vars::DATA_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./.state")),
            persistence,
            keys: KeyMaterial::from_hex(encryption.trim(), signing.trim())?,
        })
    }

    pub fn large_store_path(&self) -> PathBuf {
        self.data_dir.join(LARGE_STORE_FILE)
    }

    pub fn backup_store_path(&self) -> PathBuf {
        self.data_dir.join(BACKUP_STORE_FILE)
    }

    pub fn diagnostic_store_path(&self) -> PathBuf {
        self.data_dir.join(DIAGNOSTIC_STORE_FILE)
    }
}

fn parse_flag(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1"
}
