//! # Domain Layer
//!
//! Pure domain logic for the state persistence subsystem.
//!
//! ## Modules
//!
//! - `audit`: bounded audit ring of the diagnostic tier
//! - `codec`: signed, encrypted backup tokens
//! - `compliance`: default personal-data policy
//! - `compression`: zstd payload compression
//! - `config`: configuration and key material
//! - `errors`: error taxonomy
//! - `health`: health report
//! - `metrics`: performance counters
//! - `record`: native representations stored in each tier

pub mod audit;
pub mod codec;
pub mod compliance;
pub mod compression;
pub mod config;
pub mod errors;
pub mod health;
pub mod metrics;
pub mod record;

pub use audit::{AuditEntry, AuditEvent, AuditRing};
pub use codec::{EncodedToken, SecureCodec};
pub use compliance::{ChildDataPolicy, ComplianceReport, PiiKind, Violation};
pub use config::{KeyMaterial, PersistenceConfig, SameSite};
pub use errors::{
    CodecError, ConfigError, IntegrityError, MechanismError, PersistenceError, TierError,
};
pub use health::{HealthPerformance, HealthReport, TierHealth};
pub use metrics::{MetricsCollector, PerformanceMetrics};
pub use record::{BackupMetadata, PrimaryDocument, SaveMetadata};
