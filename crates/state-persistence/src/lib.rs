//! # State Persistence
//!
//! Stores a single application state aggregate across four storage tiers
//! with ordered failover and self-repair.
//!
//! ## Architecture
//!
//! ```text
//!                  save                                load
//!                   │                                   │
//!           [Compliance gate]                           │
//!                   │                                   ▼
//!   ┌───────────────┼────────────────┐     Volatile ── hit ──→ return
//!   ▼               ▼                ▼        │ miss
//! Volatile    Large-capacity   Small-capacity Large-capacity ── hit ──→ refill volatile
//!                              [sign+encrypt]    │ miss
//!                   │                            Small-capacity ── hit ──→ reconstruct,
//!                   ▼                                                   repair both tiers
//!              Diagnostic (audit ring)
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Description |
//! |-----------|-------------|
//! | Compliance gate | A rejected save writes nothing to any tier |
//! | Tier independence | One tier failing never aborts the others |
//! | Verify before decrypt | A token with a bad signature is never decrypted |
//! | Bounded backup | Tokens over the entry bound are refused, never truncated |
//! | Tagged reconstruction | Backup reconstructions load as `ReconstructedPartial` |
//! | Quorum health | `available` needs `health_quorum` tiers, not all of them |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Pure domain logic (codec, compliance, metrics, audit ring)
//! - `ports/` - Port traits (inbound API, outbound mechanisms and tiers)
//! - `adapters/` - Mechanisms and the four tier adapters
//! - `service/` - The orchestrator implementing the API
//!
//! ## Usage
//!
//! ```ignore
//! use state_persistence::{KeyMaterial, PersistenceApi, PersistenceConfig, PersistenceService};
//!
//! let keys = KeyMaterial::from_hex(&encryption_hex, &signing_hex)?;
//! let service = PersistenceService::in_memory(PersistenceConfig::educational(), keys);
//!
//! let report = service.save(state).await;
//! let loaded = service.load().await;
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export key types for convenience
pub use adapters::{
    CookieJar, DiagnosticTier, EntryAttributes, FileBackedKVStore, FixedTimeSource,
    InMemoryKVStore, LargeCapacityTier, SmallCapacityTier, SystemTimeSource, VolatileTier,
};
pub use domain::audit::{AuditEntry, AuditEvent};
pub use domain::codec::{EncodedToken, SecureCodec};
pub use domain::compliance::{ChildDataPolicy, ComplianceReport, Violation};
pub use domain::config::{KeyMaterial, PersistenceConfig, SameSite};
pub use domain::errors::{
    CodecError, ConfigError, IntegrityError, MechanismError, PersistenceError, TierError,
};
pub use domain::health::{HealthReport, TierHealth};
pub use domain::metrics::PerformanceMetrics;
pub use ports::inbound::{ClearReport, LoadReport, PersistenceApi, SaveReport};
pub use ports::outbound::{CompliancePolicy, KeyValueStore, StorageTier, TimeSource};
pub use service::{PersistenceDependencies, PersistenceService, TierSet};
pub use service::NO_SAVED_STATE;
