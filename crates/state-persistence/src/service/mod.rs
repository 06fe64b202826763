//! # Persistence Service
//!
//! The orchestrator implementing the Persistence API.
//!
//! ## Architecture
//!
//! This service:
//! 1. Implements `PersistenceApi` for save/load/clear/health operations
//! 2. Applies the compliance gate before any write
//! 3. Fails over between tiers and repairs higher tiers from the backup
//! 4. Uses dependency injection for all tiers, policy and time
//!
//! `save`, `load` and `clear` are serialized per instance; `health_check`
//! and `metrics` may run at any time.

mod helpers;
mod load;
mod maintenance;
mod save;

use crate::adapters::infra::SystemTimeSource;
use crate::adapters::storage::InMemoryKVStore;
use crate::adapters::tiers::{DiagnosticTier, LargeCapacityTier, SmallCapacityTier, VolatileTier};
use crate::domain::compliance::ChildDataPolicy;
use crate::domain::config::{KeyMaterial, PersistenceConfig};
use crate::domain::health::HealthReport;
use crate::domain::metrics::{MetricsCollector, PerformanceMetrics};
use crate::ports::inbound::{ClearReport, LoadReport, PersistenceApi, SaveReport};
use crate::ports::outbound::{CompliancePolicy, KeyValueStore, StorageTier, TimeSource};
use async_trait::async_trait;
use shared_types::{ApplicationState, TierKind};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

pub use load::NO_SAVED_STATE;

/// The four tiers, in load priority order.
#[derive(Clone)]
pub struct TierSet {
    pub volatile: Arc<dyn StorageTier>,
    pub large: Arc<dyn StorageTier>,
    pub small: Arc<dyn StorageTier>,
    pub diagnostic: Arc<dyn StorageTier>,
}

impl TierSet {
    /// Every tier, in priority order.
    pub fn all(&self) -> [&Arc<dyn StorageTier>; 4] {
        [&self.volatile, &self.large, &self.small, &self.diagnostic]
    }

    pub fn get(&self, kind: TierKind) -> &Arc<dyn StorageTier> {
        match kind {
            TierKind::Volatile => &self.volatile,
            TierKind::LargeCapacity => &self.large,
            TierKind::SmallCapacity => &self.small,
            TierKind::Diagnostic => &self.diagnostic,
        }
    }
}

/// Dependencies for PersistenceService
pub struct PersistenceDependencies {
    pub tiers: TierSet,
    pub compliance: Arc<dyn CompliancePolicy>,
    pub time_source: Arc<dyn TimeSource>,
}

impl PersistenceDependencies {
    /// Standard tier adapters over the given mechanisms, with the default
    /// compliance policy.
    pub fn standard<L, B, D>(
        large: L,
        backup: B,
        diagnostic: D,
        keys: KeyMaterial,
        config: &PersistenceConfig,
        time_source: Arc<dyn TimeSource>,
    ) -> Self
    where
        L: KeyValueStore + 'static,
        B: KeyValueStore + 'static,
        D: KeyValueStore + 'static,
    {
        Self {
            tiers: TierSet {
                volatile: Arc::new(VolatileTier::new(config.volatile_capacity_bytes)),
                large: Arc::new(LargeCapacityTier::new(large, config.large_capacity_bytes)),
                small: Arc::new(SmallCapacityTier::new(backup, keys, config, time_source.clone())),
                diagnostic: Arc::new(DiagnosticTier::new(
                    diagnostic,
                    config.audit_capacity,
                    config.diagnostic_capacity_bytes,
                )),
            },
            compliance: Arc::new(ChildDataPolicy::new(config.min_session_id_len)),
            time_source,
        }
    }
}

/// The Persistence Service.
pub struct PersistenceService {
    pub(crate) tiers: TierSet,
    pub(crate) compliance: Arc<dyn CompliancePolicy>,
    pub(crate) time_source: Arc<dyn TimeSource>,
    pub(crate) config: PersistenceConfig,
    pub(crate) metrics: MetricsCollector,
    /// Serializes save/load/clear.
    pub(crate) op_lock: Mutex<()>,
    pub(crate) initialized: OnceCell<()>,
    /// Anonymous id stamped on audit entries of this instance.
    pub(crate) audit_session_id: String,
}

impl PersistenceService {
    /// Create a new Persistence Service with the given dependencies.
    pub fn new(deps: PersistenceDependencies, config: PersistenceConfig) -> Self {
        Self {
            tiers: deps.tiers,
            compliance: deps.compliance,
            time_source: deps.time_source,
            config,
            metrics: MetricsCollector::new(),
            op_lock: Mutex::new(()),
            initialized: OnceCell::new(),
            audit_session_id: format!("session_{}", uuid::Uuid::new_v4().simple()),
        }
    }

    /// Service over in-memory mechanisms and the system clock.
    pub fn in_memory(config: PersistenceConfig, keys: KeyMaterial) -> Self {
        let deps = PersistenceDependencies::standard(
            InMemoryKVStore::new(),
            InMemoryKVStore::new(),
            InMemoryKVStore::new(),
            keys,
            &config,
            Arc::new(SystemTimeSource),
        );
        Self::new(deps, config)
    }

    pub fn config(&self) -> &PersistenceConfig {
        &self.config
    }

    pub fn tiers(&self) -> &TierSet {
        &self.tiers
    }

    /// Metrics in Prometheus text format.
    pub fn export_prometheus(&self) -> String {
        self.metrics.export_prometheus()
    }
}

#[async_trait]
impl PersistenceApi for PersistenceService {
    async fn save(&self, state: ApplicationState) -> SaveReport {
        self.save_state(state).await
    }

    async fn load(&self) -> LoadReport {
        self.load_state().await
    }

    async fn clear(&self) -> ClearReport {
        self.clear_state().await
    }

    async fn health_check(&self) -> HealthReport {
        self.check_health().await
    }

    fn metrics(&self) -> PerformanceMetrics {
        self.metrics.snapshot()
    }
}
