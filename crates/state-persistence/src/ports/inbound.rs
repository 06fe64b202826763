//! # Inbound Ports (Driving Ports)
//!
//! The API exposed to the UI boundary.
//!
//! No operation returns `Err`: tier failures surface as warnings inside the
//! report, and the compliance gate surfaces as `success = false`.

use crate::domain::errors::PersistenceError;
use crate::domain::health::HealthReport;
use crate::domain::metrics::PerformanceMetrics;
use async_trait::async_trait;
use serde::Serialize;
use shared_types::{ApplicationState, LoadedState, TierKind};

/// Timing and size figures for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationPerformance {
    pub duration_ms: f64,
    /// Backup payload size over plaintext size; 1.0 when not compressed.
    pub compression_ratio: f64,
}

/// Outcome of a save.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReport {
    /// At least one durable tier accepted the state.
    pub success: bool,
    /// Tiers that accepted the write, in write order.
    pub tiers_written: Vec<TierKind>,
    pub warnings: Vec<String>,
    pub performance: OperationPerformance,
    /// Why the save failed, when it did.
    pub error: Option<PersistenceError>,
}

impl SaveReport {
    pub fn wrote(&self, tier: TierKind) -> bool {
        self.tiers_written.contains(&tier)
    }
}

/// Outcome of a load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    /// `None` on a first visit or when every tier missed.
    pub state: Option<LoadedState>,
    /// Tier that answered.
    pub source: Option<TierKind>,
    pub warnings: Vec<String>,
    pub performance: OperationPerformance,
}

impl LoadReport {
    pub fn is_hit(&self) -> bool {
        self.state.is_some()
    }
}

/// Outcome of a clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearReport {
    pub success: bool,
    pub tiers_cleared: Vec<TierKind>,
    pub warnings: Vec<String>,
}

/// Primary API for the state persistence subsystem.
#[async_trait]
pub trait PersistenceApi: Send + Sync {
    /// Validate, sanitize and write the state to every tier.
    async fn save(&self, state: ApplicationState) -> SaveReport;

    /// Read from the highest-priority tier that answers, repairing higher
    /// tiers from a backup hit.
    async fn load(&self) -> LoadReport;

    /// Delete the state from every tier.
    async fn clear(&self) -> ClearReport;

    /// Probe every tier.
    async fn health_check(&self) -> HealthReport;

    /// Read-only metrics snapshot.
    fn metrics(&self) -> PerformanceMetrics;
}
