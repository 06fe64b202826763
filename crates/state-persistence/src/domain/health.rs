//! # Health Report
//!
//! Point-in-time snapshot of per-tier availability. Computed on demand,
//! never cached.

use serde::Serialize;
use shared_types::{TierKind, Timestamp};
use std::collections::BTreeMap;

/// Health of a single tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierHealth {
    pub available: bool,
    pub used_bytes: u64,
    pub capacity_bytes: u64,
    pub error_count: u64,
}

/// Performance block of the health report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthPerformance {
    pub avg_read_latency_ms: f64,
    pub avg_write_latency_ms: f64,
    pub total_storage_bytes: u64,
    pub error_rate: f64,
}

/// Aggregate health of the subsystem.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// At least `quorum` tiers report available.
    pub available: bool,
    /// The execution context is transport-secure.
    pub secure: bool,
    /// The backup tier's attribute policy is correct.
    pub compliant: bool,
    pub tiers: BTreeMap<TierKind, TierHealth>,
    pub performance: HealthPerformance,
    pub checked_at: Timestamp,
}

impl HealthReport {
    /// Number of tiers reporting available.
    pub fn available_tiers(&self) -> usize {
        self.tiers.values().filter(|t| t.available).count()
    }
}

/// Quorum rule for the aggregate availability flag.
pub fn meets_quorum(tiers: &BTreeMap<TierKind, TierHealth>, quorum: usize) -> bool {
    tiers.values().filter(|t| t.available).count() >= quorum
}
