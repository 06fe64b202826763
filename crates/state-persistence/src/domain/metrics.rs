//! # Performance Metrics
//!
//! Process-lifetime counters owned by the orchestrator. Not persisted.
//!
//! ## Metrics Exported
//!
//! - Total, save and load operation counts
//! - Running-average read and write latency
//! - Cache hit rate (volatile hits / loads)
//! - Failover count and per-tier error counts
//! - Last observed backup compression ratio

use parking_lot::RwLock;
use serde::Serialize;
use shared_types::TierKind;
use std::collections::BTreeMap;

/// Read-only snapshot handed to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub total_operations: u64,
    pub save_operations: u64,
    pub load_operations: u64,
    pub avg_read_latency_ms: f64,
    pub avg_write_latency_ms: f64,
    pub cache_hits: u64,
    pub cache_hit_rate: f64,
    pub failover_count: u64,
    pub compression_ratio: f64,
    pub tier_errors: BTreeMap<TierKind, u64>,
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self {
            total_operations: 0,
            save_operations: 0,
            load_operations: 0,
            avg_read_latency_ms: 0.0,
            avg_write_latency_ms: 0.0,
            cache_hits: 0,
            cache_hit_rate: 0.0,
            failover_count: 0,
            compression_ratio: 1.0,
            tier_errors: BTreeMap::new(),
        }
    }
}

impl PerformanceMetrics {
    /// Failovers per operation.
    pub fn error_rate(&self) -> f64 {
        if self.total_operations == 0 {
            return 0.0;
        }
        self.failover_count as f64 / self.total_operations as f64
    }

    /// Errors recorded against one tier.
    pub fn tier_error_count(&self, tier: TierKind) -> u64 {
        self.tier_errors.get(&tier).copied().unwrap_or(0)
    }
}

/// Mutable collector behind the snapshot.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    inner: RwLock<PerformanceMetrics>,
}

impl MetricsCollector {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed save.
    ///
    /// `compression_ratio` is `None` when the backup tier did not encode.
    pub fn record_save(&self, latency_ms: f64, compression_ratio: Option<f64>) {
        let mut m = self.inner.write();
        m.total_operations += 1;
        m.save_operations += 1;
        m.avg_write_latency_ms = running_mean(m.avg_write_latency_ms, latency_ms, m.save_operations);
        if let Some(ratio) = compression_ratio {
            m.compression_ratio = ratio;
        }
    }

    /// Record a completed load.
    pub fn record_load(&self, latency_ms: f64, cache_hit: bool) {
        let mut m = self.inner.write();
        m.total_operations += 1;
        m.load_operations += 1;
        if cache_hit {
            m.cache_hits += 1;
        }
        m.avg_read_latency_ms = running_mean(m.avg_read_latency_ms, latency_ms, m.load_operations);
        m.cache_hit_rate = m.cache_hits as f64 / m.load_operations as f64;
    }

    /// Record a clear.
    pub fn record_clear(&self) {
        self.inner.write().total_operations += 1;
    }

    /// Record a fallback to a lower-priority tier.
    pub fn record_failover(&self) {
        self.inner.write().failover_count += 1;
    }

    /// Record a tier-level error.
    pub fn record_tier_error(&self, tier: TierKind) {
        *self.inner.write().tier_errors.entry(tier).or_insert(0) += 1;
    }

    /// Snapshot the current values.
    pub fn snapshot(&self) -> PerformanceMetrics {
        self.inner.read().clone()
    }

    /// Export as Prometheus-style metrics string
    pub fn export_prometheus(&self) -> String {
        let m = self.snapshot();
        let mut out = format!(
            "# HELP sp_operations_total Total persistence operations\n\
             # TYPE sp_operations_total counter\n\
             sp_operations_total {}\n\
             # HELP sp_saves_total Total save operations\n\
             # TYPE sp_saves_total counter\n\
             sp_saves_total {}\n\
             # HELP sp_loads_total Total load operations\n\
             # TYPE sp_loads_total counter\n\
             sp_loads_total {}\n\
             # HELP sp_read_latency_ms Average read latency\n\
             # TYPE sp_read_latency_ms gauge\n\
             sp_read_latency_ms {:.3}\n\
             # HELP sp_write_latency_ms Average write latency\n\
             # TYPE sp_write_latency_ms gauge\n\
             sp_write_latency_ms {:.3}\n\
             # HELP sp_cache_hit_rate Volatile cache hits per load\n\
             # TYPE sp_cache_hit_rate gauge\n\
             sp_cache_hit_rate {:.4}\n\
             # HELP sp_failovers_total Fallbacks to a lower-priority tier\n\
             # TYPE sp_failovers_total counter\n\
             sp_failovers_total {}\n\
             # HELP sp_compression_ratio Last backup payload compression ratio\n\
             # TYPE sp_compression_ratio gauge\n\
             sp_compression_ratio {:.4}\n\
             # HELP sp_tier_errors_total Errors per storage tier\n\
             # TYPE sp_tier_errors_total counter\n",
            m.total_operations,
            m.save_operations,
            m.load_operations,
            m.avg_read_latency_ms,
            m.avg_write_latency_ms,
            m.cache_hit_rate,
            m.failover_count,
            m.compression_ratio,
        );
        for tier in TierKind::ALL {
            out.push_str(&format!(
                "sp_tier_errors_total{{tier=\"{}\"}} {}\n",
                tier,
                m.tier_error_count(tier)
            ));
        }
        out
    }
}

fn running_mean(mean: f64, sample: f64, count: u64) -> f64 {
    mean + (sample - mean) / count as f64
}
