//! # Persistence Service - Clear & Health

use super::*;
use crate::domain::audit::AuditEvent;
use crate::domain::health::{meets_quorum, HealthPerformance, TierHealth};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{debug, info};

impl PersistenceService {
    pub(crate) async fn clear_state(&self) -> ClearReport {
        let _guard = self.op_lock.lock().await;
        self.ensure_initialized().await;

        let mut tiers_cleared = Vec::with_capacity(4);
        let mut warnings = Vec::new();
        for tier in self.tiers.all() {
            let kind = tier.kind();
            let key = match kind {
                TierKind::Diagnostic => &self.config.audit_key,
                _ => &self.config.storage_key,
            };
            match tier.delete(key).await {
                Ok(()) => tiers_cleared.push(kind),
                Err(e) => self.tier_failed(kind, "delete", &e, &mut warnings),
            }
        }

        self.audit(AuditEvent::ClearState, json!({ "tiers": tiers_cleared }))
            .await;
        self.metrics.record_clear();
        info!("[persistence] 🧹 cleared {} tier(s)", tiers_cleared.len());

        ClearReport {
            success: !tiers_cleared.is_empty(),
            tiers_cleared,
            warnings,
        }
    }

    pub(crate) async fn check_health(&self) -> HealthReport {
        let snapshot = self.metrics.snapshot();

        let mut tiers = BTreeMap::new();
        for tier in self.tiers.all() {
            let kind = tier.kind();
            let probe = tier.probe().await;
            tiers.insert(
                kind,
                TierHealth {
                    available: probe.available,
                    used_bytes: probe.used_bytes,
                    capacity_bytes: probe.capacity_bytes,
                    error_count: snapshot.tier_error_count(kind),
                },
            );
        }

        let report = HealthReport {
            available: meets_quorum(&tiers, self.config.health_quorum),
            secure: self.config.secure_context,
            compliant: self.tiers.small.policy_compliant(),
            performance: HealthPerformance {
                avg_read_latency_ms: snapshot.avg_read_latency_ms,
                avg_write_latency_ms: snapshot.avg_write_latency_ms,
                total_storage_bytes: tiers.values().map(|t| t.used_bytes).sum(),
                error_rate: snapshot.error_rate(),
            },
            tiers,
            checked_at: self.time_source.now(),
        };
        debug!(
            "[persistence] health: {}/4 tiers available, quorum {}",
            report.available_tiers(),
            self.config.health_quorum
        );
        report
    }
}
