//! # Persistence Service - Helper Methods
//!
//! Private helper methods for the PersistenceService.

use super::*;
use crate::domain::audit::{AuditEntry, AuditEvent};
use crate::domain::errors::TierError;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{debug, info, warn};

impl PersistenceService {
    /// Write the initialization audit entry once, before the first operation.
    pub(crate) async fn ensure_initialized(&self) {
        self.initialized
            .get_or_init(|| async {
                info!(
                    "[persistence] 💾 initialized (schema {}, quorum {})",
                    self.config.schema_version, self.config.health_quorum
                );
                self.audit(
                    AuditEvent::PersistenceInitialized,
                    json!({
                        "version": self.config.schema_version,
                        "tiers": TierKind::ALL,
                        "secureContext": self.config.secure_context,
                    }),
                )
                .await;
            })
            .await;
    }

    /// Append to the diagnostic ring. Failures never reach the caller.
    pub(crate) async fn audit(&self, event: AuditEvent, data: Value) {
        let entry = AuditEntry {
            timestamp: self.time_source.now(),
            event,
            data,
            session_id: self.audit_session_id.clone(),
        };
        let bytes = match serde_json::to_vec(&entry) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("[persistence] audit entry {} not encodable: {}", event, e);
                return;
            }
        };
        if let Err(e) = self
            .tiers
            .diagnostic
            .write(&self.config.audit_key, &bytes)
            .await
        {
            self.metrics.record_tier_error(TierKind::Diagnostic);
            debug!("[persistence] audit entry {} dropped: {}", event, e);
        }
    }

    /// Record a recovered tier failure as a warning.
    pub(crate) fn tier_failed(
        &self,
        tier: TierKind,
        operation: &str,
        error: &TierError,
        warnings: &mut Vec<String>,
    ) {
        self.metrics.record_tier_error(tier);
        warn!("[persistence] {} {} failed: {}", tier, operation, error);
        warnings.push(format!("{tier} {operation} failed: {error}"));
    }
}

/// Milliseconds elapsed since `started`.
pub(crate) fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
