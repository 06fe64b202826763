//! # Persistence Service - Save
//!
//! Compliance gate, then volatile, large-capacity and small-capacity writes.
//! Only the compliance gate aborts a save; tier failures become warnings.

use super::helpers::elapsed_ms;
use super::*;
use crate::domain::audit::AuditEvent;
use crate::domain::errors::PersistenceError;
use crate::domain::record::{PrimaryDocument, SaveMetadata};
use crate::ports::inbound::OperationPerformance;
use serde_json::json;
use shared_types::CriticalProjection;
use std::time::Instant;
use tracing::{info, warn};

impl PersistenceService {
    pub(crate) async fn save_state(&self, candidate: ApplicationState) -> SaveReport {
        let _guard = self.op_lock.lock().await;
        let started = Instant::now();

        if !self.compliance.is_compliant(&candidate) {
            let error = PersistenceError::Compliance {
                violations: self.compliance.violations(&candidate),
            };
            warn!("[persistence] save rejected: {}", error);
            return Self::failed_save(error, started);
        }
        if let Some(field) = candidate.non_finite_field() {
            let error = PersistenceError::Serialization {
                message: format!("{field} is not a finite number"),
            };
            warn!("[persistence] save rejected: {}", error);
            return Self::failed_save(error, started);
        }

        self.ensure_initialized().await;
        let state = self.compliance.sanitize(candidate);
        let now = self.time_source.now();
        let version = self.config.schema_version.clone();
        let document = PrimaryDocument::new(state, SaveMetadata::new(now, version.clone()));
        let bytes = match document.to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                let error = PersistenceError::Serialization {
                    message: e.to_string(),
                };
                warn!("[persistence] save aborted: {}", error);
                return Self::failed_save(error, started);
            }
        };

        let key = &self.config.storage_key;
        let mut tiers_written = Vec::with_capacity(3);
        let mut warnings = Vec::new();

        match self.tiers.volatile.write(key, &bytes).await {
            Ok(_) => tiers_written.push(TierKind::Volatile),
            Err(e) => self.tier_failed(TierKind::Volatile, "write", &e, &mut warnings),
        }

        let large_ok = match self.tiers.large.write(key, &bytes).await {
            Ok(_) => {
                tiers_written.push(TierKind::LargeCapacity);
                true
            }
            Err(e) => {
                self.metrics.record_failover();
                self.tier_failed(TierKind::LargeCapacity, "write", &e, &mut warnings);
                false
            }
        };

        let projection = CriticalProjection::derive(&document.state, now, &version);
        let mut compression_ratio = None;
        let small_ok = match serde_json::to_vec(&projection) {
            Ok(encoded) => match self.tiers.small.write(key, &encoded).await {
                Ok(receipt) => {
                    compression_ratio = Some(receipt.compression_ratio());
                    tiers_written.push(TierKind::SmallCapacity);
                    true
                }
                Err(e) => {
                    self.tier_failed(TierKind::SmallCapacity, "write", &e, &mut warnings);
                    false
                }
            },
            Err(e) => {
                warnings.push(format!("critical projection not encodable: {e}"));
                false
            }
        };

        let success = large_ok || small_ok;
        self.audit(
            AuditEvent::SaveState,
            json!({
                "success": success,
                "tiers": tiers_written,
                "warnings": warnings.len(),
                "level": projection.player_level,
            }),
        )
        .await;

        let duration_ms = elapsed_ms(started);
        self.metrics.record_save(duration_ms, compression_ratio);

        if success {
            info!(
                "[persistence] 💾 saved to {} tier(s) in {:.2}ms",
                tiers_written.len(),
                duration_ms
            );
        } else {
            warn!("[persistence] no durable tier accepted the state");
        }

        SaveReport {
            success,
            tiers_written,
            warnings,
            performance: OperationPerformance {
                duration_ms,
                compression_ratio: compression_ratio.unwrap_or(1.0),
            },
            error: (!success).then_some(PersistenceError::AllTiersFailed),
        }
    }

    fn failed_save(error: PersistenceError, started: Instant) -> SaveReport {
        SaveReport {
            success: false,
            tiers_written: Vec::new(),
            warnings: vec![error.to_string()],
            performance: OperationPerformance {
                duration_ms: elapsed_ms(started),
                compression_ratio: 1.0,
            },
            error: Some(error),
        }
    }
}
