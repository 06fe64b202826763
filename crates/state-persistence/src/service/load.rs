//! # Persistence Service - Load
//!
//! Reads tiers in priority order: volatile, large-capacity, small-capacity.
//! A large-capacity hit refills the volatile tier; a backup hit is
//! reconstructed and written back to both higher tiers.

use super::helpers::elapsed_ms;
use super::*;
use crate::domain::audit::AuditEvent;
use crate::domain::record::{PrimaryDocument, SaveMetadata};
use crate::ports::inbound::OperationPerformance;
use serde_json::json;
use shared_types::{CriticalProjection, LoadedState, ReconstructedState};
use std::time::Instant;
use tracing::{debug, info};

/// Warning attached to a load where every tier missed.
pub const NO_SAVED_STATE: &str = "no saved state found";

impl PersistenceService {
    pub(crate) async fn load_state(&self) -> LoadReport {
        let _guard = self.op_lock.lock().await;
        self.ensure_initialized().await;
        let started = Instant::now();
        let key = &self.config.storage_key;
        let mut warnings = Vec::new();
        // An entry that exists but does not parse is left in place.
        let mut repair_large = true;

        // 1. Volatile cache
        match self.tiers.volatile.read(key).await {
            Ok(Some(bytes)) => match PrimaryDocument::from_bytes(&bytes) {
                Ok(document) => {
                    return self
                        .finish_load(Some((document.into_loaded(), TierKind::Volatile)), warnings, started)
                        .await;
                }
                Err(e) => {
                    self.metrics.record_tier_error(TierKind::Volatile);
                    warnings.push(format!("volatile entry unreadable: {e}"));
                }
            },
            Ok(None) => {}
            Err(e) => self.tier_failed(TierKind::Volatile, "read", &e, &mut warnings),
        }

        // 2. Large-capacity store
        match self.tiers.large.read(key).await {
            Ok(Some(bytes)) => match PrimaryDocument::from_bytes(&bytes) {
                Ok(document) => {
                    if let Err(e) = self.tiers.volatile.write(key, &bytes).await {
                        self.tier_failed(TierKind::Volatile, "refill", &e, &mut warnings);
                    }
                    return self
                        .finish_load(
                            Some((document.into_loaded(), TierKind::LargeCapacity)),
                            warnings,
                            started,
                        )
                        .await;
                }
                Err(e) => {
                    self.metrics.record_tier_error(TierKind::LargeCapacity);
                    warnings.push(format!("large_capacity entry unreadable: {e}"));
                    repair_large = false;
                }
            },
            Ok(None) => {}
            Err(e) => self.tier_failed(TierKind::LargeCapacity, "read", &e, &mut warnings),
        }

        // 3. Small-capacity backup
        match self.tiers.small.read(key).await {
            Ok(Some(bytes)) => {
                if let Some(restored) = self.restore(&bytes, repair_large, &mut warnings).await {
                    return self
                        .finish_load(Some((restored, TierKind::SmallCapacity)), warnings, started)
                        .await;
                }
            }
            Ok(None) => {}
            Err(e) => self.tier_failed(TierKind::SmallCapacity, "read", &e, &mut warnings),
        }

        warnings.push(NO_SAVED_STATE.to_string());
        self.finish_load(None, warnings, started).await
    }

    /// Rebuild a state from a decoded backup and write it back to the
    /// volatile tier, and to the large-capacity tier when `repair_large`.
    async fn restore(
        &self,
        bytes: &[u8],
        repair_large: bool,
        warnings: &mut Vec<String>,
    ) -> Option<LoadedState> {
        let projection: CriticalProjection = match serde_json::from_slice(bytes) {
            Ok(projection) => projection,
            Err(e) => {
                self.metrics.record_tier_error(TierKind::SmallCapacity);
                warnings.push(format!("backup projection unreadable: {e}"));
                return None;
            }
        };
        if let Err(e) = projection.validate() {
            self.metrics.record_tier_error(TierKind::SmallCapacity);
            warnings.push(format!("backup projection invalid: {e}"));
            return None;
        }

        self.metrics.record_failover();
        let now = self.time_source.now();
        let state = projection.reconstruct(now);
        let document = PrimaryDocument::new(
            state.clone(),
            SaveMetadata::restored(now, self.config.schema_version.clone()),
        );

        let key = &self.config.storage_key;
        match document.to_bytes() {
            Ok(encoded) => {
                if !repair_large {
                    warnings.push("large_capacity entry kept, repair skipped".to_string());
                } else if let Err(e) = self.tiers.large.write(key, &encoded).await {
                    self.tier_failed(TierKind::LargeCapacity, "repair", &e, warnings);
                }
                if let Err(e) = self.tiers.volatile.write(key, &encoded).await {
                    self.tier_failed(TierKind::Volatile, "repair", &e, warnings);
                }
            }
            Err(e) => debug!("[persistence] reconstruction not encodable: {}", e),
        }

        info!(
            "[persistence] 🔧 restored level {} state from backup",
            projection.player_level
        );
        self.audit(
            AuditEvent::StateRestoredFromBackup,
            json!({
                "level": projection.player_level,
                "savedAt": projection.checkpoint.saved_at,
                "restoredAt": now,
            }),
        )
        .await;

        Some(LoadedState::ReconstructedPartial(ReconstructedState {
            state,
            restored_at: now,
        }))
    }

    async fn finish_load(
        &self,
        hit: Option<(LoadedState, TierKind)>,
        warnings: Vec<String>,
        started: Instant,
    ) -> LoadReport {
        let source = hit.as_ref().map(|(_, tier)| *tier);
        self.audit(
            AuditEvent::LoadState,
            json!({
                "source": source,
                "restored": hit.as_ref().is_some_and(|(state, _)| state.restored_from_backup()),
                "warnings": warnings.len(),
            }),
        )
        .await;

        let duration_ms = elapsed_ms(started);
        self.metrics
            .record_load(duration_ms, source == Some(TierKind::Volatile));
        match source {
            Some(tier) => debug!("[persistence] loaded from {} in {:.2}ms", tier, duration_ms),
            None => info!("[persistence] no saved state in any tier"),
        }

        LoadReport {
            state: hit.map(|(state, _)| state),
            source,
            warnings,
            performance: OperationPerformance {
                duration_ms,
                compression_ratio: 1.0,
            },
        }
    }
}
