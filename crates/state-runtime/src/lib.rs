//! # State Runtime
//!
//! Wires the persistence service over file-backed mechanisms and executes
//! one command against it. The `stated` binary is a thin clap front end.
//!
//! Every command returns a JSON document so the output can be piped into
//! other tooling.

pub mod config;

pub use config::RuntimeConfig;

use anyhow::{Context, Result};
use persistence_telemetry::log_tier_event;
use serde_json::{json, Value};
use shared_types::{ApplicationState, LoadedState, TierKind};
use state_persistence::{
    FileBackedKVStore, PersistenceApi, PersistenceDependencies, PersistenceService,
    StorageTier, SystemTimeSource,
};
use std::sync::Arc;

/// One operation against the persistence service.
#[derive(Debug, Clone)]
pub enum Command {
    Save(Box<ApplicationState>),
    Load,
    Clear,
    Health,
    Metrics { prometheus: bool },
    Audit,
}

/// Build the service over the data directory.
pub fn build_service(config: &RuntimeConfig) -> Result<PersistenceService> {
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating data directory {}", config.data_dir.display()))?;

    let deps = PersistenceDependencies::standard(
        FileBackedKVStore::new(config.large_store_path()),
        FileBackedKVStore::new(config.backup_store_path()),
        FileBackedKVStore::new(config.diagnostic_store_path()),
        config.keys.clone(),
        &config.persistence,
        Arc::new(SystemTimeSource),
    );
    tracing::info!(
        "[runtime] 🔧 Persistence service ready (data dir: {})",
        config.data_dir.display()
    );
    Ok(PersistenceService::new(deps, config.persistence.clone()))
}

/// Execute a command and render its outcome.
pub async fn execute(service: &PersistenceService, command: Command) -> Result<Value> {
    match command {
        Command::Save(state) => {
            let report = service.save(*state).await;
            for tier in &report.tiers_written {
                log_tier_event!(debug, tier, "tier accepted state");
            }
            for warning in &report.warnings {
                tracing::warn!("[runtime] {}", warning);
            }
            Ok(json!({
                "success": report.success,
                "tiersWritten": report.tiers_written,
                "warnings": report.warnings,
                "performance": report.performance,
                "error": report.error.map(|e| e.to_string()),
            }))
        }
        Command::Load => {
            let report = service.load().await;
            let (provenance, restored_at, state) = match report.state {
                None => (Value::Null, Value::Null, Value::Null),
                Some(LoadedState::Full(state)) => (json!("full"), Value::Null, json!(state)),
                Some(LoadedState::ReconstructedPartial(r)) => (
                    json!("reconstructed_partial"),
                    json!(r.restored_at),
                    json!(r.state),
                ),
            };
            Ok(json!({
                "found": !state.is_null(),
                "provenance": provenance,
                "source": report.source,
                "restoredAt": restored_at,
                "state": state,
                "warnings": report.warnings,
                "performance": report.performance,
            }))
        }
        Command::Clear => {
            let report = service.clear().await;
            Ok(json!({
                "success": report.success,
                "tiersCleared": report.tiers_cleared,
                "warnings": report.warnings,
            }))
        }
        Command::Health => {
            let report = service.health_check().await;
            for (tier, health) in &report.tiers {
                if !health.available {
                    log_tier_event!(warn, tier, "tier unavailable", errors = health.error_count);
                }
            }
            Ok(serde_json::to_value(report)?)
        }
        Command::Metrics { prometheus: true } => Ok(Value::String(service.export_prometheus())),
        Command::Metrics { prometheus: false } => Ok(serde_json::to_value(service.metrics())?),
        Command::Audit => {
            let raw = service
                .tiers()
                .get(TierKind::Diagnostic)
                .read(&service.config().audit_key)
                .await
                .context("reading audit ring")?;
            match raw {
                Some(bytes) => serde_json::from_slice(&bytes).context("decoding audit ring"),
                None => Ok(json!([])),
            }
        }
    }
}

/// Parse a state document.
pub fn parse_state(bytes: &[u8]) -> Result<ApplicationState> {
    serde_json::from_slice(bytes).context("state document is not a valid application state")
}
