//! Fixture builders shared by unit and integration tests.

use crate::adapters::infra::FixedTimeSource;
use crate::adapters::storage::InMemoryKVStore;
use crate::domain::config::{KeyMaterial, PersistenceConfig};
use crate::ports::outbound::TimeSource;
use crate::service::{PersistenceDependencies, PersistenceService};
use shared_crypto::SecretKey;
use shared_types::{Achievement, ActivityProgress, ApplicationState, Timestamp};
use std::sync::Arc;

/// Clock value used by fixtures (2023-11-14T22:13:20Z).
pub const TEST_NOW: Timestamp = 1_700_000_000_000;

/// Anonymous session id long enough for the default policy.
pub const TEST_SESSION_ID: &str = "session_4f9c2a7be1d04c3a";

/// Deterministic key material.
pub fn test_keys() -> KeyMaterial {
    KeyMaterial::new(
        SecretKey::from_bytes([0x11; 32]),
        SecretKey::from_bytes([0x22; 32]),
    )
}

/// A compliant state with some progress.
pub fn make_test_state(session_id: &str) -> ApplicationState {
    let mut state = ApplicationState::new(session_id, TEST_NOW);
    state.player_stats.level = 4;
    state.player_stats.total_xp = 1_250;
    state.player_stats.streak_days = 3;
    state.player_stats.last_activity_id = Some("phishing-detective".to_string());
    state.achievements = vec![
        Achievement {
            id: "first_password".into(),
            title: "Password Novice".into(),
            category: "passwords".into(),
            unlocked_at: Some(TEST_NOW - 60_000),
            ..Achievement::default()
        },
        Achievement {
            id: "phish_spotter".into(),
            title: "Phish Spotter".into(),
            category: "phishing".into(),
            unlocked_at: Some(TEST_NOW - 30_000),
            ..Achievement::default()
        },
    ];
    state.activity_progress = vec![
        ActivityProgress {
            activity_id: "phishing-detective".into(),
            completed: true,
            best_score: 870,
            time_spent: 420,
            attempts: 2,
            ..ActivityProgress::default()
        },
        ActivityProgress {
            activity_id: "password-fortress".into(),
            completed: false,
            best_score: 300,
            time_spent: 120,
            attempts: 1,
            ..ActivityProgress::default()
        },
    ];
    state.skill_progress.insert("phishing".into(), 62.5);
    state.skill_progress.insert("passwords".into(), 20.0);
    state
}

/// A service over in-memory mechanisms whose handles stay reachable.
pub struct TestHarness {
    pub service: PersistenceService,
    pub large: InMemoryKVStore,
    pub backup: InMemoryKVStore,
    pub diagnostic: InMemoryKVStore,
    pub clock: Arc<FixedTimeSource>,
    pub config: PersistenceConfig,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(PersistenceConfig::default())
    }

    pub fn with_config(config: PersistenceConfig) -> Self {
        let large = InMemoryKVStore::new();
        let backup = InMemoryKVStore::new();
        let diagnostic = InMemoryKVStore::new();
        let clock = Arc::new(FixedTimeSource::new(TEST_NOW));
        let service = build_service(&large, &backup, &diagnostic, clock.clone(), &config);
        Self {
            service,
            large,
            backup,
            diagnostic,
            clock,
            config,
        }
    }

    /// A second service over the same durable mechanisms with an empty
    /// volatile tier, as after a process restart.
    pub fn restart(&self) -> PersistenceService {
        build_service(
            &self.large,
            &self.backup,
            &self.diagnostic,
            self.clock.clone(),
            &self.config,
        )
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

fn build_service(
    large: &InMemoryKVStore,
    backup: &InMemoryKVStore,
    diagnostic: &InMemoryKVStore,
    clock: Arc<FixedTimeSource>,
    config: &PersistenceConfig,
) -> PersistenceService {
    let time_source: Arc<dyn TimeSource> = clock;
    let deps = PersistenceDependencies::standard(
        large.clone(),
        backup.clone(),
        diagnostic.clone(),
        test_keys(),
        config,
        time_source,
    );
    PersistenceService::new(deps, config.clone())
}
