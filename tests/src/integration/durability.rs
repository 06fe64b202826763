//! # Durability Across Restarts
//!
//! File-backed mechanisms with configuration-supplied keys: the full state
//! and the encrypted backup must both outlive the process that wrote them.

#[cfg(test)]
mod tests {
    use shared_types::{CriticalProjection, TierKind};
    use state_persistence::test_utils::{make_test_state, test_keys, TEST_NOW, TEST_SESSION_ID};
    use state_persistence::{
        FileBackedKVStore, FixedTimeSource, KeyMaterial, PersistenceApi, PersistenceConfig,
        PersistenceDependencies, PersistenceService, TimeSource,
    };
    use std::path::Path;
    use std::sync::Arc;

    fn open(dir: &Path, keys: KeyMaterial, clock: Arc<FixedTimeSource>) -> PersistenceService {
        let config = PersistenceConfig::default();
        let time_source: Arc<dyn TimeSource> = clock;
        let deps = PersistenceDependencies::standard(
            FileBackedKVStore::new(dir.join("large.db")),
            FileBackedKVStore::new(dir.join("backup.db")),
            FileBackedKVStore::new(dir.join("audit.db")),
            keys,
            &config,
            time_source,
        );
        PersistenceService::new(deps, config)
    }

    fn clock() -> Arc<FixedTimeSource> {
        Arc::new(FixedTimeSource::new(TEST_NOW))
    }

    #[tokio::test]
    async fn test_full_state_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let state = make_test_state(TEST_SESSION_ID);

        let report = open(dir.path(), test_keys(), clock()).save(state.clone()).await;
        assert!(report.success);

        let loaded = open(dir.path(), test_keys(), clock()).load().await;
        assert_eq!(loaded.source, Some(TierKind::LargeCapacity));
        assert_eq!(loaded.state.map(|s| s.into_state()), Some(state));
    }

    #[tokio::test]
    async fn test_backup_survives_restart_with_same_keys() {
        let dir = tempfile::tempdir().unwrap();
        let state = make_test_state(TEST_SESSION_ID);
        open(dir.path(), test_keys(), clock()).save(state.clone()).await;
        std::fs::remove_file(dir.path().join("large.db")).unwrap();

        let loaded = open(dir.path(), test_keys(), clock()).load().await;

        assert_eq!(loaded.source, Some(TierKind::SmallCapacity));
        let loaded = loaded.state.expect("reconstructed state");
        assert!(loaded.restored_from_backup());
        assert!(loaded
            .projection()
            .same_progress(&CriticalProjection::derive(&state, 0, "")));
        // Self-repair recreated the primary file
        assert!(dir.path().join("large.db").exists());
    }

    #[tokio::test]
    async fn test_backup_unreadable_under_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        open(dir.path(), test_keys(), clock())
            .save(make_test_state(TEST_SESSION_ID))
            .await;
        std::fs::remove_file(dir.path().join("large.db")).unwrap();

        let loaded = open(dir.path(), KeyMaterial::generate(), clock()).load().await;

        assert!(loaded.state.is_none());
        assert!(loaded
            .warnings
            .iter()
            .any(|w| w.contains("signature mismatch")));
    }

    #[tokio::test]
    async fn test_expired_backup_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let clock = clock();
        open(dir.path(), test_keys(), clock.clone())
            .save(make_test_state(TEST_SESSION_ID))
            .await;
        std::fs::remove_file(dir.path().join("large.db")).unwrap();

        // Thirty days later the backup entries have expired
        clock.advance(PersistenceConfig::default().backup_max_age_secs * 1000);

        let loaded = open(dir.path(), test_keys(), clock).load().await;
        assert!(loaded.state.is_none());
        assert!(loaded.source.is_none());
    }

    #[tokio::test]
    async fn test_clear_empties_files() {
        let dir = tempfile::tempdir().unwrap();
        let service = open(dir.path(), test_keys(), clock());
        service.save(make_test_state(TEST_SESSION_ID)).await;
        assert!(service.clear().await.success);

        let loaded = open(dir.path(), test_keys(), clock()).load().await;
        assert!(loaded.state.is_none());
    }
}
