//! # Backup Tampering
//!
//! The backup token is `signature:iv:ciphertext`, with the signature taken
//! over `iv:ciphertext`. An attacker with access to the small-capacity
//! mechanism but not the keys can rewrite either entry freely.

#[cfg(test)]
mod tests {
    use shared_types::{ApplicationState, TierKind};
    use state_persistence::test_utils::{
        make_test_state, test_keys, TestHarness, TEST_SESSION_ID,
    };
    use state_persistence::{
        CookieJar, EntryAttributes, InMemoryKVStore, PersistenceApi, SmallCapacityTier,
        StorageTier,
    };

    const DELIMITER: char = ':';

    struct Backup {
        jar: CookieJar<InMemoryKVStore>,
        token_name: String,
        meta_name: String,
        attributes: EntryAttributes,
    }

    impl Backup {
        fn of(h: &TestHarness) -> Self {
            let token_name = format!("{}{}", h.config.backup_prefix, h.config.storage_key);
            Self {
                jar: CookieJar::new(h.backup.clone(), h.clock.clone()),
                meta_name: format!("{token_name}_meta"),
                token_name,
                attributes: EntryAttributes::from_config(&h.config),
            }
        }

        fn token(&self) -> String {
            self.jar.get(&self.token_name).unwrap().expect("backup token")
        }

        fn set_token(&mut self, token: &str) {
            self.jar.set(&self.token_name, token, &self.attributes).unwrap();
        }

        fn segments(&self) -> Vec<String> {
            self.token().split(DELIMITER).map(str::to_string).collect()
        }
    }

    /// Saved state, primary tier wiped so only the backup can answer.
    async fn backup_only(state: ApplicationState) -> TestHarness {
        let h = TestHarness::new();
        assert!(h.service.save(state).await.wrote(TierKind::SmallCapacity));
        h.large.wipe();
        h
    }

    /// Load through a fresh instance and require a clean miss.
    async fn assert_clean_miss(h: &TestHarness) -> Vec<String> {
        let report = h.restart().load().await;
        assert!(report.state.is_none(), "tampered backup was accepted");
        assert!(report.source.is_none());
        assert!(h.large.is_empty(), "tampered backup was repaired into the primary tier");
        report.warnings
    }

    // =============================================================================
    // ATTACK 1: Ciphertext and IV edits
    // =============================================================================

    #[tokio::test]
    async fn test_iv_bit_flip() {
        let h = backup_only(make_test_state(TEST_SESSION_ID)).await;
        let mut backup = Backup::of(&h);
        let mut parts = backup.segments();
        let flipped = if parts[1].starts_with('a') { "b" } else { "a" };
        parts[1].replace_range(0..1, flipped);
        backup.set_token(&parts.join(":"));

        let warnings = assert_clean_miss(&h).await;
        assert!(warnings.iter().any(|w| w.contains("signature mismatch")));
    }

    #[tokio::test]
    async fn test_ciphertext_truncation() {
        let h = backup_only(make_test_state(TEST_SESSION_ID)).await;
        let mut backup = Backup::of(&h);
        let mut parts = backup.segments();
        let len = parts[2].len();
        parts[2].truncate(len - 4);
        backup.set_token(&parts.join(":"));

        assert_clean_miss(&h).await;
    }

    // =============================================================================
    // ATTACK 2: Signature transplant between two valid tokens
    // =============================================================================

    #[tokio::test]
    async fn test_signature_transplant() {
        let mut boosted = make_test_state(TEST_SESSION_ID);
        boosted.player_stats.level = 99;
        let donor = backup_only(boosted).await;
        let donor_signature = Backup::of(&donor).segments().remove(0);

        let h = backup_only(make_test_state(TEST_SESSION_ID)).await;
        let mut backup = Backup::of(&h);
        let mut parts = backup.segments();
        // Same keys, different payload: the donor's signature does not cover it
        assert_ne!(parts[0], donor_signature);
        parts[0] = donor_signature;
        backup.set_token(&parts.join(":"));

        assert_clean_miss(&h).await;
    }

    // =============================================================================
    // ATTACK 3: Structural downgrades
    // =============================================================================

    #[tokio::test]
    async fn test_stripped_signature() {
        let h = backup_only(make_test_state(TEST_SESSION_ID)).await;
        let mut backup = Backup::of(&h);
        let parts = backup.segments();
        backup.set_token(&parts[1..].join(":"));

        let warnings = assert_clean_miss(&h).await;
        assert!(warnings.iter().any(|w| w.contains("malformed token")));
    }

    #[tokio::test]
    async fn test_garbage_tokens() {
        for garbage in ["", ":::", "zz:zz:zz", "not a token", "00:00:AAAA"] {
            let h = backup_only(make_test_state(TEST_SESSION_ID)).await;
            Backup::of(&h).set_token(garbage);
            assert_clean_miss(&h).await;
        }
    }

    // =============================================================================
    // ATTACK 4: Metadata forgery
    // =============================================================================

    #[tokio::test]
    async fn test_forged_compression_flag() {
        let h = backup_only(make_test_state(TEST_SESSION_ID)).await;
        let mut backup = Backup::of(&h);
        let raw = backup.jar.get(&backup.meta_name).unwrap().expect("metadata");
        let mut metadata: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(metadata["compressed"], false);
        metadata["compressed"] = true.into();
        let forged = metadata.to_string();
        let (name, attributes) = (backup.meta_name.clone(), backup.attributes.clone());
        backup.jar.set(&name, &forged, &attributes).unwrap();

        let warnings = assert_clean_miss(&h).await;
        assert!(warnings.iter().any(|w| w.contains("decompression failed")));
    }

    #[tokio::test]
    async fn test_deleted_metadata() {
        let h = backup_only(make_test_state(TEST_SESSION_ID)).await;
        let mut backup = Backup::of(&h);
        let name = backup.meta_name.clone();
        backup.jar.remove_all(&[name.as_str()]).unwrap();

        assert_clean_miss(&h).await;
    }

    // =============================================================================
    // ATTACK 5: Validly signed but invalid projection
    // =============================================================================

    #[tokio::test]
    async fn test_signed_invalid_projection_not_restored() {
        let h = TestHarness::new();
        let insider = SmallCapacityTier::new(
            h.backup.clone(),
            test_keys(),
            &h.config,
            h.clock.clone(),
        );
        let projection = serde_json::json!({
            "playerLevel": 0,
            "totalXp": 1_000_000,
            "achievementsCount": 999,
            "activitiesCompleted": 999,
            "sessionId": TEST_SESSION_ID,
        });
        insider
            .write(&h.config.storage_key, projection.to_string().as_bytes())
            .await
            .unwrap();

        let warnings = assert_clean_miss(&h).await;
        assert!(warnings.iter().any(|w| w.contains("backup projection invalid")));
    }
}
