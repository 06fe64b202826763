//! # Data Smuggling
//!
//! Personal identifiers hidden in free-text fields of a candidate state must
//! stop the save before any tier is touched.

#[cfg(test)]
mod tests {
    use shared_types::{Achievement, ActivityProgress};
    use state_persistence::test_utils::{make_test_state, TestHarness, TEST_SESSION_ID};
    use state_persistence::{PersistenceApi, PersistenceError};

    /// Nothing reached any tier.
    async fn assert_nothing_stored(h: &TestHarness) {
        assert!(h.large.is_empty());
        assert!(h.backup.is_empty());
        assert!(h.diagnostic.is_empty());
        assert!(h.service.load().await.state.is_none());
    }

    #[tokio::test]
    async fn test_email_in_achievement_description() {
        let h = TestHarness::new();
        let mut state = make_test_state(TEST_SESSION_ID);
        state.achievements.push(Achievement {
            id: "shared".into(),
            description: "ask kid.gamer@example.com for the answer".into(),
            ..Achievement::default()
        });

        let report = h.service.save(state).await;

        assert!(!report.success);
        assert!(report.tiers_written.is_empty());
        let Some(PersistenceError::Compliance { violations }) = report.error else {
            panic!("expected compliance rejection");
        };
        assert_eq!(violations, vec!["email detected at achievements[2].description"]);
        assert_nothing_stored(&h).await;
    }

    #[tokio::test]
    async fn test_phone_number_in_activity_id() {
        let h = TestHarness::new();
        let mut state = make_test_state(TEST_SESSION_ID);
        state.activity_progress.push(ActivityProgress {
            activity_id: "call (555) 123-4567".into(),
            ..ActivityProgress::default()
        });

        let report = h.service.save(state).await;

        assert!(!report.success);
        assert!(report
            .error
            .map(|e| e.to_string())
            .is_some_and(|e| e.contains("phone detected at activityProgress[2].activityId")));
        assert_nothing_stored(&h).await;
    }

    #[tokio::test]
    async fn test_student_number_in_last_activity() {
        let h = TestHarness::new();
        let mut state = make_test_state(TEST_SESSION_ID);
        state.player_stats.last_activity_id = Some("student48213".into());

        let report = h.service.save(state).await;

        assert!(!report.success);
        assert!(matches!(report.error, Some(PersistenceError::Compliance { .. })));
        assert_nothing_stored(&h).await;
    }

    #[tokio::test]
    async fn test_clean_state_after_rejection_still_saves() {
        let h = TestHarness::new();
        let mut dirty = make_test_state(TEST_SESSION_ID);
        dirty.preferences.theme = "192.168.1.20".into();
        assert!(!h.service.save(dirty).await.success);

        let report = h.service.save(make_test_state(TEST_SESSION_ID)).await;
        assert!(report.success);
        assert!(h.service.load().await.state.is_some());
    }
}
