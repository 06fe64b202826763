//! # Property Tests
//!
//! Round-trip and tamper properties over generated compliant states.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use shared_types::{Achievement, ActivityProgress, ApplicationState, CriticalProjection};
    use state_persistence::test_utils::{TestHarness, TEST_NOW};
    use state_persistence::{CookieJar, EntryAttributes, PersistenceApi};
    use tokio::runtime::Runtime;

    fn arb_state() -> impl Strategy<Value = ApplicationState> {
        (
            "[0-9a-f]{16,32}",
            1u32..200,
            0u64..1_000_000,
            prop::collection::vec(("[a-z]{3,12}", "[a-z]{3,10}"), 0..6),
            prop::collection::vec(("[a-z]{3,12}", any::<bool>(), 0u64..10_000), 0..6),
            prop::collection::btree_map("[a-z]{3,10}", 0u32..200, 0..4),
        )
            .prop_map(|(session, level, xp, achievements, activities, skills)| {
                let mut state = ApplicationState::new(format!("session_{session}"), TEST_NOW);
                state.player_stats.level = level;
                state.player_stats.total_xp = xp;
                state.achievements = achievements
                    .into_iter()
                    .map(|(id, category)| Achievement {
                        id,
                        category,
                        unlocked_at: Some(TEST_NOW),
                        ..Achievement::default()
                    })
                    .collect();
                state.activity_progress = activities
                    .into_iter()
                    .map(|(activity_id, completed, best_score)| ActivityProgress {
                        activity_id,
                        completed,
                        best_score,
                        ..ActivityProgress::default()
                    })
                    .collect();
                // Halves are exact in binary floating point
                state.skill_progress = skills
                    .into_iter()
                    .map(|(name, v)| (name, f64::from(v) / 2.0))
                    .collect();
                state
            })
    }

    fn expected(state: &ApplicationState) -> CriticalProjection {
        CriticalProjection::derive(state, 0, "")
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_load_after_save_keeps_projection(state in arb_state()) {
            let rt = Runtime::new().unwrap();
            rt.block_on(async {
                let h = TestHarness::new();
                let saved = h.service.save(state.clone()).await;
                prop_assert!(saved.success);

                let loaded = h.restart().load().await.state.expect("saved state");
                prop_assert!(!loaded.restored_from_backup());
                prop_assert_eq!(loaded.into_state(), state);
                Ok(())
            })?;
        }

        #[test]
        fn prop_backup_alone_keeps_projection(state in arb_state()) {
            let rt = Runtime::new().unwrap();
            rt.block_on(async {
                let h = TestHarness::new();
                h.service.save(state.clone()).await;
                h.large.wipe();

                let loaded = h.restart().load().await.state.expect("reconstructed state");
                prop_assert!(loaded.restored_from_backup());
                prop_assert!(loaded.projection().same_progress(&expected(&state)));
                Ok(())
            })?;
        }

        #[test]
        fn prop_any_signature_flip_is_a_miss(state in arb_state(), position in 0usize..64) {
            let rt = Runtime::new().unwrap();
            rt.block_on(async {
                let h = TestHarness::new();
                h.service.save(state).await;
                h.large.wipe();

                let name = format!("{}{}", h.config.backup_prefix, h.config.storage_key);
                let mut jar = CookieJar::new(h.backup.clone(), h.clock.clone());
                let token = jar.get(&name).unwrap().expect("backup token");

                let mut bytes = token.into_bytes();
                bytes[position] = if bytes[position] == b'0' { b'1' } else { b'0' };
                let tampered = String::from_utf8(bytes).unwrap();
                jar.set(&name, &tampered, &EntryAttributes::from_config(&h.config)).unwrap();

                let report = h.restart().load().await;
                prop_assert!(report.state.is_none());
                prop_assert!(report.source.is_none());
                prop_assert!(h.large.is_empty());
                Ok(())
            })?;
        }
    }
}
