//! # Core Domain Entities
//!
//! The application state aggregate and its sub-records.
//!
//! ## Clusters
//!
//! - **Progress**: `PlayerStats`, `Achievement`, `ActivityProgress`, skill scalars
//! - **Settings**: `Preferences`
//! - **Session**: `SessionInfo`
//!
//! All records use camelCase field names in their structured-text encoding and
//! default any field that is absent on read.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Current schema version tag attached to every save.
pub const STATE_SCHEMA_VERSION: &str = "1.0.0";

// =============================================================================
// CLUSTER A: PROGRESS
// =============================================================================

/// Aggregate progress counters for the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerStats {
    /// Current level (starts at 1).
    pub level: u32,
    /// Total experience earned.
    pub total_xp: u64,
    /// Number of activities completed.
    pub activities_completed: u32,
    /// Number of achievements unlocked.
    pub achievements_unlocked: u32,
    /// Consecutive days with activity.
    pub streak_days: u32,
    /// Last visit time.
    pub last_visit: Timestamp,
    /// Total time spent, in seconds.
    pub time_spent: u64,
    /// Identifier of the most recently played activity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity_id: Option<String>,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            level: 1,
            total_xp: 0,
            activities_completed: 0,
            achievements_unlocked: 0,
            streak_days: 0,
            last_visit: 0,
            time_spent: 0,
            last_activity_id: None,
        }
    }
}

/// An unlocked (or pending) achievement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    /// Unlock time, absent while locked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<Timestamp>,
    pub category: String,
}

/// Progress within a single activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityProgress {
    pub activity_id: String,
    pub completed: bool,
    pub best_score: u64,
    /// Time spent in the activity, in seconds.
    pub time_spent: u64,
    pub attempts: u32,
    pub hints_used: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
}

// =============================================================================
// CLUSTER B: SETTINGS & SESSION
// =============================================================================

/// User-facing preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub sound_enabled: bool,
    pub difficulty: String,
    pub theme: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            difficulty: "normal".to_string(),
            theme: "dark".to_string(),
        }
    }
}

/// Anonymous session information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionInfo {
    /// Anonymous session identifier.
    pub session_id: String,
    pub start_time: Timestamp,
    pub last_activity: Timestamp,
}

// =============================================================================
// THE AGGREGATE
// =============================================================================

/// The single persisted aggregate.
///
/// Produced by the UI layer on save and handed back on load. Every field
/// defaults when missing, so a partial document is a valid candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationState {
    pub player_stats: PlayerStats,
    pub achievements: Vec<Achievement>,
    pub activity_progress: Vec<ActivityProgress>,
    /// Named skill-progress scalars (0.0 - 100.0 by convention).
    pub skill_progress: BTreeMap<String, f64>,
    pub preferences: Preferences,
    pub session_info: SessionInfo,
}

impl ApplicationState {
    /// Create an empty state bound to a session.
    pub fn new(session_id: impl Into<String>, now: Timestamp) -> Self {
        Self {
            session_info: SessionInfo {
                session_id: session_id.into(),
                start_time: now,
                last_activity: now,
            },
            ..Self::default()
        }
    }

    /// Number of activities marked complete, counting both the aggregate
    /// counter and the per-activity records.
    pub fn completed_activities(&self) -> u32 {
        let recorded = self.activity_progress.iter().filter(|a| a.completed).count() as u32;
        self.player_stats.activities_completed.max(recorded)
    }

    /// Number of achievements unlocked, counting both the aggregate counter
    /// and the achievement list.
    pub fn unlocked_achievements(&self) -> u32 {
        (self.achievements.len() as u32).max(self.player_stats.achievements_unlocked)
    }

    /// Path of the first numeric field with no structured-text form
    /// (NaN or infinite).
    pub fn non_finite_field(&self) -> Option<String> {
        self.skill_progress
            .iter()
            .find(|(_, value)| !value.is_finite())
            .map(|(skill, _)| format!("skillProgress.{skill}"))
    }

    /// Identifier of the last played activity, if known.
    pub fn last_activity_id(&self) -> Option<String> {
        self.player_stats.last_activity_id.clone().or_else(|| {
            self.activity_progress
                .first()
                .map(|a| a.activity_id.clone())
        })
    }
}
