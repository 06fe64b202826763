//! # Critical Projection & Loaded State
//!
//! The reduced view persisted to the size-constrained backup tier, and the
//! tagged result of a load.

use crate::entities::{ApplicationState, PlayerStats, SessionInfo, Timestamp};
use crate::errors::StateValidationError;
use serde::{Deserialize, Serialize};

/// Save checkpoint carried inside the projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Checkpoint {
    pub saved_at: Timestamp,
    pub version: String,
}

/// The minimal subset of `ApplicationState` whose loss harms the user.
///
/// Derived deterministically on every save; never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalProjection {
    pub player_level: u32,
    pub total_xp: u64,
    pub achievements_count: u32,
    pub activities_completed: u32,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity_id: Option<String>,
    #[serde(default)]
    pub checkpoint: Checkpoint,
}

impl CriticalProjection {
    /// Derive the projection from a full state.
    pub fn derive(state: &ApplicationState, saved_at: Timestamp, version: &str) -> Self {
        Self {
            player_level: state.player_stats.level,
            total_xp: state.player_stats.total_xp,
            achievements_count: state.unlocked_achievements(),
            activities_completed: state.completed_activities(),
            session_id: state.session_info.session_id.clone(),
            last_activity_id: state.last_activity_id(),
            checkpoint: Checkpoint {
                saved_at,
                version: version.to_string(),
            },
        }
    }

    /// Validate a projection read back from storage.
    pub fn validate(&self) -> Result<(), StateValidationError> {
        if self.player_level < 1 {
            return Err(StateValidationError::InvalidLevel {
                level: self.player_level,
            });
        }
        if self.session_id.is_empty() {
            return Err(StateValidationError::EmptySessionId);
        }
        Ok(())
    }

    /// Whether the projection-relevant fields match another projection,
    /// ignoring the checkpoint.
    pub fn same_progress(&self, other: &CriticalProjection) -> bool {
        self.player_level == other.player_level
            && self.total_xp == other.total_xp
            && self.achievements_count == other.achievements_count
            && self.activities_completed == other.activities_completed
            && self.session_id == other.session_id
            && self.last_activity_id == other.last_activity_id
    }

    /// Rebuild a best-effort full state. Fields absent from the projection
    /// take their documented defaults: empty lists, zeroed counters, default
    /// preferences.
    pub fn reconstruct(&self, now: Timestamp) -> ApplicationState {
        ApplicationState {
            player_stats: PlayerStats {
                level: self.player_level,
                total_xp: self.total_xp,
                activities_completed: self.activities_completed,
                achievements_unlocked: self.achievements_count,
                streak_days: 0,
                last_visit: now,
                time_spent: 0,
                last_activity_id: self.last_activity_id.clone(),
            },
            session_info: SessionInfo {
                session_id: self.session_id.clone(),
                start_time: now,
                last_activity: now,
            },
            ..ApplicationState::default()
        }
    }
}

/// A state rebuilt from the reduced backup.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructedState {
    /// The best-effort state; defaulted fields are not authoritative.
    pub state: ApplicationState,
    /// When the reconstruction happened.
    pub restored_at: Timestamp,
}

/// Result of a successful load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedState {
    /// The full aggregate as last saved.
    Full(ApplicationState),
    /// Rebuilt from the critical projection; only projection fields are
    /// authoritative.
    ReconstructedPartial(ReconstructedState),
}

impl LoadedState {
    /// Borrow the underlying state regardless of variant.
    pub fn state(&self) -> &ApplicationState {
        match self {
            LoadedState::Full(state) => state,
            LoadedState::ReconstructedPartial(r) => &r.state,
        }
    }

    /// Consume into the underlying state.
    pub fn into_state(self) -> ApplicationState {
        match self {
            LoadedState::Full(state) => state,
            LoadedState::ReconstructedPartial(r) => r.state,
        }
    }

    /// True when the state was rebuilt from the backup tier.
    pub fn restored_from_backup(&self) -> bool {
        matches!(self, LoadedState::ReconstructedPartial(_))
    }

    /// Projection of the loaded state (checkpoint zeroed).
    pub fn projection(&self) -> CriticalProjection {
        CriticalProjection::derive(self.state(), 0, "")
    }
}
