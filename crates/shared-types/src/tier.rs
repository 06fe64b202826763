//! # Storage Tiers
//!
//! Identifiers for the physical storage mechanisms participating in the
//! orchestrated save/load protocol.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One physical storage mechanism.
///
/// Declaration order is load priority order for the three state-bearing tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierKind {
    /// In-process map, fastest reads, lost on restart.
    Volatile,
    /// Origin-scoped primary store holding the full aggregate.
    LargeCapacity,
    /// Size-bounded encrypted backup holding the critical projection.
    SmallCapacity,
    /// Session-scoped audit ring, never authoritative.
    Diagnostic,
}

impl TierKind {
    /// All tiers in priority order.
    pub const ALL: [TierKind; 4] = [
        TierKind::Volatile,
        TierKind::LargeCapacity,
        TierKind::SmallCapacity,
        TierKind::Diagnostic,
    ];

    /// Stable label used in logs, warnings and audit records.
    pub fn as_str(&self) -> &'static str {
        match self {
            TierKind::Volatile => "volatile",
            TierKind::LargeCapacity => "large_capacity",
            TierKind::SmallCapacity => "small_capacity",
            TierKind::Diagnostic => "diagnostic",
        }
    }

    /// Whether the tier survives a process restart.
    pub fn is_durable(&self) -> bool {
        matches!(self, TierKind::LargeCapacity | TierKind::SmallCapacity)
    }
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
