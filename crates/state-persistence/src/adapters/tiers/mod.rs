//! Tier Adapters
//!
//! Implementations of the `StorageTier` contract, one per tier.
//!
//! | Tier | Adapter | Mechanism |
//! |------|---------|-----------|
//! | Volatile | `VolatileTier` | in-process map |
//! | Large-capacity | `LargeCapacityTier` | any `KeyValueStore` |
//! | Small-capacity | `SmallCapacityTier` | `CookieJar` + `SecureCodec` |
//! | Diagnostic | `DiagnosticTier` | any `KeyValueStore` holding the audit ring |

mod diagnostic;
mod large;
mod small;
mod volatile;

pub use diagnostic::DiagnosticTier;
pub use large::LargeCapacityTier;
pub use small::SmallCapacityTier;
pub use volatile::VolatileTier;

/// Throwaway key used by availability probes.
pub(crate) const PROBE_KEY: &str = "__probe__";
