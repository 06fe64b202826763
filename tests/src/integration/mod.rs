//! Cross-tier integration tests.

pub mod durability;
pub mod flows;
pub mod properties;
