//! # Tiered State Persistence Test Suite
//!
//! Unified test crate exercising the public API of `state-persistence`.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── integration/      # End-to-end save/load/clear flows
//! │   ├── flows.rs      # Failover, self-repair, quorum
//! │   ├── durability.rs # File-backed restarts
//! │   └── properties.rs # Property-based round-trips
//! │
//! └── exploits/         # Attacks on the encrypted backup tier
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p sp-tests
//!
//! # By category
//! cargo test -p sp-tests integration::
//! cargo test -p sp-tests exploits::
//!
//! # Benchmarks
//! cargo bench -p sp-tests
//! ```

pub mod exploits;
pub mod integration;
