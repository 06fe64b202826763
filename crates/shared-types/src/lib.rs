//! # Shared Types Crate
//!
//! This crate contains the application state aggregate persisted by the
//! tiered persistence subsystem, the reduced backup projection derived from
//! it, and the identifiers of the storage tiers.
//!
//! ## Design Principles
//!
//! - **Single Aggregate**: exactly one named, bounded-size state object is
//!   persisted per origin.
//! - **Best-Effort Defaulting**: every field defaults on read, so documents
//!   written by older versions still deserialize.
//! - **Tagged Reconstruction**: a state rebuilt from the reduced backup is a
//!   distinct variant (`LoadedState::ReconstructedPartial`), never a flag on
//!   the same record.

pub mod entities;
pub mod errors;
pub mod projection;
pub mod tier;

pub use entities::*;
pub use errors::*;
pub use projection::*;
pub use tier::*;
