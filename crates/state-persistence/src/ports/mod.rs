//! # Ports Layer
//!
//! Defines the port traits for the state persistence subsystem.
//!
//! ## Hexagonal Architecture
//!
//! - `inbound.rs` - Driving ports (API exposed to the UI boundary)
//! - `outbound.rs` - Driven ports (mechanisms, tiers, compliance, time)

pub mod inbound;
pub mod outbound;
