//! # Exploit Simulations
//!
//! Attacks against the persistence boundary. Every attack must end in a
//! clean miss or a rejected save: no panic, no partial data, no repair
//! from untrusted bytes.
//!
//! - `backup_tampering`: edits to the encrypted backup entries
//! - `data_smuggling`: personal data hidden in a candidate state

pub mod backup_tampering;
pub mod data_smuggling;
