//! # Shared Crypto - Cryptographic Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `symmetric` | AES-256-CBC (PKCS#7) | Confidentiality of backup tokens |
//! | `mac` | HMAC-SHA256 | Integrity of backup tokens |
//!
//! ## Security Properties
//!
//! - **AES-256-CBC**: fresh random 128-bit IV per encryption
//! - **HMAC-SHA256**: constant-time verification via `verify_slice`
//! - **Keys**: zeroized on drop, never printed by `Debug`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod mac;
pub mod symmetric;

// Re-exports
pub use errors::CryptoError;
pub use mac::{sign, verify, Tag, TAG_LEN};
pub use symmetric::{decrypt, encrypt, Iv, SecretKey, IV_LEN, KEY_LEN};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
