//! # Domain Errors
//!
//! Error types for the state persistence subsystem.
//!
//! ## Layers
//!
//! - `MechanismError`: raised by an underlying key/value mechanism
//! - `TierError`: raised by a tier adapter; always recovered by the orchestrator
//! - `IntegrityError` / `CodecError`: raised by the backup token codec
//! - `PersistenceError`: the only failures a caller ever sees, carried inside reports
//! - `ConfigError`: invalid configuration or key material

use shared_crypto::CryptoError;
use thiserror::Error;

/// Errors from an underlying key/value mechanism.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MechanismError {
    /// The mechanism is absent or switched off.
    #[error("storage mechanism unavailable")]
    Unavailable,

    /// Filesystem or device failure.
    #[error("I/O error: {message}")]
    Io { message: String },

    /// A stored entry could not be decoded.
    #[error("corrupt entry '{name}': {message}")]
    CorruptEntry { name: String, message: String },
}

/// Errors from a tier adapter.
///
/// None of these cross the orchestrator boundary; they become warnings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TierError {
    /// The underlying mechanism cannot be reached.
    #[error("tier unavailable: {reason}")]
    Unavailable { reason: String },

    /// The encoded entry exceeds the tier's hard size bound.
    #[error("entry of {size} bytes exceeds capacity of {max} bytes")]
    Capacity { size: usize, max: usize },

    /// A backup token failed verification or decryption.
    #[error("integrity check failed: {0}")]
    Integrity(#[from] IntegrityError),

    /// Encoding or decoding of the stored representation failed.
    #[error("serialization failed: {message}")]
    Serialization { message: String },

    /// Any other mechanism failure.
    #[error("I/O error: {message}")]
    Io { message: String },
}

impl From<MechanismError> for TierError {
    fn from(err: MechanismError) -> Self {
        match err {
            MechanismError::Unavailable => TierError::Unavailable {
                reason: "storage mechanism unavailable".to_string(),
            },
            MechanismError::Io { message } => TierError::Io { message },
            MechanismError::CorruptEntry { name, message } => TierError::Serialization {
                message: format!("{name}: {message}"),
            },
        }
    }
}

impl From<CodecError> for TierError {
    fn from(err: CodecError) -> Self {
        TierError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Backup token verification failures.
///
/// Raised before any decryption is attempted when the token shape or its
/// signature is wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    /// Token does not have the `signature:iv:ciphertext` shape.
    #[error("malformed token: {reason}")]
    Malformed { reason: &'static str },

    /// HMAC over `iv:ciphertext` does not match.
    #[error("signature mismatch")]
    SignatureMismatch,

    /// Decryption failed (wrong key or bad padding).
    #[error("decryption failed")]
    Decryption,

    /// Payload was flagged compressed but does not decompress.
    #[error("decompression failed")]
    Decompression,
}

/// Backup token encoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("encryption failed: {0}")]
    Encryption(#[from] CryptoError),

    #[error("compression failed: {0}")]
    Compression(String),
}

/// Configuration and key-material errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required key variable is not set.
    #[error("missing key material: {name}")]
    MissingKey { name: &'static str },

    /// Key material could not be parsed.
    #[error("invalid key material {name}: {source}")]
    InvalidKey {
        name: &'static str,
        #[source]
        source: CryptoError,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Failures reported to the caller of the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// The compliance gate rejected the candidate state. Nothing was written.
    #[error("state rejected by compliance policy: {}", violations.join(", "))]
    Compliance { violations: Vec<String> },

    /// The state could not be encoded for storage.
    #[error("state serialization failed: {message}")]
    Serialization { message: String },

    /// Every durable tier failed.
    #[error("no durable tier accepted the state")]
    AllTiersFailed,
}
