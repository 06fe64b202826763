//! # Payload Compression
//!
//! Zstd compression for backup payloads that exceed the size threshold.

use crate::domain::errors::CodecError;

/// Trait for payload compression implementations
pub trait PayloadCompressor: Send + Sync {
    /// Compress data
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;
    /// Decompress data
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;
}

/// Zstd-based compressor
#[derive(Debug, Clone)]
pub struct ZstdCompressor {
    level: i32,
}

impl ZstdCompressor {
    /// Create a compressor at the given level (1-22).
    pub fn new(level: i32) -> Self {
        Self { level }
    }
}

impl Default for ZstdCompressor {
    fn default() -> Self {
        Self::new(3)
    }
}

impl PayloadCompressor for ZstdCompressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        zstd::encode_all(data, self.level).map_err(|e| CodecError::Compression(e.to_string()))
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        zstd::decode_all(data).map_err(|e| CodecError::Compression(e.to_string()))
    }
}
