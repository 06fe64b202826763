//! # Secure Backup Codec
//!
//! Turns a plaintext payload into a signed, optionally compressed, encrypted
//! token for the small-capacity backup tier, and reverses the transform with
//! integrity verification.
//!
//! ## Token Format
//!
//! ```text
//! hex(hmac_sha256(signing_key, "iv:ciphertext")) ":" hex(iv) ":" base64(ciphertext)
//! ```
//!
//! ## Pipeline
//!
//! 1. Compress with zstd if the plaintext exceeds the threshold
//! 2. Encrypt with AES-256-CBC under a fresh random IV
//! 3. Sign the `iv:ciphertext` string with HMAC-SHA256
//!
//! Decoding verifies the signature first and never attempts decryption of a
//! token whose signature does not match.

use crate::domain::compression::{PayloadCompressor, ZstdCompressor};
use crate::domain::config::KeyMaterial;
use crate::domain::errors::{CodecError, IntegrityError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use shared_crypto::{Iv, IV_LEN, TAG_LEN};

/// Separator between token segments.
pub const DELIMITER: char = ':';

/// Result of encoding a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedToken {
    /// The `signature:iv:ciphertext` string.
    pub token: String,
    /// Whether the payload was compressed before encryption.
    pub compressed: bool,
    /// Plaintext length in bytes.
    pub plaintext_len: usize,
    /// Payload length after the compression stage.
    pub payload_len: usize,
}

impl EncodedToken {
    /// Payload size over plaintext size; 1.0 when uncompressed.
    pub fn compression_ratio(&self) -> f64 {
        if self.plaintext_len == 0 {
            return 1.0;
        }
        self.payload_len as f64 / self.plaintext_len as f64
    }

    /// Token length in bytes.
    pub fn len(&self) -> usize {
        self.token.len()
    }

    /// Whether the token is empty.
    pub fn is_empty(&self) -> bool {
        self.token.is_empty()
    }
}

/// Signs, compresses and encrypts backup payloads.
#[derive(Debug, Clone)]
pub struct SecureCodec {
    keys: KeyMaterial,
    compressor: ZstdCompressor,
    compression_threshold: usize,
}

impl SecureCodec {
    pub fn new(keys: KeyMaterial, compression_threshold: usize, compression_level: i32) -> Self {
        Self {
            keys,
            compressor: ZstdCompressor::new(compression_level),
            compression_threshold,
        }
    }

    /// Encode a plaintext payload into a token.
    pub fn encode(&self, plaintext: &[u8]) -> Result<EncodedToken, CodecError> {
        let compressed = plaintext.len() > self.compression_threshold;
        let payload = if compressed {
            self.compressor.compress(plaintext)?
        } else {
            plaintext.to_vec()
        };

        let (ciphertext, iv) = shared_crypto::encrypt(&self.keys.encryption, &payload)?;
        let signed = format!(
            "{}{DELIMITER}{}",
            hex::encode(iv.as_bytes()),
            STANDARD.encode(&ciphertext)
        );
        let signature = shared_crypto::sign(&self.keys.signing, signed.as_bytes());

        Ok(EncodedToken {
            token: format!("{}{DELIMITER}{signed}", hex::encode(signature)),
            compressed,
            plaintext_len: plaintext.len(),
            payload_len: payload.len(),
        })
    }

    /// Verify and decode a token.
    ///
    /// `compressed` comes from the metadata record stored next to the token.
    pub fn decode(&self, token: &str, compressed: bool) -> Result<Vec<u8>, IntegrityError> {
        let mut parts = token.split(DELIMITER);
        let (signature, iv, ciphertext) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(s), Some(i), Some(c), None) => (s, i, c),
            _ => {
                return Err(IntegrityError::Malformed {
                    reason: "expected signature:iv:ciphertext",
                })
            }
        };

        if !is_lower_hex(signature, TAG_LEN * 2) {
            return Err(IntegrityError::Malformed {
                reason: "signature is not a hex-encoded HMAC-SHA256 tag",
            });
        }
        let tag = hex::decode(signature).map_err(|_| IntegrityError::Malformed {
            reason: "signature is not hex",
        })?;

        let signed = &token[signature.len() + 1..];
        shared_crypto::verify(&self.keys.signing, signed.as_bytes(), &tag)
            .map_err(|_| IntegrityError::SignatureMismatch)?;

        if !is_lower_hex(iv, IV_LEN * 2) {
            return Err(IntegrityError::Malformed {
                reason: "iv is not a hex-encoded block",
            });
        }
        let iv = hex::decode(iv)
            .ok()
            .and_then(|bytes| Iv::from_slice(&bytes).ok())
            .ok_or(IntegrityError::Malformed {
                reason: "iv is not a hex-encoded block",
            })?;
        let ciphertext = STANDARD
            .decode(ciphertext)
            .map_err(|_| IntegrityError::Malformed {
                reason: "ciphertext is not base64",
            })?;

        let payload = shared_crypto::decrypt(&self.keys.encryption, &ciphertext, &iv)
            .map_err(|_| IntegrityError::Decryption)?;

        if compressed {
            self.compressor
                .decompress(&payload)
                .map_err(|_| IntegrityError::Decompression)
        } else {
            Ok(payload)
        }
    }
}

fn is_lower_hex(segment: &str, expected_len: usize) -> bool {
    segment.len() == expected_len
        && segment
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use shared_crypto::SecretKey;

    fn codec() -> SecureCodec {
        let keys = KeyMaterial::new(
            SecretKey::from_bytes([0x11; 32]),
            SecretKey::from_bytes([0x22; 32]),
        );
        SecureCodec::new(keys, 1024, 3)
    }

    fn flip_hex_digit(c: char) -> char {
        if c == '0' {
            '1'
        } else {
            '0'
        }
    }

    #[test]
    fn test_encode_decode_small_payload() {
        let codec = codec();
        let plaintext = br#"{"playerLevel":3,"totalXp":250}"#;

        let encoded = codec.encode(plaintext).unwrap();
        assert!(!encoded.compressed);
        assert_eq!(encoded.token.split(DELIMITER).count(), 3);
        assert_eq!(encoded.compression_ratio(), 1.0);

        assert_eq!(codec.decode(&encoded.token, false).unwrap(), plaintext);
    }

    #[test]
    fn test_large_payload_is_compressed() {
        let codec = codec();
        let plaintext = br#"{"id":"badge","category":"general"}"#.repeat(64);

        let encoded = codec.encode(&plaintext).unwrap();
        assert!(encoded.compressed);
        assert!(encoded.compression_ratio() < 1.0);

        assert_eq!(codec.decode(&encoded.token, true).unwrap(), plaintext);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let codec = codec();
        let encoded = codec.encode(&[b'a'; 1024]).unwrap();
        assert!(!encoded.compressed);

        let encoded = codec.encode(&[b'a'; 1025]).unwrap();
        assert!(encoded.compressed);
    }

    #[test]
    fn test_token_length_is_deterministic() {
        let codec = codec();
        let a = codec.encode(b"same length payload").unwrap();
        let b = codec.encode(b"same length payload").unwrap();
        assert_ne!(a.token, b.token);
        assert_eq!(a.len(), b.len());
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let codec = codec();
        let encoded = codec.encode(b"payload").unwrap();

        let mut chars: Vec<char> = encoded.token.chars().collect();
        chars[0] = flip_hex_digit(chars[0]);
        let tampered: String = chars.into_iter().collect();

        assert_eq!(
            codec.decode(&tampered, false),
            Err(IntegrityError::SignatureMismatch)
        );
    }

    #[test]
    fn test_uppercase_signature_is_malformed() {
        let codec = codec();
        let encoded = codec.encode(b"payload").unwrap();
        let upper = encoded.token.to_uppercase();
        assert!(matches!(
            codec.decode(&upper, false),
            Err(IntegrityError::Malformed { .. })
        ));
    }

    #[test]
    fn test_wrong_delimiter_count() {
        let codec = codec();
        assert!(matches!(
            codec.decode("abc:def", false),
            Err(IntegrityError::Malformed { .. })
        ));
        assert!(matches!(
            codec.decode("a:b:c:d", false),
            Err(IntegrityError::Malformed { .. })
        ));
    }

    #[test]
    fn test_wrong_signing_key_rejected() {
        let encoded = codec().encode(b"payload").unwrap();
        let other = SecureCodec::new(
            KeyMaterial::new(
                SecretKey::from_bytes([0x11; 32]),
                SecretKey::from_bytes([0x33; 32]),
            ),
            1024,
            3,
        );
        assert_eq!(
            other.decode(&encoded.token, false),
            Err(IntegrityError::SignatureMismatch)
        );
    }

    #[test]
    fn test_wrong_compression_flag_fails_cleanly() {
        let codec = codec();
        let encoded = codec.encode(b"short payload").unwrap();
        assert_eq!(
            codec.decode(&encoded.token, true),
            Err(IntegrityError::Decompression)
        );
    }

    proptest! {
        #[test]
        fn prop_any_signature_flip_is_rejected(index in 0usize..64) {
            let codec = codec();
            let encoded = codec.encode(b"{\"playerLevel\":9}").unwrap();

            let mut chars: Vec<char> = encoded.token.chars().collect();
            chars[index] = flip_hex_digit(chars[index]);
            let tampered: String = chars.into_iter().collect();

            prop_assert!(codec.decode(&tampered, false).is_err());
        }

        #[test]
        fn prop_any_signed_region_change_is_rejected(offset in 0usize..64, replacement in b'!'..=b'~') {
            let codec = codec();
            let encoded = codec.encode(b"{\"playerLevel\":9}").unwrap();

            let mut bytes = encoded.token.clone().into_bytes();
            let index = 65 + offset % (bytes.len() - 65);
            prop_assume!(bytes[index] != replacement);
            bytes[index] = replacement;
            let tampered = String::from_utf8(bytes).unwrap();

            prop_assert!(codec.decode(&tampered, false).is_err());
        }
    }
}
