//! # HMAC-SHA256
//!
//! Keyed message authentication. Verification is constant-time.

use crate::{CryptoError, SecretKey};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Tag length in bytes.
pub const TAG_LEN: usize = 32;

/// HMAC-SHA256 output.
pub type Tag = [u8; TAG_LEN];

fn keyed(key: &SecretKey) -> HmacSha256 {
    // HMAC accepts keys of any length; a 32-byte key never fails.
    match HmacSha256::new_from_slice(key.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC accepts any key length"),
    }
}

/// Sign a message.
pub fn sign(key: &SecretKey, message: &[u8]) -> Tag {
    let mut mac = keyed(key);
    mac.update(message);
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&mac.finalize().into_bytes());
    tag
}

/// Verify a tag over a message.
///
/// # Errors
///
/// Returns `CryptoError::SignatureVerificationFailed` on mismatch, including
/// a tag of the wrong length.
pub fn verify(key: &SecretKey, message: &[u8], tag: &[u8]) -> Result<(), CryptoError> {
    let mut mac = keyed(key);
    mac.update(message);
    mac.verify_slice(tag)
        .map_err(|_| CryptoError::SignatureVerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify() {
        let key = SecretKey::generate();
        let tag = sign(&key, b"iv:ciphertext");
        assert!(verify(&key, b"iv:ciphertext", &tag).is_ok());
    }

    #[test]
    fn test_tampered_message_rejected() {
        let key = SecretKey::generate();
        let tag = sign(&key, b"iv:ciphertext");
        assert_eq!(
            verify(&key, b"iv:ciphertexT", &tag),
            Err(CryptoError::SignatureVerificationFailed)
        );
    }

    #[test]
    fn test_wrong_key_rejected() {
        let tag = sign(&SecretKey::generate(), b"payload");
        assert!(verify(&SecretKey::generate(), b"payload", &tag).is_err());
    }

    #[test]
    fn test_truncated_tag_rejected() {
        let key = SecretKey::generate();
        let tag = sign(&key, b"payload");
        assert!(verify(&key, b"payload", &tag[..16]).is_err());
    }

    #[test]
    fn test_deterministic() {
        let key = SecretKey::from_bytes([9u8; 32]);
        assert_eq!(sign(&key, b"x"), sign(&key, b"x"));
    }
}
