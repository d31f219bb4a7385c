//! Symmetric key used to sign and verify session tokens.

use base64::engine::general_purpose::STANDARD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::{alphabet, Engine};
use jsonwebtoken::{DecodingKey, EncodingKey};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretSlice};
use std::fmt;
use zeroize::Zeroizing;

/// Length of generated keys, matching the HMAC-SHA256 block output.
pub const HS256_KEY_LENGTH: usize = 32;

/// Standard alphabet, accepting keys with or without `=` padding.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// HMAC-SHA256 secret. Zeroized when the last owner drops it.
pub struct SigningKey {
    secret: SecretSlice<u8>,
}

impl SigningKey {
    /// Generate fresh random key material.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; HS256_KEY_LENGTH];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self::from_bytes(bytes)
    }

    /// Wrap raw key bytes. Any length is accepted.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            secret: SecretSlice::from(bytes),
        }
    }

    /// Decode a standard base64 key. Padding is optional.
    ///
    /// # Errors
    ///
    /// Returns the decoder error if `encoded` is not valid base64.
    pub fn from_base64(encoded: &str) -> Result<Self, base64::DecodeError> {
        let bytes = LENIENT_STANDARD.decode(encoded.trim())?;
        Ok(Self::from_bytes(bytes))
    }

    /// Standard base64 form of the key, suitable for the secret property.
    #[must_use]
    pub fn to_base64(&self) -> Zeroizing<String> {
        Zeroizing::new(STANDARD.encode(self.secret.expose_secret()))
    }

    /// Key length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.secret.expose_secret().len()
    }

    /// Whether the key holds no bytes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.secret.expose_secret())
    }

    pub(crate) fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.secret.expose_secret())
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_length() {
        let key = SigningKey::generate();
        assert_eq!(key.len(), HS256_KEY_LENGTH);
    }

    #[test]
    fn test_generated_keys_differ() {
        let a = SigningKey::generate();
        let b = SigningKey::generate();
        assert_ne!(*a.to_base64(), *b.to_base64());
    }

    #[test]
    fn test_base64_round_trip() {
        let encoded = "c2Vzc2lvbi10b2tlbi1zZWNyZXQtMzItYnl0ZS1rZXk=";
        let key = SigningKey::from_base64(encoded).unwrap();
        assert_eq!(key.len(), 32);
        assert_eq!(key.to_base64().as_str(), encoded);
    }

    #[test]
    fn test_unpadded_key_restores_same_bytes() {
        let encoded = "c2Vzc2lvbi10b2tlbi1zZWNyZXQtMzItYnl0ZS1rZXk=";
        let padded = SigningKey::from_base64(encoded).unwrap();
        let unpadded = SigningKey::from_base64(encoded.trim_end_matches('=')).unwrap();

        assert_eq!(padded.len(), 32);
        assert_eq!(padded.secret.expose_secret(), unpadded.secret.expose_secret());
        assert_eq!(*unpadded.to_base64(), *padded.to_base64());
    }

    #[test]
    fn test_invalid_base64_rejected() {
        assert!(SigningKey::from_base64("not*base64!").is_err());
    }

    #[test]
    fn test_empty_key_accepted() {
        let key = SigningKey::from_base64("").unwrap();
        assert!(key.is_empty());
    }

    #[test]
    fn test_debug_redacts_material() {
        let key = SigningKey::from_bytes(b"super-secret-bytes".to_vec());
        let debug = format!("{key:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("len: 18"));
    }
}
