//! Base64 transport encoding for item values.
//!
//! Values cross the caller boundary as standard, padded base64. Decoding is
//! strict: anything outside the alphabet is rejected instead of skipped.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{Result, VaultError};

/// Decode a submitted value.
pub fn decode_value(encoded: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(encoded.as_bytes())
        .map_err(|_| VaultError::MalformedCiphertext("Invalid base 64 encoded string.".to_string()))
}

/// Encode a stored value for output.
pub fn encode_value(value: &[u8]) -> String {
    STANDARD.encode(value)
}

/// Serde adapter storing `Vec<u8>` fields as base64 strings.
pub mod base64_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::encode_value(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        super::decode_value(&encoded).map_err(serde::de::Error::custom)
    }
}
