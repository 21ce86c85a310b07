//! Serde helpers for big integers.
//!
//! Values travel as base64url (unpadded) of their big-endian two's-complement
//! bytes, e.g. `#[serde(with = "crate::encoding::b64")]`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use num_bigint::BigInt;

pub fn encode_bigint_b64u(value: &BigInt) -> String {
    URL_SAFE_NO_PAD.encode(value.to_signed_bytes_be())
}

pub fn decode_bigint_b64u(text: &str) -> Result<BigInt, base64::DecodeError> {
    let bytes = URL_SAFE_NO_PAD.decode(text)?;
    Ok(BigInt::from_signed_bytes_be(&bytes))
}

pub mod b64 {
    use num_bigint::BigInt;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode_bigint_b64u(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigInt, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::decode_bigint_b64u(&text).map_err(serde::de::Error::custom)
    }
}
