//! Hex quantity encoding (`"0x1a"`) used by the JSON-RPC API for integers.
//!
//! The `hex_*` modules plug into `#[serde(with = "...")]`.

use crate::error::RpcError;

/// Renders `value` as a minimal `0x`-prefixed hex quantity.
pub fn encode_u64(value: u64) -> String {
    format!("{value:#x}")
}

/// Parses a hex quantity into a `u64`.
pub fn decode_u64(text: &str) -> Result<u64, RpcError> {
    u64::from_str_radix(digits(text)?, 16)
        .map_err(|e| RpcError::Decode(format!("bad quantity {text:?}: {e}")))
}

/// Parses a hex quantity into a `u128`.
pub fn decode_u128(text: &str) -> Result<u128, RpcError> {
    u128::from_str_radix(digits(text)?, 16)
        .map_err(|e| RpcError::Decode(format!("bad quantity {text:?}: {e}")))
}

fn digits(text: &str) -> Result<&str, RpcError> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .ok_or_else(|| RpcError::Decode(format!("quantity {text:?} is missing 0x")))?;
    if digits.is_empty() {
        return Err(RpcError::Decode(format!("quantity {text:?} has no digits")));
    }
    Ok(digits)
}

pub mod hex_u64 {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode_u64(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::decode_u64(&text).map_err(D::Error::custom)
    }
}

pub mod hex_u128 {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{value:#x}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::decode_u128(&text).map_err(D::Error::custom)
    }
}

pub mod hex_opt_u64 {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_some(&super::encode_u64(*v)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<u64>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|text| super::decode_u64(&text).map_err(D::Error::custom))
            .transpose()
    }
}

pub mod hex_opt_u128 {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<u128>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_some(&format!("{v:#x}")),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<u128>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|text| super::decode_u128(&text).map_err(D::Error::custom))
            .transpose()
    }
}
