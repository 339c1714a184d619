// Group elements and exponents travel as `0x`-prefixed hexadecimal strings.
use num_bigint::BigUint;
use num_traits::Num;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

/// Format an integer the way the voting server expects it
pub fn to_hex_string(value: &BigUint) -> String {
    format!("0x{}", value.to_str_radix(16))
}

/// Parse a `0x`-prefixed (or bare) hexadecimal integer
pub fn from_hex_string(value: &str) -> Result<BigUint, String> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    if digits.is_empty() {
        return Err("empty hexadecimal integer".to_owned());
    }
    BigUint::from_str_radix(digits, 16).map_err(|e| format!("{}: {}", value, e))
}

// a single-purpose module for use in `#[serde(with)]`
pub mod biguint_hex {
    use super::*;

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_hex_string(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let s = String::deserialize(deserializer)?;
        from_hex_string(&s).map_err(D::Error::custom)
    }
}

// a single-purpose module for use in `#[serde(with)]`
pub mod biguint_hex_vec {
    use super::*;
    use serde::ser::SerializeSeq;

    pub fn serialize<S: Serializer>(values: &[BigUint], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            seq.serialize_element(&to_hex_string(value))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<BigUint>, D::Error> {
        let strings = Vec::<String>::deserialize(deserializer)?;
        strings
            .iter()
            .map(|s| from_hex_string(s).map_err(D::Error::custom))
            .collect()
    }
}
