use serde::{de, Deserialize, Deserializer, Serialize};
use solabi::ethprim::U256 as Uint256;
use std::{num::ParseIntError, str::FromStr};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct U256(pub Uint256);

impl Serialize for U256 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for U256 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct U256Visitor;

        impl de::Visitor<'_> for U256Visitor {
            type Value = U256;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a string representing U256")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value
                    .parse()
                    .map(U256)
                    .map_err(|_| de::Error::invalid_value(de::Unexpected::Str(value), &self))
            }
        }

        deserializer.deserialize_str(U256Visitor)
    }
}

impl From<u64> for U256 {
    fn from(value: u64) -> Self {
        U256(Uint256::from(value))
    }
}

impl U256 {
    pub fn from_dec_str(value: &str) -> Result<Self, ParseIntError> {
        match Uint256::from_str(value) {
            Ok(res) => Ok(U256(res)),
            Err(err) => Err(err),
        }
    }
}
