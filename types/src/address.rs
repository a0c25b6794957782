//! Account identity: a 20-byte address rendered as `0x`-prefixed hex.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ParamError;

/// An account identity.
///
/// The all-zero address is the null identity: it can never stake, vote, own
/// the engine, or receive a treasury payout.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId([u8; 20]);

impl AccountId {
    /// The null identity.
    pub const ZERO: Self = Self([0u8; 20]);

    /// The standard prefix for rendered addresses.
    pub const PREFIX: &'static str = "0x";

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Build an address whose trailing eight bytes hold `n` (big-endian).
    ///
    /// Handy for fixtures and scripted simulations.
    pub fn from_low_u64(n: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&n.to_be_bytes());
        Self(bytes)
    }

    /// Parse a `0x`-prefixed (or bare) 40-digit hex string.
    pub fn from_hex(s: &str) -> Result<Self, ParamError> {
        let digits = s.strip_prefix(Self::PREFIX).unwrap_or(s);
        let raw = hex::decode(digits).map_err(|_| ParamError::InvalidAddress(s.to_string()))?;
        let bytes: [u8; 20] = raw
            .try_into()
            .map_err(|_| ParamError::InvalidAddress(s.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Whether this is the null identity.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, hex::encode(self.0))
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({self})")
    }
}

impl FromStr for AccountId {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_hex(&s).map_err(de::Error::custom)
        } else {
            <[u8; 20]>::deserialize(deserializer).map(Self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trips_through_from_hex() {
        let id = AccountId::from_low_u64(0xdead_beef);
        let rendered = id.to_string();
        assert_eq!(rendered, "0x00000000000000000000000000000000deadbeef");
        assert_eq!(AccountId::from_hex(&rendered).unwrap(), id);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        assert!(matches!(
            AccountId::from_hex("0x1234"),
            Err(ParamError::InvalidAddress(_))
        ));
        assert!(AccountId::from_hex("0xzz00000000000000000000000000000000000000").is_err());
    }

    #[test]
    fn zero_is_null() {
        assert!(AccountId::ZERO.is_zero());
        assert!(!AccountId::from_low_u64(1).is_zero());
    }

    #[test]
    fn json_uses_hex_strings() {
        let id = AccountId::from_low_u64(7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
