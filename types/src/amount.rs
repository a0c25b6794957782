//! Token amounts.
//!
//! Amounts are fixed-point integers (`u128`) in the token's smallest unit, with
//! 18 decimals. Base-currency value uses the same representation.

/// One whole token in raw units (18 decimals).
pub const TOKEN_UNIT: u128 = 1_000_000_000_000_000_000;

/// `n` whole tokens expressed in raw units.
///
/// Saturates rather than overflowing for absurd inputs.
pub const fn tokens(n: u64) -> u128 {
    (n as u128).saturating_mul(TOKEN_UNIT)
}

/// `floor(a * b / d)` computed exactly, even when `a * b` exceeds `u128`.
///
/// `None` when `d` is zero or the quotient itself does not fit.
pub fn mul_div(a: u128, b: u128, d: u128) -> Option<u128> {
    if d == 0 {
        return None;
    }
    if let Some(product) = a.checked_mul(b) {
        return Some(product / d);
    }
    let whole = (a / d).checked_mul(b)?;
    whole.checked_add(mul_div_below(a % d, b, d))
}

/// `floor(r * b / d)` for `r < d`, by binary long multiplication with the
/// remainder kept below `d`. The quotient is below `b`, so it always fits.
fn mul_div_below(r: u128, b: u128, d: u128) -> u128 {
    let (mut quotient, mut rem) = (0u128, 0u128);
    for bit in (0..u128::BITS).rev() {
        quotient <<= 1;
        if rem >= d - rem {
            quotient += 1;
            rem -= d - rem;
        } else {
            rem += rem;
        }
        if (b >> bit) & 1 == 1 {
            if rem >= d - r {
                quotient += 1;
                rem -= d - r;
            } else {
                rem += r;
            }
        }
    }
    quotient
}

/// Serde adapter writing `u128` amounts as decimal strings.
///
/// TOML integers are 64-bit and JSON consumers lose precision above 2^53, so
/// human-facing formats carry raw amounts as strings. Binary formats keep the
/// native integer.
pub mod decimal {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.collect_str(value)
        } else {
            serializer.serialize_u128(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        if deserializer.is_human_readable() {
            #[derive(Deserialize)]
            #[serde(untagged)]
            enum Raw {
                Text(String),
                Int(u64),
            }
            match Raw::deserialize(deserializer)? {
                Raw::Text(s) => s
                    .trim()
                    .replace('_', "")
                    .parse::<u128>()
                    .map_err(|e| de::Error::custom(format!("invalid amount {s:?}: {e}"))),
                Raw::Int(n) => Ok(n as u128),
            }
        } else {
            u128::deserialize(deserializer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_scales_by_unit() {
        assert_eq!(tokens(0), 0);
        assert_eq!(tokens(10), 10 * TOKEN_UNIT);
    }

    #[test]
    fn mul_div_survives_wide_products() {
        assert_eq!(mul_div(7, 3, 2), Some(10));
        assert_eq!(mul_div(1, 1, 0), None);
        // 341 whole units at 0.001 per token
        assert_eq!(
            mul_div(tokens(341), TOKEN_UNIT, TOKEN_UNIT / 1_000),
            Some(tokens(341_000))
        );
        assert_eq!(mul_div(u128::MAX, 3, 6), Some(u128::MAX / 2));
        assert_eq!(mul_div(u128::MAX, u128::MAX, u128::MAX), Some(u128::MAX));
        assert_eq!(mul_div(u128::MAX, 2, 1), None);
    }

    #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
    struct Holder {
        #[serde(with = "super::decimal")]
        amount: u128,
    }

    #[test]
    fn decimal_accepts_strings_and_small_integers() {
        let from_str: Holder = serde_json::from_str(r#"{"amount":"100_000000000000000000"}"#).unwrap();
        assert_eq!(from_str.amount, tokens(100));
        let from_int: Holder = serde_json::from_str(r#"{"amount":42}"#).unwrap();
        assert_eq!(from_int.amount, 42);
        assert_eq!(
            serde_json::to_string(&Holder { amount: tokens(1) }).unwrap(),
            r#"{"amount":"1000000000000000000"}"#
        );
    }

    #[test]
    fn decimal_rejects_garbage() {
        assert!(serde_json::from_str::<Holder>(r#"{"amount":"ten"}"#).is_err());
    }
}
