//! Numbers hash by value: `1`, `1.0` and `10e-1` produce the same bytes.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_traits::Zero;

use crate::error::{Error, Result};

pub fn parse_numeric(text: &str) -> Result<BigDecimal> {
    BigDecimal::from_str(text).map_err(|_| Error::InvalidNumeric(text.to_string()))
}

/// Built from the literal text, so nothing is rounded through `f64`.
pub fn json_numeric(number: &serde_json::Number) -> BigDecimal {
    // literals bigdecimal cannot hold collapse to zero on leaf and query alike
    parse_numeric(&number.to_string()).unwrap_or_else(|_| BigDecimal::zero())
}

/// Scale (i64 LE) followed by the signed little-endian digits of the
/// normalized value.
pub fn canonical_bytes(value: &BigDecimal) -> Vec<u8> {
    if value.is_zero() {
        return 0i64.to_le_bytes().to_vec();
    }
    let (digits, scale) = value.normalized().as_bigint_and_exponent();
    let mut out = scale.to_le_bytes().to_vec();
    out.extend_from_slice(&digits.to_signed_bytes_le());
    out
}
