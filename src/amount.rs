//! Exact decimal amount handling.
//!
//! Amounts travel as decimal strings (`"2.5"`) in challenges and as integer
//! drop strings (`"2500000"`) on the ledger. Every conversion here is pure
//! string manipulation so no value is ever rounded through a float.

use crate::error::{Error, ErrorCode, Result};

/// Fractional digits carried by a drop.
pub const DROP_DECIMALS: usize = 6;

/// Split a decimal string into integer and fractional digits.
///
/// Accepts exactly `^(0|[1-9]\d*)(\.\d+)?$`.
fn split_decimal(value: &str) -> Result<(&str, &str)> {
    let (int_part, frac_part) = match value.split_once('.') {
        Some((int_part, frac_part)) => {
            if frac_part.is_empty() {
                return Err(invalid_amount(value));
            }
            (int_part, frac_part)
        }
        None => (value, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if int_part.is_empty() || !all_digits(int_part) || !all_digits(frac_part) {
        return Err(invalid_amount(value));
    }
    if int_part.len() > 1 && int_part.starts_with('0') {
        return Err(invalid_amount(value));
    }

    Ok((int_part, frac_part))
}

fn invalid_amount(value: &str) -> Error {
    Error::verification(
        ErrorCode::InvalidAmount,
        format!("invalid decimal amount: {value:?}"),
    )
}

fn strip_leading_zeros(digits: &str) -> &str {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0"
    } else {
        trimmed
    }
}

/// Canonicalize a decimal string.
///
/// Trailing fractional zeros are removed, and the fraction is dropped
/// entirely when nothing remains (`"2.50"` → `"2.5"`, `"3.000"` → `"3"`).
///
/// # Errors
///
/// Returns `invalid_amount` if `value` is not a non-negative decimal.
pub fn normalize(value: &str) -> Result<String> {
    let (int_part, frac_part) = split_decimal(value)?;
    let int_part = strip_leading_zeros(int_part);
    let frac_part = frac_part.trim_end_matches('0');

    if frac_part.is_empty() {
        Ok(int_part.to_string())
    } else {
        Ok(format!("{int_part}.{frac_part}"))
    }
}

/// Check that `value` is already in canonical form.
#[must_use]
pub fn is_canonical(value: &str) -> bool {
    normalize(value).is_ok_and(|canonical| canonical == value)
}

/// Convert an XRP decimal amount to an integer drops string.
///
/// # Errors
///
/// Returns `invalid_amount` if `value` is not a decimal or has more than six
/// fractional digits.
pub fn xrp_to_drops(value: &str) -> Result<String> {
    let (int_part, frac_part) = split_decimal(value)?;
    if frac_part.len() > DROP_DECIMALS {
        return Err(Error::verification(
            ErrorCode::InvalidAmount,
            format!("XRP amount {value:?} is more precise than one drop"),
        ));
    }

    let mut digits = String::with_capacity(int_part.len() + DROP_DECIMALS);
    digits.push_str(int_part);
    digits.push_str(frac_part);
    digits.push_str(&"0".repeat(DROP_DECIMALS - frac_part.len()));

    Ok(strip_leading_zeros(&digits).to_string())
}

/// Convert an integer drops string to a canonical XRP decimal amount.
///
/// # Errors
///
/// Returns `invalid_amount` if `drops` is not a string of ASCII digits.
pub fn drops_to_xrp(drops: &str) -> Result<String> {
    let drops = canonical_drops(drops)?;
    let padded = format!("{drops:0>width$}", width = DROP_DECIMALS + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - DROP_DECIMALS);
    let frac_part = frac_part.trim_end_matches('0');

    if frac_part.is_empty() {
        Ok(int_part.to_string())
    } else {
        Ok(format!("{int_part}.{frac_part}"))
    }
}

/// Validate a drops string and strip its leading zeros.
///
/// # Errors
///
/// Returns `invalid_amount` if `drops` is empty or contains a non-digit.
pub fn canonical_drops(drops: &str) -> Result<&str> {
    if drops.is_empty() || !drops.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::verification(
            ErrorCode::InvalidAmount,
            format!("invalid drops amount: {drops:?}"),
        ));
    }
    Ok(strip_leading_zeros(drops))
}
