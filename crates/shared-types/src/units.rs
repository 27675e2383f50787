//! Raw <-> decimal conversion.
//!
//! One display unit (XNO) is 10^30 raw. Conversion is done on the decimal
//! digit strings directly so it is exact for integers of any length, not just
//! those that fit in `u128`.

use thiserror::Error;

/// Number of decimal places between raw and the display unit.
pub const RAW_DECIMALS: usize = 30;

/// Errors from parsing or converting amounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    #[error("amount is empty")]
    Empty,

    #[error("amount contains invalid character {0:?}")]
    InvalidCharacter(char),

    #[error("negative amounts are not allowed")]
    Negative,

    #[error("too many fractional digits: {digits} (maximum {max})")]
    TooPrecise { digits: usize, max: usize },

    #[error("amount exceeds the 128-bit raw range")]
    Overflow,
}

fn check_digits(s: &str) -> Result<(), UnitError> {
    match s.chars().find(|c| !c.is_ascii_digit()) {
        Some(c) => Err(UnitError::InvalidCharacter(c)),
        None => Ok(()),
    }
}

fn check_sign(s: &str) -> Result<(), UnitError> {
    if s.is_empty() {
        return Err(UnitError::Empty);
    }
    if s.starts_with('-') {
        return Err(UnitError::Negative);
    }
    Ok(())
}

/// Convert a raw integer string to a decimal display string.
///
/// Trailing fractional zeros are dropped, so `"1000000000000000000000000000000"`
/// becomes `"1"` and `"1100000000000000000000000000"` becomes `"0.0011"`.
pub fn raw_to_decimal(raw: &str) -> Result<String, UnitError> {
    let raw = raw.trim();
    check_sign(raw)?;
    check_digits(raw)?;

    let digits = raw.trim_start_matches('0');
    if digits.is_empty() {
        return Ok("0".to_string());
    }

    let (int_part, frac_part) = if digits.len() > RAW_DECIMALS {
        let split = digits.len() - RAW_DECIMALS;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        (
            "0".to_string(),
            format!("{:0>width$}", digits, width = RAW_DECIMALS),
        )
    };

    let frac = frac_part.trim_end_matches('0');
    if frac.is_empty() {
        Ok(int_part)
    } else {
        Ok(format!("{}.{}", int_part, frac))
    }
}

/// Convert a decimal display string to a raw integer string.
///
/// Accepts `"1"`, `"0.0011"`, `".5"` and `"2."`. More than 30 fractional
/// digits cannot be represented in raw and is rejected rather than rounded.
pub fn decimal_to_raw(decimal: &str) -> Result<String, UnitError> {
    let decimal = decimal.trim();
    check_sign(decimal)?;

    let (int_part, frac_part) = decimal.split_once('.').unwrap_or((decimal, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(UnitError::Empty);
    }
    check_digits(int_part)?;
    check_digits(frac_part)?;

    if frac_part.len() > RAW_DECIMALS {
        return Err(UnitError::TooPrecise {
            digits: frac_part.len(),
            max: RAW_DECIMALS,
        });
    }

    let combined = format!("{}{:0<width$}", int_part, frac_part, width = RAW_DECIMALS);
    let trimmed = combined.trim_start_matches('0');
    Ok(if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    })
}
