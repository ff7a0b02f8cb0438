//! Conversion between smallest-unit integers and human decimal strings.
//!
//! Formatting follows the usual wallet convention: the shortest fraction
//! that represents the value exactly, always with at least one fractional
//! digit (`1000000000000000000` wei is `"1.0"` ETH).

use alloy_primitives::U256;

use crate::chains::NATIVE_DECIMALS;
use crate::error::EthError;

/// Formats `value` (in smallest units) as a decimal string with `decimals` places.
pub fn format_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    // Left-pad so there is at least one integer digit.
    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
    } else {
        digits
    };

    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    let fraction = if fraction.is_empty() { "0" } else { fraction };

    format!("{whole}.{fraction}")
}

/// Formats a wei amount as ETH.
pub fn format_ether(wei: U256) -> String {
    format_units(wei, NATIVE_DECIMALS)
}

/// Parses a non-negative decimal string into smallest units.
///
/// Accepts `"1"`, `"1.5"`, `".5"` and `"1."`. Fractional digits beyond
/// `decimals` are rejected unless they are all zero.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, EthError> {
    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (amount, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(EthError::InvalidAmount(format!("invalid decimal value {amount:?}")));
    }

    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(EthError::InvalidAmount(format!("invalid decimal value {amount:?}")));
    }

    let fraction = fraction.trim_end_matches('0');
    let decimals = decimals as usize;
    if fraction.len() > decimals {
        return Err(EthError::InvalidAmount(format!(
            "too many decimals for {decimals}-decimal unit: {amount:?}"
        )));
    }

    let mut digits = String::with_capacity(whole.len() + decimals);
    digits.push_str(whole);
    digits.push_str(fraction);
    digits.extend(std::iter::repeat('0').take(decimals - fraction.len()));

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(digits, 10)
        .map_err(|e| EthError::InvalidAmount(format!("value {amount:?} out of range: {e}")))
}

/// Parses an ETH amount into wei.
pub fn parse_ether(amount: &str) -> Result<U256, EthError> {
    parse_units(amount, NATIVE_DECIMALS)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn format_whole_ether() {
        assert_eq!(format_ether(U256::from(ONE_ETHER)), "1.0");
        assert_eq!(format_ether(U256::from(ONE_ETHER * 25)), "25.0");
    }

    #[test]
    fn format_fractional_ether() {
        assert_eq!(format_ether(U256::from(ONE_ETHER / 2)), "0.5");
        assert_eq!(format_ether(U256::from(1u64)), "0.000000000000000001");
        assert_eq!(format_ether(U256::from(1_234_500_000_000_000_000u128)), "1.2345");
    }

    #[test]
    fn format_zero() {
        assert_eq!(format_ether(U256::ZERO), "0.0");
        assert_eq!(format_units(U256::ZERO, 6), "0.0");
    }

    #[test]
    fn format_six_decimal_token() {
        assert_eq!(format_units(U256::from(1_000_000u64), 6), "1.0");
        assert_eq!(format_units(U256::from(123_456_789u64), 6), "123.456789");
        assert_eq!(format_units(U256::from(10u64), 6), "0.00001");
    }

    #[test]
    fn format_zero_decimals_has_no_point() {
        assert_eq!(format_units(U256::from(1234u64), 0), "1234");
    }

    #[test]
    fn format_large_decimals_does_not_overflow() {
        let text = format_units(U256::from(5u64), 100);
        assert!(text.starts_with("0.000"));
        assert!(text.ends_with('5'));
    }

    #[test]
    fn parse_ether_values() {
        assert_eq!(parse_ether("1").unwrap(), U256::from(ONE_ETHER));
        assert_eq!(parse_ether("1.5").unwrap(), U256::from(ONE_ETHER * 3 / 2));
        assert_eq!(parse_ether(".5").unwrap(), U256::from(ONE_ETHER / 2));
        assert_eq!(parse_ether("1.").unwrap(), U256::from(ONE_ETHER));
        assert_eq!(parse_ether("0.000000000000000001").unwrap(), U256::from(1u64));
        assert_eq!(parse_ether("0").unwrap(), U256::ZERO);
    }

    #[test]
    fn parse_six_decimal_token() {
        assert_eq!(parse_units("1", 6).unwrap(), U256::from(1_000_000u64));
        assert_eq!(parse_units("2.25", 6).unwrap(), U256::from(2_250_000u64));
        assert_eq!(parse_units("1.5000000", 6).unwrap(), U256::from(1_500_000u64));
    }

    #[test]
    fn parse_rejects_too_many_decimals() {
        let err = parse_units("1.0000001", 6).unwrap_err();
        assert!(err.to_string().contains("too many decimals"));
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in ["", ".", "-1", "+1", "1e18", "abc", "1.2.3", " 1", "1,5"] {
            assert!(parse_ether(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn parse_rejects_overflow() {
        let huge = "9".repeat(80);
        assert!(parse_ether(&huge).is_err());
    }

    #[test]
    fn parse_then_format_is_stable() {
        for text in ["0.1", "12.345", "1000.0", "0.000001"] {
            assert_eq!(format_ether(parse_ether(text).unwrap()), text);
        }
    }
}
