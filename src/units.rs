//! Conversion between display units (ether) and base units (wei).

use crate::error::GatewayError;

/// Number of decimals between the display unit and the base unit.
pub const DECIMALS: usize = 18;

const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// Convert a decimal ether amount such as `"0.01"` into wei.
pub fn to_wei(amount: &str) -> Result<u128, GatewayError> {
    let amount = amount.trim();
    let invalid = |reason: &str| GatewayError::InvalidAmount(format!("{:?}: {}", amount, reason));

    if amount.is_empty() || amount == "." {
        return Err(invalid("empty amount"));
    }

    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (amount, ""),
    };

    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid("not a non-negative decimal number"));
    }
    if fraction.len() > DECIMALS {
        return Err(invalid("too many decimal places"));
    }

    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid("amount too large"))?
    };
    let fraction: u128 = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", fraction, width = DECIMALS);
        padded.parse().map_err(|_| invalid("invalid fraction"))?
    };

    whole
        .checked_mul(WEI_PER_ETHER)
        .and_then(|w| w.checked_add(fraction))
        .ok_or_else(|| invalid("amount too large"))
}

/// Format a wei amount as ether, without trailing zeros (`1500000000000000000` → `"1.5"`).
pub fn from_wei(wei: u128) -> String {
    let whole = wei / WEI_PER_ETHER;
    let fraction = wei % WEI_PER_ETHER;
    if fraction == 0 {
        return whole.to_string();
    }

    let fraction = format!("{:0>width$}", fraction, width = DECIMALS);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hundredth_of_an_ether() {
        assert_eq!(to_wei("0.01").unwrap(), 10_000_000_000_000_000);
    }

    #[test]
    fn whole_and_partial_forms() {
        assert_eq!(to_wei("1").unwrap(), WEI_PER_ETHER);
        assert_eq!(to_wei("2.5").unwrap(), 2_500_000_000_000_000_000);
        assert_eq!(to_wei(".5").unwrap(), 500_000_000_000_000_000);
        assert_eq!(to_wei("3.").unwrap(), 3 * WEI_PER_ETHER);
        assert_eq!(to_wei("0.000000000000000001").unwrap(), 1);
    }

    #[test]
    fn rejects_bad_amounts() {
        for bad in ["", ".", "-1", "abc", "1e18", "1.2.3", "0.0000000000000000001"] {
            assert!(
                matches!(to_wei(bad), Err(GatewayError::InvalidAmount(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn rejects_overflow() {
        assert!(to_wei("999999999999999999999999999999").is_err());
    }

    #[test]
    fn formats_ether() {
        assert_eq!(from_wei(0), "0");
        assert_eq!(from_wei(WEI_PER_ETHER), "1");
        assert_eq!(from_wei(1_500_000_000_000_000_000), "1.5");
        assert_eq!(from_wei(10_000_000_000_000_000), "0.01");
        assert_eq!(from_wei(1), "0.000000000000000001");
    }
}
