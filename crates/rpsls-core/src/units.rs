//! Display and parsing helpers: ether amounts, countdowns, addresses.

use alloy_primitives::utils::{self, Unit};
use alloy_primitives::{Address, U256};
use thiserror::Error;

/// Decimal places of ether
const ETHER_DECIMALS: usize = 18;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitsError {
    #[error("amount is empty")]
    Empty,

    #[error("invalid amount {0:?}")]
    Invalid(String),

    #[error("amount {0:?} has more than 18 decimal places")]
    TooPrecise(String),
}

/// Parse a decimal ether amount ("0.5", "1", ".25") into wei.
///
/// Signs, exponents and anything past 18 decimals are rejected up front,
/// as are amounts that would not fit in a `U256`.
pub fn parse_ether(input: &str) -> Result<U256, UnitsError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(UnitsError::Empty);
    }

    let (int_part, frac_part) = s.split_once('.').unwrap_or((s, ""));
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty())
        || !all_digits(int_part)
        || !all_digits(frac_part)
    {
        return Err(UnitsError::Invalid(s.to_string()));
    }
    if frac_part.len() > ETHER_DECIMALS {
        return Err(UnitsError::TooPrecise(s.to_string()));
    }
    // U256 arithmetic wraps, so make sure the whole part scales without overflow
    if !int_part.is_empty() {
        let whole = U256::from_str_radix(int_part, 10)
            .map_err(|_| UnitsError::Invalid(s.to_string()))?;
        if whole.checked_mul(Unit::ETHER.wei()).is_none() {
            return Err(UnitsError::Invalid(s.to_string()));
        }
    }

    utils::parse_ether(s).map_err(|_| UnitsError::Invalid(s.to_string()))
}

/// Format wei as a decimal ether amount with no trailing zeros
pub fn format_ether(wei: U256) -> String {
    let formatted = utils::format_ether(wei);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Human countdown: "Timeout reached", "1h 5m", "4m 10s" or "42s"
pub fn format_time_remaining(seconds: u64) -> String {
    if seconds == 0 {
        return "Timeout reached".to_string();
    }
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

/// Parse a `0x`-prefixed 20-byte hex address.
///
/// Mixed-case input must carry a valid EIP-55 checksum.
pub fn parse_address(input: &str) -> Option<Address> {
    let s = input.trim();
    let digits = s.strip_prefix("0x")?;
    if digits.len() != 40 {
        return None;
    }
    let address: Address = s.parse().ok()?;
    let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper && address.to_checksum(None) != s {
        return None;
    }
    Some(address)
}

/// `0x1234...abcd`
pub fn shorten_address(address: &Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}
