//! USDC fixed-point conversion.
//!
//! The token carries 6 decimal places. Every amount in the crate is a `u64`
//! count of micro-USDC; these helpers move between that representation and
//! the strings a person reads or types.

use rust_decimal::Decimal;

use crate::types::ParseError;

/// USDC uses 6 decimals.
pub const USDC_DECIMALS: u32 = 6;

/// One whole USDC in raw units.
pub const ONE_USDC: u64 = 1_000_000;

/// Format a raw USDC amount for display (e.g. `1_500_000` → `"1.50"`).
///
/// Shows exactly `decimals` fraction digits (capped at 6) and groups the
/// integer part with commas. Digits past `decimals` are truncated, never
/// rounded up, so the shown value is never more than the real one.
pub fn to_display(raw: u64, decimals: u32) -> String {
    let decimals = decimals.min(USDC_DECIMALS);
    let whole = group_thousands(raw / ONE_USDC);
    if decimals == 0 {
        return whole;
    }
    let frac = (raw % ONE_USDC) / 10u64.pow(USDC_DECIMALS - decimals);
    format!("{whole}.{frac:0width$}", width = decimals as usize)
}

/// Parse a human-entered amount into raw USDC (e.g. `"1"` → `1_000_000`).
///
/// Accepts plain decimals (`"2.5"`, `".75"`) and comma-grouped values as
/// produced by [`to_display`] (`"1,234.50"`).
pub fn to_raw(text: &str) -> Result<u64, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::Empty);
    }
    if text.starts_with('-') {
        return Err(ParseError::Negative);
    }

    let invalid = || ParseError::InvalidNumber(text.to_string());

    let (whole, frac) = text.split_once('.').unwrap_or((text, ""));
    let whole = strip_grouping(whole).ok_or_else(invalid)?;

    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac.len() > USDC_DECIMALS as usize {
        return Err(ParseError::TooManyDecimals { max: USDC_DECIMALS });
    }

    let whole_units: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| ParseError::Overflow)?
    };
    let frac_units: u64 = if frac.is_empty() {
        0
    } else {
        format!("{frac:0<6}").parse().map_err(|_| invalid())?
    };

    whole_units
        .checked_mul(ONE_USDC)
        .and_then(|w| w.checked_add(frac_units))
        .ok_or(ParseError::Overflow)
}

/// UTF-8 encoded length of `text` in bytes.
///
/// The ledger budgets argument content in bytes, so this is the number to
/// compare against its limits, not the character count.
pub fn utf8_byte_length(text: &str) -> usize {
    text.len()
}

/// Raw USDC as an exact decimal, for logs and JSON views.
pub fn to_decimal(raw: u64) -> Decimal {
    Decimal::from_i128_with_scale(raw as i128, USDC_DECIMALS)
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Remove en-US thousands separators, rejecting misplaced commas.
fn strip_grouping(whole: &str) -> Option<String> {
    if !whole.contains(',') {
        return Some(whole.to_string());
    }
    let mut groups = whole.split(',');
    let first = groups.next()?;
    if first.is_empty() || first.len() > 3 {
        return None;
    }
    let mut out = first.to_string();
    for group in groups {
        if group.len() != 3 {
            return None;
        }
        out.push_str(group);
    }
    Some(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
