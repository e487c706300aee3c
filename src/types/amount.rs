//! Staking token amounts.
//!
//! ## Overview
//!
//! Scores are stored as raw token base units (`u128`). Humans think in
//! decimal token amounts ("1.5 AST"), so the helpers here convert between
//! the two for a token with a given number of decimals.
//!
//! All conversions go through `rust_decimal`; nothing touches floating point.
//! Sub-unit precision is rejected rather than rounded, so a conversion never
//! silently changes the amount a staker escrows.
//!
//! ## Examples
//!
//! ```
//! use intent_indexer::types::amount::{to_base_units, format_units};
//!
//! // AST uses 4 decimals
//! let score = to_base_units("1.5", 4).unwrap();
//! assert_eq!(score, 15_000);
//! assert_eq!(format_units(score, 4), "1.5");
//! ```

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use crate::types::Score;

/// Largest decimals value whose scale factor fits in a `u64`.
pub const MAX_DECIMALS: u32 = 19;

/// Parse a decimal string into base units.
///
/// # Returns
///
/// * `Some(Score)` - The amount in base units
/// * `None` - If parsing fails, the value is negative, has more precision
///   than `decimals`, or does not fit
///
/// # Example
///
/// ```
/// use intent_indexer::types::amount::to_base_units;
///
/// assert_eq!(to_base_units("250", 0), Some(250));
/// assert_eq!(to_base_units("0.0001", 4), Some(1));
/// assert_eq!(to_base_units("0.00001", 4), None);
/// ```
pub fn to_base_units(s: &str, decimals: u32) -> Option<Score> {
    let decimal = Decimal::from_str(s.trim()).ok()?;
    decimal_to_base_units(decimal, decimals)
}

/// Convert a Decimal token amount to base units.
pub fn decimal_to_base_units(d: Decimal, decimals: u32) -> Option<Score> {
    if d.is_sign_negative() || decimals > MAX_DECIMALS {
        return None;
    }

    let factor = Decimal::from(10u64.checked_pow(decimals)?);
    let scaled = d.checked_mul(factor)?;
    if !scaled.fract().is_zero() {
        return None;
    }
    scaled.to_u128()
}

/// Convert base units to a Decimal token amount.
///
/// `None` if the amount exceeds Decimal's 96-bit mantissa.
pub fn base_units_to_decimal(value: Score, decimals: u32) -> Option<Decimal> {
    let mantissa = i128::try_from(value).ok()?;
    Decimal::try_from_i128_with_scale(mantissa, decimals).ok()
}

/// Render base units as a trimmed decimal string ("1.5", "250").
///
/// Amounts too large for a Decimal fall back to the raw base-unit integer.
pub fn format_units(value: Score, decimals: u32) -> String {
    match base_units_to_decimal(value, decimals) {
        Some(d) => d.normalize().to_string(),
        None => value.to_string(),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
