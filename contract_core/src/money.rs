//! # Money Helpers
//!
//! Decimal arithmetic shared by the pricing and rollup calculators. All money
//! and percentage values are `rust_decimal::Decimal`, which keeps cents exact
//! and serializes to plain JSON numbers.
//!
//! ## Rounding
//!
//! Every derived monetary value is rounded to 2 fraction digits, half-up
//! (midpoint away from zero). Rounding happens at each derived value, not only
//! on the final aggregate.
//!
//! ## Example
//!
//! ```rust
//! use contract_core::money::{round2, percent_of, format_money};
//! use rust_decimal_macros::dec;
//!
//! assert_eq!(round2(dec!(2.675)), dec!(2.68));
//! assert_eq!(percent_of(dec!(180), dec!(30)), Some(dec!(54)));
//! assert_eq!(format_money(dec!(7800)), "7800.00");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Months billed for an annual commitment priced per month
pub const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Percentage denominator
pub const HUNDRED: Decimal = dec!(100);

/// Margin percentage used when no configuration overrides it
pub const DEFAULT_MARGIN_PCT: Decimal = dec!(30);

// ============================================================================
// Rounding
// ============================================================================

/// Round to 2 fraction digits, half-up.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `pct` percent of `value`, unrounded, or `None` if the product overflows.
///
/// Negative or >100 percentages are not rejected here; callers that need
/// bounds validate at their boundary.
pub fn percent_of(value: Decimal, pct: Decimal) -> Option<Decimal> {
    value.checked_mul(pct)?.checked_div(HUNDRED)
}

// ============================================================================
// Display
// ============================================================================

/// Format a money value with exactly 2 decimals (e.g. `"180.00"`).
pub fn format_money(value: Decimal) -> String {
    format!("{:.2}", round2(value))
}

/// Format a money value with a currency code suffix (e.g. `"180.00 EUR"`).
pub fn format_with_currency(value: Decimal, currency: &str) -> String {
    format!("{} {}", format_money(value), currency)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_up() {
        assert_eq!(round2(dec!(0.005)), dec!(0.01));
        assert_eq!(round2(dec!(1.004)), dec!(1.00));
        assert_eq!(round2(dec!(-0.005)), dec!(-0.01));
        assert_eq!(round2(dec!(10)), dec!(10));
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(dec!(200), dec!(10)), Some(dec!(20)));
        assert_eq!(percent_of(dec!(200), dec!(-10)), Some(dec!(-20)));
        assert_eq!(percent_of(dec!(200), Decimal::ZERO), Some(Decimal::ZERO));
        assert_eq!(percent_of(Decimal::MAX, dec!(150)), None);
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(180)), "180.00");
        assert_eq!(format_money(dec!(54.005)), "54.01");
        assert_eq!(format_with_currency(dec!(7800), "EUR"), "7800.00 EUR");
    }
}
