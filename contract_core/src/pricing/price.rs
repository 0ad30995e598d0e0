//! # Single-License Price Derivation
//!
//! Quotes one license type for a number of users, applying discount, the
//! annual multiplier and the margin. Missing inputs give `None` instead of an
//! error, so a form can show an empty value while it is being filled in.
//!
//! ## Order of operations
//!
//! ```text
//! base   = annual && yearly_price ? yearly_price : monthly_price
//! total  = base * users
//! total *= 1 - discount/100            (only when discount > 0)
//! total *= 12                          (annual, priced from monthly_price)
//! total += total * margin/100
//! ```

use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::{percent_of, round2, DEFAULT_MARGIN_PCT, HUNDRED, MONTHS_PER_YEAR};
use crate::pricing::LicenseType;

/// Parameters for [`calculate_price`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceInput {
    /// Number of users
    pub users: u32,

    /// Annual commitment
    #[serde(default)]
    pub annual_commitment: bool,

    /// Discount percentage
    #[serde(default)]
    pub discount_pct: Decimal,

    /// Margin percentage added on top
    #[serde(default = "default_margin")]
    pub margin_pct: Decimal,
}

fn default_margin() -> Decimal {
    DEFAULT_MARGIN_PCT
}

impl PriceInput {
    pub fn new(users: u32) -> Self {
        PriceInput {
            users,
            annual_commitment: false,
            discount_pct: Decimal::ZERO,
            margin_pct: DEFAULT_MARGIN_PCT,
        }
    }
}

/// Derive the offer value for one license type.
///
/// Returns `None` when no license is selected, when `users` is 0, or when the
/// license has no usable price.
///
/// # Example
///
/// ```rust
/// use contract_core::pricing::{calculate_price, LicenseType, PriceInput};
/// use rust_decimal_macros::dec;
///
/// let license = LicenseType::new("lt-1", "ERP-USER", "ERP User", "erp")
///     .with_monthly_price(dec!(50));
/// let input = PriceInput { annual_commitment: true, ..PriceInput::new(10) };
///
/// // 50 * 10 * 12 = 6000, +30% = 7800
/// assert_eq!(calculate_price(Some(&license), &input), Some(dec!(7800.00)));
/// ```
pub fn calculate_price(license: Option<&LicenseType>, input: &PriceInput) -> Option<Decimal> {
    let license = license?;
    if input.users == 0 {
        return None;
    }

    let (base_price, from_yearly) = match (input.annual_commitment, license.yearly_price) {
        (true, Some(yearly)) => (yearly, true),
        _ => (license.monthly_price?, false),
    };

    let Some(total) = checked_total(base_price, from_yearly, input) else {
        warn!("Price for {} x{} overflows", license.code, input.users);
        return None;
    };

    let total = round2(total);
    debug!("Priced {} x{} at {}", license.code, input.users, total);
    Some(total)
}

fn checked_total(base_price: Decimal, from_yearly: bool, input: &PriceInput) -> Option<Decimal> {
    let mut total = base_price.checked_mul(Decimal::from(input.users))?;

    if input.discount_pct > Decimal::ZERO {
        total = total.checked_mul(Decimal::ONE.checked_sub(input.discount_pct / HUNDRED)?)?;
    }

    if input.annual_commitment && !from_yearly {
        total = total.checked_mul(MONTHS_PER_YEAR)?;
    }

    total.checked_add(percent_of(total, input.margin_pct)?)
}
