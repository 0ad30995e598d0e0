//! # License Line Items
//!
//! One row of an offer: a license type, a quantity, and its pricing terms.
//! The derived `total_value` and `margin_value` are recomputed whenever a
//! pricing field changes.
//!
//! ## Example
//!
//! ```rust
//! use contract_core::pricing::LicenseLineItem;
//! use rust_decimal_macros::dec;
//!
//! let mut item = LicenseLineItem::new(1);
//! item.unit_price = dec!(100);
//! item.quantity = 2;
//! item.discount_pct = dec!(10);
//! item.recompute(dec!(30));
//!
//! assert_eq!(item.total_value, dec!(180.00));
//! assert_eq!(item.margin_value, dec!(54.00));
//! ```

use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{ContractError, ContractResult};
use crate::money::{percent_of, round2, HUNDRED, MONTHS_PER_YEAR};

/// A license row in an offer.
///
/// ## JSON Example
///
/// ```json
/// {
///   "id": 1,
///   "license_type_id": "lt-erp-user",
///   "quantity": 2,
///   "unit_price": 100.0,
///   "annual_commitment": false,
///   "monthly_payment": true,
///   "discount_pct": 10.0,
///   "total_value": 180.0,
///   "margin_value": 54.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseLineItem {
    /// Form-scoped identifier; not meaningful outside the editing session
    pub id: u32,

    /// Selected license type, if any
    #[serde(default)]
    pub license_type_id: Option<String>,

    /// Number of licenses (≥ 1)
    pub quantity: u32,

    /// Price per license per billing period
    pub unit_price: Decimal,

    /// Billed for twelve months up front
    #[serde(default)]
    pub annual_commitment: bool,

    /// Paid monthly (informational; does not change the arithmetic)
    #[serde(default)]
    pub monthly_payment: bool,

    /// Discount percentage (0–100 when valid)
    #[serde(default)]
    pub discount_pct: Decimal,

    /// Post-discount value, rounded to cents
    #[serde(default)]
    pub total_value: Decimal,

    /// Margin on `total_value`, rounded to cents
    #[serde(default)]
    pub margin_value: Decimal,
}

impl LicenseLineItem {
    /// Empty row with quantity 1 and no price.
    pub fn new(id: u32) -> Self {
        LicenseLineItem {
            id,
            license_type_id: None,
            quantity: 1,
            unit_price: Decimal::ZERO,
            annual_commitment: false,
            monthly_payment: false,
            discount_pct: Decimal::ZERO,
            total_value: Decimal::ZERO,
            margin_value: Decimal::ZERO,
        }
    }

    /// Billing multiplier: 12 for an annual commitment, otherwise 1.
    pub fn multiplier(&self) -> Decimal {
        if self.annual_commitment {
            MONTHS_PER_YEAR
        } else {
            Decimal::ONE
        }
    }

    /// `unit_price × quantity × multiplier`, unrounded. `None` on overflow.
    pub fn subtotal(&self) -> Option<Decimal> {
        self.list_value()?.checked_mul(self.multiplier())
    }

    /// Discount amount on the subtotal, unrounded.
    pub fn discount_value(&self) -> Option<Decimal> {
        percent_of(self.subtotal()?, self.discount_pct)
    }

    /// `unit_price × quantity`, the pre-discount value used by the offer
    /// aggregate (which ignores the annual multiplier).
    pub fn list_value(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }

    /// List-value discount used by the offer aggregate.
    pub fn list_discount(&self) -> Option<Decimal> {
        percent_of(self.list_value()?, self.discount_pct)
    }

    /// Recompute `total_value` and `margin_value`.
    ///
    /// A row whose amounts overflow is priced at zero.
    pub fn recompute(&mut self, margin_pct: Decimal) {
        match self.derived_values(margin_pct) {
            Some((total_value, margin_value)) => {
                self.total_value = total_value;
                self.margin_value = margin_value;
            }
            None => {
                warn!("Line item {} overflows; pricing it at zero", self.id);
                self.total_value = Decimal::ZERO;
                self.margin_value = Decimal::ZERO;
            }
        }
    }

    fn derived_values(&self, margin_pct: Decimal) -> Option<(Decimal, Decimal)> {
        let subtotal = self.subtotal()?;
        let total_value = round2(subtotal.checked_sub(percent_of(subtotal, self.discount_pct)?)?);
        let margin_value = round2(percent_of(total_value, margin_pct)?);
        Some((total_value, margin_value))
    }

    /// Check the value ranges the offer form declares.
    ///
    /// The calculators accept anything; this is for the save boundary.
    pub fn validate(&self) -> ContractResult<()> {
        if self.quantity == 0 {
            return Err(ContractError::invalid_input(
                "quantity",
                self.quantity.to_string(),
                "Quantity must be at least 1",
            ));
        }
        if self.unit_price < Decimal::ZERO {
            return Err(ContractError::invalid_input(
                "unit_price",
                self.unit_price.to_string(),
                "Unit price cannot be negative",
            ));
        }
        if self.discount_pct < Decimal::ZERO || self.discount_pct > HUNDRED {
            return Err(ContractError::invalid_input(
                "discount_pct",
                self.discount_pct.to_string(),
                "Discount must be between 0 and 100",
            ));
        }
        Ok(())
    }
}
