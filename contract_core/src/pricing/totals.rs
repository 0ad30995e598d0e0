//! # Offer Totals
//!
//! Aggregate value, discount, final total and margin across every line item
//! of an offer. Recomputed from the full list on each change; never stored as
//! its own entity (the offer persists only `final_total` as its `value`).
//!
//! The aggregate value and discount are taken over `unit_price × quantity`
//! without the annual multiplier, while the margin sums the per-item
//! post-discount totals, which do include it.

use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::{format_money, percent_of, round2};
use crate::pricing::LicenseLineItem;

/// Derived totals for a list of line items.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OfferTotals {
    /// Σ unit_price × quantity (pre-discount)
    pub total_value: Decimal,

    /// Σ unit_price × quantity × discount_pct / 100
    pub total_discount: Decimal,

    /// `total_value - total_discount`, exactly
    pub final_total: Decimal,

    /// Σ item.total_value × margin_pct / 100
    pub total_margin: Decimal,
}

impl OfferTotals {
    /// Aggregate the given items.
    ///
    /// # Example
    ///
    /// ```rust
    /// use contract_core::pricing::{LicenseLineItem, OfferTotals};
    /// use rust_decimal_macros::dec;
    ///
    /// let mut item = LicenseLineItem::new(1);
    /// item.unit_price = dec!(100);
    /// item.quantity = 2;
    /// item.discount_pct = dec!(10);
    /// item.recompute(dec!(30));
    ///
    /// let totals = OfferTotals::from_items(&[item], dec!(30));
    /// assert_eq!(totals.total_value, dec!(200));
    /// assert_eq!(totals.total_discount, dec!(20));
    /// assert_eq!(totals.final_total, dec!(180));
    /// assert_eq!(totals.total_margin, dec!(54));
    /// ```
    pub fn from_items(items: &[LicenseLineItem], margin_pct: Decimal) -> Self {
        Self::checked_from_items(items, margin_pct).unwrap_or_else(|| {
            warn!("Offer totals overflow across {} line items; reporting zero", items.len());
            OfferTotals::default()
        })
    }

    fn checked_from_items(items: &[LicenseLineItem], margin_pct: Decimal) -> Option<Self> {
        let (value, discount, item_totals) = items.iter().try_fold(
            (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
            |(value, discount, item_totals), item| {
                Some((
                    value.checked_add(item.list_value()?)?,
                    discount.checked_add(item.list_discount()?)?,
                    item_totals.checked_add(item.total_value)?,
                ))
            },
        )?;

        let total_value = round2(value);
        let total_discount = round2(discount);

        Some(OfferTotals {
            total_value,
            total_discount,
            final_total: total_value.checked_sub(total_discount)?,
            total_margin: round2(percent_of(item_totals, margin_pct)?),
        })
    }

    /// Display strings with 2 decimals.
    pub fn display(&self) -> OfferTotalsDisplay {
        OfferTotalsDisplay {
            total_value: format_money(self.total_value),
            total_discount: format_money(self.total_discount),
            final_total: format_money(self.final_total),
            total_margin: format_money(self.total_margin),
        }
    }
}

/// [`OfferTotals`] formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferTotalsDisplay {
    pub total_value: String,
    pub total_discount: String,
    pub final_total: String,
    pub total_margin: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn item(id: u32, price: Decimal, quantity: u32, discount: Decimal, annual: bool) -> LicenseLineItem {
        let mut item = LicenseLineItem::new(id);
        item.unit_price = price;
        item.quantity = quantity;
        item.discount_pct = discount;
        item.annual_commitment = annual;
        item.recompute(dec!(30));
        item
    }

    #[test]
    fn test_empty_offer() {
        let totals = OfferTotals::from_items(&[], dec!(30));
        assert_eq!(totals, OfferTotals::default());
        assert_eq!(totals.display().final_total, "0.00");
    }

    #[test]
    fn test_aggregate_ignores_annual_multiplier() {
        let items = vec![
            item(1, dec!(100), 2, dec!(10), false),
            item(2, dec!(50), 1, Decimal::ZERO, true),
        ];
        let totals = OfferTotals::from_items(&items, dec!(30));

        assert_eq!(totals.total_value, dec!(250));
        assert_eq!(totals.total_discount, dec!(20));
        assert_eq!(totals.final_total, dec!(230));
        // Margin uses the item totals: (180 + 600) * 0.3
        assert_eq!(totals.total_margin, dec!(234));
    }

    #[test]
    fn test_display_formatting() {
        let totals = OfferTotals::from_items(&[item(1, dec!(19.99), 3, dec!(5), false)], dec!(30));
        let display = totals.display();
        assert_eq!(display.total_value, "59.97");
        assert_eq!(display.total_discount, "3.00");
        assert_eq!(display.final_total, "56.97");
    }

    #[test]
    fn test_overflowing_offer_reports_zero() {
        let mut huge = LicenseLineItem::new(1);
        huge.unit_price = Decimal::MAX;
        huge.quantity = 2;
        huge.recompute(dec!(30));

        let items = vec![item(2, dec!(100), 1, Decimal::ZERO, false), huge];
        assert_eq!(OfferTotals::from_items(&items, dec!(30)), OfferTotals::default());
    }

    proptest! {
        #[test]
        fn prop_final_total_is_value_minus_discount(
            rows in prop::collection::vec((0i64..1_000_000, 1u32..100, -20i64..120, any::<bool>()), 0..12)
        ) {
            let items: Vec<_> = rows
                .iter()
                .enumerate()
                .map(|(i, (cents, qty, discount, annual))| {
                    item(i as u32, Decimal::new(*cents, 2), *qty, Decimal::from(*discount), *annual)
                })
                .collect();

            let totals = OfferTotals::from_items(&items, dec!(30));
            prop_assert_eq!(totals.final_total, totals.total_value - totals.total_discount);
        }
    }
}
