//! # Offer Form
//!
//! Editing session over an offer's license rows. Every edit recomputes the
//! touched row; totals are derived on demand from the whole list.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::DEFAULT_MARGIN_PCT;
use crate::pricing::{LicenseLineItem, LicenseType, OfferTotals};

/// A single field edit on a line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum LineItemEdit {
    /// Select a license type; the unit price is taken from its monthly price
    LicenseType(LicenseType),
    UnitPrice(Decimal),
    Quantity(u32),
    DiscountPct(Decimal),
    AnnualCommitment(bool),
    MonthlyPayment(bool),
}

/// In-memory form state for an offer's license rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferForm {
    pub items: Vec<LicenseLineItem>,
    pub margin_pct: Decimal,
    next_id: u32,
}

impl Default for OfferForm {
    fn default() -> Self {
        OfferForm::new(DEFAULT_MARGIN_PCT)
    }
}

impl OfferForm {
    pub fn new(margin_pct: Decimal) -> Self {
        OfferForm {
            items: Vec::new(),
            margin_pct,
            next_id: 1,
        }
    }

    /// Resume editing existing rows. Ids continue after the largest one.
    pub fn from_items(items: Vec<LicenseLineItem>, margin_pct: Decimal) -> Self {
        let next_id = items.iter().map(|i| i.id).max().unwrap_or(0) + 1;
        OfferForm {
            items,
            margin_pct,
            next_id,
        }
    }

    /// Append a row, pre-filled from `license` when given. Returns its id.
    pub fn add_item(&mut self, license: Option<&LicenseType>) -> u32 {
        let id = self.next_id;
        self.next_id += 1;

        let mut item = LicenseLineItem::new(id);
        if let Some(license) = license {
            select_license(&mut item, license);
        }
        item.recompute(self.margin_pct);
        self.items.push(item);
        id
    }

    /// Remove a row. Returns the removed row if it existed.
    pub fn remove_item(&mut self, id: u32) -> Option<LicenseLineItem> {
        let index = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(index))
    }

    pub fn item(&self, id: u32) -> Option<&LicenseLineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Apply an edit and recompute the row. Returns `false` if no row has `id`.
    pub fn apply(&mut self, id: u32, edit: LineItemEdit) -> bool {
        let margin_pct = self.margin_pct;
        let Some(item) = self.items.iter_mut().find(|i| i.id == id) else {
            return false;
        };

        match edit {
            LineItemEdit::LicenseType(license) => select_license(item, &license),
            LineItemEdit::UnitPrice(price) => item.unit_price = price,
            LineItemEdit::Quantity(quantity) => item.quantity = quantity,
            LineItemEdit::DiscountPct(pct) => item.discount_pct = pct,
            LineItemEdit::AnnualCommitment(annual) => item.annual_commitment = annual,
            LineItemEdit::MonthlyPayment(monthly) => item.monthly_payment = monthly,
        }
        item.recompute(margin_pct);
        true
    }

    /// Change the margin and recompute every row.
    pub fn set_margin_pct(&mut self, margin_pct: Decimal) {
        self.margin_pct = margin_pct;
        for item in &mut self.items {
            item.recompute(margin_pct);
        }
    }

    pub fn totals(&self) -> OfferTotals {
        OfferTotals::from_items(&self.items, self.margin_pct)
    }

    pub fn into_items(self) -> Vec<LicenseLineItem> {
        self.items
    }
}

fn select_license(item: &mut LicenseLineItem, license: &LicenseType) {
    item.license_type_id = Some(license.id.clone());
    item.unit_price = license.monthly_price.unwrap_or(Decimal::ZERO);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn erp_user() -> LicenseType {
        LicenseType::new("lt-erp", "ERP-USER", "ERP User", "erp").with_monthly_price(dec!(100))
    }

    #[test]
    fn test_add_item_prefills_price() {
        let mut form = OfferForm::default();
        let id = form.add_item(Some(&erp_user()));

        let item = form.item(id).unwrap();
        assert_eq!(item.license_type_id.as_deref(), Some("lt-erp"));
        assert_eq!(item.unit_price, dec!(100));
        assert_eq!(item.total_value, dec!(100));
        assert_eq!(item.margin_value, dec!(30));
    }

    #[test]
    fn test_edits_recompute_row() {
        let mut form = OfferForm::default();
        let id = form.add_item(Some(&erp_user()));

        assert!(form.apply(id, LineItemEdit::Quantity(2)));
        assert!(form.apply(id, LineItemEdit::DiscountPct(dec!(10))));
        let item = form.item(id).unwrap();
        assert_eq!(item.total_value, dec!(180));
        assert_eq!(item.margin_value, dec!(54));

        assert!(form.apply(id, LineItemEdit::AnnualCommitment(true)));
        assert_eq!(form.item(id).unwrap().total_value, dec!(2160));

        assert!(!form.apply(99, LineItemEdit::Quantity(3)));
    }

    #[test]
    fn test_remove_item_and_ids_are_not_reused() {
        let mut form = OfferForm::default();
        let first = form.add_item(None);
        let second = form.add_item(None);
        assert!(form.remove_item(first).is_some());
        assert!(form.remove_item(first).is_none());

        let third = form.add_item(None);
        assert_ne!(third, second);
        assert_eq!(form.items.len(), 2);
    }

    #[test]
    fn test_from_items_continues_ids() {
        let mut form = OfferForm::from_items(vec![LicenseLineItem::new(7), LicenseLineItem::new(3)], dec!(30));
        assert_eq!(form.add_item(None), 8);
    }

    #[test]
    fn test_set_margin_recomputes() {
        let mut form = OfferForm::default();
        let id = form.add_item(Some(&erp_user()));
        form.set_margin_pct(dec!(50));
        assert_eq!(form.item(id).unwrap().margin_value, dec!(50));
        assert_eq!(form.totals().total_margin, dec!(50));
    }

    #[test]
    fn test_edit_serialization() {
        let edit = LineItemEdit::DiscountPct(dec!(12.5));
        let json = serde_json::to_string(&edit).unwrap();
        assert_eq!(json, r#"{"field":"discount_pct","value":12.5}"#);
    }
}
