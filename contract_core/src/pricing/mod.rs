//! # Offer Pricing
//!
//! Derives per-license and aggregate monetary totals for offers.
//!
//! - [`line_item`] - A license row and its per-row recompute
//! - [`totals`] - Aggregate value, discount, final total and margin
//! - [`price`] - Single-license price derivation (`calculate_price`)
//! - [`form`] - Editing session that recomputes rows on every field edit
//! - [`license_type`] - License catalogue entries
//!
//! Both pricing paths take the margin as a parameter; callers pass the
//! configured `PricingSettings::margin_pct` (30 unless overridden).

pub mod form;
pub mod license_type;
pub mod line_item;
pub mod price;
pub mod totals;

pub use form::{LineItemEdit, OfferForm};
pub use license_type::LicenseType;
pub use line_item::LicenseLineItem;
pub use price::{calculate_price, PriceInput};
pub use totals::{OfferTotals, OfferTotalsDisplay};
