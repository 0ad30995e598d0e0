//! License type catalogue entries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A sellable license type with its list prices.
///
/// ## JSON Example
///
/// ```json
/// {
///   "id": "lt-erp-user",
///   "code": "ERP-USER",
///   "name": "ERP Named User",
///   "solution_id": "erp",
///   "monthly_price": 50.0,
///   "yearly_price": 540.0
/// }
/// ```
///
/// Older rows used `product_id`; it is read as `solution_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseType {
    pub id: String,

    /// Short code shown in the offer form (e.g., "ERP-USER")
    pub code: String,

    pub name: String,

    /// Solution (product family) this license belongs to
    #[serde(alias = "product_id")]
    pub solution_id: String,

    /// Price per user per month
    #[serde(default)]
    pub monthly_price: Option<Decimal>,

    /// Price per user per year, when an annual list price exists
    #[serde(default)]
    pub yearly_price: Option<Decimal>,
}

impl LicenseType {
    pub fn new(id: impl Into<String>, code: impl Into<String>, name: impl Into<String>, solution_id: impl Into<String>) -> Self {
        LicenseType {
            id: id.into(),
            code: code.into(),
            name: name.into(),
            solution_id: solution_id.into(),
            monthly_price: None,
            yearly_price: None,
        }
    }

    pub fn with_monthly_price(mut self, price: Decimal) -> Self {
        self.monthly_price = Some(price);
        self
    }

    pub fn with_yearly_price(mut self, price: Decimal) -> Self {
        self.yearly_price = Some(price);
        self
    }
}
