//! # Offers
//!
//! A sales quotation: customer, solution, license rows and the derived value.
//! Offers move through a small approval workflow before operations staff
//! turn them into project plans.
//!
//! ```text
//! Draft ──submit──▶ PendingApproval ──approve──▶ Approved
//!   ▲                     │
//!   └──reopen── Rejected ◀┘ reject
//! ```
//!
//! ## Example
//!
//! ```rust
//! use contract_core::offer::{Offer, OfferStatus};
//! use contract_core::pricing::LineItemEdit;
//! use contract_core::session::{Role, Session, User};
//! use rust_decimal_macros::dec;
//!
//! let sales = Session::new(User::new("sam@example.com", "Sam", Role::Sales));
//! let mut offer = Offer::new("Acme GmbH", "erp", &sales);
//!
//! let mut form = offer.form();
//! let id = form.add_item(None);
//! form.apply(id, LineItemEdit::UnitPrice(dec!(100)));
//! form.apply(id, LineItemEdit::Quantity(2));
//! offer.apply_form(form);
//!
//! assert_eq!(offer.value, dec!(200));
//! offer.submit(&sales).unwrap();
//! assert_eq!(offer.status, OfferStatus::PendingApproval);
//! ```

use chrono::{DateTime, Utc};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ContractError, ContractResult};
use crate::money::DEFAULT_MARGIN_PCT;
use crate::pricing::{LicenseLineItem, OfferForm, OfferTotals};
use crate::session::{Role, Session};

/// Approval status of an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    #[default]
    Draft,
    PendingApproval,
    Approved,
    Rejected,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Draft => "draft",
            OfferStatus::PendingApproval => "pending_approval",
            OfferStatus::Approved => "approved",
            OfferStatus::Rejected => "rejected",
        }
    }
}

/// A persisted offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub id: Uuid,

    pub customer_name: String,

    /// Solution (product family) the offer is scoped to
    #[serde(alias = "product_id")]
    pub solution_id: String,

    #[serde(default)]
    pub status: OfferStatus,

    #[serde(default)]
    pub line_items: Vec<LicenseLineItem>,

    /// Persisted final total of the line items
    #[serde(default)]
    pub value: Decimal,

    #[serde(default = "default_margin")]
    pub margin_pct: Decimal,

    #[serde(default)]
    pub notes: String,

    /// User id of the creator
    pub created_by: String,

    /// User id that last submitted the offer for approval
    #[serde(default)]
    pub submitted_by: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

fn default_margin() -> Decimal {
    DEFAULT_MARGIN_PCT
}

impl Offer {
    /// New draft offer owned by the session user, using the configured margin.
    pub fn new(customer_name: impl Into<String>, solution_id: impl Into<String>, session: &Session) -> Self {
        let now = Utc::now();
        Offer {
            id: Uuid::new_v4(),
            customer_name: customer_name.into(),
            solution_id: solution_id.into(),
            status: OfferStatus::Draft,
            line_items: Vec::new(),
            value: Decimal::ZERO,
            margin_pct: session.settings.pricing.margin_pct,
            notes: String::new(),
            created_by: session.user.id.clone(),
            submitted_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Open an editing form over the current rows.
    pub fn form(&self) -> OfferForm {
        OfferForm::from_items(self.line_items.clone(), self.margin_pct)
    }

    /// Take the rows from a finished form and recompute the value.
    pub fn apply_form(&mut self, form: OfferForm) {
        self.margin_pct = form.margin_pct;
        self.line_items = form.into_items();
        self.recompute();
    }

    /// Recompute every row and set `value` to the aggregate final total.
    pub fn recompute(&mut self) {
        self.refresh_derived();
        self.touch();
        debug!("Offer {} recomputed: value {}", self.id, self.value);
    }

    /// Recompute row totals and `value` without touching timestamps.
    /// Returns whether any stored value changed.
    pub fn refresh_derived(&mut self) -> bool {
        let mut changed = false;
        for item in &mut self.line_items {
            let stored = (item.total_value, item.margin_value);
            item.recompute(self.margin_pct);
            changed |= stored != (item.total_value, item.margin_value);
        }
        let value = self.totals().final_total;
        changed |= value != self.value;
        self.value = value;
        changed
    }

    pub fn totals(&self) -> OfferTotals {
        OfferTotals::from_items(&self.line_items, self.margin_pct)
    }

    /// Check the fields a saved offer must have.
    pub fn validate(&self) -> ContractResult<()> {
        if self.customer_name.trim().is_empty() {
            return Err(ContractError::missing_field("customer_name"));
        }
        if self.solution_id.trim().is_empty() {
            return Err(ContractError::missing_field("solution_id"));
        }
        for item in &self.line_items {
            item.validate()?;
        }
        Ok(())
    }

    /// Draft → PendingApproval. The offer must validate; the submitting user
    /// is recorded.
    pub fn submit(&mut self, session: &Session) -> ContractResult<()> {
        self.validate()?;
        self.transition(OfferStatus::Draft, OfferStatus::PendingApproval)?;
        self.submitted_by = Some(session.user.id.clone());
        Ok(())
    }

    /// PendingApproval → Approved. Operations or admin only.
    pub fn approve(&mut self, session: &Session) -> ContractResult<()> {
        session.require_role("approve offers", &[Role::Operations, Role::Admin])?;
        self.transition(OfferStatus::PendingApproval, OfferStatus::Approved)
    }

    /// PendingApproval → Rejected. Operations or admin only.
    pub fn reject(&mut self, session: &Session) -> ContractResult<()> {
        session.require_role("reject offers", &[Role::Operations, Role::Admin])?;
        self.transition(OfferStatus::PendingApproval, OfferStatus::Rejected)
    }

    /// Rejected → Draft, so the offer can be edited and resubmitted. Only the
    /// creator, operations or admin may reopen.
    pub fn reopen(&mut self, session: &Session) -> ContractResult<()> {
        if session.user.id != self.created_by {
            session.require_role("reopen other users' offers", &[Role::Operations, Role::Admin])?;
        }
        self.transition(OfferStatus::Rejected, OfferStatus::Draft)?;
        self.submitted_by = None;
        Ok(())
    }

    fn transition(&mut self, from: OfferStatus, to: OfferStatus) -> ContractResult<()> {
        if self.status != from {
            return Err(ContractError::invalid_transition(
                "offer",
                self.status.as_str(),
                to.as_str(),
            ));
        }
        self.status = to;
        self.touch();
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::LineItemEdit;
    use crate::session::User;
    use rust_decimal_macros::dec;

    fn sales() -> Session {
        Session::new(User::new("sam@example.com", "Sam Sales", Role::Sales))
    }

    fn ops() -> Session {
        Session::new(User::new("olivia@example.com", "Olivia Ops", Role::Operations))
    }

    fn priced_offer() -> Offer {
        let mut offer = Offer::new("Acme GmbH", "erp", &sales());
        let mut form = offer.form();
        let id = form.add_item(None);
        form.apply(id, LineItemEdit::UnitPrice(dec!(100)));
        form.apply(id, LineItemEdit::Quantity(2));
        form.apply(id, LineItemEdit::DiscountPct(dec!(10)));
        offer.apply_form(form);
        offer
    }

    #[test]
    fn test_new_offer_uses_session() {
        let offer = Offer::new("Acme", "erp", &sales());
        assert_eq!(offer.created_by, "sam@example.com");
        assert_eq!(offer.margin_pct, dec!(30));
        assert_eq!(offer.status, OfferStatus::Draft);
    }

    #[test]
    fn test_value_is_final_total() {
        let offer = priced_offer();
        assert_eq!(offer.value, dec!(180));
        assert_eq!(offer.line_items[0].margin_value, dec!(54));
    }

    #[test]
    fn test_approval_workflow() {
        let mut offer = priced_offer();
        offer.submit(&sales()).unwrap();

        let err = offer.approve(&sales()).unwrap_err();
        assert_eq!(err.error_code(), "PERMISSION_DENIED");

        offer.approve(&ops()).unwrap();
        assert_eq!(offer.status, OfferStatus::Approved);

        let err = offer.submit(&sales()).unwrap_err();
        assert_eq!(
            err,
            ContractError::invalid_transition("offer", "approved", "pending_approval")
        );
    }

    #[test]
    fn test_reject_and_reopen() {
        let mut offer = priced_offer();
        offer.submit(&sales()).unwrap();
        offer.reject(&ops()).unwrap();
        assert_eq!(offer.status, OfferStatus::Rejected);

        offer.reopen(&sales()).unwrap();
        assert_eq!(offer.status, OfferStatus::Draft);
        assert_eq!(offer.submitted_by, None);
    }

    #[test]
    fn test_submit_records_user() {
        let mut offer = priced_offer();
        offer.submit(&sales()).unwrap();
        assert_eq!(offer.submitted_by.as_deref(), Some("sam@example.com"));
    }

    #[test]
    fn test_reopen_by_other_sales_user_denied() {
        let mut offer = priced_offer();
        offer.submit(&sales()).unwrap();
        offer.reject(&ops()).unwrap();

        let other = Session::new(User::new("alex@example.com", "Alex Sales", Role::Sales));
        assert_eq!(offer.reopen(&other).unwrap_err().error_code(), "PERMISSION_DENIED");
        assert_eq!(offer.status, OfferStatus::Rejected);

        offer.reopen(&ops()).unwrap();
        assert_eq!(offer.status, OfferStatus::Draft);
    }

    #[test]
    fn test_refresh_derived_reports_stale_values() {
        let mut offer = priced_offer();
        assert!(!offer.refresh_derived());

        offer.value = dec!(1);
        assert!(offer.refresh_derived());
        assert_eq!(offer.value, dec!(180));
    }

    #[test]
    fn test_submit_requires_valid_offer() {
        let mut offer = priced_offer();
        offer.customer_name = "  ".to_string();
        assert_eq!(
            offer.submit(&sales()).unwrap_err(),
            ContractError::missing_field("customer_name")
        );

        let mut offer = priced_offer();
        offer.line_items[0].discount_pct = dec!(120);
        assert_eq!(offer.submit(&sales()).unwrap_err().error_code(), "INVALID_INPUT");
        assert_eq!(offer.status, OfferStatus::Draft);
    }

    #[test]
    fn test_legacy_product_id() {
        let offer = priced_offer();
        let json = serde_json::to_string(&offer)
            .unwrap()
            .replace("\"solution_id\"", "\"product_id\"");
        let loaded: Offer = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.solution_id, "erp");
        assert_eq!(loaded.value, dec!(180));
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&OfferStatus::PendingApproval).unwrap(),
            "\"pending_approval\""
        );
    }
}
