//! # contract_core - Offer Pricing & Project Cost Engine
//!
//! `contract_core` is the computational heart of Contractify: it prices sales
//! offers from their license rows and rolls project plans up into days and
//! cost. All inputs and outputs are JSON-serializable so any front-end can
//! drive it.
//!
//! ## Design Philosophy
//!
//! - **Pure calculators**: pricing and rollup functions take data and return
//!   totals; missing inputs degrade to `None` or zero instead of erroring
//! - **Exact money**: `rust_decimal::Decimal`, rounded half-up to cents
//! - **Explicit context**: a [`Session`] carries the user and settings
//! - **Explicit fallbacks**: rate fetches return `Result`, and the caller picks
//!   a [`FallbackPolicy`]
//!
//! ## Quick Start
//!
//! ```rust
//! use contract_core::pricing::{LicenseLineItem, OfferTotals};
//! use rust_decimal_macros::dec;
//!
//! let mut item = LicenseLineItem::new(1);
//! item.unit_price = dec!(100);
//! item.quantity = 2;
//! item.discount_pct = dec!(10);
//! item.recompute(dec!(30));
//!
//! let totals = OfferTotals::from_items(&[item], dec!(30));
//! assert_eq!(totals.display().final_total, "180.00");
//! ```
//!
//! ## Modules
//!
//! - [`pricing`] - License rows, offer totals, single-license price derivation
//! - [`offer`] - Offers and their approval workflow
//! - [`planning`] - Project plans, phase-day recompute, cost rollup
//! - [`rates`] - Per-solution resource rate tables and their sources
//! - [`workspace`] - The persisted store document
//! - [`file_io`] - Atomic workspace saves and versioned loads
//! - [`session`] - Request-scoped user and settings
//! - [`settings`] - Configuration
//! - [`money`] - Rounding and formatting helpers
//! - [`errors`] - Structured error types

pub mod errors;
pub mod file_io;
pub mod money;
pub mod offer;
pub mod planning;
pub mod pricing;
pub mod rates;
pub mod session;
pub mod settings;
pub mod workspace;

// Re-export commonly used types at crate root for convenience
pub use errors::{ContractError, ContractResult};
pub use file_io::{load_workspace, save_workspace};
pub use offer::{Offer, OfferStatus};
pub use planning::{rollup_cost, CostRollup, ProjectPlan};
pub use pricing::{calculate_price, LicenseLineItem, OfferTotals};
pub use rates::{FallbackPolicy, FetchError, RateSource, RateTable};
pub use session::{Role, Session, User};
pub use settings::Settings;
pub use workspace::Workspace;
