//! # Resource Rates
//!
//! Per-solution rate tables used to price resource assignments in a project
//! plan. Rates live in an external store; [`RateSource`] is the seam between
//! the rollup and wherever the rows come from (the local workspace file or a
//! REST backend, see [`rest`]).
//!
//! Fetch failures are returned as [`FetchError`]. Whether a failure aborts the
//! rollup or degrades to zero cost is the caller's choice, expressed with
//! [`FallbackPolicy`].

pub mod rest;

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::ContractError;

pub use rest::RestRateSource;

/// One row of the remote rate table.
///
/// ## JSON Example
///
/// ```json
/// { "solution_id": "erp", "resource_type_code": "BA", "rate_per_hour": 95.0 }
/// ```
///
/// Rows written before the rename carry `product_id`; it is read as
/// `solution_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRate {
    #[serde(alias = "product_id")]
    pub solution_id: String,

    pub resource_type_code: String,

    /// Rate applied per assigned resource day
    pub rate_per_hour: Decimal,
}

impl ResourceRate {
    pub fn new(solution_id: impl Into<String>, code: impl Into<String>, rate: Decimal) -> Self {
        ResourceRate {
            solution_id: solution_id.into(),
            resource_type_code: code.into(),
            rate_per_hour: rate,
        }
    }
}

/// Resource code → rate lookup for one solution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    rates: HashMap<String, Decimal>,
}

impl RateTable {
    /// Build from rows, keeping only those for `solution_id`.
    /// A later row for the same code replaces an earlier one.
    pub fn from_rows<'a>(solution_id: &str, rows: impl IntoIterator<Item = &'a ResourceRate>) -> Self {
        let rates = rows
            .into_iter()
            .filter(|row| row.solution_id == solution_id)
            .map(|row| (row.resource_type_code.clone(), row.rate_per_hour))
            .collect();
        RateTable { rates }
    }

    /// Rate for a resource code; unknown codes are priced at zero.
    pub fn rate_for(&self, code: &str) -> Decimal {
        self.rates.get(code).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rates.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Why a rate table could not be fetched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid rate table: {0}")]
    Decode(String),

    #[error("store error: {0}")]
    Store(String),
}

impl From<FetchError> for ContractError {
    fn from(e: FetchError) -> Self {
        ContractError::FetchFailed {
            reason: e.to_string(),
        }
    }
}

/// What a cost rollup does when the rate table cannot be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Log a warning and price every resource at zero
    #[default]
    ZeroCost,
    /// Return the fetch error to the caller
    Propagate,
}

/// Anything that can supply the rate rows for a solution.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rates(&self, solution_id: &str) -> Result<Vec<ResourceRate>, FetchError>;
}

/// Fixed rows held in memory.
#[async_trait]
impl RateSource for Vec<ResourceRate> {
    async fn fetch_rates(&self, solution_id: &str) -> Result<Vec<ResourceRate>, FetchError> {
        Ok(self
            .iter()
            .filter(|row| row.solution_id == solution_id)
            .cloned()
            .collect())
    }
}
