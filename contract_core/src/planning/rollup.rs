//! # Project Cost Rollup
//!
//! Phase days, total days, resource count and total cost for a plan.
//!
//! ```text
//! phase.days  = Σ task.days                  (except the manual-days phase)
//! total_days  = Σ phase.days
//! total_cost  = Σ resource.days × rate(resource.code)   (unknown code → 0)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use contract_core::planning::{rollup_cost, ProjectPhase, ProjectPlan, ProjectTask, TaskResource};
//! use contract_core::rates::{FallbackPolicy, ResourceRate};
//! use rust_decimal_macros::dec;
//!
//! # tokio_test_block(async {
//! let mut plan = ProjectPlan::new("ERP rollout", "erp");
//! let phase = plan.add_phase(ProjectPhase::new("Analysis", "#3b82f6"));
//! let task = plan.add_task(&phase, ProjectTask::new("Workshops", 3)).unwrap();
//! plan.add_resource(&phase, &task, TaskResource::new("BA", "Business Analyst", dec!(3))).unwrap();
//!
//! let rates = vec![ResourceRate::new("erp", "BA", dec!(100))];
//! let rollup = rollup_cost(&plan, &rates, FallbackPolicy::ZeroCost).await.unwrap();
//! assert_eq!(rollup.total_cost, dec!(300));
//! assert_eq!(rollup.total_days, 3);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::planning::{ProjectPhase, ProjectPlan};
use crate::rates::{FallbackPolicy, FetchError, RateSource, RateTable};

/// Totals produced by [`rollup_cost`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostRollup {
    pub total_days: u32,
    pub total_cost: Decimal,

    /// Display metric; not persisted on the plan
    pub resource_count: usize,

    /// Number of resource codes in the fetched rate table
    pub rates_found: usize,
}

/// Set each phase's days to the sum of its task days, except `manual_phase`.
pub fn recompute_phase_days(phases: &mut [ProjectPhase], manual_phase: &str) {
    for phase in phases.iter_mut().filter(|p| p.name != manual_phase) {
        phase.days = phase.tasks.iter().fold(0, |sum, t| sum.saturating_add(t.days));
    }
}

pub fn total_days(phases: &[ProjectPhase]) -> u32 {
    phases.iter().fold(0, |sum, p| sum.saturating_add(p.days))
}

pub fn resource_count(phases: &[ProjectPhase]) -> usize {
    phases
        .iter()
        .flat_map(|p| &p.tasks)
        .map(|t| t.resources.len())
        .sum()
}

/// Σ resource.days × rate over every assignment. Zero if the sum overflows.
pub fn total_cost(phases: &[ProjectPhase], rates: &RateTable) -> Decimal {
    phases
        .iter()
        .flat_map(|p| &p.tasks)
        .flat_map(|t| &t.resources)
        .try_fold(Decimal::ZERO, |sum, r| sum.checked_add(r.days.checked_mul(rates.rate_for(&r.code))?))
        .unwrap_or_else(|| {
            warn!("Plan cost overflows; costing at zero");
            Decimal::ZERO
        })
}

/// Fetch the plan's rate table and compute its totals.
///
/// With [`FallbackPolicy::ZeroCost`] a failed fetch is logged and every
/// resource is priced at zero; with [`FallbackPolicy::Propagate`] the error is
/// returned.
pub async fn rollup_cost(
    plan: &ProjectPlan,
    source: &dyn RateSource,
    policy: FallbackPolicy,
) -> Result<CostRollup, FetchError> {
    let rates = match source.fetch_rates(&plan.solution_id).await {
        Ok(rows) => RateTable::from_rows(&plan.solution_id, &rows),
        Err(e) => match policy {
            FallbackPolicy::Propagate => return Err(e),
            FallbackPolicy::ZeroCost => {
                warn!("Rate table for solution '{}' unavailable ({}); costing at zero", plan.solution_id, e);
                RateTable::default()
            }
        },
    };

    if rates.is_empty() {
        warn!("No resource rates for solution '{}'", plan.solution_id);
    }

    let rollup = CostRollup {
        total_days: plan.total_days(),
        total_cost: total_cost(&plan.phases, &rates),
        resource_count: plan.resource_count(),
        rates_found: rates.len(),
    };
    debug!("Plan {} rollup: {:?}", plan.id, rollup);
    Ok(rollup)
}
