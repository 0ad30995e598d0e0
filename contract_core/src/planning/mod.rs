//! # Project Planning
//!
//! Implementation plans built from approved offers.
//!
//! - [`plan`] - Phase/task/resource tree and its editing operations
//! - [`rollup`] - Phase days, total days, resource count, total cost
//! - [`template`] - Offer → plan conversion and resource-type catalogue

pub mod plan;
pub mod rollup;
pub mod template;

pub use plan::{ProjectPhase, ProjectPlan, ProjectTask, TaskResource, DEFAULT_STATUS};
pub use rollup::{rollup_cost, CostRollup};
pub use template::{default_resource_types, ResourceType};
