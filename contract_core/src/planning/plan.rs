//! # Project Plan Tree
//!
//! A project plan is a list of phases, each holding tasks, each holding
//! resource assignments. Every mutation of the task tree recomputes phase
//! days; the manual-days phase (by default "Project Management") keeps the
//! days entered for it by hand.
//!
//! ```text
//! ProjectPlan
//! └── phases: Vec<ProjectPhase>
//!     └── tasks: Vec<ProjectTask>
//!         └── resources: Vec<TaskResource>  (one per code)
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ContractError, ContractResult};
use crate::planning::rollup::{self, CostRollup};
use crate::settings::PROJECT_MANAGEMENT_PHASE;

/// Status given to new plans
pub const DEFAULT_STATUS: &str = "draft";

/// Shortest task
pub const MIN_TASK_DAYS: u32 = 1;

/// Smallest resource assignment
pub const MIN_RESOURCE_DAYS: Decimal = dec!(0.5);

/// A role assigned to a task for a number of days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResource {
    /// Resource type code (e.g., "BA")
    pub code: String,

    /// Display name (e.g., "Business Analyst")
    pub name: String,

    /// Assigned days (≥ 0.5)
    pub days: Decimal,
}

impl TaskResource {
    pub fn new(code: impl Into<String>, name: impl Into<String>, days: Decimal) -> Self {
        TaskResource {
            code: code.into(),
            name: name.into(),
            days,
        }
    }

    pub fn validate(&self) -> ContractResult<()> {
        if self.days < MIN_RESOURCE_DAYS {
            return Err(ContractError::invalid_input(
                "days",
                self.days.to_string(),
                "A resource must be assigned at least half a day",
            ));
        }
        Ok(())
    }
}

/// A unit of work within a phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectTask {
    pub id: Uuid,
    pub name: String,

    /// Duration in days (≥ 1)
    pub days: u32,

    #[serde(default)]
    pub resources: Vec<TaskResource>,
}

impl ProjectTask {
    pub fn new(name: impl Into<String>, days: u32) -> Self {
        ProjectTask {
            id: Uuid::new_v4(),
            name: name.into(),
            days,
            resources: Vec::new(),
        }
    }

    pub fn validate(&self) -> ContractResult<()> {
        if self.days < MIN_TASK_DAYS {
            return Err(ContractError::invalid_input(
                "days",
                self.days.to_string(),
                "A task must last at least 1 day",
            ));
        }
        self.resources.iter().try_for_each(TaskResource::validate)
    }

    /// Add a resource unless one with the same code is already assigned.
    /// Returns whether it was added.
    pub fn add_resource(&mut self, resource: TaskResource) -> bool {
        if self.resources.iter().any(|r| r.code == resource.code) {
            return false;
        }
        self.resources.push(resource);
        true
    }

    pub fn remove_resource(&mut self, code: &str) -> Option<TaskResource> {
        let index = self.resources.iter().position(|r| r.code == code)?;
        Some(self.resources.remove(index))
    }
}

/// A named stage of implementation work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectPhase {
    pub id: Uuid,
    pub name: String,

    /// Display colour (e.g., "#3b82f6")
    #[serde(default)]
    pub color: String,

    /// Sum of task days, or the manual value for the manual-days phase
    #[serde(default)]
    pub days: u32,

    #[serde(default)]
    pub tasks: Vec<ProjectTask>,
}

impl ProjectPhase {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        ProjectPhase {
            id: Uuid::new_v4(),
            name: name.into(),
            color: color.into(),
            days: 0,
            tasks: Vec::new(),
        }
    }

    fn task_mut(&mut self, task_id: &Uuid) -> ContractResult<&mut ProjectTask> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == *task_id)
            .ok_or_else(|| ContractError::not_found("Task", task_id))
    }
}

/// An implementation project plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectPlan {
    pub id: Uuid,
    pub name: String,

    /// Offer this plan was converted from
    #[serde(default)]
    pub offer_id: Option<Uuid>,

    /// Solution whose rate table prices the resources
    #[serde(alias = "product_id")]
    pub solution_id: String,

    /// Free-form status; no transition rules apply
    #[serde(default = "default_status")]
    pub status: String,

    #[serde(default)]
    pub phases: Vec<ProjectPhase>,

    /// Persisted total days, kept current by every tree change
    #[serde(default)]
    pub total_days: u32,

    /// Persisted total cost from the last rollup
    #[serde(default)]
    pub total_cost: Decimal,

    /// Phase whose days are entered by hand
    #[serde(default = "default_manual_phase")]
    pub manual_days_phase: String,

    #[serde(default)]
    pub created_by: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

fn default_manual_phase() -> String {
    PROJECT_MANAGEMENT_PHASE.to_string()
}

impl ProjectPlan {
    /// Empty draft plan.
    pub fn new(name: impl Into<String>, solution_id: impl Into<String>) -> Self {
        let now = Utc::now();
        ProjectPlan {
            id: Uuid::new_v4(),
            name: name.into(),
            offer_id: None,
            solution_id: solution_id.into(),
            status: default_status(),
            phases: Vec::new(),
            total_days: 0,
            total_cost: Decimal::ZERO,
            manual_days_phase: default_manual_phase(),
            created_by: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set any status value.
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.touch();
    }

    pub fn phase(&self, phase_id: &Uuid) -> Option<&ProjectPhase> {
        self.phases.iter().find(|p| p.id == *phase_id)
    }

    pub fn phase_by_name(&self, name: &str) -> Option<&ProjectPhase> {
        self.phases.iter().find(|p| p.name == name)
    }

    fn phase_mut(&mut self, phase_id: &Uuid) -> ContractResult<&mut ProjectPhase> {
        self.phases
            .iter_mut()
            .find(|p| p.id == *phase_id)
            .ok_or_else(|| ContractError::not_found("Phase", phase_id))
    }

    /// Append a phase. Returns its id.
    pub fn add_phase(&mut self, phase: ProjectPhase) -> Uuid {
        let id = phase.id;
        self.phases.push(phase);
        self.tree_changed();
        id
    }

    pub fn remove_phase(&mut self, phase_id: &Uuid) -> Option<ProjectPhase> {
        let index = self.phases.iter().position(|p| p.id == *phase_id)?;
        let phase = self.phases.remove(index);
        self.tree_changed();
        Some(phase)
    }

    /// Enter phase days by hand. Only the manual-days phase keeps the value;
    /// any other phase is recomputed from its tasks on the next tree change.
    pub fn set_phase_days(&mut self, phase_id: &Uuid, days: u32) -> ContractResult<()> {
        self.phase_mut(phase_id)?.days = days;
        self.total_days = self.total_days();
        self.touch();
        Ok(())
    }

    /// Add a task to a phase. Returns the task id.
    pub fn add_task(&mut self, phase_id: &Uuid, task: ProjectTask) -> ContractResult<Uuid> {
        let id = task.id;
        self.phase_mut(phase_id)?.tasks.push(task);
        self.tree_changed();
        Ok(id)
    }

    pub fn remove_task(&mut self, phase_id: &Uuid, task_id: &Uuid) -> ContractResult<ProjectTask> {
        let phase = self.phase_mut(phase_id)?;
        let index = phase
            .tasks
            .iter()
            .position(|t| t.id == *task_id)
            .ok_or_else(|| ContractError::not_found("Task", task_id))?;
        let task = phase.tasks.remove(index);
        self.tree_changed();
        Ok(task)
    }

    pub fn set_task_days(&mut self, phase_id: &Uuid, task_id: &Uuid, days: u32) -> ContractResult<()> {
        self.phase_mut(phase_id)?.task_mut(task_id)?.days = days;
        self.tree_changed();
        Ok(())
    }

    /// Assign a resource to a task. Returns `Ok(false)` without changes when
    /// the task already has a resource with that code.
    pub fn add_resource(&mut self, phase_id: &Uuid, task_id: &Uuid, resource: TaskResource) -> ContractResult<bool> {
        let added = self.phase_mut(phase_id)?.task_mut(task_id)?.add_resource(resource);
        if added {
            self.touch();
        }
        Ok(added)
    }

    pub fn remove_resource(&mut self, phase_id: &Uuid, task_id: &Uuid, code: &str) -> ContractResult<Option<TaskResource>> {
        let removed = self.phase_mut(phase_id)?.task_mut(task_id)?.remove_resource(code);
        if removed.is_some() {
            self.touch();
        }
        Ok(removed)
    }

    pub fn set_resource_days(&mut self, phase_id: &Uuid, task_id: &Uuid, code: &str, days: Decimal) -> ContractResult<()> {
        let task = self.phase_mut(phase_id)?.task_mut(task_id)?;
        let resource = task
            .resources
            .iter_mut()
            .find(|r| r.code == code)
            .ok_or_else(|| ContractError::not_found("Resource", code))?;
        resource.days = days;
        self.touch();
        Ok(())
    }

    /// Recompute phase days from tasks, leaving the manual-days phase alone.
    pub fn recompute_phase_days(&mut self) {
        rollup::recompute_phase_days(&mut self.phases, &self.manual_days_phase);
    }

    /// Σ phase days.
    pub fn total_days(&self) -> u32 {
        rollup::total_days(&self.phases)
    }

    /// Number of resource assignments across the whole plan.
    pub fn resource_count(&self) -> usize {
        rollup::resource_count(&self.phases)
    }

    /// Check day bounds on every task and resource.
    pub fn validate(&self) -> ContractResult<()> {
        self.phases
            .iter()
            .flat_map(|p| &p.tasks)
            .try_for_each(ProjectTask::validate)
    }

    /// Store the rollup totals for persistence.
    pub fn apply_rollup(&mut self, rollup: &CostRollup) {
        self.total_days = rollup.total_days;
        self.total_cost = rollup.total_cost;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Recompute phase days and the stored total days without touching
    /// timestamps. Returns whether any stored value changed.
    pub fn refresh_derived(&mut self) -> bool {
        let phase_days: Vec<u32> = self.phases.iter().map(|p| p.days).collect();
        let stored_total = self.total_days;
        self.recompute_phase_days();
        self.total_days = self.total_days();
        stored_total != self.total_days || self.phases.iter().map(|p| p.days).ne(phase_days)
    }

    fn tree_changed(&mut self) {
        self.refresh_derived();
        self.touch();
    }
}
