//! # Workspace Store
//!
//! The `Workspace` is the persisted document holding every table the
//! application reads and writes: license types, resource types and rates,
//! offers and project plans. It serializes to `.ctf` (Contractify) files as
//! human-readable JSON and is always read and written whole.
//!
//! ## Structure
//!
//! ```text
//! Workspace
//! ├── meta: WorkspaceMetadata (schema version, timestamps)
//! ├── license_types: Vec<LicenseType>
//! ├── resource_types: Vec<ResourceType>
//! ├── resource_rates: Vec<ResourceRate>
//! ├── offers: HashMap<Uuid, Offer>
//! └── projects: HashMap<Uuid, ProjectPlan>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use contract_core::workspace::Workspace;
//!
//! let workspace = Workspace::with_default_catalog();
//! assert!(workspace.license_type("ERP-USER").is_some());
//!
//! let json = serde_json::to_string_pretty(&workspace).unwrap();
//! assert!(json.contains("resource_rates"));
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ContractError, ContractResult};
use crate::offer::Offer;
use crate::planning::{default_resource_types, ProjectPlan, ResourceType};
use crate::pricing::LicenseType;
use crate::rates::{FetchError, RateSource, ResourceRate};

/// Current schema version for .ctf files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Solution seeded by [`Workspace::with_default_catalog`]
pub const DEMO_SOLUTION: &str = "erp";

/// Root store document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub meta: WorkspaceMetadata,

    #[serde(default)]
    pub license_types: Vec<LicenseType>,

    #[serde(default)]
    pub resource_types: Vec<ResourceType>,

    #[serde(default)]
    pub resource_rates: Vec<ResourceRate>,

    /// Offers keyed by id
    #[serde(default)]
    pub offers: HashMap<Uuid, Offer>,

    /// Project plans keyed by id
    #[serde(default)]
    pub projects: HashMap<Uuid, ProjectPlan>,
}

/// Workspace header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    pub created: DateTime<Utc>,

    pub modified: DateTime<Utc>,
}

impl Workspace {
    /// Empty workspace.
    pub fn new() -> Self {
        let now = Utc::now();
        Workspace {
            meta: WorkspaceMetadata {
                version: SCHEMA_VERSION.to_string(),
                created: now,
                modified: now,
            },
            license_types: Vec::new(),
            resource_types: Vec::new(),
            resource_rates: Vec::new(),
            offers: HashMap::new(),
            projects: HashMap::new(),
        }
    }

    /// Workspace seeded with a demo ERP catalogue and rate table.
    pub fn with_default_catalog() -> Self {
        let mut workspace = Workspace::new();
        workspace.license_types = vec![
            LicenseType::new("lt-erp-user", "ERP-USER", "ERP Named User", DEMO_SOLUTION)
                .with_monthly_price(dec!(50))
                .with_yearly_price(dec!(540)),
            LicenseType::new("lt-erp-device", "ERP-DEVICE", "ERP Shop-Floor Device", DEMO_SOLUTION)
                .with_monthly_price(dec!(20)),
            LicenseType::new("lt-erp-api", "ERP-API", "ERP API Access", DEMO_SOLUTION)
                .with_yearly_price(dec!(1200)),
        ];
        workspace.resource_types = default_resource_types();
        workspace.resource_rates = vec![
            ResourceRate::new(DEMO_SOLUTION, "BA", dec!(95)),
            ResourceRate::new(DEMO_SOLUTION, "PM", dec!(110)),
            ResourceRate::new(DEMO_SOLUTION, "DEV", dec!(85)),
            ResourceRate::new(DEMO_SOLUTION, "CONS", dec!(100)),
            ResourceRate::new(DEMO_SOLUTION, "QA", dec!(70)),
            ResourceRate::new(DEMO_SOLUTION, "TRAIN", dec!(75)),
        ];
        workspace
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    /// Recompute derived values on every offer and plan. Returns how many
    /// records held stale values. Plan costs need a rate fetch and are left
    /// to the next rollup.
    pub fn refresh_derived(&mut self) -> usize {
        let offers = self.offers.values_mut().map(Offer::refresh_derived).filter(|stale| *stale).count();
        let projects = self
            .projects
            .values_mut()
            .map(ProjectPlan::refresh_derived)
            .filter(|stale| *stale)
            .count();
        offers + projects
    }

    // ------------------------------------------------------------------------
    // Catalogue
    // ------------------------------------------------------------------------

    /// License type by code.
    pub fn license_type(&self, code: &str) -> Option<&LicenseType> {
        self.license_types.iter().find(|l| l.code == code)
    }

    /// License type by id (as stored on line items).
    pub fn license_type_by_id(&self, id: &str) -> Option<&LicenseType> {
        self.license_types.iter().find(|l| l.id == id)
    }

    /// Resource type by code, falling back to the built-in catalogue.
    pub fn resource_type(&self, code: &str) -> Option<ResourceType> {
        self.resource_types
            .iter()
            .find(|r| r.code == code)
            .cloned()
            .or_else(|| default_resource_types().into_iter().find(|r| r.code == code))
    }

    // ------------------------------------------------------------------------
    // Offers
    // ------------------------------------------------------------------------

    /// Insert or replace an offer. Returns its id.
    pub fn upsert_offer(&mut self, offer: Offer) -> Uuid {
        let id = offer.id;
        self.offers.insert(id, offer);
        self.touch();
        id
    }

    pub fn get_offer(&self, id: &Uuid) -> ContractResult<&Offer> {
        self.offers.get(id).ok_or_else(|| ContractError::not_found("Offer", id))
    }

    pub fn remove_offer(&mut self, id: &Uuid) -> Option<Offer> {
        let offer = self.offers.remove(id);
        if offer.is_some() {
            self.touch();
        }
        offer
    }

    // ------------------------------------------------------------------------
    // Projects
    // ------------------------------------------------------------------------

    /// Insert or replace a project plan. Returns its id.
    pub fn upsert_project(&mut self, plan: ProjectPlan) -> Uuid {
        let id = plan.id;
        self.projects.insert(id, plan);
        self.touch();
        id
    }

    pub fn get_project(&self, id: &Uuid) -> ContractResult<&ProjectPlan> {
        self.projects.get(id).ok_or_else(|| ContractError::not_found("Project", id))
    }

    pub fn remove_project(&mut self, id: &Uuid) -> Option<ProjectPlan> {
        let plan = self.projects.remove(id);
        if plan.is_some() {
            self.touch();
        }
        plan
    }

    /// Plans converted from the given offer.
    pub fn projects_for_offer(&self, offer_id: &Uuid) -> Vec<&ProjectPlan> {
        self.projects
            .values()
            .filter(|p| p.offer_id.as_ref() == Some(offer_id))
            .collect()
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Workspace::new()
    }
}

#[async_trait]
impl RateSource for Workspace {
    async fn fetch_rates(&self, solution_id: &str) -> Result<Vec<ResourceRate>, FetchError> {
        self.resource_rates.fetch_rates(solution_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Role, Session, User};

    fn sales() -> Session {
        Session::new(User::new("sam@example.com", "Sam", Role::Sales))
    }

    #[test]
    fn test_workspace_creation() {
        let workspace = Workspace::new();
        assert_eq!(workspace.meta.version, SCHEMA_VERSION);
        assert!(workspace.offers.is_empty());
        assert!(workspace.license_types.is_empty());
    }

    #[test]
    fn test_default_catalog() {
        let workspace = Workspace::with_default_catalog();
        let user = workspace.license_type("ERP-USER").unwrap();
        assert_eq!(user.monthly_price, Some(dec!(50)));
        assert_eq!(workspace.license_type_by_id("lt-erp-api").unwrap().code, "ERP-API");
        assert_eq!(workspace.resource_type("BA").unwrap().name, "Business Analyst");
        assert!(workspace.license_type("NOPE").is_none());
    }

    #[test]
    fn test_refresh_derived_counts_stale_records() {
        let mut workspace = Workspace::new();
        workspace.upsert_offer(Offer::new("Acme", "erp", &sales()));
        let mut plan = ProjectPlan::new("Acme rollout", "erp");
        plan.total_days = 12;
        workspace.upsert_project(plan);

        assert_eq!(workspace.refresh_derived(), 1);
        assert_eq!(workspace.refresh_derived(), 0);
    }

    #[test]
    fn test_resource_type_falls_back_to_builtin() {
        let workspace = Workspace::new();
        assert_eq!(workspace.resource_type("DEV").unwrap().name, "Developer");
        assert!(workspace.resource_type("ZZZ").is_none());
    }

    #[test]
    fn test_offer_crud() {
        let mut workspace = Workspace::new();
        let offer = Offer::new("Acme", "erp", &sales());
        let id = workspace.upsert_offer(offer);

        assert_eq!(workspace.get_offer(&id).unwrap().customer_name, "Acme");

        let mut edited = workspace.get_offer(&id).unwrap().clone();
        edited.notes = "Follow up in May".to_string();
        workspace.upsert_offer(edited);
        assert_eq!(workspace.offers.len(), 1);
        assert_eq!(workspace.get_offer(&id).unwrap().notes, "Follow up in May");

        assert!(workspace.remove_offer(&id).is_some());
        assert_eq!(workspace.get_offer(&id).unwrap_err().error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_project_crud() {
        let mut workspace = Workspace::new();
        let offer_id = Uuid::new_v4();
        let mut plan = ProjectPlan::new("Rollout", "erp");
        plan.offer_id = Some(offer_id);
        let id = workspace.upsert_project(plan);

        assert_eq!(workspace.projects_for_offer(&offer_id).len(), 1);
        assert!(workspace.projects_for_offer(&Uuid::new_v4()).is_empty());
        assert!(workspace.remove_project(&id).is_some());
        assert!(workspace.get_project(&id).is_err());
    }

    #[tokio::test]
    async fn test_workspace_rate_source() {
        let workspace = Workspace::with_default_catalog();
        let rates = workspace.fetch_rates("erp").await.unwrap();
        assert_eq!(rates.len(), 6);
        assert!(workspace.fetch_rates("crm").await.unwrap().is_empty());
    }

    #[test]
    fn test_workspace_serialization() {
        let mut workspace = Workspace::with_default_catalog();
        workspace.upsert_offer(Offer::new("Acme", "erp", &sales()));

        let json = serde_json::to_string_pretty(&workspace).unwrap();
        let roundtrip: Workspace = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.offers.len(), 1);
        assert_eq!(roundtrip.license_types, workspace.license_types);
    }
}
