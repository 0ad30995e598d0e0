//! # Plan Templates
//!
//! Converting an approved offer into a project plan, and the built-in
//! resource-type catalogue.

use serde::{Deserialize, Serialize};

use crate::errors::{ContractError, ContractResult};
use crate::offer::{Offer, OfferStatus};
use crate::planning::{ProjectPhase, ProjectPlan};
use crate::session::{Role, Session};

/// A resource type that can be assigned to tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceType {
    pub code: String,
    pub name: String,
}

impl ResourceType {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        ResourceType {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Resource types used when the store has none.
pub fn default_resource_types() -> Vec<ResourceType> {
    vec![
        ResourceType::new("BA", "Business Analyst"),
        ResourceType::new("PM", "Project Manager"),
        ResourceType::new("DEV", "Developer"),
        ResourceType::new("CONS", "Functional Consultant"),
        ResourceType::new("QA", "Quality Assurance"),
        ResourceType::new("TRAIN", "Trainer"),
    ]
}

impl ProjectPlan {
    /// Start a plan from an approved offer.
    ///
    /// Phases come from the session's phase template; the plan is linked to
    /// the offer and scoped to the same solution.
    ///
    /// # Example
    ///
    /// ```rust
    /// use contract_core::offer::Offer;
    /// use contract_core::planning::ProjectPlan;
    /// use contract_core::session::{Role, Session, User};
    ///
    /// let sales = Session::new(User::new("sam@example.com", "Sam", Role::Sales));
    /// let ops = Session::new(User::new("olivia@example.com", "Olivia", Role::Operations));
    ///
    /// let mut offer = Offer::new("Acme GmbH", "erp", &sales);
    /// offer.submit(&sales).unwrap();
    /// offer.approve(&ops).unwrap();
    ///
    /// let plan = ProjectPlan::from_offer(&offer, &ops).unwrap();
    /// assert_eq!(plan.offer_id, Some(offer.id));
    /// assert_eq!(plan.phases.len(), 6);
    /// ```
    pub fn from_offer(offer: &Offer, session: &Session) -> ContractResult<Self> {
        session.require_role("create project plans", &[Role::Operations, Role::Admin])?;
        if offer.status != OfferStatus::Approved {
            return Err(ContractError::invalid_transition(
                "offer",
                offer.status.as_str(),
                "project",
            ));
        }

        let planning = &session.settings.planning;
        let mut plan = ProjectPlan::new(format!("{} - {}", offer.customer_name, offer.solution_id), offer.solution_id.clone());
        plan.offer_id = Some(offer.id);
        plan.created_by = session.user.id.clone();
        plan.manual_days_phase = planning.manual_days_phase.clone();
        for phase in &planning.phase_template {
            plan.add_phase(ProjectPhase::new(phase.name.clone(), phase.color.clone()));
        }
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::User;
    use crate::settings::{PhaseTemplate, Settings};

    fn sales() -> Session {
        Session::new(User::new("sam@example.com", "Sam", Role::Sales))
    }

    fn ops() -> Session {
        Session::new(User::new("olivia@example.com", "Olivia", Role::Operations))
    }

    fn approved_offer() -> Offer {
        let mut offer = Offer::new("Acme GmbH", "erp", &sales());
        offer.submit(&sales()).unwrap();
        offer.approve(&ops()).unwrap();
        offer
    }

    #[test]
    fn test_from_offer_seeds_template() {
        let offer = approved_offer();
        let plan = ProjectPlan::from_offer(&offer, &ops()).unwrap();

        assert_eq!(plan.name, "Acme GmbH - erp");
        assert_eq!(plan.solution_id, "erp");
        assert_eq!(plan.status, "draft");
        assert_eq!(plan.created_by, "olivia@example.com");
        let names: Vec<_> = plan.phases.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            ["Analysis", "Design", "Development", "Testing", "Deployment", "Project Management"]
        );
        assert_eq!(plan.total_days(), 0);
    }

    #[test]
    fn test_from_offer_custom_template() {
        let mut settings = Settings::default();
        settings.planning.phase_template = vec![PhaseTemplate::new("Setup", "#000"), PhaseTemplate::new("PMO", "#111")];
        settings.planning.manual_days_phase = "PMO".to_string();
        let session = ops().with_settings(settings);

        let plan = ProjectPlan::from_offer(&approved_offer(), &session).unwrap();
        assert_eq!(plan.phases.len(), 2);
        assert_eq!(plan.manual_days_phase, "PMO");
    }

    #[test]
    fn test_from_offer_requires_approval() {
        let offer = Offer::new("Acme GmbH", "erp", &sales());
        let err = ProjectPlan::from_offer(&offer, &ops()).unwrap_err();
        assert_eq!(err, ContractError::invalid_transition("offer", "draft", "project"));
    }

    #[test]
    fn test_from_offer_requires_operations() {
        let err = ProjectPlan::from_offer(&approved_offer(), &sales()).unwrap_err();
        assert_eq!(err.error_code(), "PERMISSION_DENIED");
    }

    #[test]
    fn test_default_resource_types_unique() {
        let types = default_resource_types();
        let mut codes: Vec<_> = types.iter().map(|t| t.code.clone()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), types.len());
    }
}
