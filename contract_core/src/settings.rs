//! # Settings
//!
//! Configuration for pricing, planning and the rate-table store. Every field
//! has a default, so an empty JSON object (or no file at all) is a valid
//! configuration.
//!
//! ```json
//! {
//!   "pricing": { "margin_pct": 30, "currency": "EUR" },
//!   "planning": { "manual_days_phase": "Project Management" },
//!   "store": { "rest_url": "https://example.supabase.co" }
//! }
//! ```

use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{ContractError, ContractResult};
use crate::money::DEFAULT_MARGIN_PCT;

/// Environment variable that overrides `store.rest_url`
pub const REST_URL_ENV: &str = "CONTRACTIFY_REST_URL";

/// Name of the phase whose days are entered by hand
pub const PROJECT_MANAGEMENT_PHASE: &str = "Project Management";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub pricing: PricingSettings,
    pub planning: PlanningSettings,
    pub store: StoreSettings,
}

impl Settings {
    /// Load settings from a JSON file. Missing keys take their defaults.
    pub fn load(path: &Path) -> ContractResult<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ContractError::file_error("read settings", path.display().to_string(), e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| ContractError::SerializationError {
            reason: format!("Invalid settings in {}: {}", path.display(), e),
        })
    }

    /// Apply environment overrides (currently only the REST base URL).
    pub fn apply_env(mut self) -> Self {
        if let Ok(url) = std::env::var(REST_URL_ENV) {
            if !url.trim().is_empty() {
                self.store.rest_url = Some(url);
            }
        }
        self
    }
}

/// Pricing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    /// Margin percentage applied by every pricing path
    pub margin_pct: Decimal,

    /// Currency code used for display
    pub currency: String,
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            margin_pct: DEFAULT_MARGIN_PCT,
            currency: "EUR".to_string(),
        }
    }
}

/// Planning configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningSettings {
    /// Phase whose days are manual rather than summed from tasks
    pub manual_days_phase: String,

    /// Phases seeded into a plan converted from an offer
    pub phase_template: Vec<PhaseTemplate>,
}

impl Default for PlanningSettings {
    fn default() -> Self {
        PlanningSettings {
            manual_days_phase: PROJECT_MANAGEMENT_PHASE.to_string(),
            phase_template: default_phase_template(),
        }
    }
}

/// A phase name and its display colour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTemplate {
    pub name: String,
    pub color: String,
}

impl PhaseTemplate {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        PhaseTemplate {
            name: name.into(),
            color: color.into(),
        }
    }
}

fn default_phase_template() -> Vec<PhaseTemplate> {
    vec![
        PhaseTemplate::new("Analysis", "#3b82f6"),
        PhaseTemplate::new("Design", "#8b5cf6"),
        PhaseTemplate::new("Development", "#10b981"),
        PhaseTemplate::new("Testing", "#f59e0b"),
        PhaseTemplate::new("Deployment", "#ef4444"),
        PhaseTemplate::new(PROJECT_MANAGEMENT_PHASE, "#6b7280"),
    ]
}

/// Rate-table store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Base URL of the REST backend; `None` means use the local workspace
    pub rest_url: Option<String>,

    /// Name of the environment variable holding the API key
    pub api_key_env: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            rest_url: None,
            api_key_env: "CONTRACTIFY_API_KEY".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.pricing.margin_pct, dec!(30));
        assert_eq!(settings.planning.manual_days_phase, "Project Management");
        assert_eq!(settings.planning.phase_template.len(), 6);
        assert!(settings.store.rest_url.is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "pricing": { "margin_pct": 25 } }"#).unwrap();
        assert_eq!(settings.pricing.margin_pct, dec!(25));
        assert_eq!(settings.pricing.currency, "EUR");
        assert_eq!(settings.planning, PlanningSettings::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "store": {{ "rest_url": "https://rates.example.com" }} }}"#).unwrap();

        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.store.rest_url.as_deref(), Some("https://rates.example.com"));
        assert_eq!(settings.store.api_key_env, "CONTRACTIFY_API_KEY");
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = Settings::load(file.path()).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }
}
