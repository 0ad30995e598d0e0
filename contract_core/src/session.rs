//! # Session Context
//!
//! The signed-in user and the active settings, passed by reference into
//! every operation that needs them. There is no process-wide singleton; a
//! front-end builds one `Session` per request or per command.
//!
//! ```rust
//! use contract_core::session::{Role, Session, User};
//!
//! let session = Session::new(User::new("ops@example.com", "Olivia Ops", Role::Operations));
//! assert!(session.require_role("approve offers", &[Role::Operations, Role::Admin]).is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{ContractError, ContractResult};
use crate::settings::Settings;

/// User roles. Sales staff create offers; operations approve them and
/// build project plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Sales,
    Operations,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Sales => "sales",
            Role::Operations => "operations",
            Role::Admin => "admin",
        }
    }
}

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Stable identifier (the email for locally created users)
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

impl User {
    pub fn new(email: impl Into<String>, display_name: impl Into<String>, role: Role) -> Self {
        let email = email.into();
        User {
            id: email.clone(),
            email,
            display_name: display_name.into(),
            role,
        }
    }
}

/// Request-scoped context.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub settings: Settings,
}

impl Session {
    /// Session with default settings.
    pub fn new(user: User) -> Self {
        Session {
            user,
            settings: Settings::default(),
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Fail with `PermissionDenied` unless the user has one of `allowed`.
    pub fn require_role(&self, action: &str, allowed: &[Role]) -> ContractResult<()> {
        if allowed.contains(&self.user.role) {
            Ok(())
        } else {
            Err(ContractError::permission_denied(self.user.role.as_str(), action))
        }
    }
}
