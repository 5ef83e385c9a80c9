//! Session and view state
//!
//! [`AppState`] replaces the page-level mutable variables of a dashboard
//! with one value and pure transitions. Every transition consumes the old
//! state and returns the new one.
//!
//! Login is a stub: any submission authenticates as the first user of the
//! store. It is not, and must not become, an access-control mechanism.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::filter::{Facet, IndicatorFilter, UserFilter};
use crate::model::{Role, User};
use crate::store::RecordStore;
use crate::CoreError;

/// Dashboard tab
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Dashboard,
    Indicators,
    Users,
    Settings,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Dashboard, Tab::Indicators, Tab::Users, Tab::Settings];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Dashboard => "dashboard",
            Tab::Indicators => "indicators",
            Tab::Users => "users",
            Tab::Settings => "settings",
        }
    }
}

impl FromStr for Tab {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::Validation(format!("unknown tab '{s}'")))
    }
}

/// Complete view state of one dashboard session
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub authenticated: bool,
    pub current_user: Option<User>,
    pub active_tab: Tab,
    pub indicator_filter: IndicatorFilter,
    pub user_filter: UserFilter,
}

impl AppState {
    /// Fresh, signed-out state
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit the login form.
    ///
    /// Credentials are ignored: the session becomes authenticated as the
    /// store's first user (or with no user when the store has none).
    pub fn login(self, store: &RecordStore, _email: &str, _password: &str) -> Self {
        let current_user = store.first_user().cloned();
        tracing::debug!(user = ?current_user.as_ref().map(|u| &u.email), "stub login");
        Self {
            authenticated: true,
            current_user,
            ..self
        }
    }

    /// Sign out, keeping tab and filter selections
    pub fn logout(self) -> Self {
        Self {
            authenticated: false,
            current_user: None,
            ..self
        }
    }

    pub fn set_tab(self, tab: Tab) -> Self {
        Self {
            active_tab: tab,
            ..self
        }
    }

    pub fn set_indicator_filter(self, indicator_filter: IndicatorFilter) -> Self {
        Self {
            indicator_filter,
            ..self
        }
    }

    pub fn set_user_filter(self, user_filter: UserFilter) -> Self {
        Self { user_filter, ..self }
    }

    pub fn set_period(mut self, period: Facet<String>) -> Self {
        self.indicator_filter.period = period;
        self
    }

    pub fn set_indicator_department(mut self, department: Facet<String>) -> Self {
        self.indicator_filter.department = department;
        self
    }

    pub fn set_role(mut self, role: Facet<Role>) -> Self {
        self.user_filter.role = role;
        self
    }

    pub fn set_user_department(mut self, department: Facet<String>) -> Self {
        self.user_filter.department = department;
        self
    }
}
