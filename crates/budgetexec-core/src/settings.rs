//! Organization settings shown on the settings tab

use serde::{Deserialize, Serialize};

/// General and notification settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Name of the reporting organization
    pub organization: String,
    /// Fiscal year the data covers
    pub fiscal_year: i32,
    /// Send email notifications
    pub email_notifications: bool,
    /// Produce reports on a schedule
    pub scheduled_reports: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            organization: "Министерство финансов".into(),
            fiscal_year: 2024,
            email_notifications: true,
            scheduled_reports: true,
        }
    }
}
