//! Dashboard headline figures
//!
//! Aggregates an indicator view into the numbers shown on the dashboard
//! cards: totals, overall execution, deviation from plan and how many
//! indicators fall into each severity tier.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::execution::{execution, round_percent, Execution, Severity};
use crate::model::{FinancialIndicator, Role, User};

/// Aggregated view of a set of indicators
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Number of indicators aggregated
    pub indicator_count: usize,
    /// Sum of planned amounts
    pub total_planned: Decimal,
    /// Sum of actual amounts
    pub total_actual: Decimal,
    /// Execution of the totals
    pub overall_execution: Execution,
    /// Overall execution minus 100, in percentage points
    pub deviation: Option<Decimal>,
    pub on_track: usize,
    pub watch: usize,
    pub at_risk: usize,
    /// Indicators with nothing planned
    pub not_applicable: usize,
    /// Users holding the GRBS role
    pub grbs_count: usize,
}

impl DashboardSummary {
    /// Summarise `indicators` (typically a filtered view) and `users`
    pub fn compute<'a, I>(indicators: I, users: &[User]) -> Self
    where
        I: IntoIterator<Item = &'a FinancialIndicator>,
    {
        let mut summary = Self {
            indicator_count: 0,
            total_planned: Decimal::ZERO,
            total_actual: Decimal::ZERO,
            overall_execution: Execution::NotApplicable,
            deviation: None,
            on_track: 0,
            watch: 0,
            at_risk: 0,
            not_applicable: 0,
            grbs_count: users.iter().filter(|u| u.role == Role::Grbs).count(),
        };

        for indicator in indicators {
            summary.indicator_count += 1;
            // store validation bounds each amount; saturate for unchecked input
            summary.total_planned = summary.total_planned.saturating_add(indicator.planned);
            summary.total_actual = summary.total_actual.saturating_add(indicator.actual);
            match indicator.execution().severity() {
                Some(Severity::OnTrack) => summary.on_track += 1,
                Some(Severity::Watch) => summary.watch += 1,
                Some(Severity::AtRisk) => summary.at_risk += 1,
                None => summary.not_applicable += 1,
            }
        }

        summary.overall_execution = execution(summary.total_planned, summary.total_actual);
        summary.deviation = summary
            .overall_execution
            .percent()
            .map(|p| round_percent(p - Decimal::ONE_HUNDRED));
        summary
    }

    /// Count for one severity tier
    pub fn count(&self, severity: Severity) -> usize {
        match severity {
            Severity::OnTrack => self.on_track,
            Severity::Watch => self.watch,
            Severity::AtRisk => self.at_risk,
        }
    }
}
