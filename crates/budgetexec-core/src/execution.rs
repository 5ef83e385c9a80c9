//! Execution percentage and severity classification
//!
//! Execution answers "how much of the plan has been spent":
//!
//! ```text
//! execution = actual / planned * 100
//! ```
//!
//! The value is rounded to one decimal place, midpoint away from zero
//! (round-half-up for the non-negative amounts the store holds), and always
//! rendered with exactly one fractional digit.
//!
//! # Example
//!
//! ```rust
//! use budgetexec_core::execution::{execution, Severity};
//! use rust_decimal::Decimal;
//!
//! let e = execution(Decimal::from(450_000_000), Decimal::from(425_000_000));
//! assert_eq!(e.to_string(), "94.4");
//! assert_eq!(e.severity(), Some(Severity::Watch));
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Execution at or above this percentage is on track
pub const ON_TRACK_THRESHOLD: Decimal = Decimal::from_parts(95, 0, 0, false, 0);

/// Execution at or above this percentage (and below on-track) needs watching
pub const WATCH_THRESHOLD: Decimal = Decimal::from_parts(85, 0, 0, false, 0);

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

// ============================================================================
// Severity
// ============================================================================

/// Three-tier classification of an execution percentage
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    /// `>= 95%`
    OnTrack,
    /// `>= 85%` and `< 95%`
    Watch,
    /// `< 85%`
    AtRisk,
}

impl Severity {
    /// All tiers from best to worst
    pub const ALL: [Severity; 3] = [Severity::OnTrack, Severity::Watch, Severity::AtRisk];

    /// Classify a percentage
    pub fn classify(percent: Decimal) -> Self {
        if percent >= ON_TRACK_THRESHOLD {
            Severity::OnTrack
        } else if percent >= WATCH_THRESHOLD {
            Severity::Watch
        } else {
            Severity::AtRisk
        }
    }

    /// Machine-readable tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::OnTrack => "on-track",
            Severity::Watch => "watch",
            Severity::AtRisk => "at-risk",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Execution
// ============================================================================

/// Result of the execution calculation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "percent", rename_all = "kebab-case")]
pub enum Execution {
    /// Percentage rounded to one decimal place
    Percent(Decimal),
    /// Nothing was planned, so the ratio is undefined
    NotApplicable,
}

impl Execution {
    /// The rounded percentage, if defined
    pub fn percent(&self) -> Option<Decimal> {
        match self {
            Execution::Percent(p) => Some(*p),
            Execution::NotApplicable => None,
        }
    }

    /// Severity tier, `None` when nothing was planned
    pub fn severity(&self) -> Option<Severity> {
        self.percent().map(Severity::classify)
    }

    pub fn is_applicable(&self) -> bool {
        matches!(self, Execution::Percent(_))
    }
}

/// Renders the percentage with exactly one decimal digit and no `%` sign.
///
/// `NotApplicable` renders as an empty string; callers substitute a
/// locale label.
impl std::fmt::Display for Execution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Execution::Percent(p) => {
                let mut p = *p;
                p.rescale(1);
                write!(f, "{p}")
            }
            Execution::NotApplicable => Ok(()),
        }
    }
}

/// Round a percentage to one decimal place, midpoint away from zero
pub fn round_percent(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Compute `actual / planned * 100` rounded to one decimal place.
///
/// Returns [`Execution::NotApplicable`] when `planned` is zero, or when the
/// ratio does not fit a `Decimal` (a vanishing plan against a huge actual).
pub fn execution(planned: Decimal, actual: Decimal) -> Execution {
    if planned.is_zero() {
        return Execution::NotApplicable;
    }
    let ratio = actual
        .checked_mul(HUNDRED)
        .and_then(|scaled| scaled.checked_div(planned))
        .or_else(|| {
            actual
                .checked_div(planned)
                .and_then(|r| r.checked_mul(HUNDRED))
        });
    match ratio {
        Some(ratio) => Execution::Percent(round_percent(ratio)),
        None => {
            tracing::warn!(%planned, %actual, "execution ratio out of range");
            Execution::NotApplicable
        }
    }
}
