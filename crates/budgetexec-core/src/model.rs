//! Domain records: users, financial indicators and chart series.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::execution::{execution, Execution};
use crate::CoreError;

/// Unique identifier for a user
pub type UserId = u32;

/// Unique identifier for a financial indicator
pub type IndicatorId = u32;

// ============================================================================
// User
// ============================================================================

/// Role tag attached to a user.
///
/// Roles are decorative: nothing in the system enforces access control
/// based on them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    /// Principal budget holder
    Grbs,
    Viewer,
}

impl Role {
    /// Stable code used in data files and filters
    pub fn code(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Grbs => "grbs",
            Role::Viewer => "viewer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "grbs" => Ok(Role::Grbs),
            "viewer" => Ok(Role::Viewer),
            other => Err(CoreError::Validation(format!("unknown role '{other}'"))),
        }
    }
}

/// A person with access to the dashboard
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department: String,
}

impl User {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
        department: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            name: name.into(),
            email: email.into(),
            role,
            department: department.into(),
        }
    }

    /// Set the identifier
    pub fn with_id(mut self, id: UserId) -> Self {
        self.id = id;
        self
    }

    /// First letter of every part of the name ("Иванов Иван" -> "ИИ")
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .collect()
    }
}

// ============================================================================
// Financial Indicator
// ============================================================================

/// Planned vs. actual spending for one budget line in one period
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialIndicator {
    pub id: IndicatorId,
    pub name: String,
    /// Planned amount (non-negative, store currency)
    pub planned: Decimal,
    /// Actual amount (non-negative, store currency)
    pub actual: Decimal,
    /// Quarter-year label, e.g. "Q1 2024"
    pub period: String,
    /// Responsible person
    pub responsible: String,
    pub department: String,
}

impl FinancialIndicator {
    pub fn new(name: impl Into<String>, planned: Decimal, actual: Decimal) -> Self {
        Self {
            id: 0,
            name: name.into(),
            planned,
            actual,
            period: String::new(),
            responsible: String::new(),
            department: String::new(),
        }
    }

    /// Set the identifier
    pub fn with_id(mut self, id: IndicatorId) -> Self {
        self.id = id;
        self
    }

    /// Set the reporting period
    pub fn period(mut self, period: impl Into<String>) -> Self {
        self.period = period.into();
        self
    }

    /// Set the responsible person
    pub fn responsible(mut self, responsible: impl Into<String>) -> Self {
        self.responsible = responsible.into();
        self
    }

    /// Set the department
    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }

    /// Execution percentage for this indicator (derived, never stored)
    pub fn execution(&self) -> Execution {
        execution(self.planned, self.actual)
    }
}

// ============================================================================
// Chart Series
// ============================================================================

/// One month of the plan/fact time series (millions)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetPoint {
    pub month: String,
    pub plan: Decimal,
    pub fact: Decimal,
}

impl BudgetPoint {
    pub fn new(month: impl Into<String>, plan: impl Into<Decimal>, fact: impl Into<Decimal>) -> Self {
        Self {
            month: month.into(),
            plan: plan.into(),
            fact: fact.into(),
        }
    }
}

/// Budget allocated to one spending direction (millions)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPoint {
    pub name: String,
    pub value: Decimal,
}

impl AllocationPoint {
    pub fn new(name: impl Into<String>, value: impl Into<Decimal>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}
