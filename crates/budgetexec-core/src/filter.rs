//! Facet filtering over the record store
//!
//! A facet is one filterable dimension (period, department, role). Each
//! selected facet is either [`Facet::All`] or a concrete value; a record is
//! kept when every facet matches. Filtering is stable: the output is a
//! subsequence of the input in the original order.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hash::Hash;
use std::str::FromStr;

use crate::model::{FinancialIndicator, Role, User};
use crate::CoreError;

/// Textual sentinel meaning "no filter on this facet"
pub const ALL: &str = "all";

/// Selected value of one facet
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facet<T> {
    All,
    Only(T),
}

impl<T> Default for Facet<T> {
    fn default() -> Self {
        Facet::All
    }
}

impl<T: PartialEq> Facet<T> {
    /// Does `value` pass this facet?
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Facet::All => true,
            Facet::Only(selected) => selected == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Facet::All)
    }
}

impl Facet<String> {
    /// Parse a string selection; `"all"` and the empty string select everything
    pub fn parse_text(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(ALL) {
            Facet::All
        } else {
            Facet::Only(value.to_string())
        }
    }

    /// Matches a borrowed string without allocating
    pub fn matches_str(&self, value: &str) -> bool {
        match self {
            Facet::All => true,
            Facet::Only(selected) => selected == value,
        }
    }
}

impl Facet<Role> {
    /// Parse a role selection; `"all"` selects every role
    pub fn parse_role(value: &str) -> Result<Self, CoreError> {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(ALL) {
            Ok(Facet::All)
        } else {
            Role::from_str(value).map(Facet::Only)
        }
    }
}

impl<T> From<Option<T>> for Facet<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Facet::All, Facet::Only)
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Facets applied to financial indicators
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorFilter {
    pub period: Facet<String>,
    pub department: Facet<String>,
}

impl IndicatorFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one period
    pub fn period(mut self, period: impl Into<String>) -> Self {
        self.period = Facet::Only(period.into());
        self
    }

    /// Restrict to one department
    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = Facet::Only(department.into());
        self
    }

    pub fn matches(&self, indicator: &FinancialIndicator) -> bool {
        self.period.matches_str(&indicator.period)
            && self.department.matches_str(&indicator.department)
    }

    /// Stable filter over `indicators`
    pub fn apply<'a>(&self, indicators: &'a [FinancialIndicator]) -> Vec<&'a FinancialIndicator> {
        let kept: Vec<_> = indicators.iter().filter(|i| self.matches(i)).collect();
        tracing::debug!(
            period = ?self.period,
            department = ?self.department,
            kept = kept.len(),
            total = indicators.len(),
            "filtered indicators"
        );
        kept
    }
}

/// Facets applied to users
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFilter {
    pub role: Facet<Role>,
    pub department: Facet<String>,
}

impl UserFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one role
    pub fn role(mut self, role: Role) -> Self {
        self.role = Facet::Only(role);
        self
    }

    /// Restrict to one department
    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = Facet::Only(department.into());
        self
    }

    pub fn matches(&self, user: &User) -> bool {
        self.role.matches(&user.role) && self.department.matches_str(&user.department)
    }

    /// Stable filter over `users`
    pub fn apply<'a>(&self, users: &'a [User]) -> Vec<&'a User> {
        let kept: Vec<_> = users.iter().filter(|u| self.matches(u)).collect();
        tracing::debug!(
            role = ?self.role,
            department = ?self.department,
            kept = kept.len(),
            total = users.len(),
            "filtered users"
        );
        kept
    }
}

// ============================================================================
// Facet value sets
// ============================================================================

/// Distinct values in order of first appearance
pub fn unique_in_order<T, I>(values: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

/// Periods observed across indicators
pub fn periods(indicators: &[FinancialIndicator]) -> Vec<String> {
    unique_in_order(indicators.iter().map(|i| i.period.clone()))
}

/// Departments observed across indicators
pub fn indicator_departments(indicators: &[FinancialIndicator]) -> Vec<String> {
    unique_in_order(indicators.iter().map(|i| i.department.clone()))
}

/// Departments observed across users
pub fn user_departments(users: &[User]) -> Vec<String> {
    unique_in_order(users.iter().map(|u| u.department.clone()))
}

/// Roles observed across users
pub fn roles(users: &[User]) -> Vec<Role> {
    unique_in_order(users.iter().map(|u| u.role))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordStore;
    use pretty_assertions::assert_eq;

    fn ids<T, F: Fn(&T) -> u32>(records: &[&T], id: F) -> Vec<u32> {
        records.iter().map(|r| id(*r)).collect()
    }

    #[test]
    fn period_filter_q1() {
        let store = RecordStore::sample();
        let kept = IndicatorFilter::new().period("Q1 2024").apply(&store.indicators);
        assert_eq!(ids(&kept, |i: &FinancialIndicator| i.id), vec![1, 5]);
    }

    #[test]
    fn role_filter_grbs() {
        let store = RecordStore::sample();
        let kept = UserFilter::new().role(Role::Grbs).apply(&store.users);
        assert_eq!(ids(&kept, |u: &User| u.id), vec![2, 3]);
    }

    #[test]
    fn all_facets_return_everything_in_order() {
        let store = RecordStore::sample();
        let kept = IndicatorFilter::new().apply(&store.indicators);
        let expected: Vec<&FinancialIndicator> = store.indicators.iter().collect();
        assert_eq!(kept, expected);

        let users = UserFilter::new().apply(&store.users);
        let expected: Vec<&User> = store.users.iter().collect();
        assert_eq!(users, expected);
    }

    #[test]
    fn user_filter_keeps_input_order() {
        let mut store = RecordStore::sample();
        store.users.reverse();
        let kept = UserFilter::new().role(Role::Grbs).apply(&store.users);
        assert_eq!(ids(&kept, |u: &User| u.id), vec![3, 2]);
    }

    #[test]
    fn user_facets_combine_with_and() {
        let store = RecordStore::sample();
        let kept = UserFilter::new()
            .role(Role::Grbs)
            .department("Здравоохранение")
            .apply(&store.users);
        assert_eq!(ids(&kept, |u: &User| u.id), vec![3]);

        let none = UserFilter::new()
            .role(Role::Admin)
            .department("Здравоохранение")
            .apply(&store.users);
        assert!(none.is_empty());
    }

    #[test]
    fn user_filtering_is_idempotent() {
        let store = RecordStore::sample();
        let filter = UserFilter::new().role(Role::Grbs);
        let once: Vec<User> = filter.apply(&store.users).into_iter().cloned().collect();
        let twice: Vec<User> = filter.apply(&once).into_iter().cloned().collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn facets_combine_with_and() {
        let store = RecordStore::sample();
        let kept = IndicatorFilter::new()
            .period("Q2 2024")
            .department("Отдел бюджетного планирования")
            .apply(&store.indicators);
        assert_eq!(ids(&kept, |i: &FinancialIndicator| i.id), vec![4]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let store = RecordStore::sample();
        let filter = IndicatorFilter::new().period("Q3 2024");
        let once: Vec<FinancialIndicator> =
            filter.apply(&store.indicators).into_iter().cloned().collect();
        let twice: Vec<FinancialIndicator> = filter.apply(&once).into_iter().cloned().collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn unmatched_filter_is_empty() {
        let store = RecordStore::sample();
        let kept = IndicatorFilter::new().period("Q4 2024").apply(&store.indicators);
        assert!(kept.is_empty());

        let nobody = UserFilter::new().role(Role::Viewer).apply(&store.users);
        assert!(nobody.is_empty());
    }

    #[test]
    fn facet_sets_in_first_occurrence_order() {
        let store = RecordStore::sample();
        assert_eq!(periods(&store.indicators), vec!["Q1 2024", "Q2 2024", "Q3 2024"]);
        assert_eq!(
            indicator_departments(&store.indicators),
            vec![
                "Отдел бюджетного планирования",
                "Отдел бюджетного учета",
                "Отдел казначейства"
            ]
        );
        assert_eq!(
            user_departments(&store.users),
            vec!["Администрация", "Образование", "Здравоохранение"]
        );
        assert_eq!(roles(&store.users), vec![Role::Admin, Role::Grbs]);
    }

    #[test]
    fn parses_sentinel() {
        assert_eq!(Facet::parse_text("all"), Facet::All);
        assert_eq!(Facet::parse_text("  "), Facet::All);
        assert_eq!(Facet::parse_text("Q1 2024"), Facet::Only("Q1 2024".to_string()));
        assert_eq!(Facet::parse_role("ALL").unwrap(), Facet::All);
        assert_eq!(Facet::parse_role("viewer").unwrap(), Facet::Only(Role::Viewer));
        assert!(Facet::parse_role("owner").is_err());
    }
}
