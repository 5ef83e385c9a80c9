//! In-memory record store
//!
//! The store owns every collection the dashboard shows. It starts either
//! from the built-in sample data or from a JSON document of the same shape,
//! and supports create/update/delete for users and indicators. Nothing is
//! ever written back to disk.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::model::{
    AllocationPoint, BudgetPoint, FinancialIndicator, IndicatorId, Role, User, UserId,
};
use crate::CoreError;

/// Largest planned or actual amount a stored indicator may carry (10^18)
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA764_0000, 0x0DE0_B6B3, 0, false, 0);

/// All record collections of one dashboard
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordStore {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub indicators: Vec<FinancialIndicator>,
    /// Monthly plan/fact series (millions)
    #[serde(default)]
    pub budget: Vec<BudgetPoint>,
    /// Allocation per spending direction (millions)
    #[serde(default)]
    pub allocation: Vec<AllocationPoint>,
}

impl RecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in sample data set
    pub fn sample() -> Self {
        let users = vec![
            User::new("Иванов Иван", "ivanov@grbs.ru", Role::Admin, "Администрация").with_id(1),
            User::new("Петрова Мария", "petrova@grbs.ru", Role::Grbs, "Образование").with_id(2),
            User::new("Сидоров Петр", "sidorov@grbs.ru", Role::Grbs, "Здравоохранение").with_id(3),
        ];

        let planning = "Отдел бюджетного планирования";
        let accounting = "Отдел бюджетного учета";
        let treasury = "Отдел казначейства";
        let indicator = |id, name: &str, planned: i64, actual: i64, period: &str, who: &str, dept: &str| {
            FinancialIndicator::new(name, Decimal::from(planned), Decimal::from(actual))
                .with_id(id)
                .period(period)
                .responsible(who)
                .department(dept)
        };
        let indicators = vec![
            indicator(1, "Расходы на образование", 450_000_000, 425_000_000, "Q1 2024", "Петрова М.", planning),
            indicator(2, "Расходы на здравоохранение", 380_000_000, 378_000_000, "Q2 2024", "Сидоров П.", accounting),
            indicator(3, "Расходы на культуру", 180_000_000, 175_000_000, "Q3 2024", "Иванов И.", treasury),
            indicator(4, "Расходы на спорт", 120_000_000, 118_000_000, "Q2 2024", "Петрова М.", planning),
            indicator(5, "Расходы на социальную защиту", 280_000_000, 275_000_000, "Q1 2024", "Сидоров П.", accounting),
            indicator(6, "Инфраструктурные проекты", 320_000_000, 310_000_000, "Q3 2024", "Иванов И.", treasury),
        ];

        let budget = vec![
            BudgetPoint::new("Янв", 120, 115),
            BudgetPoint::new("Фев", 130, 128),
            BudgetPoint::new("Мар", 140, 135),
            BudgetPoint::new("Апр", 135, 138),
            BudgetPoint::new("Май", 145, 142),
            BudgetPoint::new("Июн", 150, 148),
        ];

        let allocation = vec![
            AllocationPoint::new("Образование", 450),
            AllocationPoint::new("Здравоохранение", 380),
            AllocationPoint::new("Культура", 180),
            AllocationPoint::new("Спорт", 120),
            AllocationPoint::new("Социальная защита", 280),
        ];

        Self {
            users,
            indicators,
            budget,
            allocation,
        }
    }

    /// Parse a store from JSON and validate every record
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let store: RecordStore = serde_json::from_str(json)?;
        store.validate()?;
        tracing::debug!(
            users = store.users.len(),
            indicators = store.indicators.len(),
            "loaded record store"
        );
        Ok(store)
    }

    /// Read and parse a store from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Serialize the store as pretty JSON
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check record invariants and id uniqueness
    pub fn validate(&self) -> Result<(), CoreError> {
        for (i, user) in self.users.iter().enumerate() {
            validate_user(user)?;
            if self.users[..i].iter().any(|u| u.id == user.id) {
                return Err(CoreError::Validation(format!("duplicate user id {}", user.id)));
            }
            if self.users[..i].iter().any(|u| same_email(&u.email, &user.email)) {
                return Err(CoreError::Validation(format!(
                    "duplicate user email '{}'",
                    user.email
                )));
            }
        }
        for (i, indicator) in self.indicators.iter().enumerate() {
            validate_indicator(indicator)?;
            if self.indicators[..i].iter().any(|x| x.id == indicator.id) {
                return Err(CoreError::Validation(format!(
                    "duplicate indicator id {}",
                    indicator.id
                )));
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    /// Get a user by ID
    pub fn get_user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Get an indicator by ID
    pub fn get_indicator(&self, id: IndicatorId) -> Option<&FinancialIndicator> {
        self.indicators.iter().find(|i| i.id == id)
    }

    /// The user a stub login signs in as
    pub fn first_user(&self) -> Option<&User> {
        self.users.first()
    }

    // ------------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------------

    /// Add a user, assigning the next free id. Returns the new id.
    pub fn add_user(&mut self, mut user: User) -> Result<UserId, CoreError> {
        validate_user(&user)?;
        if self.users.iter().any(|u| same_email(&u.email, &user.email)) {
            return Err(CoreError::Validation(format!(
                "email '{}' is already registered",
                user.email
            )));
        }
        user.id = next_id("user", self.users.iter().map(|u| u.id))?;
        let id = user.id;
        tracing::debug!(id, email = %user.email, "added user");
        self.users.push(user);
        Ok(id)
    }

    /// Replace the user with the same id
    pub fn update_user(&mut self, user: User) -> Result<(), CoreError> {
        validate_user(&user)?;
        if self
            .users
            .iter()
            .any(|u| u.id != user.id && same_email(&u.email, &user.email))
        {
            return Err(CoreError::Validation(format!(
                "email '{}' is already registered",
                user.email
            )));
        }
        let slot = self
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(CoreError::NotFound { kind: "user", id: user.id })?;
        *slot = user;
        Ok(())
    }

    /// Remove a user, returning it
    pub fn remove_user(&mut self, id: UserId) -> Result<User, CoreError> {
        let pos = self
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or(CoreError::NotFound { kind: "user", id })?;
        Ok(self.users.remove(pos))
    }

    // ------------------------------------------------------------------------
    // Indicators
    // ------------------------------------------------------------------------

    /// Add an indicator, assigning the next free id. Returns the new id.
    pub fn add_indicator(
        &mut self,
        mut indicator: FinancialIndicator,
    ) -> Result<IndicatorId, CoreError> {
        validate_indicator(&indicator)?;
        indicator.id = next_id("indicator", self.indicators.iter().map(|i| i.id))?;
        let id = indicator.id;
        tracing::debug!(id, name = %indicator.name, "added indicator");
        self.indicators.push(indicator);
        Ok(id)
    }

    /// Replace the indicator with the same id
    pub fn update_indicator(&mut self, indicator: FinancialIndicator) -> Result<(), CoreError> {
        validate_indicator(&indicator)?;
        let slot = self
            .indicators
            .iter_mut()
            .find(|i| i.id == indicator.id)
            .ok_or(CoreError::NotFound {
                kind: "indicator",
                id: indicator.id,
            })?;
        *slot = indicator;
        Ok(())
    }

    /// Remove an indicator, returning it
    pub fn remove_indicator(&mut self, id: IndicatorId) -> Result<FinancialIndicator, CoreError> {
        let pos = self
            .indicators
            .iter()
            .position(|i| i.id == id)
            .ok_or(CoreError::NotFound {
                kind: "indicator",
                id,
            })?;
        Ok(self.indicators.remove(pos))
    }
}

fn next_id(kind: &str, ids: impl Iterator<Item = u32>) -> Result<u32, CoreError> {
    match ids.max() {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| CoreError::Validation(format!("no {kind} ids left after {max}"))),
    }
}

fn same_email(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

fn validate_user(user: &User) -> Result<(), CoreError> {
    if user.name.trim().is_empty() {
        return Err(CoreError::Validation("user name must not be empty".into()));
    }
    let email = user.email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(CoreError::Validation(format!(
            "'{}' is not a valid email address",
            user.email
        ))),
    }
}

fn validate_indicator(indicator: &FinancialIndicator) -> Result<(), CoreError> {
    if indicator.name.trim().is_empty() {
        return Err(CoreError::Validation("indicator name must not be empty".into()));
    }
    if indicator.period.trim().is_empty() {
        return Err(CoreError::Validation(format!(
            "indicator '{}' has no period",
            indicator.name
        )));
    }
    if indicator.planned.is_sign_negative() || indicator.actual.is_sign_negative() {
        return Err(CoreError::Validation(format!(
            "indicator '{}' has a negative amount",
            indicator.name
        )));
    }
    if indicator.planned > MAX_AMOUNT || indicator.actual > MAX_AMOUNT {
        return Err(CoreError::Validation(format!(
            "indicator '{}' has an amount above {MAX_AMOUNT}",
            indicator.name
        )));
    }
    Ok(())
}
