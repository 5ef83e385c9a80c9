//! Locale-dependent presentation text and number/date formatting
//!
//! Everything a user reads (column headers, sheet names, role labels,
//! money amounts, date stamps) goes through [`Locale`]. Filtering and the
//! execution calculator never look at it.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::execution::{Execution, Severity};
use crate::model::Role;
use crate::state::Tab;
use crate::CoreError;

/// Presentation language
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ru,
    En,
}

impl FromStr for Locale {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ru" | "ru-ru" => Ok(Locale::Ru),
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            other => Err(CoreError::Validation(format!("unsupported locale '{other}'"))),
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locale::Ru => write!(f, "ru"),
            Locale::En => write!(f, "en"),
        }
    }
}

/// Currency of all monetary amounts in the store
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// ISO 4217 code
    pub code: String,
}

impl Default for Currency {
    fn default() -> Self {
        Self::new("RUB")
    }
}

impl Currency {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into().to_ascii_uppercase(),
        }
    }

    /// Symbol used next to formatted amounts
    pub fn symbol(&self) -> &str {
        match self.code.as_str() {
            "RUB" => "₽",
            "USD" => "$",
            "EUR" => "€",
            _ => &self.code,
        }
    }
}

// ============================================================================
// Labels
// ============================================================================

impl Locale {
    /// Display label for a role
    pub fn role_label(&self, role: Role) -> &'static str {
        match (self, role) {
            (Locale::Ru, Role::Admin) => "Администратор",
            (Locale::Ru, Role::Grbs) => "ГРБС",
            (Locale::Ru, Role::Viewer) => "Наблюдатель",
            (Locale::En, Role::Admin) => "Administrator",
            (Locale::En, Role::Grbs) => "GRBS",
            (Locale::En, Role::Viewer) => "Observer",
        }
    }

    /// Display label for a severity tier
    pub fn severity_label(&self, severity: Severity) -> &'static str {
        match (self, severity) {
            (Locale::Ru, Severity::OnTrack) => "В норме",
            (Locale::Ru, Severity::Watch) => "Внимание",
            (Locale::Ru, Severity::AtRisk) => "Риск",
            (Locale::En, Severity::OnTrack) => "On track",
            (Locale::En, Severity::Watch) => "Watch",
            (Locale::En, Severity::AtRisk) => "At risk",
        }
    }

    /// Label shown instead of a percentage when nothing was planned
    pub fn not_applicable(&self) -> &'static str {
        match self {
            Locale::Ru => "н/д",
            Locale::En => "n/a",
        }
    }

    /// Execution percentage as text, substituting the n/a label
    pub fn execution_text(&self, execution: Execution) -> String {
        if execution.is_applicable() {
            execution.to_string()
        } else {
            self.not_applicable().to_string()
        }
    }

    /// Title of a dashboard tab
    pub fn tab_title(&self, tab: Tab) -> &'static str {
        match (self, tab) {
            (Locale::Ru, Tab::Dashboard) => "Главная",
            (Locale::Ru, Tab::Indicators) => "Показатели",
            (Locale::Ru, Tab::Users) => "Пользователи",
            (Locale::Ru, Tab::Settings) => "Настройки",
            (Locale::En, Tab::Dashboard) => "Dashboard",
            (Locale::En, Tab::Indicators) => "Indicators",
            (Locale::En, Tab::Users) => "Users",
            (Locale::En, Tab::Settings) => "Settings",
        }
    }

    /// Unit written in monetary column headers ("руб." / "RUB")
    pub fn currency_unit(&self, currency: &Currency) -> String {
        match (self, currency.code.as_str()) {
            (Locale::Ru, "RUB") => "руб.".to_string(),
            _ => currency.code.clone(),
        }
    }

    /// Unit of the chart datasets, which are kept in millions
    pub fn millions_unit(&self, currency: &Currency) -> String {
        match self {
            Locale::Ru => format!("млн {}", currency.symbol()),
            Locale::En => format!("mn {}", currency.symbol()),
        }
    }

    // ------------------------------------------------------------------------
    // Formatting
    // ------------------------------------------------------------------------

    /// Format a whole-unit money amount, e.g. `450 000 000 ₽` or `RUB 450,000,000`
    pub fn format_money(&self, amount: Decimal, currency: &Currency) -> String {
        let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let digits = rounded.abs().trunc().to_string();
        let separator = match self {
            Locale::Ru => '\u{a0}',
            Locale::En => ',',
        };
        let grouped = group_thousands(&digits, separator);
        let sign = if negative { "-" } else { "" };
        match self {
            Locale::Ru => format!("{sign}{grouped}\u{a0}{}", currency.symbol()),
            Locale::En => format!("{sign}{} {grouped}", currency.code),
        }
    }
}

/// Date stamp used in export file names: `DD-MM-YYYY`, the same in every locale
pub fn date_stamp(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

fn group_thousands(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn role_labels_per_locale() {
        assert_eq!(Locale::Ru.role_label(Role::Admin), "Администратор");
        assert_eq!(Locale::Ru.role_label(Role::Grbs), "ГРБС");
        assert_eq!(Locale::Ru.role_label(Role::Viewer), "Наблюдатель");
        assert_eq!(Locale::En.role_label(Role::Admin), "Administrator");
        assert_eq!(Locale::En.role_label(Role::Grbs), "GRBS");
        assert_eq!(Locale::En.role_label(Role::Viewer), "Observer");
    }

    #[test]
    fn money_russian_grouping() {
        let rub = Currency::default();
        assert_eq!(
            Locale::Ru.format_money(dec!(450000000), &rub),
            "450\u{a0}000\u{a0}000\u{a0}₽"
        );
        assert_eq!(Locale::Ru.format_money(dec!(999), &rub), "999\u{a0}₽");
    }

    #[test]
    fn money_english_grouping() {
        let rub = Currency::default();
        assert_eq!(Locale::En.format_money(dec!(1234567.6), &rub), "RUB 1,234,568");
        assert_eq!(Locale::En.format_money(dec!(0), &rub), "RUB 0");
    }

    #[test]
    fn date_stamp_uses_hyphens() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(date_stamp(date), "05-03-2024");
    }

    #[test]
    fn not_applicable_execution_text() {
        assert_eq!(Locale::En.execution_text(Execution::NotApplicable), "n/a");
        assert_eq!(Locale::Ru.execution_text(Execution::Percent(dec!(94.4))), "94.4");
    }

    #[test]
    fn currency_units() {
        let rub = Currency::new("rub");
        assert_eq!(rub.code, "RUB");
        assert_eq!(Locale::Ru.currency_unit(&rub), "руб.");
        assert_eq!(Locale::En.currency_unit(&rub), "RUB");
        assert_eq!(Locale::Ru.millions_unit(&rub), "млн ₽");
    }

    #[test]
    fn parses_locale_tags() {
        assert_eq!("ru-RU".parse::<Locale>().unwrap(), Locale::Ru);
        assert_eq!("en".parse::<Locale>().unwrap(), Locale::En);
        assert!("de".parse::<Locale>().is_err());
    }
}
