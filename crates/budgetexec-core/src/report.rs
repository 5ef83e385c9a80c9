//! Tabular reports
//!
//! A [`Report`] is what gets exported: a label (which names the file) and
//! one or more named sheets with a header row and one row per record. The
//! builders here decide columns, labels and cell values; renderers only
//! encode.
//!
//! # Example
//!
//! ```rust
//! use budgetexec_core::{IndicatorFilter, RecordStore, ReportBuilder};
//! use budgetexec_core::locale::{Currency, Locale};
//!
//! let store = RecordStore::sample();
//! let view = IndicatorFilter::new().period("Q1 2024").apply(&store.indicators);
//! let report = ReportBuilder::new(Locale::En, Currency::default()).indicators(view);
//!
//! assert_eq!(report.sheets[0].total_rows(), 3);
//! assert_eq!(report.sheets[0].headers[1], "Planned (RUB)");
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::locale::{date_stamp, Currency, Locale};
use crate::model::{AllocationPoint, BudgetPoint, FinancialIndicator, User};

// ============================================================================
// Report model
// ============================================================================

/// Value of one cell
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(Decimal),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Plain-text rendering (numbers without grouping)
    pub fn display(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.normalize().to_string(),
        }
    }
}

impl From<Decimal> for Cell {
    fn from(value: Decimal) -> Self {
        Cell::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

/// One named table of a report
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new<S: Into<String>>(name: impl Into<String>, headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Rows including the header row
    pub fn total_rows(&self) -> usize {
        self.rows.len() + 1
    }

    /// Index of the first row whose width differs from the header
    pub fn ragged_row(&self) -> Option<usize> {
        self.rows.iter().position(|r| r.len() != self.headers.len())
    }
}

/// The three exports the dashboard offers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// Filtered financial indicators
    Indicators,
    /// Full user list
    Users,
    /// Chart datasets of the dashboard tab
    Dashboard,
}

impl ReportKind {
    /// Label used as the file name prefix
    pub fn label(&self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::Ru, ReportKind::Indicators) => "Финансовые_показатели",
            (Locale::Ru, ReportKind::Users) => "Пользователи",
            (Locale::Ru, ReportKind::Dashboard) => "Отчет_Dashboard",
            (Locale::En, ReportKind::Indicators) => "Financial_indicators",
            (Locale::En, ReportKind::Users) => "Users",
            (Locale::En, ReportKind::Dashboard) => "Dashboard_report",
        }
    }
}

impl std::str::FromStr for ReportKind {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "indicators" => Ok(ReportKind::Indicators),
            "users" => Ok(ReportKind::Users),
            "dashboard" => Ok(ReportKind::Dashboard),
            other => Err(crate::CoreError::Validation(format!("unknown report '{other}'"))),
        }
    }
}

/// A complete export
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub kind: ReportKind,
    pub label: String,
    pub sheets: Vec<Sheet>,
}

impl Report {
    /// File name stamped with `date`: `<label>_<DD-MM-YYYY>.xlsx`
    pub fn file_name(&self, date: NaiveDate) -> String {
        export_file_name(&self.label, date)
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// `<label>_<DD-MM-YYYY>.xlsx`
pub fn export_file_name(label: &str, date: NaiveDate) -> String {
    format!("{label}_{}.xlsx", date_stamp(date))
}

// ============================================================================
// Builders
// ============================================================================

fn indicators_sheet_name(locale: Locale) -> &'static str {
    match locale {
        Locale::Ru => "Финансовые показатели",
        Locale::En => "Financial indicators",
    }
}

fn users_sheet_name(locale: Locale) -> &'static str {
    match locale {
        Locale::Ru => "Пользователи",
        Locale::En => "Users",
    }
}

/// Builds the dashboard's reports in one locale and currency
#[derive(Clone, Debug, Default)]
pub struct ReportBuilder {
    pub locale: Locale,
    pub currency: Currency,
}

impl ReportBuilder {
    pub fn new(locale: Locale, currency: Currency) -> Self {
        Self { locale, currency }
    }

    /// Indicator export: amounts as raw numbers, execution as text
    pub fn indicators<'a, I>(&self, indicators: I) -> Report
    where
        I: IntoIterator<Item = &'a FinancialIndicator>,
    {
        let unit = self.locale.currency_unit(&self.currency);
        let (sheet_name, headers) = match self.locale {
            Locale::Ru => (
                indicators_sheet_name(self.locale),
                [
                    "Наименование".to_string(),
                    format!("План ({unit})"),
                    format!("Факт ({unit})"),
                    "Исполнение (%)".to_string(),
                    "Период".to_string(),
                    "Отдел".to_string(),
                    "Ответственный".to_string(),
                ],
            ),
            Locale::En => (
                indicators_sheet_name(self.locale),
                [
                    "Name".to_string(),
                    format!("Planned ({unit})"),
                    format!("Actual ({unit})"),
                    "Execution (%)".to_string(),
                    "Period".to_string(),
                    "Department".to_string(),
                    "Responsible".to_string(),
                ],
            ),
        };

        let mut sheet = Sheet::new(sheet_name, headers);
        for indicator in indicators {
            sheet.push_row(vec![
                Cell::text(&indicator.name),
                Cell::Number(indicator.planned),
                Cell::Number(indicator.actual),
                Cell::Text(self.locale.execution_text(indicator.execution())),
                Cell::text(&indicator.period),
                Cell::text(&indicator.department),
                Cell::text(&indicator.responsible),
            ]);
        }
        tracing::debug!(rows = sheet.rows.len(), "built indicators report");
        self.report(ReportKind::Indicators, vec![sheet])
    }

    /// User export with translated role labels
    pub fn users(&self, users: &[User]) -> Report {
        let headers = match self.locale {
            Locale::Ru => ["Имя", "Email", "Роль", "Подразделение"],
            Locale::En => ["Name", "Email", "Role", "Department"],
        };

        let mut sheet = Sheet::new(users_sheet_name(self.locale), headers);
        for user in users {
            sheet.push_row(vec![
                Cell::text(&user.name),
                Cell::text(&user.email),
                Cell::text(self.locale.role_label(user.role)),
                Cell::text(&user.department),
            ]);
        }
        tracing::debug!(rows = sheet.rows.len(), "built users report");
        self.report(ReportKind::Users, vec![sheet])
    }

    /// Dashboard export: monthly dynamics and allocation as two sheets
    pub fn dashboard(&self, budget: &[BudgetPoint], allocation: &[AllocationPoint]) -> Report {
        let unit = self.locale.millions_unit(&self.currency);
        let (dynamics_name, month, plan, fact, allocation_name, direction, value) = match self.locale {
            Locale::Ru => (
                "Динамика бюджета",
                "Месяц",
                format!("План ({unit})"),
                format!("Факт ({unit})"),
                "Распределение",
                "Направление",
                format!("Бюджет ({unit})"),
            ),
            Locale::En => (
                "Budget dynamics",
                "Month",
                format!("Plan ({unit})"),
                format!("Fact ({unit})"),
                "Allocation",
                "Direction",
                format!("Budget ({unit})"),
            ),
        };

        let mut dynamics = Sheet::new(dynamics_name, [month.to_string(), plan, fact]);
        for point in budget {
            dynamics.push_row(vec![
                Cell::text(&point.month),
                Cell::Number(point.plan),
                Cell::Number(point.fact),
            ]);
        }

        let mut split = Sheet::new(allocation_name, [direction.to_string(), value]);
        for point in allocation {
            split.push_row(vec![Cell::text(&point.name), Cell::Number(point.value)]);
        }

        self.report(ReportKind::Dashboard, vec![dynamics, split])
    }

    /// On-screen indicator table: formatted money, `%` suffix, severity label
    pub fn indicators_view<'a, I>(&self, indicators: I) -> Sheet
    where
        I: IntoIterator<Item = &'a FinancialIndicator>,
    {
        let headers = match self.locale {
            Locale::Ru => ["Наименование", "План", "Факт", "Исполнение", "Статус", "Период", "Отдел", "Ответственный"],
            Locale::En => ["Name", "Planned", "Actual", "Execution", "Status", "Period", "Department", "Responsible"],
        };
        let mut sheet = Sheet::new(indicators_sheet_name(self.locale), headers);
        for indicator in indicators {
            let execution = indicator.execution();
            let percent = if execution.is_applicable() {
                format!("{execution}%")
            } else {
                self.locale.not_applicable().to_string()
            };
            let status = execution
                .severity()
                .map_or("", |s| self.locale.severity_label(s));
            sheet.push_row(vec![
                Cell::text(&indicator.name),
                Cell::Text(self.locale.format_money(indicator.planned, &self.currency)),
                Cell::Text(self.locale.format_money(indicator.actual, &self.currency)),
                Cell::Text(percent),
                Cell::text(status),
                Cell::text(&indicator.period),
                Cell::text(&indicator.department),
                Cell::text(&indicator.responsible),
            ]);
        }
        sheet
    }

    /// On-screen user table with initials
    pub fn users_view<'a, I>(&self, users: I) -> Sheet
    where
        I: IntoIterator<Item = &'a User>,
    {
        let headers = match self.locale {
            Locale::Ru => ["", "Пользователь", "Email", "Роль", "Подразделение"],
            Locale::En => ["", "User", "Email", "Role", "Department"],
        };
        let mut sheet = Sheet::new(users_sheet_name(self.locale), headers);
        for user in users {
            sheet.push_row(vec![
                Cell::Text(user.initials()),
                Cell::text(&user.name),
                Cell::text(&user.email),
                Cell::text(self.locale.role_label(user.role)),
                Cell::text(&user.department),
            ]);
        }
        sheet
    }

    fn report(&self, kind: ReportKind, sheets: Vec<Sheet>) -> Report {
        Report {
            kind,
            label: kind.label(self.locale).to_string(),
            sheets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::IndicatorFilter;
    use crate::model::Role;
    use crate::store::RecordStore;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn russian() -> ReportBuilder {
        ReportBuilder::new(Locale::Ru, Currency::default())
    }

    #[test]
    fn indicator_headers_russian() {
        let store = RecordStore::sample();
        let report = russian().indicators(&store.indicators);
        let sheet = &report.sheets[0];
        assert_eq!(sheet.name, "Финансовые показатели");
        assert_eq!(
            sheet.headers,
            vec![
                "Наименование",
                "План (руб.)",
                "Факт (руб.)",
                "Исполнение (%)",
                "Период",
                "Отдел",
                "Ответственный"
            ]
        );
        assert_eq!(report.label, "Финансовые_показатели");
    }

    #[test]
    fn indicator_rows_hold_numbers_and_execution_text() {
        let store = RecordStore::sample();
        let view = IndicatorFilter::new().period("Q1 2024").apply(&store.indicators);
        let report = russian().indicators(view);
        let sheet = &report.sheets[0];

        assert_eq!(sheet.total_rows(), 3);
        assert_eq!(
            sheet.rows[0],
            vec![
                Cell::text("Расходы на образование"),
                Cell::Number(dec!(450000000)),
                Cell::Number(dec!(425000000)),
                Cell::text("94.4"),
                Cell::text("Q1 2024"),
                Cell::text("Отдел бюджетного планирования"),
                Cell::text("Петрова М."),
            ]
        );
        assert_eq!(sheet.ragged_row(), None);
    }

    #[test]
    fn zero_plan_exports_not_applicable() {
        let indicator = FinancialIndicator::new("New line", dec!(0), dec!(10)).period("Q4 2024");
        let report = ReportBuilder::new(Locale::En, Currency::default()).indicators([&indicator]);
        assert_eq!(report.sheets[0].rows[0][3], Cell::text("n/a"));
    }

    #[test]
    fn empty_view_keeps_header() {
        let report = russian().indicators(std::iter::empty());
        assert_eq!(report.sheets[0].total_rows(), 1);
        assert_eq!(report.sheets[0].headers.len(), 7);
    }

    #[test]
    fn users_translate_roles() {
        let store = RecordStore::sample();
        let report = russian().users(&store.users);
        let sheet = &report.sheets[0];
        assert_eq!(sheet.headers, vec!["Имя", "Email", "Роль", "Подразделение"]);
        let roles: Vec<String> = sheet.rows.iter().map(|r| r[2].display()).collect();
        assert_eq!(roles, vec!["Администратор", "ГРБС", "ГРБС"]);
        assert_eq!(report.label, "Пользователи");

        let english = ReportBuilder::new(Locale::En, Currency::default()).users(&[
            User::new("Watcher", "w@x.ru", Role::Viewer, "Audit").with_id(9),
        ]);
        assert_eq!(english.sheets[0].rows[0][2], Cell::text("Observer"));
    }

    #[test]
    fn dashboard_has_two_sheets() {
        let store = RecordStore::sample();
        let report = russian().dashboard(&store.budget, &store.allocation);
        assert_eq!(report.sheets.len(), 2);

        let dynamics = report.sheet("Динамика бюджета").unwrap();
        assert_eq!(dynamics.headers, vec!["Месяц", "План (млн ₽)", "Факт (млн ₽)"]);
        assert_eq!(dynamics.total_rows(), 7);

        let split = report.sheet("Распределение").unwrap();
        assert_eq!(split.headers, vec!["Направление", "Бюджет (млн ₽)"]);
        assert_eq!(split.rows[1], vec![Cell::text("Здравоохранение"), Cell::Number(dec!(380))]);
        assert_eq!(report.label, "Отчет_Dashboard");
    }

    #[test]
    fn file_name_stamped_with_date() {
        let date = NaiveDate::from_ymd_opt(2024, 4, 9).unwrap();
        let store = RecordStore::sample();
        let report = russian().users(&store.users);
        assert_eq!(report.file_name(date), "Пользователи_09-04-2024.xlsx");
        assert_eq!(
            export_file_name("Отчет_Dashboard", date),
            "Отчет_Dashboard_09-04-2024.xlsx"
        );
    }

    #[test]
    fn indicators_view_formats_for_screen() {
        let store = RecordStore::sample();
        let sheet = russian().indicators_view(&store.indicators[..1]);
        let row: Vec<String> = sheet.rows[0].iter().map(Cell::display).collect();
        assert_eq!(row[1], "450\u{a0}000\u{a0}000\u{a0}₽");
        assert_eq!(row[3], "94.4%");
        assert_eq!(row[4], "Внимание");
    }

    #[test]
    fn views_are_titled_like_sheets() {
        let store = RecordStore::sample();
        let builder = russian();
        assert_eq!(builder.indicators_view(&store.indicators).name, "Финансовые показатели");
        assert_eq!(builder.users_view(&store.users).name, "Пользователи");

        let english = ReportBuilder::new(Locale::En, Currency::default());
        assert_eq!(english.indicators_view(&store.indicators).name, "Financial indicators");
    }

    #[test]
    fn users_view_has_initials() {
        let store = RecordStore::sample();
        let sheet = ReportBuilder::new(Locale::En, Currency::default()).users_view(&store.users);
        assert_eq!(sheet.rows[1][0], Cell::text("ПМ"));
        assert_eq!(sheet.rows[1][3], Cell::text("GRBS"));
        assert_eq!(sheet.ragged_row(), None);
    }

    #[test]
    fn report_kind_parses() {
        assert_eq!("Dashboard".parse::<ReportKind>().unwrap(), ReportKind::Dashboard);
        assert!("ledger".parse::<ReportKind>().is_err());
    }
}
