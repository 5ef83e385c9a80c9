//! WebAssembly bindings for the budget execution dashboard
//!
//! The browser front end holds a single [`Dashboard`]: it owns the record
//! store and the view state, answers the tables and summary cards as plain
//! JS objects and produces `.xlsx` downloads.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use budgetexec_core::{
    filter, AppState, DashboardSummary, Facet, FinancialIndicator, IndicatorId, Locale,
    RecordStore, Renderer, Report, ReportBuilder, ReportKind, Role, Settings, Severity, Tab, User,
    UserId,
};
use budgetexec_render::ExcelRenderer;

/// Initialize panic hook for better error messages in console
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn js_error(message: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&message.to_string())
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(js_error)
}

/// A generated workbook ready to be offered as a download
#[wasm_bindgen]
pub struct ExportFile {
    file_name: String,
    bytes: Vec<u8>,
}

#[wasm_bindgen]
impl ExportFile {
    /// `<label>_<DD-MM-YYYY>.xlsx`
    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> String {
        self.file_name.clone()
    }

    /// Raw bytes of the XLSX file
    #[wasm_bindgen(getter)]
    pub fn bytes(&self) -> js_sys::Uint8Array {
        js_sys::Uint8Array::from(self.bytes.as_slice())
    }

    /// Size of the workbook in bytes
    #[wasm_bindgen(getter)]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Dashboard session running in the browser
#[wasm_bindgen]
pub struct Dashboard {
    store: RecordStore,
    state: AppState,
    builder: ReportBuilder,
    settings: Settings,
}

#[wasm_bindgen]
impl Dashboard {
    /// Create a dashboard over the built-in sample data
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::with_store(RecordStore::sample())
    }

    /// Create a dashboard over a JSON record store
    pub fn from_json(json: &str) -> Result<Dashboard, JsValue> {
        RecordStore::from_json(json)
            .map(Self::with_store)
            .map_err(js_error)
    }

    /// Switch presentation language ("ru" or "en")
    pub fn set_locale(&mut self, locale: &str) -> Result<(), JsValue> {
        self.builder.locale = locale.parse::<Locale>().map_err(js_error)?;
        Ok(())
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Sign in. Credentials are not checked; the first user becomes current.
    pub fn login(&mut self, email: &str, password: &str) -> Result<JsValue, JsValue> {
        self.state = std::mem::take(&mut self.state).login(&self.store, email, password);
        to_js(&self.state.current_user.as_ref().map(|u| self.user_row(u)))
    }

    pub fn logout(&mut self) {
        self.state = std::mem::take(&mut self.state).logout();
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.authenticated
    }

    pub fn active_tab(&self) -> String {
        self.state.active_tab.as_str().to_string()
    }

    /// Title of the active tab in the current locale
    pub fn tab_title(&self) -> String {
        self.builder.locale.tab_title(self.state.active_tab).to_string()
    }

    pub fn set_tab(&mut self, tab: &str) -> Result<(), JsValue> {
        let tab = tab.parse::<Tab>().map_err(js_error)?;
        self.state = std::mem::take(&mut self.state).set_tab(tab);
        Ok(())
    }

    // =========================================================================
    // Filters ("all" clears a facet)
    // =========================================================================

    pub fn set_period(&mut self, period: &str) {
        self.state = std::mem::take(&mut self.state).set_period(Facet::parse_text(period));
    }

    pub fn set_indicator_department(&mut self, department: &str) {
        self.state = std::mem::take(&mut self.state)
            .set_indicator_department(Facet::parse_text(department));
    }

    pub fn set_role(&mut self, role: &str) -> Result<(), JsValue> {
        let role = Facet::parse_role(role).map_err(js_error)?;
        self.state = std::mem::take(&mut self.state).set_role(role);
        Ok(())
    }

    pub fn set_user_department(&mut self, department: &str) {
        self.state =
            std::mem::take(&mut self.state).set_user_department(Facet::parse_text(department));
    }

    /// Values each filter dropdown offers, in first-occurrence order
    pub fn facets(&self) -> Result<JsValue, JsValue> {
        to_js(&self.facet_lists())
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Users matching the user filter
    pub fn users(&self) -> Result<JsValue, JsValue> {
        to_js(&self.user_rows())
    }

    /// Indicators matching the indicator filter, with execution and status
    pub fn indicators(&self) -> Result<JsValue, JsValue> {
        to_js(&self.indicator_rows())
    }

    /// Summary cards for the filtered indicators
    pub fn summary(&self) -> Result<JsValue, JsValue> {
        to_js(&self.summary_data())
    }

    /// Monthly plan/fact series for the line chart
    pub fn budget_series(&self) -> Result<JsValue, JsValue> {
        to_js(&self.store.budget)
    }

    /// Allocation by direction for the pie chart
    pub fn allocation(&self) -> Result<JsValue, JsValue> {
        to_js(&self.store.allocation)
    }

    pub fn settings(&self) -> Result<JsValue, JsValue> {
        to_js(&self.settings)
    }

    pub fn update_settings(&mut self, settings: JsValue) -> Result<(), JsValue> {
        self.settings = serde_wasm_bindgen::from_value(settings).map_err(js_error)?;
        Ok(())
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Add a user from `{name, email, role, department}`, returning its id
    pub fn add_user(&mut self, user: JsValue) -> Result<UserId, JsValue> {
        let draft: UserDraft = serde_wasm_bindgen::from_value(user).map_err(js_error)?;
        self.insert_user(draft).map_err(js_error)
    }

    pub fn remove_user(&mut self, id: UserId) -> Result<(), JsValue> {
        self.store.remove_user(id).map(drop).map_err(js_error)
    }

    /// Add an indicator from `{name, planned, actual, period, responsible,
    /// department}`, returning its id
    pub fn add_indicator(&mut self, indicator: JsValue) -> Result<IndicatorId, JsValue> {
        let draft: IndicatorDraft = serde_wasm_bindgen::from_value(indicator).map_err(js_error)?;
        self.insert_indicator(draft).map_err(js_error)
    }

    pub fn remove_indicator(&mut self, id: IndicatorId) -> Result<(), JsValue> {
        self.store.remove_indicator(id).map(drop).map_err(js_error)
    }

    /// Record store as JSON, for saving
    pub fn to_json(&self) -> Result<String, JsValue> {
        self.store.to_json().map_err(js_error)
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Workbook of the filtered indicators
    pub fn export_indicators(&self) -> Result<ExportFile, JsValue> {
        self.export(ReportKind::Indicators, today()).map_err(js_error)
    }

    /// Workbook of every user, regardless of the user filter
    pub fn export_users(&self) -> Result<ExportFile, JsValue> {
        self.export(ReportKind::Users, today()).map_err(js_error)
    }

    /// Workbook of both chart datasets
    pub fn export_dashboard(&self) -> Result<ExportFile, JsValue> {
        self.export(ReportKind::Dashboard, today()).map_err(js_error)
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

// =============================================================================
// JS-facing records
// =============================================================================

#[derive(Debug, Serialize)]
struct UserRow {
    id: UserId,
    name: String,
    initials: String,
    email: String,
    role: Role,
    role_label: String,
    department: String,
}

#[derive(Debug, Serialize)]
struct IndicatorRow {
    id: IndicatorId,
    name: String,
    planned: String,
    actual: String,
    planned_text: String,
    actual_text: String,
    /// Rounded percentage, absent when nothing was planned
    execution: Option<String>,
    execution_text: String,
    severity: Option<Severity>,
    severity_label: Option<String>,
    period: String,
    department: String,
    responsible: String,
}

#[derive(Debug, Serialize)]
struct SummaryData {
    indicator_count: usize,
    total_planned: String,
    total_actual: String,
    execution_text: String,
    deviation: Option<String>,
    on_track: usize,
    watch: usize,
    at_risk: usize,
    not_applicable: usize,
    grbs_count: usize,
}

#[derive(Debug, Serialize)]
struct FacetLists {
    periods: Vec<String>,
    indicator_departments: Vec<String>,
    user_departments: Vec<String>,
    roles: Vec<Role>,
}

#[derive(Debug, Deserialize)]
struct UserDraft {
    name: String,
    email: String,
    role: Role,
    #[serde(default)]
    department: String,
}

#[derive(Debug, Deserialize)]
struct IndicatorDraft {
    name: String,
    planned: Decimal,
    actual: Decimal,
    period: String,
    #[serde(default)]
    responsible: String,
    #[serde(default)]
    department: String,
}

// =============================================================================
// Internals (no JsValue, usable from native tests)
// =============================================================================

impl Dashboard {
    fn with_store(store: RecordStore) -> Self {
        Self {
            store,
            state: AppState::new(),
            builder: ReportBuilder::default(),
            settings: Settings::default(),
        }
    }

    fn user_row(&self, user: &User) -> UserRow {
        UserRow {
            id: user.id,
            name: user.name.clone(),
            initials: user.initials(),
            email: user.email.clone(),
            role: user.role,
            role_label: self.builder.locale.role_label(user.role).to_string(),
            department: user.department.clone(),
        }
    }

    fn user_rows(&self) -> Vec<UserRow> {
        self.state
            .user_filter
            .apply(&self.store.users)
            .into_iter()
            .map(|u| self.user_row(u))
            .collect()
    }

    fn indicator_rows(&self) -> Vec<IndicatorRow> {
        let locale = self.builder.locale;
        let currency = &self.builder.currency;
        self.state
            .indicator_filter
            .apply(&self.store.indicators)
            .into_iter()
            .map(|i| {
                let execution = i.execution();
                IndicatorRow {
                    id: i.id,
                    name: i.name.clone(),
                    planned: i.planned.to_string(),
                    actual: i.actual.to_string(),
                    planned_text: locale.format_money(i.planned, currency),
                    actual_text: locale.format_money(i.actual, currency),
                    execution: execution.percent().map(|_| execution.to_string()),
                    execution_text: locale.execution_text(execution),
                    severity: execution.severity(),
                    severity_label: execution
                        .severity()
                        .map(|s| locale.severity_label(s).to_string()),
                    period: i.period.clone(),
                    department: i.department.clone(),
                    responsible: i.responsible.clone(),
                }
            })
            .collect()
    }

    fn summary_data(&self) -> SummaryData {
        let locale = self.builder.locale;
        let currency = &self.builder.currency;
        let view = self.state.indicator_filter.apply(&self.store.indicators);
        let summary = DashboardSummary::compute(view, &self.store.users);
        SummaryData {
            indicator_count: summary.indicator_count,
            total_planned: locale.format_money(summary.total_planned, currency),
            total_actual: locale.format_money(summary.total_actual, currency),
            execution_text: locale.execution_text(summary.overall_execution),
            deviation: summary.deviation.map(|d| format!("{d:+}")),
            on_track: summary.on_track,
            watch: summary.watch,
            at_risk: summary.at_risk,
            not_applicable: summary.not_applicable,
            grbs_count: summary.grbs_count,
        }
    }

    fn facet_lists(&self) -> FacetLists {
        FacetLists {
            periods: filter::periods(&self.store.indicators),
            indicator_departments: filter::indicator_departments(&self.store.indicators),
            user_departments: filter::user_departments(&self.store.users),
            roles: filter::roles(&self.store.users),
        }
    }

    fn insert_user(&mut self, draft: UserDraft) -> Result<UserId, budgetexec_core::CoreError> {
        self.store.add_user(User::new(
            draft.name,
            draft.email,
            draft.role,
            draft.department,
        ))
    }

    fn insert_indicator(
        &mut self,
        draft: IndicatorDraft,
    ) -> Result<IndicatorId, budgetexec_core::CoreError> {
        self.store.add_indicator(
            FinancialIndicator::new(draft.name, draft.planned, draft.actual)
                .period(draft.period)
                .responsible(draft.responsible)
                .department(draft.department),
        )
    }

    fn report(&self, kind: ReportKind) -> Report {
        match kind {
            ReportKind::Indicators => self
                .builder
                .indicators(self.state.indicator_filter.apply(&self.store.indicators)),
            ReportKind::Users => self.builder.users(&self.store.users),
            ReportKind::Dashboard => self
                .builder
                .dashboard(&self.store.budget, &self.store.allocation),
        }
    }

    fn export(
        &self,
        kind: ReportKind,
        date: NaiveDate,
    ) -> Result<ExportFile, budgetexec_core::RenderError> {
        let report = self.report(kind);
        let bytes = ExcelRenderer::new().render(&report)?;
        Ok(ExportFile {
            file_name: report.file_name(date),
            bytes,
        })
    }
}
