//! # budgetexec-core
//!
//! Core domain model for the budgetexec budget execution monitor.
//!
//! This crate provides:
//! - Domain types: `User`, `FinancialIndicator`, `BudgetPoint`, `AllocationPoint`
//! - The in-memory `RecordStore` with sample data and CRUD
//! - Facet filtering (`IndicatorFilter`, `UserFilter`) and facet value sets
//! - The execution calculator and its severity tiers
//! - Tabular `Report`s for export, plus the `Renderer` trait
//! - Session/view state (`AppState`) with pure transitions
//!
//! ## Example
//!
//! ```rust
//! use budgetexec_core::{AppState, IndicatorFilter, RecordStore, Severity};
//!
//! let store = RecordStore::sample();
//! let state = AppState::new().login(&store, "anyone@grbs.ru", "secret");
//! assert_eq!(state.current_user.unwrap().id, 1);
//!
//! let q1 = IndicatorFilter::new().period("Q1 2024").apply(&store.indicators);
//! assert_eq!(q1.len(), 2);
//! assert_eq!(q1[0].execution().severity(), Some(Severity::Watch));
//! ```

pub mod execution;
pub mod filter;
pub mod locale;
pub mod model;
pub mod report;
pub mod settings;
pub mod state;
pub mod store;
pub mod summary;

pub use execution::{execution, Execution, Severity};
pub use filter::{Facet, IndicatorFilter, UserFilter};
pub use locale::{Currency, Locale};
pub use model::{AllocationPoint, BudgetPoint, FinancialIndicator, IndicatorId, Role, User, UserId};
pub use report::{export_file_name, Cell, Report, ReportBuilder, ReportKind, Sheet};
pub use settings::Settings;
pub use state::{AppState, Tab};
pub use store::RecordStore;
pub use summary::DashboardSummary;

use thiserror::Error;

// ============================================================================
// Traits
// ============================================================================

/// Output rendering
pub trait Renderer {
    type Output;

    /// Render a report to the output format
    fn render(&self, report: &Report) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Record store and input error
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u32 },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================
