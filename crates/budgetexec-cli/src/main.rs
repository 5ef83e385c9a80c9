//! budgetexec CLI - Budget Execution Monitor
//!
//! Command-line interface for listing, summarising and exporting planned vs.
//! actual spending.

mod config;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use budgetexec_core::{
    filter, AppState, DashboardSummary, Facet, Locale, RecordStore, ReportBuilder, ReportKind,
    Role, Severity,
};
use budgetexec_render::{ExcelRenderer, TextRenderer};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "budgetexec")]
#[command(author, version, about = "Budget execution monitor", long_about = None)]
struct Cli {
    /// Verbose output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file
    #[arg(long, value_name = "FILE", env = "BUDGETEXEC_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// JSON record store (defaults to the built-in sample data)
    #[arg(long, value_name = "FILE", global = true)]
    data: Option<PathBuf>,

    /// Presentation language (ru, en)
    #[arg(long, global = true)]
    locale: Option<Locale>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in (any credentials are accepted)
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// List users
    Users {
        /// Role to show ("all" for every role)
        #[arg(long, default_value = filter::ALL)]
        role: String,

        /// Department to show ("all" for every department)
        #[arg(long, default_value = filter::ALL)]
        department: String,
    },

    /// List financial indicators with their execution
    Indicators {
        #[command(flatten)]
        facets: IndicatorFacets,
    },

    /// Show the values each filter can take
    Facets,

    /// Headline figures for the dashboard
    Summary {
        #[command(flatten)]
        facets: IndicatorFacets,
    },

    /// Show organization settings
    Settings,

    /// Export a report as an Excel workbook
    Export {
        /// Report to export
        #[arg(value_enum)]
        report: ExportTarget,

        #[command(flatten)]
        facets: IndicatorFacets,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Date stamp for the file name (DD-MM-YYYY, default today)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// Write cells without header styling, frozen header or autofit
        #[arg(long)]
        plain: bool,
    },
}

#[derive(clap::Args)]
struct IndicatorFacets {
    /// Period to show, e.g. "Q1 2024" ("all" for every period)
    #[arg(long, default_value = filter::ALL)]
    period: String,

    /// Department to show ("all" for every department)
    #[arg(long, default_value = filter::ALL)]
    department: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportTarget {
    /// Filtered financial indicators
    Indicators,
    /// Full user list
    Users,
    /// Dashboard chart datasets
    Dashboard,
}

impl From<ExportTarget> for ReportKind {
    fn from(target: ExportTarget) -> Self {
        match target {
            ExportTarget::Indicators => ReportKind::Indicators,
            ExportTarget::Users => ReportKind::Users,
            ExportTarget::Dashboard => ReportKind::Dashboard,
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%d-%m-%Y")
        .map_err(|e| format!("expected DD-MM-YYYY: {e}"))
}

/// Everything a command needs, resolved from config and flags
struct App {
    store: RecordStore,
    config: Config,
    builder: ReportBuilder,
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let store = match config.data(cli.data.clone()) {
        Some(path) => RecordStore::load(&path)
            .with_context(|| format!("failed to load record store {}", path.display()))?,
        None => RecordStore::sample(),
    };
    let builder = ReportBuilder::new(config.locale(cli.locale), config.currency());
    let ctx = App {
        store,
        config,
        builder,
        json: cli.json,
    };

    match cli.command {
        Some(Commands::Login { email, password }) => cmd_login(&ctx, &email, &password),
        Some(Commands::Users { role, department }) => cmd_users(&ctx, &role, &department),
        Some(Commands::Indicators { facets }) => cmd_indicators(&ctx, &facets),
        Some(Commands::Facets) => cmd_facets(&ctx),
        Some(Commands::Summary { facets }) => cmd_summary(&ctx, &facets),
        Some(Commands::Settings) => cmd_settings(&ctx),
        Some(Commands::Export {
            report,
            facets,
            out_dir,
            date,
            plain,
        }) => cmd_export(&ctx, report.into(), &facets, out_dir, date, plain),
        None => {
            println!("budgetexec - Budget Execution Monitor");
            println!("Run with --help for usage information");
            Ok(())
        }
    }
}

impl App {
    fn table(&self) -> TextRenderer {
        let renderer = TextRenderer::new();
        match self.config.table_gap {
            Some(gap) => renderer.gap(gap),
            None => renderer,
        }
    }

    fn workbook(&self, plain: bool) -> ExcelRenderer {
        let mut renderer = ExcelRenderer::new();
        if let Some(format) = &self.config.number_format {
            renderer = renderer.number_format(format.as_str());
        }
        if plain {
            renderer = renderer.plain();
        }
        renderer
    }
}

/// View state after applying the indicator facets
fn indicator_state(facets: &IndicatorFacets) -> AppState {
    AppState::new()
        .set_period(Facet::parse_text(&facets.period))
        .set_indicator_department(Facet::parse_text(&facets.department))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_login(ctx: &App, email: &str, password: &str) -> Result<()> {
    let state = AppState::new().login(&ctx.store, email, password);
    if ctx.json {
        return print_json(&state);
    }
    match &state.current_user {
        Some(user) => {
            let locale = ctx.builder.locale;
            println!(
                "Signed in as {} [{}] {} <{}>",
                user.name,
                user.initials(),
                locale.role_label(user.role),
                user.email
            );
            println!("{}", user.department);
        }
        None => println!("Signed in (no users in the record store)"),
    }
    Ok(())
}

fn cmd_users(ctx: &App, role: &str, department: &str) -> Result<()> {
    let state = AppState::new()
        .set_role(Facet::parse_role(role)?)
        .set_user_department(Facet::parse_text(department));
    let users = state.user_filter.apply(&ctx.store.users);
    if ctx.json {
        return print_json(&users);
    }
    print!("{}", ctx.table().render_sheet(&ctx.builder.users_view(users)));
    Ok(())
}

fn cmd_indicators(ctx: &App, facets: &IndicatorFacets) -> Result<()> {
    let state = indicator_state(facets);
    let indicators = state.indicator_filter.apply(&ctx.store.indicators);
    if ctx.json {
        let rows: Vec<serde_json::Value> = indicators
            .iter()
            .map(|i| {
                let execution = i.execution();
                serde_json::json!({
                    "indicator": i,
                    "execution": execution.percent(),
                    "severity": execution.severity(),
                })
            })
            .collect();
        return print_json(&rows);
    }
    print!("{}", ctx.table().render_sheet(&ctx.builder.indicators_view(indicators)));
    Ok(())
}

fn cmd_facets(ctx: &App) -> Result<()> {
    let store = &ctx.store;
    let periods = filter::periods(&store.indicators);
    let indicator_departments = filter::indicator_departments(&store.indicators);
    let user_departments = filter::user_departments(&store.users);
    let roles: Vec<Role> = filter::roles(&store.users);
    if ctx.json {
        return print_json(&serde_json::json!({
            "periods": periods,
            "indicator_departments": indicator_departments,
            "user_departments": user_departments,
            "roles": roles,
        }));
    }
    let locale = ctx.builder.locale;
    println!("periods: {}", periods.join(", "));
    println!("indicator departments: {}", indicator_departments.join(", "));
    println!("user departments: {}", user_departments.join(", "));
    let role_labels: Vec<String> = roles
        .iter()
        .map(|r| format!("{} ({})", r.code(), locale.role_label(*r)))
        .collect();
    println!("roles: {}", role_labels.join(", "));
    Ok(())
}

fn cmd_summary(ctx: &App, facets: &IndicatorFacets) -> Result<()> {
    let state = indicator_state(facets);
    let view = state.indicator_filter.apply(&ctx.store.indicators);
    let summary = DashboardSummary::compute(view, &ctx.store.users);
    if ctx.json {
        return print_json(&summary);
    }

    let locale = ctx.builder.locale;
    let currency = &ctx.builder.currency;
    println!("indicators:   {}", summary.indicator_count);
    println!("planned:      {}", locale.format_money(summary.total_planned, currency));
    println!("actual:       {}", locale.format_money(summary.total_actual, currency));
    println!("execution:    {}", locale.execution_text(summary.overall_execution));
    match summary.deviation {
        Some(deviation) => println!("deviation:    {deviation:+}"),
        None => println!("deviation:    {}", locale.not_applicable()),
    }
    for severity in Severity::ALL {
        println!(
            "{:<13} {}",
            format!("{}:", locale.severity_label(severity)),
            summary.count(severity)
        );
    }
    println!("grbs users:   {}", summary.grbs_count);
    Ok(())
}

fn cmd_settings(ctx: &App) -> Result<()> {
    let settings = &ctx.config.settings;
    if ctx.json {
        return print_json(settings);
    }
    println!("organization:        {}", settings.organization);
    println!("fiscal year:         {}", settings.fiscal_year);
    println!("email notifications: {}", settings.email_notifications);
    println!("scheduled reports:   {}", settings.scheduled_reports);
    Ok(())
}

fn cmd_export(
    ctx: &App,
    kind: ReportKind,
    facets: &IndicatorFacets,
    out_dir: Option<PathBuf>,
    date: Option<NaiveDate>,
    plain: bool,
) -> Result<()> {
    let store = &ctx.store;
    let report = match kind {
        ReportKind::Indicators => {
            let state = indicator_state(facets);
            ctx.builder
                .indicators(state.indicator_filter.apply(&store.indicators))
        }
        ReportKind::Users => ctx.builder.users(&store.users),
        ReportKind::Dashboard => ctx.builder.dashboard(&store.budget, &store.allocation),
    };

    let dir = ctx.config.output_dir(out_dir);
    let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
    let path = ctx
        .workbook(plain)
        .export_to_dir(&report, &dir, date)
        .with_context(|| format!("failed to export '{}' to {}", report.label, dir.display()))?;

    if ctx.json {
        return print_json(&serde_json::json!({
            "path": path,
            "sheets": report.sheets.iter().map(|s| (&s.name, s.total_rows())).collect::<Vec<_>>(),
        }));
    }
    println!("Exported: {}", path.display());
    Ok(())
}
