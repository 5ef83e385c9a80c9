//! Configuration file
//!
//! ```toml
//! locale = "ru"
//! currency = "RUB"
//! output_dir = "reports"
//! data = "store.json"
//! number_format = "#,##0.00"
//! table_gap = 3
//!
//! [settings]
//! organization = "Министерство финансов"
//! fiscal_year = 2024
//! ```
//!
//! Command-line flags override values from the file. Relative `data` and
//! `output_dir` paths are taken relative to the config file's directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use budgetexec_core::{Currency, Locale, Settings};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub locale: Option<Locale>,
    /// ISO 4217 currency code of the amounts
    pub currency: Option<String>,
    /// Where exported workbooks are written
    pub output_dir: Option<PathBuf>,
    /// JSON record store to load instead of the sample data
    pub data: Option<PathBuf>,
    /// Excel display format of amounts
    pub number_format: Option<String>,
    /// Spaces between terminal table columns
    pub table_gap: Option<usize>,
    pub settings: Settings,
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("in config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(match path.parent() {
            Some(base) => config.relative_to(base),
            None => config,
        })
    }

    /// Anchor relative paths at `base`
    fn relative_to(mut self, base: &Path) -> Self {
        self.data = self.data.map(|p| base.join(p));
        self.output_dir = self.output_dir.map(|p| base.join(p));
        self
    }

    pub fn locale(&self, flag: Option<Locale>) -> Locale {
        flag.or(self.locale).unwrap_or_default()
    }

    pub fn currency(&self) -> Currency {
        self.currency
            .as_deref()
            .map_or_else(Currency::default, Currency::new)
    }

    pub fn output_dir(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn data(&self, flag: Option<PathBuf>) -> Option<PathBuf> {
        flag.or_else(|| self.data.clone())
    }
}
