// src/config.rs

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{collections::HashSet, fs, path::Path, time::Duration};
use url::Url;

use crate::fetch::urls::{parse_base_url, WORLD_BANK_INDICATOR_BASE};

pub const DEFAULT_START_YEAR: i32 = 2000;
pub const DEFAULT_END_YEAR: i32 = 2024;
pub const DEFAULT_OUTPUT: &str = "digital_divide_clean.csv";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// One World Bank indicator and the column its values land in.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndicatorSpec {
    /// World Bank indicator code, e.g. `NY.GDP.PCAP.CD`.
    pub code: String,
    /// Output column name for the indicator's values.
    pub column: String,
    /// Human-readable label, only used in logs.
    #[serde(default)]
    pub label: String,
}

impl IndicatorSpec {
    pub fn new(code: &str, column: &str, label: &str) -> Self {
        Self {
            code: code.to_string(),
            column: column.to_string(),
            label: label.to_string(),
        }
    }
}

/// The three indicators the digital-divide dataset is built from.
pub fn default_indicators() -> Vec<IndicatorSpec> {
    vec![
        // % of population using the internet
        IndicatorSpec::new(
            "IT.NET.USER.ZS",
            "internet_users_pct",
            "Internet users (% of population)",
        ),
        // Fixed broadband subscriptions (per 100 people)
        IndicatorSpec::new(
            "IT.NET.BBND.P2",
            "broadband_subs_per100",
            "Fixed broadband subscriptions (per 100)",
        ),
        // GDP per capita, current US$
        IndicatorSpec::new("NY.GDP.PCAP.CD", "gdp_per_capita_usd", "GDP per capita (US$)"),
    ]
}

/// Settings for the indicator pipeline. Every field has a default, so an
/// empty YAML document is a valid config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub indicators: Vec<IndicatorSpec>,
    pub start_year: i32,
    pub end_year: i32,
    pub output: String,
    pub timeout_secs: u64,
    /// Indicator download base, overridable for mirrors.
    pub base_url: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            indicators: default_indicators(),
            start_year: DEFAULT_START_YEAR,
            end_year: DEFAULT_END_YEAR,
            output: DEFAULT_OUTPUT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            base_url: WORLD_BANK_INDICATOR_BASE.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load a YAML config file and validate it.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        let cfg = Self::from_yaml_str(&text).with_context(|| format!("parsing {:?}", path))?;
        Ok(cfg)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        // serde_yaml rejects a fully empty document
        let cfg: PipelineConfig = if text.trim().is_empty() {
            PipelineConfig::default()
        } else {
            serde_yaml::from_str(text)?
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.indicators.is_empty() {
            bail!("at least one indicator must be configured");
        }
        if self.start_year > self.end_year {
            bail!(
                "start_year {} is after end_year {}",
                self.start_year,
                self.end_year
            );
        }
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be at least 1");
        }
        parse_base_url(&self.base_url)?;
        let mut seen = HashSet::new();
        for ind in &self.indicators {
            if ind.code.trim().is_empty() {
                bail!("indicator with empty code (column `{}`)", ind.column);
            }
            if matches!(ind.column.as_str(), "country" | "country_code" | "year") {
                bail!("indicator column `{}` clashes with a key column", ind.column);
            }
            if !seen.insert(ind.column.as_str()) {
                bail!("duplicate indicator column `{}`", ind.column);
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn base_url(&self) -> Result<Url> {
        parse_base_url(&self.base_url)
    }

    pub fn value_columns(&self) -> Vec<String> {
        self.indicators.iter().map(|i| i.column.clone()).collect()
    }
}
