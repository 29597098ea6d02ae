use serde::Deserialize;

use crate::error::{InsightsError, InsightsResult};

/// Root application configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `ADPULSE__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub revenue: RevenueConfig,
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// How revenue and ROAS are derived for an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenueMode {
    /// No revenue block in summaries.
    None,
    /// Sum of reported purchase values only.
    #[default]
    Reported,
    /// Reported values, falling back to a flat per-purchase estimate.
    Estimated,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RevenueConfig {
    #[serde(default)]
    pub mode: RevenueMode,
    /// Assumed share of purchases from the India market.
    #[serde(default = "default_india_share")]
    pub india_share: f64,
    /// Assumed share of purchases from the US market.
    #[serde(default = "default_us_share")]
    pub us_share: f64,
    #[serde(default)]
    pub india_unit_price: f64,
    #[serde(default)]
    pub us_unit_price: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectorConfig {
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportConfig {
    /// Emit every category of a breakdown, including empty ones.
    #[serde(default)]
    pub complete_categories: bool,
}

fn default_india_share() -> f64 {
    0.8
}
fn default_us_share() -> f64 {
    0.2
}
fn default_max_concurrent_fetches() -> usize {
    8
}

/// Upper bound on `collector.max_concurrent_fetches`.
pub const MAX_CONCURRENT_FETCHES: usize = 256;

impl Default for RevenueConfig {
    fn default() -> Self {
        Self {
            mode: RevenueMode::default(),
            india_share: default_india_share(),
            us_share: default_us_share(),
            india_unit_price: 0.0,
            us_unit_price: 0.0,
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: default_max_concurrent_fetches(),
        }
    }
}

impl RevenueConfig {
    /// Blended price of one purchase under the assumed market split.
    pub fn flat_unit_price(&self) -> f64 {
        self.india_share * self.india_unit_price + self.us_share * self.us_unit_price
    }
}

impl AppConfig {
    /// Load configuration. `path` names a required config file; without it an
    /// `adpulse.toml` in the working directory is used when present.
    pub fn load(path: Option<&str>) -> InsightsResult<Self> {
        let file = match path {
            Some(path) => config::File::with_name(path).required(true),
            None => config::File::with_name("adpulse").required(false),
        };
        let builder = config::Config::builder().add_source(file).add_source(
            config::Environment::with_prefix("ADPULSE")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> InsightsResult<()> {
        let revenue = &self.revenue;
        for (name, share) in [("india_share", revenue.india_share), ("us_share", revenue.us_share)] {
            if !(0.0..=1.0).contains(&share) {
                return Err(InsightsError::Config(format!(
                    "revenue.{name} must be within [0, 1], got {share}"
                )));
            }
        }
        if revenue.india_share + revenue.us_share > 1.0 + f64::EPSILON {
            return Err(InsightsError::Config(
                "revenue market shares sum above 1".into(),
            ));
        }
        for (name, price) in [
            ("india_unit_price", revenue.india_unit_price),
            ("us_unit_price", revenue.us_unit_price),
        ] {
            if !price.is_finite() || price < 0.0 {
                return Err(InsightsError::Config(format!(
                    "revenue.{name} must be a non-negative number, got {price}"
                )));
            }
        }
        if revenue.mode == RevenueMode::Estimated && revenue.flat_unit_price() <= 0.0 {
            return Err(InsightsError::Config(
                "estimated revenue needs a positive unit price for at least one market".into(),
            ));
        }
        let fetches = self.collector.max_concurrent_fetches;
        if !(1..=MAX_CONCURRENT_FETCHES).contains(&fetches) {
            return Err(InsightsError::Config(format!(
                "collector.max_concurrent_fetches must be within [1, {MAX_CONCURRENT_FETCHES}], got {fetches}"
            )));
        }
        Ok(())
    }
}
