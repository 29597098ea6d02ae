//! Revenue and ROAS strategies, injected into the aggregator per account.

use adpulse_core::config::{RevenueConfig, RevenueMode};
use serde::{Deserialize, Serialize};

/// What the aggregator collected for a bucket, before any revenue policy.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RevenueInputs {
    /// Sum of reported purchase values.
    pub reported: f64,
    pub purchases: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevenueFigure {
    pub revenue: f64,
    /// `true` when the figure is a placeholder estimate, not reported revenue.
    pub is_estimated: bool,
}

impl RevenueFigure {
    pub fn reported(revenue: f64) -> Self {
        Self {
            revenue,
            is_estimated: false,
        }
    }
}

pub trait RevenuePolicy {
    /// `None` means this account has no revenue concept at all.
    fn resolve(&self, inputs: &RevenueInputs) -> Option<RevenueFigure>;
}

/// Accounts without revenue tracking.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRevenue;

impl RevenuePolicy for NoRevenue {
    fn resolve(&self, _inputs: &RevenueInputs) -> Option<RevenueFigure> {
        None
    }
}

/// Reported purchase values only.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportedRevenue;

impl RevenuePolicy for ReportedRevenue {
    fn resolve(&self, inputs: &RevenueInputs) -> Option<RevenueFigure> {
        Some(RevenueFigure::reported(inputs.reported))
    }
}

/// Assumed split of purchases between the two markets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketSplit {
    pub india_share: f64,
    pub us_share: f64,
}

impl Default for MarketSplit {
    fn default() -> Self {
        Self {
            india_share: 0.8,
            us_share: 0.2,
        }
    }
}

/// Reported revenue when there is any; otherwise `purchases × flat unit price`,
/// flagged as an estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatedRevenue {
    flat_unit_price: f64,
}

impl EstimatedRevenue {
    pub fn new(split: MarketSplit, india_unit_price: f64, us_unit_price: f64) -> Self {
        Self {
            flat_unit_price: split.india_share * india_unit_price + split.us_share * us_unit_price,
        }
    }

    pub fn flat_unit_price(&self) -> f64 {
        self.flat_unit_price
    }
}

impl RevenuePolicy for EstimatedRevenue {
    fn resolve(&self, inputs: &RevenueInputs) -> Option<RevenueFigure> {
        if inputs.reported > 0.0 {
            return Some(RevenueFigure::reported(inputs.reported));
        }
        if inputs.purchases == 0 {
            return Some(RevenueFigure::reported(0.0));
        }
        Some(RevenueFigure {
            revenue: inputs.purchases as f64 * self.flat_unit_price,
            is_estimated: true,
        })
    }
}

/// Configuration-selected strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RevenueStrategy {
    None,
    Reported,
    Estimated(EstimatedRevenue),
}

impl RevenueStrategy {
    pub fn from_config(config: &RevenueConfig) -> Self {
        match config.mode {
            RevenueMode::None => Self::None,
            RevenueMode::Reported => Self::Reported,
            RevenueMode::Estimated => Self::Estimated(EstimatedRevenue::new(
                MarketSplit {
                    india_share: config.india_share,
                    us_share: config.us_share,
                },
                config.india_unit_price,
                config.us_unit_price,
            )),
        }
    }
}

impl RevenuePolicy for RevenueStrategy {
    fn resolve(&self, inputs: &RevenueInputs) -> Option<RevenueFigure> {
        match self {
            Self::None => NoRevenue.resolve(inputs),
            Self::Reported => ReportedRevenue.resolve(inputs),
            Self::Estimated(estimated) => estimated.resolve(inputs),
        }
    }
}
