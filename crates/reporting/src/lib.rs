//! Campaign reporting: dimension classification, grouping, metrics
//! aggregation with pluggable revenue strategies, and dashboard views.

pub mod aggregator;
pub mod classifier;
pub mod grouping;
pub mod revenue;
pub mod store;
pub mod views;

pub use aggregator::{aggregate, MetricsAggregator, MetricsSummary, RevenueSummary};
pub use classifier::{
    classify_age_bracket, classify_country, classify_device_platform, classify_gender,
    classify_platform, AgeBracket, Category, Country, DevicePlatform, Gender, Platform,
};
pub use grouping::{
    group_by, group_by_campaign, group_by_combined, group_by_date, group_by_dimension,
    AggregateBucket, Buckets, Classifier, Dimension,
};
pub use revenue::{EstimatedRevenue, MarketSplit, NoRevenue, ReportedRevenue, RevenuePolicy, RevenueStrategy};
pub use store::InsightsStore;
pub use views::{BreakdownKind, DashboardSnapshot, MarketView, RecordRow, ReportViews};
