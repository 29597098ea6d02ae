//! Dashboard views: grouping and aggregation composed into the shapes the
//! presentation layer renders.

use std::collections::BTreeMap;

use adpulse_core::normalize::{display_ratios, RecordRatios};
use adpulse_core::{Breakdown, CampaignRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregator::{MetricsAggregator, MetricsSummary};
use crate::classifier::{AgeBracket, Category, DevicePlatform, Gender};
use crate::grouping::{
    group_by, group_by_campaign, group_by_combined, group_by_date, into_buckets, Dimension,
};
use crate::revenue::{NoRevenue, RevenuePolicy};

/// Country and platform slices of one account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketView {
    pub complete_overall: MetricsSummary,
    /// `india`, `us`, `unknown`.
    pub by_country: BTreeMap<String, MetricsSummary>,
    /// `android`, `ios`, `unknown`.
    pub by_platform: BTreeMap<String, MetricsSummary>,
    /// `india_android`, `us_ios`, ...
    pub by_country_platform: BTreeMap<String, MetricsSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: String,
    pub summary: MetricsSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignRow {
    pub campaign_id: String,
    pub campaign_name: Option<String>,
    pub summary: MetricsSummary,
}

/// One raw row as the table view shows it, with upstream ratios preferred.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordRow<'a> {
    pub date: &'a str,
    pub campaign_id: Option<&'a str>,
    pub campaign_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<Breakdown<'a>>,
    pub spend: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub ratios: RecordRatios,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownKind {
    Age,
    Gender,
    Device,
}

impl BreakdownKind {
    pub fn dimension(&self) -> Dimension {
        match self {
            Self::Age => Dimension::Age,
            Self::Gender => Dimension::Gender,
            Self::Device => Dimension::Device,
        }
    }

    /// Every category key of the closed set, in display order.
    pub fn category_keys(&self) -> Vec<&'static str> {
        match self {
            Self::Age => keys_of::<AgeBracket>(),
            Self::Gender => keys_of::<Gender>(),
            Self::Device => keys_of::<DevicePlatform>(),
        }
    }
}

/// Everything one dashboard page shows for an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub snapshot_id: Uuid,
    pub account: String,
    pub record_count: usize,
    pub markets: MarketView,
    pub daily: Vec<DailyPoint>,
    pub campaigns: Vec<CampaignRow>,
    pub generated_at: DateTime<Utc>,
}

/// View builder over one revenue strategy.
#[derive(Debug, Clone, Default)]
pub struct ReportViews<P = NoRevenue> {
    aggregator: MetricsAggregator<P>,
}

impl ReportViews<NoRevenue> {
    pub fn new() -> Self {
        Self {
            aggregator: MetricsAggregator::new(),
        }
    }
}

impl<P: RevenuePolicy> ReportViews<P> {
    pub fn with_aggregator(aggregator: MetricsAggregator<P>) -> Self {
        Self { aggregator }
    }

    pub fn aggregator(&self) -> &MetricsAggregator<P> {
        &self.aggregator
    }

    /// `complete_overall`: the whole unfiltered record set.
    pub fn overall(&self, records: &[CampaignRecord]) -> MetricsSummary {
        self.aggregator.aggregate(records)
    }

    /// Per-market overalls come from single-dimension groupings; only the
    /// cross-tab uses combined buckets.
    pub fn markets(&self, records: &[CampaignRecord]) -> MarketView {
        let by_country = group_by(records, &Dimension::Country);
        let by_platform = group_by(records, &Dimension::Platform);
        let combined = group_by_combined(records, &[&Dimension::Country, &Dimension::Platform]);

        MarketView {
            complete_overall: self.overall(records),
            by_country: self.aggregator.aggregate_buckets(&by_country),
            by_platform: self.aggregator.aggregate_buckets(&by_platform),
            by_country_platform: self.aggregator.aggregate_buckets(&combined),
        }
    }

    /// One point per distinct date, oldest first.
    pub fn daily_series(&self, records: &[CampaignRecord]) -> Vec<DailyPoint> {
        into_buckets(group_by_date(records))
            .into_iter()
            .map(|bucket| DailyPoint {
                summary: self.aggregator.aggregate(bucket.records),
                date: bucket.bucket_key,
            })
            .collect()
    }

    /// Row-level table, oldest first, in input order within a day.
    pub fn record_table<'a>(&self, records: &'a [CampaignRecord]) -> Vec<RecordRow<'a>> {
        let mut rows: Vec<RecordRow<'a>> = records
            .iter()
            .map(|record| RecordRow {
                date: &record.date,
                campaign_id: record.campaign_key(),
                campaign_name: record.campaign_name.as_deref(),
                breakdown: record.breakdown(),
                spend: record.spend,
                impressions: record.impressions,
                clicks: record.clicks,
                ratios: display_ratios(record),
            })
            .collect();
        rows.sort_by(|a, b| a.date.cmp(b.date));
        rows
    }

    /// Campaign-level rows, highest spend first.
    pub fn campaign_table(&self, records: &[CampaignRecord]) -> Vec<CampaignRow> {
        let mut rows: Vec<CampaignRow> = group_by_campaign(records)
            .into_iter()
            .map(|(campaign_id, bucket)| CampaignRow {
                summary: self.aggregator.aggregate(bucket.records),
                campaign_name: bucket.name,
                campaign_id,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.summary
                .total_spend
                .total_cmp(&a.summary.total_spend)
                .then_with(|| a.campaign_id.cmp(&b.campaign_id))
        });
        rows
    }

    /// Age, gender or device breakdown. With `complete`, categories without
    /// records appear with a zero summary so chart legends stay stable.
    pub fn breakdown(
        &self,
        records: &[CampaignRecord],
        kind: BreakdownKind,
        complete: bool,
    ) -> BTreeMap<String, MetricsSummary> {
        let buckets = group_by(records, &kind.dimension());
        let mut summaries = self.aggregator.aggregate_buckets(&buckets);
        if complete {
            for key in kind.category_keys() {
                summaries
                    .entry(key.to_owned())
                    .or_insert_with(|| self.aggregator.aggregate(std::iter::empty::<&CampaignRecord>()));
            }
        }
        summaries
    }

    pub fn snapshot(&self, account: &str, records: &[CampaignRecord]) -> DashboardSnapshot {
        DashboardSnapshot {
            snapshot_id: Uuid::new_v4(),
            account: account.to_owned(),
            record_count: records.len(),
            markets: self.markets(records),
            daily: self.daily_series(records),
            campaigns: self.campaign_table(records),
            generated_at: Utc::now(),
        }
    }
}

fn keys_of<C: Category>() -> Vec<&'static str> {
    C::ALL.iter().map(Category::key).collect()
}
