//! Metrics aggregator: one pass over a bucket, summing base counters and
//! deriving ratios. Every zero denominator yields `0.0`.

use std::collections::BTreeMap;

use adpulse_core::normalize::{extract_action_revenue, extract_action_value};
use adpulse_core::{ActionType, CampaignRecord};
use serde::{Deserialize, Serialize};

use crate::grouping::Buckets;
use crate::revenue::{NoRevenue, RevenueInputs, RevenuePolicy};

/// Derived summary of one bucket. `Default` is the all-zero summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub record_count: u64,
    pub total_spend: f64,
    pub total_impressions: u64,
    pub total_clicks: u64,
    pub total_purchases: u64,
    pub total_add_to_cart: u64,
    pub total_initiate_checkout: u64,
    pub total_registrations: u64,
    pub total_installs: u64,
    /// Percent.
    pub average_ctr: f64,
    pub average_cpc: f64,
    pub average_cpm: f64,
    pub cost_per_purchase: f64,
    /// Purchases per click, percent.
    pub conversion_rate: f64,
    pub cost_per_install: f64,
    pub cost_per_registration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<RevenueSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevenueSummary {
    pub revenue: f64,
    /// `revenue / spend`.
    pub roas: f64,
    pub is_estimated: bool,
}

/// Aggregator with an injected revenue strategy.
#[derive(Debug, Clone, Default)]
pub struct MetricsAggregator<P = NoRevenue> {
    policy: P,
}

impl MetricsAggregator<NoRevenue> {
    pub fn new() -> Self {
        Self { policy: NoRevenue }
    }
}

impl<P: RevenuePolicy> MetricsAggregator<P> {
    pub fn with_policy(policy: P) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn aggregate<'a>(&self, records: impl IntoIterator<Item = &'a CampaignRecord>) -> MetricsSummary {
        let mut summary = MetricsSummary::default();
        let mut reported_revenue = 0.0;

        for record in records {
            let actions = Some(record.actions.as_slice());
            summary.record_count += 1;
            summary.total_spend += record.spend;
            add_count(&mut summary.total_impressions, record.impressions);
            add_count(&mut summary.total_clicks, record.clicks);
            for (total, action) in [
                (&mut summary.total_purchases, ActionType::Purchase),
                (&mut summary.total_add_to_cart, ActionType::AddToCart),
                (&mut summary.total_initiate_checkout, ActionType::InitiateCheckout),
                (&mut summary.total_registrations, ActionType::CompleteRegistration),
                (&mut summary.total_installs, ActionType::MobileAppInstall),
            ] {
                add_count(total, extract_action_value(actions, action.as_str()));
            }
            reported_revenue += extract_action_revenue(actions, ActionType::Purchase.as_str());
        }

        let spend = summary.total_spend;
        let impressions = summary.total_impressions as f64;
        let clicks = summary.total_clicks as f64;
        let purchases = summary.total_purchases as f64;

        summary.average_ctr = if impressions > 0.0 {
            clicks / impressions * 100.0
        } else {
            0.0
        };
        summary.average_cpc = ratio(spend, clicks);
        summary.average_cpm = if impressions > 0.0 {
            spend / impressions * 1000.0
        } else {
            0.0
        };
        summary.cost_per_purchase = ratio(spend, purchases);
        summary.conversion_rate = if clicks > 0.0 {
            purchases / clicks * 100.0
        } else {
            0.0
        };
        summary.cost_per_install = ratio(spend, summary.total_installs as f64);
        summary.cost_per_registration = ratio(spend, summary.total_registrations as f64);

        let inputs = RevenueInputs {
            reported: reported_revenue,
            purchases: summary.total_purchases,
        };
        summary.revenue = self.policy.resolve(&inputs).map(|figure| RevenueSummary {
            revenue: figure.revenue,
            roas: ratio(figure.revenue, spend),
            is_estimated: figure.is_estimated,
        });

        summary
    }

    /// Aggregate every bucket of a grouping, keeping its keys.
    pub fn aggregate_buckets(&self, buckets: &Buckets<'_>) -> BTreeMap<String, MetricsSummary> {
        buckets
            .iter()
            .map(|(key, records)| (key.clone(), self.aggregate(records.iter().copied())))
            .collect()
    }
}

/// Aggregate with no revenue strategy.
pub fn aggregate<'a>(records: impl IntoIterator<Item = &'a CampaignRecord>) -> MetricsSummary {
    MetricsAggregator::new().aggregate(records)
}

/// Counters saturate at `u64::MAX` instead of wrapping.
fn add_count(total: &mut u64, value: u64) {
    *total = total.saturating_add(value);
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::group_by_date;
    use crate::revenue::{EstimatedRevenue, MarketSplit, ReportedRevenue};
    use adpulse_core::ActionEntry;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn row(date: &str, spend: f64, impressions: u64, clicks: u64, purchases: &str) -> CampaignRecord {
        CampaignRecord {
            date: date.into(),
            spend,
            impressions,
            clicks,
            actions: vec![ActionEntry::new("purchase", purchases)],
            ..Default::default()
        }
    }

    fn assert_all_zero(summary: &MetricsSummary) {
        assert_eq!(summary.record_count, 0);
        assert_eq!(summary.total_spend, 0.0);
        assert_eq!(summary.total_impressions, 0);
        assert_eq!(summary.total_clicks, 0);
        assert_eq!(summary.total_purchases, 0);
        assert_eq!(summary.total_installs, 0);
        assert_eq!(summary.average_ctr, 0.0);
        assert_eq!(summary.average_cpc, 0.0);
        assert_eq!(summary.average_cpm, 0.0);
        assert_eq!(summary.cost_per_purchase, 0.0);
        assert_eq!(summary.conversion_rate, 0.0);
        assert_eq!(summary.cost_per_install, 0.0);
        assert_eq!(summary.cost_per_registration, 0.0);
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let summary = aggregate(&Vec::<CampaignRecord>::new());
        assert_all_zero(&summary);
        assert!(summary.revenue.is_none());
        assert_eq!(summary, MetricsSummary::default());
    }

    #[test]
    fn test_empty_input_with_revenue_policy() {
        let summary = MetricsAggregator::with_policy(ReportedRevenue).aggregate(&Vec::<CampaignRecord>::new());
        assert_all_zero(&summary);
        let revenue = summary.revenue.unwrap();
        assert_eq!(revenue.revenue, 0.0);
        assert_eq!(revenue.roas, 0.0);
        assert!(!revenue.is_estimated);
    }

    #[test]
    fn test_single_record_scenario() {
        let record: CampaignRecord = serde_json::from_value(serde_json::json!({
            "date": "2025-01-01",
            "spend": "100",
            "impressions": "1000",
            "clicks": "20",
            "actions": [{"action_type": "purchase", "value": "2"}]
        }))
        .unwrap();
        let summary = aggregate(std::iter::once(&record));

        assert!(approx(summary.total_spend, 100.0));
        assert_eq!(summary.total_impressions, 1000);
        assert_eq!(summary.total_clicks, 20);
        assert_eq!(summary.total_purchases, 2);
        assert!(approx(summary.average_ctr, 2.0));
        assert!(approx(summary.average_cpc, 5.0));
        assert!(approx(summary.average_cpm, 100.0));
        assert!(approx(summary.cost_per_purchase, 50.0));
        assert!(approx(summary.conversion_rate, 10.0));
    }

    #[test]
    fn test_zero_impressions() {
        let records = vec![row("2025-01-01", 40.0, 0, 0, "0")];
        let summary = aggregate(&records);
        assert_eq!(summary.average_ctr, 0.0);
        assert_eq!(summary.average_cpm, 0.0);
        assert_eq!(summary.average_cpc, 0.0);
        assert_eq!(summary.conversion_rate, 0.0);
        assert_eq!(summary.cost_per_purchase, 0.0);
        assert!(summary.average_ctr.is_finite());
    }

    #[test]
    fn test_zero_clicks_with_impressions() {
        let records = vec![row("2025-01-01", 40.0, 800, 0, "1")];
        let summary = aggregate(&records);
        assert!(approx(summary.average_cpm, 50.0));
        assert_eq!(summary.average_cpc, 0.0);
        assert_eq!(summary.conversion_rate, 0.0);
        assert!(approx(summary.cost_per_purchase, 40.0));
    }

    #[test]
    fn test_same_date_rows_are_summed() {
        let mut first = row("2025-01-01", 100.0, 1000, 20, "2");
        first.campaign_id = Some("c1".into());
        let mut second = row("2025-01-01", 50.5, 500, 5, "1");
        second.campaign_id = Some("c2".into());
        let records = vec![first, second];

        let per_day = MetricsAggregator::new().aggregate_buckets(&group_by_date(&records));
        let day = &per_day["2025-01-01"];
        assert_eq!(per_day.len(), 1);
        assert_eq!(day.record_count, 2);
        assert!(approx(day.total_spend, 150.5));
        assert_eq!(day.total_impressions, 1500);
        assert_eq!(day.total_clicks, 25);
        assert_eq!(day.total_purchases, 3);
    }

    #[test]
    fn test_huge_counters_saturate() {
        let records: Vec<CampaignRecord> = serde_json::from_value(serde_json::json!([
            {"date": "2025-01-01", "spend": "10", "impressions": "1e20", "clicks": "1e20",
             "actions": [{"action_type": "purchase", "value": "1e20"}]},
            {"date": "2025-01-01", "spend": "5", "impressions": "10", "clicks": "2",
             "actions": [{"action_type": "purchase", "value": "1"}]}
        ]))
        .unwrap();
        assert_eq!(records[0].impressions, u64::MAX);

        let summary = aggregate(&records);
        assert_eq!(summary.record_count, 2);
        assert!(approx(summary.total_spend, 15.0));
        assert_eq!(summary.total_impressions, u64::MAX);
        assert_eq!(summary.total_clicks, u64::MAX);
        assert_eq!(summary.total_purchases, u64::MAX);
        assert!(summary.average_ctr.is_finite());
        assert!(summary.average_cpm.is_finite());
    }

    #[test]
    fn test_other_action_totals() {
        let record = CampaignRecord {
            date: "2025-01-01".into(),
            spend: 90.0,
            actions: vec![
                ActionEntry::new("mobile_app_install", "30"),
                ActionEntry::new("complete_registration", "9"),
                ActionEntry::new("add_to_cart", "4"),
                ActionEntry::new("initiate_checkout", 2),
            ],
            ..Default::default()
        };
        let summary = aggregate(std::iter::once(&record));
        assert_eq!(summary.total_installs, 30);
        assert_eq!(summary.total_registrations, 9);
        assert_eq!(summary.total_add_to_cart, 4);
        assert_eq!(summary.total_initiate_checkout, 2);
        assert!(approx(summary.cost_per_install, 3.0));
        assert!(approx(summary.cost_per_registration, 10.0));
    }

    #[test]
    fn test_reported_roas() {
        let mut record = row("2025-01-01", 200.0, 1000, 10, "4");
        record.actions = vec![ActionEntry::new("purchase", "4").with_action_value("600")];
        let summary = MetricsAggregator::with_policy(ReportedRevenue).aggregate(std::iter::once(&record));
        let revenue = summary.revenue.unwrap();
        assert!(approx(revenue.revenue, 600.0));
        assert!(approx(revenue.roas, 3.0));
        assert!(!revenue.is_estimated);
    }

    #[test]
    fn test_estimated_roas_is_flagged() {
        let records = vec![row("2025-01-01", 100.0, 1000, 10, "5")];
        let policy = EstimatedRevenue::new(MarketSplit::default(), 10.0, 50.0);
        let summary = MetricsAggregator::with_policy(policy).aggregate(&records);
        let revenue = summary.revenue.unwrap();
        assert!(approx(revenue.revenue, 90.0));
        assert!(approx(revenue.roas, 0.9));
        assert!(revenue.is_estimated);
    }

    #[test]
    fn test_roas_without_spend_is_zero() {
        let mut record = row("2025-01-01", 0.0, 10, 1, "1");
        record.actions = vec![ActionEntry::new("purchase", "1").with_action_value("50")];
        let summary = MetricsAggregator::with_policy(ReportedRevenue).aggregate(std::iter::once(&record));
        assert_eq!(summary.revenue.unwrap().roas, 0.0);
    }

    #[test]
    fn test_summary_serializes_without_revenue_block() {
        let json = serde_json::to_value(aggregate(&Vec::<CampaignRecord>::new())).unwrap();
        assert_eq!(json["total_spend"], 0.0);
        assert!(json.get("revenue").is_none());
    }
}
