//! Record normalizer: numeric coercion of loosely-typed reporting fields and
//! lookups into the sparse `actions` list.
//!
//! Nothing here fails: unparsable input coerces to zero (or `None` for
//! optional ratios). Currency conversion happens upstream, never here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{ActionEntry, CampaignRecord};

/// Per-row ratios for direct display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordRatios {
    pub ctr: f64,
    pub cpc: f64,
    pub cpm: f64,
    pub frequency: Option<f64>,
}

/// Spend as a non-negative float; `0.0` for null, garbage, negative or
/// non-finite input.
pub fn normalize_spend(raw: &Value) -> f64 {
    coerce_amount(raw).unwrap_or(0.0)
}

/// Counter as a non-negative integer. Fractional input is truncated.
pub fn normalize_count(raw: &Value) -> u64 {
    match raw {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().and_then(truncate_count))
            .unwrap_or(0),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(truncate_count))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

/// Optional upstream ratio; `None` when absent or unusable.
pub fn normalize_ratio(raw: &Value) -> Option<f64> {
    coerce_amount(raw)
}

/// Count of the first action whose type matches exactly (case-sensitive).
pub fn extract_action_value(actions: Option<&[ActionEntry]>, action_type: &str) -> u64 {
    find_action(actions, action_type)
        .map(|action| normalize_count(&action.value))
        .unwrap_or(0)
}

/// Monetary value of the first matching action.
pub fn extract_action_revenue(actions: Option<&[ActionEntry]>, action_type: &str) -> f64 {
    find_action(actions, action_type)
        .and_then(|action| action.action_value.as_ref())
        .map(normalize_spend)
        .unwrap_or(0.0)
}

/// Upstream ratios win; missing ones are derived from the raw counters.
pub fn display_ratios(record: &CampaignRecord) -> RecordRatios {
    let spend = record.spend;
    let impressions = record.impressions as f64;
    let clicks = record.clicks as f64;

    RecordRatios {
        ctr: record.ctr.unwrap_or(if impressions > 0.0 {
            clicks / impressions * 100.0
        } else {
            0.0
        }),
        cpc: record
            .cpc
            .unwrap_or(if clicks > 0.0 { spend / clicks } else { 0.0 }),
        cpm: record.cpm.unwrap_or(if impressions > 0.0 {
            spend / impressions * 1000.0
        } else {
            0.0
        }),
        frequency: record.frequency,
    }
}

fn find_action<'a>(actions: Option<&'a [ActionEntry]>, action_type: &str) -> Option<&'a ActionEntry> {
    actions?
        .iter()
        .find(|action| action.action_type == action_type)
}

fn coerce_amount(raw: &Value) -> Option<f64> {
    let amount = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    (amount.is_finite() && amount >= 0.0).then_some(amount)
}

fn truncate_count(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0).then(|| value.trunc() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn purchase_actions() -> Vec<ActionEntry> {
        vec![
            ActionEntry::new("add_to_cart", "7"),
            ActionEntry::new("purchase", "2").with_action_value("149.50"),
            ActionEntry::new("purchase", "9"),
        ]
    }

    #[test]
    fn test_normalize_spend_shapes() {
        assert!((normalize_spend(&json!("100")) - 100.0).abs() < f64::EPSILON);
        assert!((normalize_spend(&json!(" 12.75 ")) - 12.75).abs() < f64::EPSILON);
        assert!((normalize_spend(&json!(3)) - 3.0).abs() < f64::EPSILON);
        assert_eq!(normalize_spend(&Value::Null), 0.0);
        assert_eq!(normalize_spend(&json!("abc")), 0.0);
        assert_eq!(normalize_spend(&json!("-4")), 0.0);
        assert_eq!(normalize_spend(&json!("NaN")), 0.0);
        assert_eq!(normalize_spend(&json!({"amount": 1})), 0.0);
    }

    #[test]
    fn test_normalize_count_shapes() {
        assert_eq!(normalize_count(&json!("1000")), 1000);
        assert_eq!(normalize_count(&json!(20)), 20);
        assert_eq!(normalize_count(&json!("2.9")), 2);
        assert_eq!(normalize_count(&json!(-5)), 0);
        assert_eq!(normalize_count(&json!(true)), 0);
        assert_eq!(normalize_count(&json!("")), 0);
    }

    #[test]
    fn test_extract_first_matching_action() {
        let actions = purchase_actions();
        assert_eq!(extract_action_value(Some(actions.as_slice()), "purchase"), 2);
        assert_eq!(extract_action_value(Some(actions.as_slice()), "add_to_cart"), 7);
    }

    #[test]
    fn test_extract_missing_action_is_zero() {
        let actions = purchase_actions();
        assert_eq!(extract_action_value(Some(actions.as_slice()), "nonexistent_type"), 0);
        assert_eq!(extract_action_value(Some(actions.as_slice()), "Purchase"), 0);
        assert_eq!(extract_action_value(None, "purchase"), 0);
        assert_eq!(extract_action_value(Some(&[][..]), "purchase"), 0);
    }

    #[test]
    fn test_extract_non_numeric_value_is_zero() {
        let actions = vec![ActionEntry::new("purchase", "lots")];
        assert_eq!(extract_action_value(Some(actions.as_slice()), "purchase"), 0);
    }

    #[test]
    fn test_extract_is_pure() {
        let actions = purchase_actions();
        let before = actions.clone();
        let first = extract_action_value(Some(actions.as_slice()), "purchase");
        let second = extract_action_value(Some(actions.as_slice()), "purchase");
        assert_eq!(first, second);
        assert_eq!(actions, before);
    }

    #[test]
    fn test_extract_action_revenue() {
        let actions = purchase_actions();
        assert!((extract_action_revenue(Some(actions.as_slice()), "purchase") - 149.5).abs() < f64::EPSILON);
        assert_eq!(extract_action_revenue(Some(actions.as_slice()), "add_to_cart"), 0.0);
        assert_eq!(extract_action_revenue(None, "purchase"), 0.0);
    }

    #[test]
    fn test_display_ratios_prefer_upstream_values() {
        let record = CampaignRecord {
            date: "2025-01-01".into(),
            spend: 100.0,
            impressions: 1000,
            clicks: 20,
            ctr: Some(2.5),
            frequency: Some(1.3),
            ..Default::default()
        };
        let ratios = display_ratios(&record);
        assert!((ratios.ctr - 2.5).abs() < f64::EPSILON);
        assert!((ratios.cpc - 5.0).abs() < f64::EPSILON);
        assert!((ratios.cpm - 100.0).abs() < f64::EPSILON);
        assert_eq!(ratios.frequency, Some(1.3));
    }

    #[test]
    fn test_display_ratios_zero_denominators() {
        let record = CampaignRecord {
            date: "2025-01-01".into(),
            spend: 50.0,
            ..Default::default()
        };
        let ratios = display_ratios(&record);
        assert_eq!(ratios.ctr, 0.0);
        assert_eq!(ratios.cpc, 0.0);
        assert_eq!(ratios.cpm, 0.0);
        assert!(ratios.frequency.is_none());
    }
}
