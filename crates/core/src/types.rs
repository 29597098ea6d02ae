use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::normalize;

/// One reporting row: a single day, optionally narrowed to one campaign and
/// one breakdown value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignRecord {
    /// ISO `YYYY-MM-DD`. The reporting API sends it as `date_start`.
    #[serde(alias = "date_start")]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_name: Option<String>,
    #[serde(default, deserialize_with = "de_spend")]
    pub spend: f64,
    #[serde(default, deserialize_with = "de_count")]
    pub impressions: u64,
    #[serde(default, deserialize_with = "de_count")]
    pub clicks: u64,
    #[serde(default, deserialize_with = "de_ratio", skip_serializing_if = "Option::is_none")]
    pub ctr: Option<f64>,
    #[serde(default, deserialize_with = "de_ratio", skip_serializing_if = "Option::is_none")]
    pub cpc: Option<f64>,
    #[serde(default, deserialize_with = "de_ratio", skip_serializing_if = "Option::is_none")]
    pub cpm: Option<f64>,
    #[serde(default, deserialize_with = "de_ratio", skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
    #[serde(default, deserialize_with = "de_actions")]
    pub actions: Vec<ActionEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_platform: Option<String>,
}

impl CampaignRecord {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        if self.date.len() != 10 {
            return None;
        }
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    /// The single breakdown value this row was fetched with, if any.
    pub fn breakdown(&self) -> Option<Breakdown<'_>> {
        if let Some(age) = self.age.as_deref() {
            return Some(Breakdown::Age(age));
        }
        if let Some(gender) = self.gender.as_deref() {
            return Some(Breakdown::Gender(gender));
        }
        self.device_platform.as_deref().map(Breakdown::DevicePlatform)
    }

    /// Identity at campaign reporting level. Blank ids count as absent.
    pub fn campaign_key(&self) -> Option<&str> {
        self.campaign_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// One entry of the sparse `actions` list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionEntry {
    #[serde(default)]
    pub action_type: String,
    /// Count, usually a numeric string. Parsed on lookup.
    #[serde(default)]
    pub value: Value,
    /// Monetary value for revenue-bearing actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_value: Option<Value>,
}

impl ActionEntry {
    pub fn new(action_type: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            action_type: action_type.into(),
            value: value.into(),
            action_value: None,
        }
    }

    pub fn with_action_value(mut self, action_value: impl Into<Value>) -> Self {
        self.action_value = Some(action_value.into());
        self
    }
}

/// Serializes as `{"dimension": "age", "value": "25-34"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "dimension", content = "value", rename_all = "snake_case")]
pub enum Breakdown<'a> {
    Age(&'a str),
    Gender(&'a str),
    DevicePlatform(&'a str),
}

/// Action types the dashboards report on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Purchase,
    AddToCart,
    InitiateCheckout,
    CompleteRegistration,
    MobileAppInstall,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::AddToCart => "add_to_cart",
            Self::InitiateCheckout => "initiate_checkout",
            Self::CompleteRegistration => "complete_registration",
            Self::MobileAppInstall => "mobile_app_install",
        }
    }
}

fn de_spend<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    Ok(normalize::normalize_spend(&raw))
}

fn de_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    Ok(normalize::normalize_count(&raw))
}

fn de_ratio<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    Ok(normalize::normalize_ratio(&raw))
}

// Entries that are not objects are skipped rather than failing the row.
fn de_actions<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<ActionEntry>, D::Error> {
    let entries = match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries,
        _ => return Ok(Vec::new()),
    };
    Ok(entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect())
}
