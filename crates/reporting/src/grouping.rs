//! Grouping engine: partitions records into named buckets by date, campaign,
//! or any classifier output. Buckets borrow the input records.

use std::collections::BTreeMap;

use adpulse_core::CampaignRecord;
use serde::{Deserialize, Serialize};

use crate::classifier::{
    classify_age_bracket, classify_country, classify_device_platform, classify_gender,
    classify_platform, Category,
};

/// Separator joining per-dimension keys in combined buckets.
pub const KEY_SEPARATOR: &str = "_";

/// Bucket key -> records. Ordered, and sparse: empty categories never appear.
pub type Buckets<'a> = BTreeMap<String, Vec<&'a CampaignRecord>>;

/// Maps a record to its bucket key. `None` leaves the record out.
pub trait Classifier {
    fn classify(&self, record: &CampaignRecord) -> Option<String>;
}

impl<F> Classifier for F
where
    F: Fn(&CampaignRecord) -> Option<String>,
{
    fn classify(&self, record: &CampaignRecord) -> Option<String> {
        self(record)
    }
}

/// The dimensions the dashboards slice by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Date,
    Campaign,
    Country,
    Platform,
    Age,
    Gender,
    Device,
}

impl Classifier for Dimension {
    fn classify(&self, record: &CampaignRecord) -> Option<String> {
        let name = record.campaign_name.as_deref();
        let key = match self {
            Self::Date => return Some(record.date.clone()),
            Self::Campaign => return record.campaign_key().map(str::to_owned),
            Self::Country => classify_country(name).key(),
            Self::Platform => classify_platform(name).key(),
            Self::Age => classify_age_bracket(record.age.as_deref()).key(),
            Self::Gender => classify_gender(record.gender.as_deref()).key(),
            Self::Device => classify_device_platform(record.device_platform.as_deref()).key(),
        };
        Some(key.to_owned())
    }
}

/// A materialized bucket, handed to the aggregator and then dropped.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateBucket<'a> {
    pub bucket_key: String,
    pub records: Vec<&'a CampaignRecord>,
}

/// Records of one campaign plus the first non-empty name seen for it.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignBucket<'a> {
    pub name: Option<String>,
    pub records: Vec<&'a CampaignRecord>,
}

/// Group by any classifier.
pub fn group_by<'a, C>(records: impl IntoIterator<Item = &'a CampaignRecord>, classifier: &C) -> Buckets<'a>
where
    C: Classifier + ?Sized,
{
    let mut buckets = Buckets::new();
    for record in records {
        if let Some(key) = classifier.classify(record) {
            buckets.entry(key).or_default().push(record);
        }
    }
    buckets
}

/// Partition by exact date string. Rows sharing a date stay separate here;
/// the aggregator sums them.
pub fn group_by_date<'a>(records: impl IntoIterator<Item = &'a CampaignRecord>) -> Buckets<'a> {
    group_by(records, &Dimension::Date)
}

/// Group by campaign id. Account-level rows without an id are excluded.
pub fn group_by_campaign<'a>(
    records: impl IntoIterator<Item = &'a CampaignRecord>,
) -> BTreeMap<String, CampaignBucket<'a>> {
    let mut campaigns: BTreeMap<String, CampaignBucket<'a>> = BTreeMap::new();
    for record in records {
        let Some(id) = record.campaign_key() else {
            continue;
        };
        let bucket = campaigns.entry(id.to_owned()).or_insert_with(|| CampaignBucket {
            name: None,
            records: Vec::new(),
        });
        if bucket.name.is_none() {
            bucket.name = record
                .campaign_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned);
        }
        bucket.records.push(record);
    }
    campaigns
}

/// Apply `classify` to `field(record)` and bucket by the category key.
pub fn group_by_dimension<'a, K, F, A>(
    records: impl IntoIterator<Item = &'a CampaignRecord>,
    classify: F,
    field: A,
) -> Buckets<'a>
where
    K: Category,
    F: Fn(Option<&str>) -> K,
    A: Fn(&CampaignRecord) -> Option<&str>,
{
    let mut buckets = Buckets::new();
    for record in records {
        let key = classify(field(record)).key();
        buckets.entry(key.to_owned()).or_default().push(record);
    }
    buckets
}

/// Cross-tabulate: a record lands in `a_b_...` only when every classifier
/// yields a key for it. With no classifiers the result is empty.
pub fn group_by_combined<'a>(
    records: impl IntoIterator<Item = &'a CampaignRecord>,
    classifiers: &[&dyn Classifier],
) -> Buckets<'a> {
    let mut buckets = Buckets::new();
    if classifiers.is_empty() {
        return buckets;
    }
    for record in records {
        let keys: Option<Vec<String>> = classifiers.iter().map(|c| c.classify(record)).collect();
        if let Some(keys) = keys {
            buckets.entry(keys.join(KEY_SEPARATOR)).or_default().push(record);
        }
    }
    buckets
}

/// Flatten a bucket map into owned `AggregateBucket`s, in key order.
pub fn into_buckets(buckets: Buckets<'_>) -> Vec<AggregateBucket<'_>> {
    buckets
        .into_iter()
        .map(|(bucket_key, records)| AggregateBucket { bucket_key, records })
        .collect()
}
