//! Fan-out / fan-in of independent reporting fetches.
//!
//! Each unit (usually one day) is fetched on its own Tokio task, bounded by a
//! semaphore. A failed or panicked fetch is logged and contributes nothing;
//! there is no retry, timeout or cancellation. The joined records are handed
//! to the synchronous aggregator in one piece.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use adpulse_core::{CampaignRecord, InsightsResult};
use chrono::NaiveDate;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

pub mod source;

/// Outcome of one collection round.
#[derive(Debug, Clone)]
pub struct CollectionReport<K> {
    /// Records of every successful unit, in the order the units were given.
    pub records: Vec<CampaignRecord>,
    pub succeeded: usize,
    pub failed: Vec<K>,
}

impl<K> CollectionReport<K> {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Every day from `start` to `end`, inclusive. Empty when `start > end`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|day| *day <= end).collect()
}

/// Fetch every key concurrently, at most `max_concurrent` at a time. The bound
/// is clamped to `1..=Semaphore::MAX_PERMITS`.
pub async fn collect_all<K, F, Fut>(keys: Vec<K>, max_concurrent: usize, fetch: F) -> CollectionReport<K>
where
    K: Display + Clone + Send + 'static,
    F: Fn(K) -> Fut,
    Fut: Future<Output = InsightsResult<Vec<CampaignRecord>>> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(max_concurrent.clamp(1, Semaphore::MAX_PERMITS)));
    let mut tasks = JoinSet::new();

    for (index, key) in keys.iter().cloned().enumerate() {
        let semaphore = semaphore.clone();
        let pending = fetch(key.clone());
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            (index, key, pending.await)
        });
    }

    let mut slots: Vec<Option<Vec<CampaignRecord>>> = vec![None; keys.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, key, Ok(records))) => {
                debug!(unit = %key, rows = records.len(), "Fetch completed");
                slots[index] = Some(records);
            }
            Ok((_, key, Err(e))) => {
                warn!(unit = %key, error = %e, "Fetch failed, contributing no records");
                metrics::counter!("collector.fetch_failed").increment(1);
            }
            Err(e) => {
                warn!(error = %e, "Fetch task aborted, contributing no records");
                metrics::counter!("collector.fetch_failed").increment(1);
            }
        }
    }

    let mut records = Vec::new();
    let mut failed = Vec::new();
    let mut succeeded = 0;
    for (key, slot) in keys.into_iter().zip(slots) {
        match slot {
            Some(mut rows) => {
                succeeded += 1;
                records.append(&mut rows);
            }
            None => failed.push(key),
        }
    }

    info!(
        succeeded,
        failed = failed.len(),
        rows = records.len(),
        "Collection finished"
    );

    CollectionReport {
        records,
        succeeded,
        failed,
    }
}

/// One fetch per day, joined in date order.
pub async fn collect_daily<F, Fut>(
    dates: &[NaiveDate],
    max_concurrent: usize,
    fetch: F,
) -> CollectionReport<NaiveDate>
where
    F: Fn(NaiveDate) -> Fut,
    Fut: Future<Output = InsightsResult<Vec<CampaignRecord>>> + Send + 'static,
{
    let mut dates = dates.to_vec();
    dates.sort();
    dates.dedup();
    collect_all(dates, max_concurrent, fetch).await
}
