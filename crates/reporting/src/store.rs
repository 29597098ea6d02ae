//! Latest dashboard snapshot per account. The presentation layer reads from
//! here; aggregation never does.

use dashmap::DashMap;
use tracing::debug;

use crate::views::DashboardSnapshot;

pub struct InsightsStore {
    snapshots: DashMap<String, DashboardSnapshot>,
}

impl InsightsStore {
    pub fn new() -> Self {
        Self {
            snapshots: DashMap::new(),
        }
    }

    /// Replace the account's snapshot, returning the one it superseded.
    pub fn publish(&self, snapshot: DashboardSnapshot) -> Option<DashboardSnapshot> {
        debug!(
            account = %snapshot.account,
            snapshot_id = %snapshot.snapshot_id,
            records = snapshot.record_count,
            "Publishing dashboard snapshot"
        );
        self.snapshots.insert(snapshot.account.clone(), snapshot)
    }

    pub fn latest(&self, account: &str) -> Option<DashboardSnapshot> {
        self.snapshots.get(account).map(|s| s.clone())
    }

    pub fn list_accounts(&self) -> Vec<String> {
        let mut accounts: Vec<String> = self.snapshots.iter().map(|s| s.key().clone()).collect();
        accounts.sort();
        accounts
    }

    pub fn clear(&self, account: &str) -> bool {
        self.snapshots.remove(account).is_some()
    }
}

impl Default for InsightsStore {
    fn default() -> Self {
        Self::new()
    }
}
