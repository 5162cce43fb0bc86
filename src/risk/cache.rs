use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::RiskAssessment;
use crate::clock::{Clock, SystemClock};
use crate::market_data::AssetSnapshot;

#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: Option<AssetSnapshot>,
    assessment: Option<RiskAssessment>,
    /// Refreshed by every write to either field.
    updated_at: DateTime<Utc>,
}

/// In-memory per-asset cache of snapshots and assessments.
///
/// Keys are asset ids compared case-sensitively. Entries older than the TTL
/// are ignored on read but never removed, so memory grows with the number of
/// distinct ids seen until the process restarts.
pub struct AnalysisCache {
    entries: tokio::sync::Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl AnalysisCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: tokio::sync::Mutex::new(HashMap::new()),
            ttl,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get_snapshot(&self, asset_id: &str) -> Option<AssetSnapshot> {
        let entries = self.entries.lock().await;
        entries
            .get(asset_id)
            .filter(|entry| self.is_fresh(entry))
            .and_then(|entry| entry.snapshot.clone())
    }

    pub async fn get_assessment(&self, asset_id: &str) -> Option<RiskAssessment> {
        let entries = self.entries.lock().await;
        entries
            .get(asset_id)
            .filter(|entry| self.is_fresh(entry))
            .and_then(|entry| entry.assessment.clone())
    }

    /// Store whichever parts are given and refresh the entry's timestamp.
    pub async fn put(
        &self,
        asset_id: &str,
        snapshot: Option<AssetSnapshot>,
        assessment: Option<RiskAssessment>,
    ) {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        let entry = entries
            .entry(asset_id.to_string())
            .or_insert_with(|| CacheEntry {
                snapshot: None,
                assessment: None,
                updated_at: now,
            });
        if snapshot.is_some() {
            entry.snapshot = snapshot;
        }
        if assessment.is_some() {
            entry.assessment = assessment;
        }
        entry.updated_at = now;
    }

    /// Number of stored entries, fresh or not.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        match (self.clock.now() - entry.updated_at).to_std() {
            Ok(age) => age < self.ttl,
            // Written "in the future" (clock moved backwards): treat as fresh.
            Err(_) => true,
        }
    }
}
