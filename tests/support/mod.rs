#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;
use simplifi::market_data::{AssetDataSource, AssetSnapshot, UpstreamError};
use simplifi::risk::{ScoringError, ScoringProtocol};

/// A realistic snapshot for a known asset.
pub fn snapshot(name: &str, symbol: &str, price: f64) -> AssetSnapshot {
    AssetSnapshot {
        name: name.to_string(),
        symbol: symbol.to_string(),
        current_price: Some(price),
        market_cap: Some(price * 19_000_000.0),
        volume_24h: Some(30_000_000_000.0),
        circulating_supply: Some(19_000_000.0),
        total_supply: Some(21_000_000.0),
        max_supply: Some(21_000_000.0),
        price_change_24h: Some(1.2),
        low_24h: Some(price * 0.98),
        high_24h: Some(price * 1.01),
    }
}

/// In-memory market data source; unknown ids answer 404.
#[derive(Default)]
pub struct MockAssetSource {
    assets: HashMap<String, AssetSnapshot>,
    calls: AtomicUsize,
}

impl MockAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset(mut self, asset_id: &str, snapshot: AssetSnapshot) -> Self {
        self.assets.insert(asset_id.to_string(), snapshot);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetDataSource for MockAssetSource {
    async fn fetch_asset(&self, asset_id: &str) -> Result<AssetSnapshot, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.assets
            .get(asset_id)
            .cloned()
            .ok_or_else(|| UpstreamError::Status {
                status: StatusCode::NOT_FOUND,
                body: r#"{"error":"coin not found"}"#.to_string(),
            })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Scripted scoring protocol that records what it was asked.
pub struct MockScoring {
    score: u8,
    justification: String,
    fail_score: bool,
    fail_justify: bool,
    score_calls: AtomicUsize,
    justified_scores: Mutex<Vec<u8>>,
}

impl MockScoring {
    pub fn new(score: u8, justification: &str) -> Self {
        Self {
            score,
            justification: justification.to_string(),
            fail_score: false,
            fail_justify: false,
            score_calls: AtomicUsize::new(0),
            justified_scores: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_on_score(mut self) -> Self {
        self.fail_score = true;
        self
    }

    pub fn fail_on_justify(mut self) -> Self {
        self.fail_justify = true;
        self
    }

    pub fn score_calls(&self) -> usize {
        self.score_calls.load(Ordering::SeqCst)
    }

    pub fn justified_scores(&self) -> Vec<u8> {
        self.justified_scores.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScoringProtocol for MockScoring {
    async fn score(&self, _snapshot: &AssetSnapshot) -> Result<u8, ScoringError> {
        self.score_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_score {
            return Err(ScoringError::EmptyResponse);
        }
        Ok(self.score)
    }

    async fn justify(&self, _snapshot: &AssetSnapshot, score: u8) -> Result<String, ScoringError> {
        self.justified_scores.lock().unwrap().push(score);
        if self.fail_justify {
            return Err(ScoringError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: "overloaded".to_string(),
            });
        }
        Ok(self.justification.clone())
    }

    fn name(&self) -> &str {
        "mock-scoring"
    }
}
