//! CoinGecko market data client.
//!
//! Fetches `/coins/{id}` and normalizes the response into an [`AssetSnapshot`].
//! All requests from one client share a [`RequestGate`] and a [`KeyRing`]; the
//! free tier rate limits aggressively, so keep a single client per process.

use std::time::Duration;

use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, info};

use super::rate_limit::{KeyRing, RequestGate};
use super::{AssetDataSource, AssetSnapshot, UpstreamError};
use crate::config::MarketDataConfig;

const COINGECKO_COINS_URL: &str = "https://api.coingecko.com/api/v3/coins";
const API_KEY_HEADER: &str = "x-cg-api-key";
const USER_AGENT: &str = concat!("simplifi/", env!("CARGO_PKG_VERSION"));

const DEFAULT_MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(6);
const DEFAULT_KEY_ROTATION_WINDOW: Duration = Duration::from_secs(1);

pub struct CoinGeckoClient {
    client: reqwest::Client,
    base_url: String,
    keys: KeyRing,
    gate: RequestGate,
}

impl CoinGeckoClient {
    /// Creates a client against the public API with the default pacing.
    pub fn new(api_keys: Vec<SecretString>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: COINGECKO_COINS_URL.to_string(),
            keys: KeyRing::new(api_keys, DEFAULT_KEY_ROTATION_WINDOW),
            gate: RequestGate::new(DEFAULT_MIN_REQUEST_INTERVAL),
        }
    }

    pub fn from_config(config: MarketDataConfig) -> Self {
        Self::new(config.api_keys)
            .with_base_url(config.base_url)
            .with_min_request_interval(config.min_request_interval)
            .with_key_rotation_window(config.key_rotation_window)
    }

    /// Points the client at a different coins endpoint (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_min_request_interval(mut self, interval: Duration) -> Self {
        self.gate = RequestGate::new(interval);
        self
    }

    pub fn with_key_rotation_window(mut self, window: Duration) -> Self {
        self.keys = self.keys.with_rotation_window(window);
        self
    }

    /// Index of the API key used most recently.
    pub fn current_key_index(&self) -> usize {
        self.keys.current_index()
    }

    /// `{base_url}/{asset_id}` with the id percent-encoded as a single path segment.
    fn coin_url(&self, asset_id: &str) -> Result<Url, UpstreamError> {
        if asset_id.is_empty() || asset_id == "." || asset_id == ".." {
            return Err(UpstreamError::InvalidAssetId(asset_id.to_string()));
        }

        let mut url = Url::parse(&self.base_url)
            .map_err(|_| UpstreamError::InvalidBaseUrl(self.base_url.clone()))?;
        url.path_segments_mut()
            .map_err(|_| UpstreamError::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push(asset_id);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl AssetDataSource for CoinGeckoClient {
    async fn fetch_asset(&self, asset_id: &str) -> Result<AssetSnapshot, UpstreamError> {
        let url = self.coin_url(asset_id)?;

        // Pick the key on arrival so a burst of queued callers spreads across keys.
        let key = self.keys.next_key();
        self.gate.wait_turn().await;

        debug!(asset_id, url = %url, authenticated = key.is_some(), "fetching coin data");

        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT);
        if let Some(key) = key {
            request = request.header(API_KEY_HEADER, key.expose_secret());
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status, body });
        }

        let body = response.text().await?;
        let data: Value = serde_json::from_str(&body)?;
        let snapshot = AssetSnapshot::from_provider_json(&data);

        info!(
            asset_id,
            name = %snapshot.name,
            symbol = %snapshot.symbol,
            "fetched coin data"
        );
        Ok(snapshot)
    }

    fn name(&self) -> &str {
        "coingecko"
    }
}
