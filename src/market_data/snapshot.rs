//! Flat market data record for a single asset.
//!
//! Upstream payloads come in several shapes (CoinGecko coin detail with a
//! nested `market_data` object, CoinGecko markets rows with flat fields, or a
//! snapshot we already rendered). All of them normalize to [`AssetSnapshot`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Currency read from per-currency price objects.
const QUOTE_CURRENCY: &str = "usd";

/// Market data for one asset, serialized with the dashboard's display keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSnapshot {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Current Price")]
    pub current_price: Option<f64>,
    #[serde(rename = "Market Cap")]
    pub market_cap: Option<f64>,
    #[serde(rename = "24h Trading Volume")]
    pub volume_24h: Option<f64>,
    #[serde(rename = "Circulating Supply")]
    pub circulating_supply: Option<f64>,
    #[serde(rename = "Total Supply")]
    pub total_supply: Option<f64>,
    #[serde(rename = "Max Supply")]
    pub max_supply: Option<f64>,
    #[serde(rename = "24h Price Change")]
    pub price_change_24h: Option<f64>,
    #[serde(rename = "24h Low")]
    pub low_24h: Option<f64>,
    #[serde(rename = "24h High")]
    pub high_24h: Option<f64>,
}

impl AssetSnapshot {
    /// Normalize a provider payload. Missing fields become `None`; this never fails.
    pub fn from_provider_json(data: &Value) -> Self {
        if data.get("Name").is_some() {
            if let Ok(snapshot) = serde_json::from_value::<AssetSnapshot>(data.clone()) {
                return snapshot;
            }
        }

        let market_data = data.get("market_data");
        let field = |name: &str| {
            market_data
                .and_then(|md| md.get(name))
                .and_then(quoted_number)
                .or_else(|| data.get(name).and_then(quoted_number))
        };

        Self {
            name: data
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("Unknown")
                .to_string(),
            symbol: data
                .get("symbol")
                .and_then(Value::as_str)
                .unwrap_or("UNKNOWN")
                .to_uppercase(),
            current_price: field("current_price"),
            market_cap: field("market_cap"),
            volume_24h: field("total_volume"),
            circulating_supply: field("circulating_supply"),
            total_supply: field("total_supply"),
            max_supply: field("max_supply"),
            price_change_24h: field("price_change_percentage_24h"),
            low_24h: field("low_24h"),
            high_24h: field("high_24h"),
        }
    }

    /// Synthetic snapshot used when the provider has nothing for `asset_id`.
    ///
    /// Identity comes from the identifier itself (see [`display_name`] and
    /// [`display_symbol`]); the numbers describe a generic low-cap token.
    pub fn placeholder(asset_id: &str) -> Self {
        Self {
            name: display_name(asset_id),
            symbol: display_symbol(asset_id),
            current_price: Some(0.00001234),
            market_cap: Some(5_000_000.0),
            volume_24h: Some(250_000.0),
            circulating_supply: Some(1_000_000_000_000.0),
            total_supply: Some(1_000_000_000_000.0),
            max_supply: None,
            price_change_24h: Some(-2.5),
            low_24h: Some(0.000012),
            high_24h: Some(0.000013),
        }
    }
}

/// Either a bare number or an object keyed by currency.
fn quoted_number(value: &Value) -> Option<f64> {
    match value {
        Value::Object(by_currency) => by_currency.get(QUOTE_CURRENCY).and_then(Value::as_f64),
        other => other.as_f64(),
    }
}

/// "made-up-coin-xyz" -> "Made Up Coin Xyz".
///
/// Hyphens become spaces, and every run of letters is capitalized with the
/// rest lower-cased. Any non-letter starts a new word.
pub fn display_name(asset_id: &str) -> String {
    let mut out = String::with_capacity(asset_id.len());
    let mut at_word_start = true;
    for c in asset_id.replace('-', " ").chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// "made-up-coin-xyz" -> "MADE".
pub fn display_symbol(asset_id: &str) -> String {
    asset_id
        .split('-')
        .next()
        .unwrap_or_default()
        .to_uppercase()
}
