use serde::{Deserialize, Serialize};

use crate::market_data::AssetSnapshot;

/// Score used when the provider has no data and the snapshot is synthetic.
pub const UPSTREAM_FALLBACK_SCORE: u8 = 75;

/// Score used with a real snapshot when the language model is unavailable.
pub const MODEL_FALLBACK_SCORE: u8 = 75;

/// Score used when the model's score reply cannot be read as 0..=100.
pub const NEUTRAL_SCORE: u8 = 50;

/// Canned explanation attached to every fallback assessment.
pub const FALLBACK_JUSTIFICATION: &str = "This appears to be a newer token with very low price, \
extremely high supply, and moderate to low liquidity relative to its market cap. These are common \
characteristics of higher-risk tokens. Exercise extreme caution.";

/// Rug-pull risk verdict for one asset. Cached and returned verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// 0 = low risk, 100 = high risk.
    pub score: u8,
    pub justification: String,
    #[serde(rename = "coin_info")]
    pub snapshot: AssetSnapshot,
}

impl RiskAssessment {
    pub fn new(score: u8, justification: impl Into<String>, snapshot: AssetSnapshot) -> Self {
        Self {
            score,
            justification: justification.into(),
            snapshot,
        }
    }

    /// Assessment for an asset the provider could not describe.
    pub fn upstream_fallback(asset_id: &str) -> Self {
        Self::new(
            UPSTREAM_FALLBACK_SCORE,
            FALLBACK_JUSTIFICATION,
            AssetSnapshot::placeholder(asset_id),
        )
    }

    /// Assessment for real market data that could not be scored by the model.
    pub fn model_fallback(snapshot: AssetSnapshot) -> Self {
        Self::new(MODEL_FALLBACK_SCORE, FALLBACK_JUSTIFICATION, snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let assessment = RiskAssessment::upstream_fallback("made-up-coin-xyz");
        let rendered = serde_json::to_value(&assessment).unwrap();

        let mut keys: Vec<&str> = rendered
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["coin_info", "justification", "score"]);
        assert_eq!(rendered["score"], 75);
        assert_eq!(rendered["coin_info"]["Symbol"], "MADE");
    }

    #[test]
    fn test_model_fallback_keeps_real_snapshot() {
        let mut snapshot = AssetSnapshot::placeholder("bitcoin");
        snapshot.name = "Bitcoin".to_string();
        snapshot.symbol = "BTC".to_string();
        snapshot.current_price = Some(64_000.0);

        let assessment = RiskAssessment::model_fallback(snapshot.clone());
        assert_eq!(assessment.score, MODEL_FALLBACK_SCORE);
        assert_eq!(assessment.justification, FALLBACK_JUSTIFICATION);
        assert_eq!(assessment.snapshot, snapshot);
    }
}
