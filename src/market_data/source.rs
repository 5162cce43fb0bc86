use reqwest::StatusCode;

use super::AssetSnapshot;

/// Failure talking to the market data provider.
///
/// The client never substitutes mock data; callers pick their own fallback.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("market data request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("market data provider returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("market data response was not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid asset id path segment: {0:?}")]
    InvalidAssetId(String),

    #[error("invalid market data base url {0:?}")]
    InvalidBaseUrl(String),
}

impl UpstreamError {
    /// HTTP status for provider rejections, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            Self::Decode(_) | Self::InvalidAssetId(_) | Self::InvalidBaseUrl(_) => None,
        }
    }
}

/// Provider of per-asset market snapshots.
#[async_trait::async_trait]
pub trait AssetDataSource: Send + Sync {
    async fn fetch_asset(&self, asset_id: &str) -> Result<AssetSnapshot, UpstreamError>;

    fn name(&self) -> &str;
}
