//! Two-step rug-pull scoring: ask for a number, then ask for its explanation.

use reqwest::StatusCode;
use tracing::warn;

use super::llm::{ChatClient, ChatMessage};
use super::NEUTRAL_SCORE;
use crate::market_data::AssetSnapshot;

/// Failure producing a score or justification.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("language model request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("language model returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("language model response was not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("language model returned no content")]
    EmptyResponse,

    #[error("score reply {0:?} is not an integer between 0 and 100")]
    ScoreParse(String),
}

/// Scores an asset's rug-pull risk and explains the score.
///
/// Implementations are free to absorb parse problems (the chat protocol
/// substitutes [`NEUTRAL_SCORE`]); transport failures are returned as errors.
#[async_trait::async_trait]
pub trait ScoringProtocol: Send + Sync {
    async fn score(&self, snapshot: &AssetSnapshot) -> Result<u8, ScoringError>;

    async fn justify(&self, snapshot: &AssetSnapshot, score: u8) -> Result<String, ScoringError>;

    fn name(&self) -> &str;
}

/// Read a model reply as a 0..=100 score.
pub fn parse_score(reply: &str) -> Result<u8, ScoringError> {
    let trimmed = reply.trim();
    match trimmed.parse::<i64>() {
        Ok(score @ 0..=100) => Ok(score as u8),
        _ => Err(ScoringError::ScoreParse(trimmed.to_string())),
    }
}

const RUG_PULL_DEFINITION: &str =
    "Rug pull: When founders abandon a project and take investors' money.";

/// [`ScoringProtocol`] backed by a chat completion model.
pub struct ChatScoringProtocol {
    client: ChatClient,
}

impl ChatScoringProtocol {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }

    fn snapshot_json(snapshot: &AssetSnapshot) -> String {
        serde_json::to_string(snapshot).unwrap_or_default()
    }

    fn score_messages(snapshot: &AssetSnapshot) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(format!(
                "{RUG_PULL_DEFINITION} Return a score out of 100 indicating the rug pull risk of \
                 the coin and symbol provided. 100 = high risk. Use the following data for your \
                 assessment: {} Return nothing else.",
                Self::snapshot_json(snapshot)
            )),
            ChatMessage::user(format!("{}, {}", snapshot.name, snapshot.symbol)),
        ]
    }

    fn justification_messages(snapshot: &AssetSnapshot, score: u8) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(format!(
                "{RUG_PULL_DEFINITION} The score given is the rug pull risk score. 0 = low risk, \
                 100 = high risk. Return a short justification for the score. Use the following \
                 data for your assessment: {} Do not include the score in the output. Max 100 words.",
                Self::snapshot_json(snapshot)
            )),
            ChatMessage::user(format!("{}, {}, {}", snapshot.name, snapshot.symbol, score)),
        ]
    }
}

#[async_trait::async_trait]
impl ScoringProtocol for ChatScoringProtocol {
    async fn score(&self, snapshot: &AssetSnapshot) -> Result<u8, ScoringError> {
        let reply = self.client.complete(&Self::score_messages(snapshot)).await?;
        match parse_score(&reply) {
            Ok(score) => Ok(score),
            Err(err) => {
                warn!(symbol = %snapshot.symbol, error = %err, "using neutral score");
                Ok(NEUTRAL_SCORE)
            }
        }
    }

    async fn justify(&self, snapshot: &AssetSnapshot, score: u8) -> Result<String, ScoringError> {
        self.client
            .complete(&Self::justification_messages(snapshot, score))
            .await
    }

    fn name(&self) -> &str {
        self.client.model()
    }
}
