mod analyzer;
mod cache;
pub mod llm;
mod models;
mod scoring;

pub use analyzer::RiskAnalyzer;
pub use cache::AnalysisCache;
pub use llm::{ChatClient, ChatMessage};
pub use models::{
    RiskAssessment, FALLBACK_JUSTIFICATION, MODEL_FALLBACK_SCORE, NEUTRAL_SCORE,
    UPSTREAM_FALLBACK_SCORE,
};
pub use scoring::{parse_score, ChatScoringProtocol, ScoringError, ScoringProtocol};
