use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use super::llm::ChatClient;
use super::scoring::{ChatScoringProtocol, ScoringError, ScoringProtocol};
use super::{AnalysisCache, RiskAssessment};
use crate::config::Config;
use crate::market_data::{AssetDataSource, AssetSnapshot, CoinGeckoClient};

/// Produces rug-pull risk assessments, always.
///
/// Every failure (provider down, no model credential, model error) degrades
/// to a canned assessment, so callers never see an analysis error. Results
/// are cached per asset id, including the fallbacks.
pub struct RiskAnalyzer {
    source: Arc<dyn AssetDataSource>,
    cache: Arc<AnalysisCache>,
    scoring: Option<Arc<dyn ScoringProtocol>>,
}

impl RiskAnalyzer {
    /// Analyzer without a language model; every uncached analysis is a fallback.
    pub fn new(source: Arc<dyn AssetDataSource>, cache: Arc<AnalysisCache>) -> Self {
        Self {
            source,
            cache,
            scoring: None,
        }
    }

    pub fn with_scoring(mut self, scoring: Arc<dyn ScoringProtocol>) -> Self {
        self.scoring = Some(scoring);
        self
    }

    /// Wire CoinGecko, the cache and (when a key is configured) the chat model.
    pub fn from_config(config: Config) -> Result<Self> {
        let source = Arc::new(CoinGeckoClient::from_config(config.market_data));
        let cache = Arc::new(AnalysisCache::new(config.cache.ttl));
        let analyzer = Self::new(source, cache);

        Ok(match ChatClient::from_config(config.llm) {
            Some(client) => analyzer.with_scoring(Arc::new(ChatScoringProtocol::new(client))),
            None => {
                warn!("no language model key configured; analyses will use fallback scores");
                analyzer
            }
        })
    }

    pub fn cache(&self) -> &Arc<AnalysisCache> {
        &self.cache
    }

    pub fn has_scoring(&self) -> bool {
        self.scoring.is_some()
    }

    /// Assess `asset_id`, optionally using market data the caller already has.
    ///
    /// A fresh cached assessment wins even over a provided snapshot.
    pub async fn analyze(
        &self,
        asset_id: &str,
        provided: Option<AssetSnapshot>,
    ) -> RiskAssessment {
        if let Some(cached) = self.cache.get_assessment(asset_id).await {
            debug!(asset_id, "assessment cache hit");
            return cached;
        }

        let snapshot = match provided {
            Some(snapshot) => {
                debug!(asset_id, "using caller-provided market data");
                self.cache.put(asset_id, Some(snapshot.clone()), None).await;
                snapshot
            }
            None => match self.cache.get_snapshot(asset_id).await {
                Some(snapshot) => {
                    debug!(asset_id, "snapshot cache hit");
                    snapshot
                }
                None => match self.source.fetch_asset(asset_id).await {
                    Ok(snapshot) => {
                        self.cache.put(asset_id, Some(snapshot.clone()), None).await;
                        snapshot
                    }
                    Err(err) => {
                        warn!(
                            asset_id,
                            source = self.source.name(),
                            error = %err,
                            "market data unavailable; using placeholder assessment"
                        );
                        let assessment = RiskAssessment::upstream_fallback(asset_id);
                        self.cache.put(asset_id, None, Some(assessment.clone())).await;
                        return assessment;
                    }
                },
            },
        };

        let assessment = match &self.scoring {
            None => RiskAssessment::model_fallback(snapshot),
            Some(scoring) => match Self::score_with(scoring.as_ref(), &snapshot).await {
                Ok(assessment) => {
                    info!(asset_id, score = assessment.score, "rug pull risk scored");
                    assessment
                }
                Err(err) => {
                    warn!(
                        asset_id,
                        scorer = scoring.name(),
                        error = %err,
                        "scoring failed; using fallback assessment"
                    );
                    RiskAssessment::model_fallback(snapshot)
                }
            },
        };

        self.cache.put(asset_id, None, Some(assessment.clone())).await;
        assessment
    }

    async fn score_with(
        scoring: &dyn ScoringProtocol,
        snapshot: &AssetSnapshot,
    ) -> Result<RiskAssessment, ScoringError> {
        let score = scoring.score(snapshot).await?;
        let justification = scoring.justify(snapshot, score).await?;
        Ok(RiskAssessment::new(score, justification, snapshot.clone()))
    }
}
