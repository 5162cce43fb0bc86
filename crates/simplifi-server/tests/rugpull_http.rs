#[path = "../../../tests/support/mod.rs"]
mod support;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};
use simplifi::market_data::AssetSnapshot;
use simplifi::risk::{AnalysisCache, RiskAnalyzer, FALLBACK_JUSTIFICATION};
use simplifi_server::{router, AppState};
use support::MockAssetSource;

fn bitcoin() -> AssetSnapshot {
    AssetSnapshot::from_provider_json(&json!({
        "name": "Bitcoin",
        "symbol": "btc",
        "current_price": 64000.0,
        "market_cap": 1260000000000.0
    }))
}

async fn spawn_server(source: Arc<MockAssetSource>) -> Result<SocketAddr> {
    let cache = Arc::new(AnalysisCache::new(Duration::from_secs(86_400)));
    let analyzer = Arc::new(RiskAnalyzer::new(source, cache));
    let app = router(AppState::new(analyzer));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(addr)
}

#[tokio::test]
async fn root_and_health_respond() -> Result<()> {
    let addr = spawn_server(Arc::new(MockAssetSource::new())).await?;
    let client = reqwest::Client::new();

    let root: Value = client.get(format!("http://{addr}/")).send().await?.json().await?;
    assert_eq!(root["message"], "Welcome to SimpliFi Crypto Dashboard API");

    let health: Value = client
        .get(format!("http://{addr}/health"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(health["status"], "ok");

    Ok(())
}

#[tokio::test]
async fn get_rugpull_for_unknown_coin_returns_placeholder() -> Result<()> {
    let addr = spawn_server(Arc::new(MockAssetSource::new())).await?;

    let response = reqwest::get(format!("http://{addr}/api/rugpull/made-up-coin-xyz")).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await?;
    assert_eq!(body["score"], 75);
    assert_eq!(body["justification"], FALLBACK_JUSTIFICATION);
    assert_eq!(body["coin_info"]["Name"], "Made Up Coin Xyz");
    assert_eq!(body["coin_info"]["Symbol"], "MADE");

    Ok(())
}

#[tokio::test]
async fn get_rugpull_reports_fetched_market_data() -> Result<()> {
    let source = Arc::new(MockAssetSource::new().with_asset("bitcoin", bitcoin()));
    let addr = spawn_server(source.clone()).await?;

    let body: Value = reqwest::get(format!("http://{addr}/api/rugpull/bitcoin"))
        .await?
        .json()
        .await?;
    assert_eq!(body["coin_info"]["Name"], "Bitcoin");
    assert_eq!(body["coin_info"]["Symbol"], "BTC");
    assert_eq!(body["coin_info"]["Current Price"], 64000.0);

    reqwest::get(format!("http://{addr}/api/rugpull/bitcoin")).await?;
    assert_eq!(source.calls(), 1);

    Ok(())
}

#[tokio::test]
async fn post_rugpull_uses_provided_coin_data() -> Result<()> {
    let source = Arc::new(MockAssetSource::new());
    let addr = spawn_server(source.clone()).await?;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/api/rugpull/moon-rocket"))
        .json(&json!({
            "coin_data": { "name": "Moon Rocket", "symbol": "moon", "current_price": 0.0004 }
        }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await?;
    assert_eq!(body["coin_info"]["Name"], "Moon Rocket");
    assert_eq!(body["coin_info"]["Symbol"], "MOON");
    assert_eq!(source.calls(), 0);

    Ok(())
}

#[tokio::test]
async fn post_rugpull_with_malformed_body_is_rejected() -> Result<()> {
    let addr = spawn_server(Arc::new(MockAssetSource::new())).await?;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/api/rugpull/bitcoin"))
        .header("content-type", "application/json")
        .body("{coin_data:")
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await?;
    assert!(body["detail"].as_str().unwrap_or_default().contains("invalid request body"));

    Ok(())
}
