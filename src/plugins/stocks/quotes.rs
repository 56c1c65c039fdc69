use async_trait::async_trait;
use serde::Deserialize;

use crate::shared::errors::{BotError, BotResult};

/// Stock-quote lookup by ticker.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Latest market price, or `None` when the provider has no price.
    async fn price(&self, symbol: &str) -> BotResult<Option<f64>>;
}

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (craftdesk)";

/// Quote source backed by Yahoo Finance's public chart endpoint.
pub struct YahooQuotes {
    http: reqwest::Client,
}

impl YahooQuotes {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl Default for YahooQuotes {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
}

#[async_trait]
impl QuoteSource for YahooQuotes {
    async fn price(&self, symbol: &str) -> BotResult<Option<f64>> {
        let response = self
            .http
            .get(format!("{}/{}", CHART_URL, symbol))
            .query(&[("interval", "1d"), ("range", "1d")])
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| BotError::external(format!("Quote request failed: {}", e)))?;

        if !response.status().is_success() {
            tracing::debug!(target: "stocks", symbol, status = %response.status(), "No quote");
            return Ok(None);
        }

        let body: ChartResponse = response
            .json()
            .await
            .map_err(|e| BotError::external(format!("Malformed quote response: {}", e)))?;

        Ok(body
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .and_then(|result| result.meta.regular_market_price))
    }
}
