//! CoinGecko market data provider implementation

use crate::{
    config::DashboardConfig,
    constants::{COINGECKO_MARKETS_ENDPOINT, PRICE_CHANGE_WINDOWS, VS_CURRENCY},
    error::ProviderError,
    provider::MarketDataProvider,
    types::{CoinRecord, HistoryPoint},
};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;

/// One entry of the `/coins/markets` response
#[derive(Debug, Deserialize)]
struct CoinGeckoMarket {
    id: String,
    symbol: String,
    name: String,
    #[serde(default)]
    image: Option<String>,
    current_price: Option<f64>,
    total_volume: Option<f64>,
    market_cap: Option<f64>,
    price_change_percentage_1h_in_currency: Option<f64>,
    price_change_percentage_24h_in_currency: Option<f64>,
    price_change_percentage_7d_in_currency: Option<f64>,
    #[serde(default)]
    sparkline_in_7d: Option<CoinGeckoSparkline>,
}

#[derive(Debug, Deserialize)]
struct CoinGeckoSparkline {
    #[serde(default)]
    price: Vec<Option<f64>>,
}

impl From<CoinGeckoMarket> for CoinRecord {
    fn from(market: CoinGeckoMarket) -> Self {
        let sparkline_7d = market
            .sparkline_in_7d
            .map(|s| s.price.into_iter().flatten().collect())
            .unwrap_or_default();

        CoinRecord {
            id: market.id,
            symbol: market.symbol,
            name: market.name,
            image_url: market.image.unwrap_or_default(),
            current_price: market.current_price.unwrap_or(0.0),
            total_volume: market.total_volume.unwrap_or(0.0),
            market_cap: market.market_cap.unwrap_or(0.0),
            price_change_pct_1h: market.price_change_percentage_1h_in_currency,
            price_change_pct_24h: market.price_change_percentage_24h_in_currency,
            price_change_pct_7d: market.price_change_percentage_7d_in_currency,
            sparkline_7d,
        }
    }
}

/// `/coins/{id}/market_chart` response; only the price series is used
#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    prices: Vec<(f64, f64)>,
}

/// CoinGecko market data provider
pub struct CoinGeckoProvider {
    client: Client,
    api_url: String,
    request_timeout: Duration,
    history_timeout: Duration,
}

impl CoinGeckoProvider {
    /// Creates a new CoinGecko provider
    pub fn new(config: &DashboardConfig) -> Result<Self, ProviderError> {
        // Timeouts are set per request: the chart gets the longer history wait
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(ProviderError::NetworkError)?;

        Ok(Self::with_client(client, config))
    }

    fn with_client(client: Client, config: &DashboardConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
            request_timeout: config.request_timeout,
            history_timeout: config.history_timeout,
        }
    }

    /// Builds the URL of one market listing page
    fn build_markets_url(&self, page: NonZeroU32, per_page: u32) -> String {
        format!(
            "{}{}?vs_currency={}&order=market_cap_desc&per_page={}&page={}&sparkline=true&price_change_percentage={}",
            self.api_url, COINGECKO_MARKETS_ENDPOINT, VS_CURRENCY, per_page, page, PRICE_CHANGE_WINDOWS
        )
    }

    /// Builds the URL of an asset's price chart
    fn build_chart_url(&self, asset_id: &str, days: u32) -> String {
        format!(
            "{}/coins/{}/market_chart?vs_currency={}&days={}",
            self.api_url, asset_id, VS_CURRENCY, days
        )
    }

    /// Sends a GET request and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<T, ProviderError> {
        log::debug!("Fetching from CoinGecko: {}", url);

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::NetworkError(e)
                }
            })?;

        // Check for rate limiting
        if response.status().as_u16() == 429 {
            return Err(ProviderError::RateLimitExceeded);
        }

        // Check for other errors
        if !response.status().is_success() {
            return Err(ProviderError::ApiError(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let response_text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout
            } else {
                ProviderError::NetworkError(e)
            }
        })?;

        serde_json::from_str(&response_text).map_err(|e| {
            ProviderError::InvalidResponse(format!(
                "Failed to parse CoinGecko response: {}. Response: {}",
                e,
                truncate(&response_text, 256)
            ))
        })
    }
}

/// Converts `[timestamp_ms, price]` pairs into chronological points
/// labelled with their UTC calendar date
fn parse_chart(response: MarketChartResponse) -> Result<Vec<HistoryPoint>, ProviderError> {
    let mut prices = response.prices;
    prices.sort_by(|a, b| a.0.total_cmp(&b.0));

    prices
        .into_iter()
        .map(|(timestamp_ms, price)| {
            let date = DateTime::from_timestamp_millis(timestamp_ms as i64).ok_or_else(|| {
                ProviderError::InvalidResponse(format!("Invalid timestamp: {}", timestamp_ms))
            })?;
            Ok(HistoryPoint::new(date.format("%Y-%m-%d").to_string(), price))
        })
        .collect()
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    async fn fetch_markets(
        &self,
        page: NonZeroU32,
        per_page: u32,
    ) -> Result<Vec<CoinRecord>, ProviderError> {
        let url = self.build_markets_url(page, per_page);
        let markets: Vec<CoinGeckoMarket> = self.get_json(&url, self.request_timeout).await?;

        log::debug!(
            "Successfully fetched {} markets from CoinGecko (page {})",
            markets.len(),
            page
        );

        Ok(markets.into_iter().map(CoinRecord::from).collect())
    }

    async fn fetch_market_chart(
        &self,
        asset_id: &str,
        days: u32,
    ) -> Result<Vec<HistoryPoint>, ProviderError> {
        let url = self.build_chart_url(asset_id, days);
        let chart: MarketChartResponse = self.get_json(&url, self.history_timeout).await?;
        let points = parse_chart(chart)?;

        log::debug!(
            "Successfully fetched {} history points for {} from CoinGecko",
            points.len(),
            asset_id
        );

        Ok(points)
    }

    fn provider_name(&self) -> &'static str {
        "coingecko"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{HistoryFetcher, HistorySource};
    use crate::metrics::MetricsCollector;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn provider() -> CoinGeckoProvider {
        CoinGeckoProvider::new(&DashboardConfig::default()).unwrap()
    }

    /// Serves one HTTP response on a local port after `delay`; returns the base URL
    async fn serve_once(status: &'static str, body: &'static str, delay: Duration) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; 4096];
            let _ = socket.read(&mut request).await;
            tokio::time::sleep(delay).await;
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });

        format!("http://{addr}")
    }

    fn local_provider(api_url: String) -> CoinGeckoProvider {
        let client = Client::builder().no_proxy().build().unwrap();
        CoinGeckoProvider::with_client(
            client,
            &DashboardConfig {
                api_url,
                request_timeout: Duration::from_millis(200),
                history_timeout: Duration::from_secs(2),
                ..DashboardConfig::default()
            },
        )
    }

    #[test]
    fn test_markets_url() {
        let url = provider().build_markets_url(NonZeroU32::new(3).unwrap(), 50);
        assert_eq!(
            url,
            "https://api.coingecko.com/api/v3/coins/markets?vs_currency=usd&order=market_cap_desc\
             &per_page=50&page=3&sparkline=true&price_change_percentage=1h,24h,7d"
        );
    }

    #[test]
    fn test_chart_url() {
        let url = provider().build_chart_url("bitcoin", 7);
        assert_eq!(
            url,
            "https://api.coingecko.com/api/v3/coins/bitcoin/market_chart?vs_currency=usd&days=7"
        );
    }

    #[test]
    fn test_parse_market_entry() {
        let json = r#"[{
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin",
            "image": "https://coin-images.coingecko.com/coins/images/1/large/bitcoin.png",
            "current_price": 67123.5,
            "market_cap": 1323000000000,
            "total_volume": 28000000000,
            "price_change_percentage_1h_in_currency": -0.12,
            "price_change_percentage_24h_in_currency": 1.8,
            "price_change_percentage_7d_in_currency": null,
            "sparkline_in_7d": { "price": [66000.1, 66500.2, null, 67100.0] }
        }]"#;

        let markets: Vec<CoinGeckoMarket> = serde_json::from_str(json).unwrap();
        let record = CoinRecord::from(markets.into_iter().next().unwrap());

        assert_eq!(record.id, "bitcoin");
        assert_eq!(record.current_price, 67123.5);
        assert_eq!(record.market_cap, 1.323e12);
        assert_eq!(record.price_change_pct_1h, Some(-0.12));
        assert_eq!(record.price_change_pct_7d, None);
        assert_eq!(record.sparkline_7d, vec![66000.1, 66500.2, 67100.0]);
    }

    #[test]
    fn test_parse_market_entry_with_nulls() {
        let json = r#"[{
            "id": "new-token",
            "symbol": "new",
            "name": "New Token",
            "image": null,
            "current_price": null,
            "market_cap": null,
            "total_volume": null
        }]"#;

        let markets: Vec<CoinGeckoMarket> = serde_json::from_str(json).unwrap();
        let record = CoinRecord::from(markets.into_iter().next().unwrap());

        assert_eq!(record.current_price, 0.0);
        assert_eq!(record.market_cap, 0.0);
        assert!(record.image_url.is_empty());
        assert!(record.sparkline_7d.is_empty());
        assert_eq!(record.price_change_pct_24h, None);
    }

    #[test]
    fn test_parse_chart_sorts_and_labels_by_date() {
        let json = r#"{
            "prices": [[1704153600000, 46000.0], [1704067200000, 45000.0], [1704240000000, 44000.5]],
            "market_caps": [],
            "total_volumes": []
        }"#;
        let chart: MarketChartResponse = serde_json::from_str(json).unwrap();
        let points = parse_chart(chart).unwrap();

        assert_eq!(
            points,
            vec![
                HistoryPoint::new("2024-01-01", 45000.0),
                HistoryPoint::new("2024-01-02", 46000.0),
                HistoryPoint::new("2024-01-03", 44000.5),
            ]
        );
    }

    #[test]
    fn test_parse_chart_rejects_missing_prices() {
        let result: Result<MarketChartResponse, _> =
            serde_json::from_str(r#"{"error": "coin not found"}"#);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_chart_waits_past_market_timeout() {
        let url = serve_once(
            "200 OK",
            r#"{"prices":[[1704067200000,45000.0]]}"#,
            Duration::from_millis(600),
        )
        .await;

        let fetcher = HistoryFetcher::new(
            Arc::new(local_provider(url)),
            Duration::from_secs(2),
            Arc::new(MetricsCollector::new("coins/market_chart")),
        );
        let outcome = fetcher.fetch_history("bitcoin", 7).await;

        assert_eq!(outcome.source, HistorySource::Provider);
        assert_eq!(outcome.points, vec![HistoryPoint::new("2024-01-01", 45000.0)]);
    }

    #[tokio::test]
    async fn test_markets_use_request_timeout() {
        let url = serve_once("200 OK", "[]", Duration::from_millis(600)).await;

        let err = local_provider(url)
            .fetch_markets(NonZeroU32::MIN, 50)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Timeout));
    }

    #[tokio::test]
    async fn test_rate_limit_status() {
        let url = serve_once("429 Too Many Requests", "{}", Duration::ZERO).await;

        let err = local_provider(url)
            .fetch_markets(NonZeroU32::MIN, 50)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::RateLimitExceeded));
    }

    #[tokio::test]
    async fn test_error_status_is_api_error() {
        let url = serve_once(
            "404 Not Found",
            r#"{"error":"coin not found"}"#,
            Duration::ZERO,
        )
        .await;

        let err = local_provider(url)
            .fetch_market_chart("no-such-coin", 7)
            .await
            .unwrap_err();
        match err {
            ProviderError::ApiError(message) => {
                assert!(message.starts_with("HTTP 404"));
                assert!(message.contains("coin not found"));
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unparseable_body_is_invalid_response() {
        let url = serve_once("200 OK", r#"{"error":"oops"}"#, Duration::ZERO).await;

        let err = local_provider(url)
            .fetch_market_chart("bitcoin", 7)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("ab", 3), "ab");
    }
}
