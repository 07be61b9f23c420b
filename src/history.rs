//! Single-asset price history with fallback
//!
//! The chart always gets renderable data: any failure while fetching the
//! real series (network, status, malformed body, empty series, or exceeding
//! the bounded wait) is absorbed and replaced by a fixed sample series.

use crate::{
    constants::FALLBACK_HISTORY,
    error::ProviderError,
    metrics::MetricsCollector,
    provider::MarketDataProvider,
    types::HistoryPoint,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Where a history series came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistorySource {
    Provider,
    Fallback,
}

/// Result of a history fetch; never an error
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryOutcome {
    pub asset_id: String,
    pub points: Vec<HistoryPoint>,
    pub source: HistorySource,
}

impl HistoryOutcome {
    pub fn is_fallback(&self) -> bool {
        self.source == HistorySource::Fallback
    }
}

/// Chart state for the current selection
#[derive(Debug, Clone, PartialEq, Default)]
pub enum HistoryState {
    /// Nothing selected yet
    #[default]
    Idle,
    /// A fetch for `asset_id` is in flight
    Loading { asset_id: String },
    /// Provider data
    Loaded {
        asset_id: String,
        points: Vec<HistoryPoint>,
    },
    /// Fallback data after a failed fetch
    LoadedWithFallback {
        asset_id: String,
        points: Vec<HistoryPoint>,
    },
}

impl HistoryState {
    /// Selected asset, if any
    pub fn asset_id(&self) -> Option<&str> {
        match self {
            HistoryState::Idle => None,
            HistoryState::Loading { asset_id }
            | HistoryState::Loaded { asset_id, .. }
            | HistoryState::LoadedWithFallback { asset_id, .. } => Some(asset_id),
        }
    }

    /// Points ready to chart; empty while idle or loading
    pub fn points(&self) -> &[HistoryPoint] {
        match self {
            HistoryState::Loaded { points, .. } | HistoryState::LoadedWithFallback { points, .. } => {
                points.as_slice()
            }
            _ => &[],
        }
    }

    /// Latest price of the series
    pub fn current_price(&self) -> Option<f64> {
        self.points().last().map(|p| p.price)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, HistoryState::Loading { .. })
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, HistoryState::LoadedWithFallback { .. })
    }
}

impl From<HistoryOutcome> for HistoryState {
    fn from(outcome: HistoryOutcome) -> Self {
        match outcome.source {
            HistorySource::Provider => HistoryState::Loaded {
                asset_id: outcome.asset_id,
                points: outcome.points,
            },
            HistorySource::Fallback => HistoryState::LoadedWithFallback {
                asset_id: outcome.asset_id,
                points: outcome.points,
            },
        }
    }
}

/// The fixed series substituted on failure
pub fn fallback_history() -> Vec<HistoryPoint> {
    FALLBACK_HISTORY
        .iter()
        .map(|(date, price)| HistoryPoint::new(*date, *price))
        .collect()
}

/// Fetches chart history with a bounded wait
pub struct HistoryFetcher {
    provider: Arc<dyn MarketDataProvider>,
    timeout: Duration,
    metrics: Arc<MetricsCollector>,
}

impl HistoryFetcher {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        timeout: Duration,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            provider,
            timeout,
            metrics,
        }
    }

    /// Fetches `days` of history for `asset_id`, substituting the fallback
    /// series on any failure
    pub async fn fetch_history(&self, asset_id: &str, days: u32) -> HistoryOutcome {
        let start = Instant::now();
        let result = match tokio::time::timeout(
            self.timeout,
            self.provider.fetch_market_chart(asset_id, days),
        )
        .await
        {
            Ok(Ok(points)) if points.is_empty() => Err(ProviderError::InvalidResponse(
                "Empty price series".to_string(),
            )),
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout),
        };

        match result {
            Ok(points) => {
                self.metrics.record_request(start.elapsed(), true).await;
                HistoryOutcome {
                    asset_id: asset_id.to_string(),
                    points,
                    source: HistorySource::Provider,
                }
            }
            Err(e) => {
                self.metrics.record_request(start.elapsed(), false).await;
                tracing::warn!(
                    asset_id,
                    provider = self.provider.provider_name(),
                    kind = %e.kind(),
                    error = %e,
                    "History fetch failed, using fallback series"
                );
                HistoryOutcome {
                    asset_id: asset_id.to_string(),
                    points: fallback_history(),
                    source: HistorySource::Fallback,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::MockProvider;

    fn fetcher(provider: &MockProvider, timeout: Duration) -> HistoryFetcher {
        HistoryFetcher::new(
            Arc::new(provider.clone()),
            timeout,
            Arc::new(MetricsCollector::new("market_chart")),
        )
    }

    fn expected_fallback() -> Vec<HistoryPoint> {
        vec![
            HistoryPoint::new("2024-01-01", 45000.0),
            HistoryPoint::new("2024-01-02", 46000.0),
            HistoryPoint::new("2024-01-03", 44000.0),
            HistoryPoint::new("2024-01-04", 47000.0),
            HistoryPoint::new("2024-01-05", 48000.0),
            HistoryPoint::new("2024-01-06", 46500.0),
            HistoryPoint::new("2024-01-07", 47500.0),
        ]
    }

    #[tokio::test]
    async fn test_returns_provider_series() {
        let provider = MockProvider::new();
        let points = vec![
            HistoryPoint::new("2024-05-01", 3000.0),
            HistoryPoint::new("2024-05-02", 3100.0),
        ];
        provider.set_chart("ethereum", points.clone());

        let outcome = fetcher(&provider, Duration::from_secs(15))
            .fetch_history("ethereum", 7)
            .await;

        assert_eq!(outcome.source, HistorySource::Provider);
        assert_eq!(outcome.points, points);
        assert_eq!(provider.chart_calls(), vec![("ethereum".to_string(), 7)]);
    }

    #[tokio::test]
    async fn test_network_failure_uses_fallback() {
        let provider = MockProvider::new();
        provider.set_chart_error("bitcoin", ProviderError::Timeout);

        let outcome = fetcher(&provider, Duration::from_secs(15))
            .fetch_history("bitcoin", 7)
            .await;

        assert!(outcome.is_fallback());
        assert_eq!(outcome.asset_id, "bitcoin");
        assert_eq!(outcome.points, expected_fallback());
    }

    #[tokio::test]
    async fn test_malformed_and_empty_use_fallback() {
        let provider = MockProvider::new();
        provider.set_chart_error(
            "cardano",
            ProviderError::InvalidResponse("missing prices".to_string()),
        );
        provider.set_chart("ripple", Vec::new());
        let fetcher = fetcher(&provider, Duration::from_secs(15));

        assert!(fetcher.fetch_history("cardano", 7).await.is_fallback());
        assert!(fetcher.fetch_history("ripple", 7).await.is_fallback());
    }

    #[tokio::test]
    async fn test_slow_provider_hits_bounded_wait() {
        let provider = MockProvider::new();
        provider.set_chart("solana", vec![HistoryPoint::new("2024-05-01", 150.0)]);
        provider.set_chart_delay("solana", Duration::from_secs(5));

        let outcome = fetcher(&provider, Duration::from_millis(50))
            .fetch_history("solana", 7)
            .await;

        assert!(outcome.is_fallback());
        assert_eq!(outcome.points, expected_fallback());
    }

    #[tokio::test]
    async fn test_failures_are_recorded_in_metrics() {
        let provider = MockProvider::new();
        provider.set_chart("bitcoin", vec![HistoryPoint::new("2024-05-01", 60000.0)]);
        let metrics = Arc::new(MetricsCollector::new("market_chart"));
        let fetcher = HistoryFetcher::new(
            Arc::new(provider.clone()),
            Duration::from_secs(15),
            metrics.clone(),
        );

        fetcher.fetch_history("bitcoin", 7).await;
        fetcher.fetch_history("dogecoin", 7).await;

        let snapshot = metrics.get_metrics().await;
        assert_eq!(snapshot.total_requests, 2);
        assert_eq!(snapshot.failed_requests, 1);
    }

    #[test]
    fn test_state_accessors() {
        let state = HistoryState::from(HistoryOutcome {
            asset_id: "bitcoin".to_string(),
            points: fallback_history(),
            source: HistorySource::Fallback,
        });
        assert!(state.is_fallback());
        assert_eq!(state.asset_id(), Some("bitcoin"));
        assert_eq!(state.current_price(), Some(47500.0));

        let loading = HistoryState::Loading {
            asset_id: "ethereum".to_string(),
        };
        assert!(loading.is_loading());
        assert!(loading.points().is_empty());
        assert_eq!(loading.current_price(), None);
        assert_eq!(HistoryState::default().asset_id(), None);
    }
}
