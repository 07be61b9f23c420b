//! Market dashboard service
//!
//! Owns the view state and the two result slots (market page, chart
//! history) and turns UI events into fetches or re-projections.

use crate::{
    config::DashboardConfig,
    constants::{CHART_TOKENS, DEFAULT_CHART_ASSET, EVENT_CHANNEL_CAPACITY, PER_PAGE},
    engine::{self, SortKey, ViewState},
    error::{DashboardError, ProviderError},
    favorites::{FavoritesStore, InMemoryFavorites},
    history::{HistoryFetcher, HistoryState},
    metrics::{EndpointMetrics, MetricsCollector},
    provider::MarketDataProvider,
    providers::CoinGeckoProvider,
    sequencer::{Commit, RequestSequencer, RequestTicket},
    types::{
        Chain, CoinRecord, ComponentHealth, DashboardEvent, HealthStatus, RequestSlot,
        TrackedToken,
    },
    wallet::{ChainSelector, StaticChainSelector},
};
use chrono::Utc;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

/// Contents of the market page slot
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PageState {
    #[default]
    Idle,
    Loading {
        page: u32,
    },
    Loaded {
        page: u32,
        records: Vec<CoinRecord>,
    },
    /// Shown as "failed to load" with a retry action
    Failed {
        page: u32,
        error: DashboardError,
    },
}

impl PageState {
    pub fn page(&self) -> Option<u32> {
        match self {
            PageState::Idle => None,
            PageState::Loading { page }
            | PageState::Loaded { page, .. }
            | PageState::Failed { page, .. } => Some(*page),
        }
    }

    /// Records as fetched, before sorting and filtering
    pub fn records(&self) -> &[CoinRecord] {
        match self {
            PageState::Loaded { records, .. } => records.as_slice(),
            _ => &[],
        }
    }

    fn label(&self) -> &'static str {
        match self {
            PageState::Idle => "idle",
            PageState::Loading { .. } => "loading",
            PageState::Loaded { .. } => "loaded",
            PageState::Failed { .. } => "failed",
        }
    }
}

/// Client-side model of the market dashboard
///
/// # Example
/// ```no_run
/// use market_dashboard_sdk::{MarketDashboard, SortKey};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let dashboard = MarketDashboard::new()?;
/// dashboard.initialize().await?;
///
/// dashboard.sort_by(SortKey::CurrentPrice).await;
/// for coin in dashboard.visible_coins().await {
///     println!("{:<8} ${:.2}", coin.display_symbol(), coin.current_price);
/// }
/// # Ok(())
/// # }
/// ```
pub struct MarketDashboard {
    provider: Arc<dyn MarketDataProvider>,
    favorites: Arc<dyn FavoritesStore>,
    chains: Arc<dyn ChainSelector>,
    config: DashboardConfig,
    view: RwLock<ViewState>,
    page: RwLock<PageState>,
    history: RwLock<HistoryState>,
    page_requests: RequestSequencer,
    history_requests: RequestSequencer,
    history_fetcher: HistoryFetcher,
    market_metrics: Arc<MetricsCollector>,
    chart_metrics: Arc<MetricsCollector>,
    events: broadcast::Sender<DashboardEvent>,
}

impl MarketDashboard {
    /// Creates a dashboard backed by CoinGecko, configured from the environment
    pub fn new() -> Result<Self, ProviderError> {
        let config = DashboardConfig::from_env();
        let provider = Arc::new(CoinGeckoProvider::new(&config)?);
        Ok(Self::with_config(provider, config))
    }

    /// Creates a dashboard with a custom provider and default configuration
    pub fn with_provider(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self::with_config(provider, DashboardConfig::default())
    }

    /// Creates a dashboard with a custom provider and configuration
    pub fn with_config(provider: Arc<dyn MarketDataProvider>, config: DashboardConfig) -> Self {
        let market_metrics = Arc::new(MetricsCollector::new("coins/markets"));
        let chart_metrics = Arc::new(MetricsCollector::new("coins/market_chart"));
        let history_fetcher =
            HistoryFetcher::new(provider.clone(), config.history_timeout, chart_metrics.clone());
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            provider,
            favorites: Arc::new(InMemoryFavorites::new()),
            chains: Arc::new(StaticChainSelector::default()),
            config,
            view: RwLock::new(ViewState::default()),
            page: RwLock::new(PageState::Idle),
            history: RwLock::new(HistoryState::Idle),
            page_requests: RequestSequencer::new(),
            history_requests: RequestSequencer::new(),
            history_fetcher,
            market_metrics,
            chart_metrics,
            events,
        }
    }

    /// Replaces the favorites store
    pub fn with_favorites(mut self, favorites: Arc<dyn FavoritesStore>) -> Self {
        self.favorites = favorites;
        self
    }

    /// Replaces the wallet/chain collaborator
    pub fn with_chain_selector(mut self, chains: Arc<dyn ChainSelector>) -> Self {
        self.chains = chains;
        self
    }

    /// Loads the current page and the default chart asset concurrently
    pub async fn initialize(&self) -> Result<Commit, DashboardError> {
        tracing::info!(
            provider = self.provider.provider_name(),
            asset = DEFAULT_CHART_ASSET,
            "Initializing market dashboard"
        );
        let (page, _) = futures::join!(self.load_page(), self.select_asset(DEFAULT_CHART_ASSET));
        page
    }

    // ---- market table -------------------------------------------------

    /// Fetches the page currently selected in the view
    pub async fn load_page(&self) -> Result<Commit, DashboardError> {
        let page = self.view.read().await.page;
        self.fetch_page(page).await
    }

    /// Re-issues the fetch for the current page after a failure
    pub async fn retry(&self) -> Result<Commit, DashboardError> {
        self.load_page().await
    }

    /// Advances to the next page and fetches it
    pub async fn next_page(&self) -> Result<Commit, DashboardError> {
        let page = {
            let mut view = self.view.write().await;
            view.next_page();
            view.page
        };
        self.fetch_page(page).await
    }

    /// Goes back one page and fetches it; no-op on page 1
    pub async fn previous_page(&self) -> Result<Commit, DashboardError> {
        let page = {
            let mut view = self.view.write().await;
            if !view.previous_page() {
                return Ok(Commit::Unchanged);
            }
            view.page
        };
        self.fetch_page(page).await
    }

    async fn fetch_page(&self, page: NonZeroU32) -> Result<Commit, DashboardError> {
        let ticket = {
            let mut slot = self.page.write().await;
            let ticket = self.page_requests.issue(page.to_string());
            *slot = PageState::Loading { page: page.get() };
            ticket
        };

        let start = Instant::now();
        let result = self.provider.fetch_markets(page, PER_PAGE).await;
        self.market_metrics
            .record_request(start.elapsed(), result.is_ok())
            .await;

        let mut slot = self.page.write().await;
        if !self.page_requests.is_latest(&ticket) {
            drop(slot);
            self.discard(RequestSlot::Markets, &ticket);
            return Ok(Commit::Superseded);
        }

        match result {
            Ok(records) => {
                tracing::info!(
                    page = page.get(),
                    records = records.len(),
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Loaded market page"
                );
                let count = records.len();
                *slot = PageState::Loaded {
                    page: page.get(),
                    records,
                };
                self.emit(DashboardEvent::PageLoaded {
                    id: Uuid::new_v4(),
                    page: page.get(),
                    records: count,
                    timestamp: Utc::now(),
                });
                Ok(Commit::Applied)
            }
            Err(e) => {
                tracing::warn!(page = page.get(), kind = %e.kind(), error = %e, "Failed to load market page");
                let error = DashboardError::load_failed(page.get(), &e);
                *slot = PageState::Failed {
                    page: page.get(),
                    error: error.clone(),
                };
                self.emit(DashboardEvent::PageLoadFailed {
                    id: Uuid::new_v4(),
                    page: page.get(),
                    error_message: error.to_string(),
                    timestamp: Utc::now(),
                });
                Err(error)
            }
        }
    }

    /// Clicks a column header: same column flips direction, a new one sorts descending
    pub async fn sort_by(&self, key: SortKey) -> ViewState {
        let mut view = self.view.write().await;
        view.apply_sort(key);
        tracing::debug!(key = ?key, direction = ?view.sort_direction, "Sort changed");
        view.clone()
    }

    /// Restricts the table to favorites
    pub async fn set_favorites_only(&self, favorites_only: bool) {
        self.view.write().await.favorites_only = favorites_only;
    }

    /// Stars or unstars a coin; returns whether it is now a favorite
    pub fn toggle_favorite(&self, coin_id: &str) -> bool {
        let favorite = self.favorites.toggle(coin_id);
        self.emit(DashboardEvent::FavoriteToggled {
            id: Uuid::new_v4(),
            coin_id: coin_id.to_string(),
            favorite,
            timestamp: Utc::now(),
        });
        favorite
    }

    pub fn is_favorite(&self, coin_id: &str) -> bool {
        self.favorites.is_favorite(coin_id)
    }

    pub fn favorites(&self) -> &dyn FavoritesStore {
        self.favorites.as_ref()
    }

    pub async fn view_state(&self) -> ViewState {
        self.view.read().await.clone()
    }

    pub async fn page_state(&self) -> PageState {
        self.page.read().await.clone()
    }

    /// Rows to display: the committed page, filtered and sorted per the view
    pub async fn visible_coins(&self) -> Vec<CoinRecord> {
        let view = self.view.read().await.clone();
        let page = self.page.read().await;
        engine::project(page.records(), &view, self.favorites.as_ref())
    }

    // ---- price chart --------------------------------------------------

    /// Tokens selectable on the chart
    pub fn chart_tokens(&self) -> &'static [TrackedToken] {
        CHART_TOKENS
    }

    /// Selects the chart asset and fetches its history.
    ///
    /// Always ends in a loaded state; returns `Superseded` if another asset
    /// was selected before this fetch finished.
    pub async fn select_asset(&self, asset_id: &str) -> Commit {
        let ticket = {
            let mut slot = self.history.write().await;
            let ticket = self.history_requests.issue(asset_id);
            *slot = HistoryState::Loading {
                asset_id: asset_id.to_string(),
            };
            ticket
        };

        let outcome = self
            .history_fetcher
            .fetch_history(asset_id, self.config.history_days)
            .await;

        let mut slot = self.history.write().await;
        if !self.history_requests.is_latest(&ticket) {
            drop(slot);
            self.discard(RequestSlot::History, &ticket);
            return Commit::Superseded;
        }

        let event = DashboardEvent::HistoryLoaded {
            id: Uuid::new_v4(),
            asset_id: outcome.asset_id.clone(),
            points: outcome.points.len(),
            fallback: outcome.is_fallback(),
            timestamp: Utc::now(),
        };
        *slot = HistoryState::from(outcome);
        drop(slot);

        self.emit(event);
        Commit::Applied
    }

    pub async fn history_state(&self) -> HistoryState {
        self.history.read().await.clone()
    }

    // ---- wallet -------------------------------------------------------

    pub fn active_chain(&self) -> Option<Chain> {
        self.chains.active_chain()
    }

    pub fn active_chain_name(&self) -> Option<&'static str> {
        self.chains.active_chain().map(|c| c.name)
    }

    pub fn supported_chains(&self) -> &[Chain] {
        self.chains.supported_chains()
    }

    /// Asks the wallet to switch chains. Failures are logged and leave the
    /// previous chain active.
    pub async fn switch_chain(&self, chain_id: u64) -> Result<Chain, DashboardError> {
        match self.chains.switch_chain(chain_id).await {
            Ok(chain) => {
                tracing::info!(chain = chain.name, chain_id, "Switched chain");
                self.emit(DashboardEvent::ChainSwitched {
                    id: Uuid::new_v4(),
                    chain_id,
                    timestamp: Utc::now(),
                });
                Ok(chain)
            }
            Err(e) => {
                tracing::warn!(chain_id, error = %e, "Failed to switch chain");
                self.emit(DashboardEvent::ChainSwitchFailed {
                    id: Uuid::new_v4(),
                    chain_id,
                    error_message: e.to_string(),
                    timestamp: Utc::now(),
                });
                Err(DashboardError::chain_switch(chain_id, &e))
            }
        }
    }

    // ---- observability ------------------------------------------------

    /// Subscribes to dashboard events
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    /// Returns the name of the current provider
    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    /// Latency and success metrics for the listing and chart endpoints
    pub async fn endpoint_metrics(&self) -> Vec<EndpointMetrics> {
        vec![
            self.market_metrics.get_metrics().await,
            self.chart_metrics.get_metrics().await,
        ]
    }

    /// Perform a health check on the dashboard
    pub async fn health_check(&self) -> ComponentHealth {
        let page = self.page.read().await.clone();
        let history = self.history.read().await.clone();
        let mut details = HashMap::new();

        details.insert("provider_name".to_string(), serde_json::json!(self.provider_name()));
        details.insert("page_state".to_string(), serde_json::json!(page.label()));
        details.insert("page".to_string(), serde_json::json!(page.page()));
        details.insert("records".to_string(), serde_json::json!(page.records().len()));
        details.insert(
            "favorites".to_string(),
            serde_json::json!(self.favorites.count()),
        );
        details.insert("chart_asset".to_string(), serde_json::json!(history.asset_id()));
        details.insert(
            "chart_fallback".to_string(),
            serde_json::json!(history.is_fallback()),
        );

        let (status, message) = match (&page, history.is_fallback()) {
            (PageState::Loaded { .. }, false) => (
                HealthStatus::Healthy,
                "Market page and chart are showing provider data".to_string(),
            ),
            (PageState::Loaded { .. }, true) => (
                HealthStatus::Degraded,
                "Chart is showing fallback data".to_string(),
            ),
            (PageState::Failed { error, .. }, _) => (HealthStatus::Unhealthy, error.to_string()),
            _ => (
                HealthStatus::Unhealthy,
                "No market page loaded yet".to_string(),
            ),
        };

        ComponentHealth {
            name: "market_dashboard".to_string(),
            status,
            message: Some(message),
            details,
            last_checked: Utc::now(),
        }
    }

    fn discard(&self, slot: RequestSlot, ticket: &RequestTicket) {
        tracing::debug!(slot = ?slot, key = %ticket.key, seq = ticket.seq(), "Discarding superseded response");
        self.emit(DashboardEvent::StaleResponseDiscarded {
            id: Uuid::new_v4(),
            slot,
            key: ticket.key.clone(),
            timestamp: Utc::now(),
        });
    }

    fn emit(&self, event: DashboardEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
