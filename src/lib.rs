//! # Market Dashboard SDK
//!
//! Client-side data model for a cryptocurrency market dashboard: a paged,
//! sortable market table with a favorites filter, and a 7-day price chart
//! for one selected token, backed by CoinGecko.
//!
//! ## Usage
//!
//! ```no_run
//! use market_dashboard_sdk::{MarketDashboard, SortKey};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dashboard = MarketDashboard::new()?;
//! dashboard.initialize().await?;
//!
//! // Click the "Price" header twice: descending, then ascending
//! dashboard.sort_by(SortKey::CurrentPrice).await;
//! dashboard.sort_by(SortKey::CurrentPrice).await;
//!
//! dashboard.toggle_favorite("bitcoin");
//! dashboard.set_favorites_only(true).await;
//! for coin in dashboard.visible_coins().await {
//!     println!("{}: ${:.2}", coin.display_symbol(), coin.current_price);
//! }
//!
//! dashboard.select_asset("ethereum").await;
//! if let Some(price) = dashboard.history_state().await.current_price() {
//!     println!("ETH: ${:.2}", price);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! MarketDashboard (view state, page slot, history slot)
//!     ├── MarketDataProvider (CoinGecko)   /coins/markets, /coins/{id}/market_chart
//!     ├── HistoryFetcher                   bounded wait + fallback series
//!     ├── engine::project                  favorites filter + stable sort
//!     ├── FavoritesStore                   in-memory, injectable
//!     └── ChainSelector                    wallet collaborator
//! ```
//!
//! Page and history fetches each write a single slot that is replaced
//! wholesale. A response is committed only if no newer request for the same
//! slot was issued while it was in flight.
//!
//! ## Error Handling
//!
//! ```no_run
//! use market_dashboard_sdk::{DashboardError, MarketDashboard};
//!
//! # async fn example(dashboard: MarketDashboard) {
//! match dashboard.load_page().await {
//!     Ok(_) => {}
//!     Err(DashboardError::LoadFailed { page, kind, .. }) => {
//!         println!("Failed to load page {} ({}), retrying", page, kind);
//!         let _ = dashboard.retry().await;
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! # }
//! ```
//!
//! History fetches never fail: the chart falls back to a fixed sample
//! series and reports `HistoryState::LoadedWithFallback`.

pub mod config;
pub mod constants;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod favorites;
pub mod history;
pub mod metrics;
pub mod provider;
pub mod providers;
pub mod sequencer;
pub mod types;
pub mod wallet;

// Re-export commonly used types
pub use config::DashboardConfig;
pub use dashboard::{MarketDashboard, PageState};
pub use engine::{project, SortDirection, SortKey, ViewState};
pub use error::{DashboardError, FailureKind, ProviderError, WalletError};
pub use favorites::{FavoritesStore, InMemoryFavorites};
pub use history::{HistoryOutcome, HistorySource, HistoryState};
pub use metrics::EndpointMetrics;
pub use provider::MarketDataProvider;
pub use sequencer::Commit;
pub use types::{
    ChangePeriod, Chain, CoinRecord, ComponentHealth, DashboardEvent, HealthStatus,
    HistoryPoint, PriceTrend, RequestSlot, TrackedToken,
};
pub use wallet::{ChainSelector, StaticChainSelector};
