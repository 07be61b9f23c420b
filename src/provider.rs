//! Provider abstraction for fetching market data from external APIs

use crate::{
    error::ProviderError,
    types::{CoinRecord, HistoryPoint},
};
use async_trait::async_trait;
use std::num::NonZeroU32;

/// Trait for market data providers
///
/// Both calls are read-only and idempotent, so callers may retry them or
/// drop their futures freely.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetches one page of the market listing
    ///
    /// # Arguments
    /// * `page` - 1-based page number
    /// * `per_page` - Page size
    ///
    /// # Returns
    /// Records ordered by descending market cap, as the provider returns them.
    /// An empty list means the page is past the end of the catalog.
    async fn fetch_markets(
        &self,
        page: NonZeroU32,
        per_page: u32,
    ) -> Result<Vec<CoinRecord>, ProviderError>;

    /// Fetches the USD price series of one asset
    ///
    /// # Arguments
    /// * `asset_id` - Provider identifier of the asset
    /// * `days` - How many days back the series reaches
    ///
    /// # Returns
    /// Points in ascending chronological order
    async fn fetch_market_chart(
        &self,
        asset_id: &str,
        days: u32,
    ) -> Result<Vec<HistoryPoint>, ProviderError>;

    /// Returns the name of this provider
    fn provider_name(&self) -> &'static str;
}
