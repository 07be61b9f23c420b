//! Types for the market dashboard

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One market entity as listed on a single page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinRecord {
    /// Provider identifier, unique across the catalog (e.g. "bitcoin")
    pub id: String,

    /// Ticker symbol as returned by the provider (usually lowercase)
    pub symbol: String,

    /// Display name
    pub name: String,

    /// Logo URL
    pub image_url: String,

    /// Price in USD
    pub current_price: f64,

    /// 24h trading volume in USD
    pub total_volume: f64,

    /// Market capitalization in USD
    pub market_cap: f64,

    /// 1h price change percentage
    pub price_change_pct_1h: Option<f64>,

    /// 24h price change percentage
    pub price_change_pct_24h: Option<f64>,

    /// 7d price change percentage
    pub price_change_pct_7d: Option<f64>,

    /// Chronological price samples over the last 7 days
    pub sparkline_7d: Vec<f64>,
}

impl CoinRecord {
    /// Get the percentage change for a window
    pub fn price_change(&self, period: ChangePeriod) -> Option<f64> {
        match period {
            ChangePeriod::OneHour => self.price_change_pct_1h,
            ChangePeriod::TwentyFourHours => self.price_change_pct_24h,
            ChangePeriod::SevenDays => self.price_change_pct_7d,
        }
    }

    /// Direction of the change for a window; a missing value counts as flat
    pub fn trend(&self, period: ChangePeriod) -> PriceTrend {
        PriceTrend::of(self.price_change(period))
    }

    /// Symbol in upper case, as shown next to the name
    pub fn display_symbol(&self) -> String {
        self.symbol.to_uppercase()
    }

    /// Sparkline samples labelled "Day 1", "Day 2", ... in sample order
    pub fn sparkline_points(&self) -> Vec<HistoryPoint> {
        self.sparkline_7d
            .iter()
            .enumerate()
            .map(|(i, price)| HistoryPoint::new(format!("Day {}", i + 1), *price))
            .collect()
    }
}

/// Percentage-change windows carried by a `CoinRecord`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangePeriod {
    OneHour,
    TwentyFourHours,
    SevenDays,
}

/// Sign of a price change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTrend {
    /// Zero or positive change
    Up,
    /// Negative change
    Down,
}

impl PriceTrend {
    pub fn of(change: Option<f64>) -> Self {
        if change.unwrap_or(0.0) >= 0.0 {
            PriceTrend::Up
        } else {
            PriceTrend::Down
        }
    }
}

/// One sample of a single-asset price series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Label of the sample (a calendar date for real history)
    pub date: String,

    /// Price in USD
    pub price: f64,
}

impl HistoryPoint {
    pub fn new(date: impl Into<String>, price: f64) -> Self {
        Self {
            date: date.into(),
            price,
        }
    }
}

/// A token selectable on the price chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrackedToken {
    /// Provider identifier
    pub id: &'static str,
    pub symbol: &'static str,
    pub name: &'static str,
    /// Brand color as a hex string
    pub color: &'static str,
}

impl TrackedToken {
    pub const fn new(
        id: &'static str,
        symbol: &'static str,
        name: &'static str,
        color: &'static str,
    ) -> Self {
        Self {
            id,
            symbol,
            name,
            color,
        }
    }
}

/// A blockchain network the wallet can be connected to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Chain {
    /// Display name
    pub name: &'static str,
    /// EIP-155 chain id
    pub chain_id: u64,
    pub slug: &'static str,
}

impl Chain {
    pub const fn new(name: &'static str, chain_id: u64, slug: &'static str) -> Self {
        Self {
            name,
            chain_id,
            slug,
        }
    }
}

/// Which result slot a request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestSlot {
    /// The market table page
    Markets,
    /// The single-asset chart
    History,
}

/// Dashboard events published on the broadcast channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DashboardEvent {
    /// A market page was fetched and committed
    PageLoaded {
        id: Uuid,
        page: u32,
        records: usize,
        timestamp: DateTime<Utc>,
    },

    /// A market page fetch failed
    PageLoadFailed {
        id: Uuid,
        page: u32,
        error_message: String,
        timestamp: DateTime<Utc>,
    },

    /// A history series was committed for the selected asset
    HistoryLoaded {
        id: Uuid,
        asset_id: String,
        points: usize,
        fallback: bool,
        timestamp: DateTime<Utc>,
    },

    /// A response arrived after a newer request for the same slot and was dropped
    StaleResponseDiscarded {
        id: Uuid,
        slot: RequestSlot,
        key: String,
        timestamp: DateTime<Utc>,
    },

    /// A coin was added to or removed from favorites
    FavoriteToggled {
        id: Uuid,
        coin_id: String,
        favorite: bool,
        timestamp: DateTime<Utc>,
    },

    /// The wallet switched chains
    ChainSwitched {
        id: Uuid,
        chain_id: u64,
        timestamp: DateTime<Utc>,
    },

    /// The wallet failed to switch chains
    ChainSwitchFailed {
        id: Uuid,
        chain_id: u64,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

impl DashboardEvent {
    /// Get the event ID
    pub fn id(&self) -> Uuid {
        match self {
            DashboardEvent::PageLoaded { id, .. }
            | DashboardEvent::PageLoadFailed { id, .. }
            | DashboardEvent::HistoryLoaded { id, .. }
            | DashboardEvent::StaleResponseDiscarded { id, .. }
            | DashboardEvent::FavoriteToggled { id, .. }
            | DashboardEvent::ChainSwitched { id, .. }
            | DashboardEvent::ChainSwitchFailed { id, .. } => *id,
        }
    }

    /// Get the event type as string
    pub fn event_type(&self) -> &'static str {
        match self {
            DashboardEvent::PageLoaded { .. } => "PAGE_LOADED",
            DashboardEvent::PageLoadFailed { .. } => "PAGE_LOAD_FAILED",
            DashboardEvent::HistoryLoaded { .. } => "HISTORY_LOADED",
            DashboardEvent::StaleResponseDiscarded { .. } => "STALE_RESPONSE_DISCARDED",
            DashboardEvent::FavoriteToggled { .. } => "FAVORITE_TOGGLED",
            DashboardEvent::ChainSwitched { .. } => "CHAIN_SWITCHED",
            DashboardEvent::ChainSwitchFailed { .. } => "CHAIN_SWITCH_FAILED",
        }
    }
}

impl std::fmt::Display for DashboardEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DashboardEvent::PageLoaded { page, records, .. } => {
                write!(f, "Page {} loaded ({} records)", page, records)
            }
            DashboardEvent::PageLoadFailed {
                page,
                error_message,
                ..
            } => write!(f, "Page {} failed: {}", page, error_message),
            DashboardEvent::HistoryLoaded {
                asset_id,
                points,
                fallback,
                ..
            } => {
                let source = if *fallback { "fallback" } else { "provider" };
                write!(f, "History for {}: {} points ({})", asset_id, points, source)
            }
            DashboardEvent::StaleResponseDiscarded { slot, key, .. } => {
                write!(f, "Discarded stale {:?} response for {}", slot, key)
            }
            DashboardEvent::FavoriteToggled {
                coin_id, favorite, ..
            } => {
                let verb = if *favorite { "added to" } else { "removed from" };
                write!(f, "{} {} favorites", coin_id, verb)
            }
            DashboardEvent::ChainSwitched { chain_id, .. } => {
                write!(f, "Switched to chain {}", chain_id)
            }
            DashboardEvent::ChainSwitchFailed {
                chain_id,
                error_message,
                ..
            } => write!(f, "Switch to chain {} failed: {}", chain_id, error_message),
        }
    }
}

/// Overall system health status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Market page and chart are showing provider data
    Healthy,
    /// Usable, but showing fallback data somewhere
    Degraded,
    /// No market page available
    Unhealthy,
}

/// Component health information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component name
    pub name: String,
    /// Component status
    pub status: HealthStatus,
    /// Optional status message
    pub message: Option<String>,
    /// Component-specific details
    pub details: std::collections::HashMap<String, serde_json::Value>,
    /// Last checked timestamp
    pub last_checked: DateTime<Utc>,
}
