//! Constants for the market dashboard
//!
//! Defaults for every tunable live here. `config::DashboardConfig` layers
//! environment overrides on top of them.

use crate::types::{Chain, TrackedToken};

/// CoinGecko API base URL
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Endpoint for the paged market listing
pub const COINGECKO_MARKETS_ENDPOINT: &str = "/coins/markets";

/// Quote currency for every request
pub const VS_CURRENCY: &str = "usd";

/// Page size of the market table. Fixed so every page has the same shape.
pub const PER_PAGE: u32 = 50;

/// Percentage-change windows requested alongside the market listing
pub const PRICE_CHANGE_WINDOWS: &str = "1h,24h,7d";

/// Days of history shown on the single-asset chart
pub const HISTORY_DAYS: u32 = 7;

/// HTTP request timeout for market listing calls (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Upper bound on the history fetch before falling back (in seconds)
pub const HISTORY_TIMEOUT_SECS: u64 = 15;

/// Capacity of the dashboard event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// User agent for HTTP requests
pub const USER_AGENT: &str = "market-dashboard-sdk/0.1.0";

/// Asset selected on the chart when the dashboard starts
pub const DEFAULT_CHART_ASSET: &str = "bitcoin";

/// History substituted when the real series cannot be fetched
pub const FALLBACK_HISTORY: &[(&str, f64)] = &[
    ("2024-01-01", 45000.0),
    ("2024-01-02", 46000.0),
    ("2024-01-03", 44000.0),
    ("2024-01-04", 47000.0),
    ("2024-01-05", 48000.0),
    ("2024-01-06", 46500.0),
    ("2024-01-07", 47500.0),
];

/// Tokens selectable on the price chart
pub const CHART_TOKENS: &[TrackedToken] = &[
    TrackedToken::new("bitcoin", "BTC", "Bitcoin", "#F7931A"),
    TrackedToken::new("ethereum", "ETH", "Ethereum", "#627EEA"),
    TrackedToken::new("binancecoin", "BNB", "BNB", "#F3BA2F"),
    TrackedToken::new("solana", "SOL", "Solana", "#14F195"),
    TrackedToken::new("ripple", "XRP", "XRP", "#23292F"),
    TrackedToken::new("cardano", "ADA", "Cardano", "#0033AD"),
    TrackedToken::new("dogecoin", "DOGE", "Dogecoin", "#C2A633"),
];

/// Chains the wallet can switch between
pub const SUPPORTED_CHAINS: &[Chain] = &[
    Chain::new("Ethereum", 1, "ethereum"),
    Chain::new("Polygon", 137, "polygon"),
    Chain::new("Base", 8453, "base"),
];
