//! Sort/filter projection of a market page
//!
//! `project` is a pure function of the fetched page, the current
//! [`ViewState`] and the favorites store. Pagination is not applied here:
//! each page is fetched independently, so `ViewState::page` only selects
//! which page is requested next.

use crate::{favorites::FavoritesStore, types::CoinRecord};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::num::NonZeroU32;

/// Columns the market table can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Name,
    CurrentPrice,
    PriceChange1h,
    PriceChange24h,
    PriceChange7d,
    TotalVolume,
    MarketCap,
}

impl SortKey {
    /// Get all sortable columns
    pub fn all() -> &'static [SortKey] {
        &[
            SortKey::Name,
            SortKey::CurrentPrice,
            SortKey::PriceChange1h,
            SortKey::PriceChange24h,
            SortKey::PriceChange7d,
            SortKey::TotalVolume,
            SortKey::MarketCap,
        ]
    }

    /// Numeric value of the column; missing percentages count as 0.
    /// `None` for the non-numeric `Name` column.
    pub fn numeric_value(&self, record: &CoinRecord) -> Option<f64> {
        let value = match self {
            SortKey::Name => return None,
            SortKey::CurrentPrice => record.current_price,
            SortKey::PriceChange1h => record.price_change_pct_1h.unwrap_or(0.0),
            SortKey::PriceChange24h => record.price_change_pct_24h.unwrap_or(0.0),
            SortKey::PriceChange7d => record.price_change_pct_7d.unwrap_or(0.0),
            SortKey::TotalVolume => record.total_volume,
            SortKey::MarketCap => record.market_cap,
        };
        Some(value)
    }

    /// Ascending comparison of two records on this column
    pub fn compare(&self, a: &CoinRecord, b: &CoinRecord) -> Ordering {
        match (self.numeric_value(a), self.numeric_value(b)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// UI projection parameters for the market table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    /// Page requested from the provider, starting at 1
    pub page: NonZeroU32,
    pub sort_key: Option<SortKey>,
    pub sort_direction: SortDirection,
    /// Restrict the table to favorites
    pub favorites_only: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            page: NonZeroU32::MIN,
            sort_key: None,
            sort_direction: SortDirection::Descending,
            favorites_only: false,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles a click on a sortable column.
    ///
    /// The active column flips direction; any other column becomes active
    /// and starts descending.
    pub fn apply_sort(&mut self, key: SortKey) {
        if self.sort_key == Some(key) {
            self.sort_direction = self.sort_direction.flipped();
        } else {
            self.sort_key = Some(key);
            self.sort_direction = SortDirection::Descending;
        }
    }

    /// Moves to the next page. The provider decides where the data ends.
    pub fn next_page(&mut self) {
        self.page = self.page.saturating_add(1);
    }

    /// Moves to the previous page; returns false at page 1
    pub fn previous_page(&mut self) -> bool {
        match NonZeroU32::new(self.page.get() - 1) {
            Some(prev) => {
                self.page = prev;
                true
            }
            None => false,
        }
    }
}

/// Projects a fetched page into the ordered rows to display.
///
/// Filtering keeps input order. Sorting is stable, so rows with equal keys
/// keep their relative order in both directions.
pub fn project(
    records: &[CoinRecord],
    view: &ViewState,
    favorites: &dyn FavoritesStore,
) -> Vec<CoinRecord> {
    let mut rows: Vec<CoinRecord> = if view.favorites_only {
        records
            .iter()
            .filter(|record| favorites.is_favorite(&record.id))
            .cloned()
            .collect()
    } else {
        records.to_vec()
    };

    if let Some(key) = view.sort_key {
        sort_records(&mut rows, key, view.sort_direction);
    }

    rows
}

/// Stable in-place sort by `key`
pub fn sort_records(records: &mut [CoinRecord], key: SortKey, direction: SortDirection) {
    // slice::sort_by is a stable merge sort
    match direction {
        SortDirection::Ascending => records.sort_by(|a, b| key.compare(a, b)),
        SortDirection::Descending => records.sort_by(|a, b| key.compare(b, a)),
    }
}
