use market_dashboard_sdk::{ChangePeriod, MarketDashboard, PriceTrend, SortKey};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dashboard = MarketDashboard::new()?;
    println!("Market Dashboard (Provider: {})", dashboard.provider_name());
    println!("==================================");

    // 1. First page + default chart asset
    if let Err(e) = dashboard.initialize().await {
        eprintln!("Failed to load markets: {}. Retrying once...", e);
        dashboard.retry().await?;
    }

    // 2. Top 10 by 24h change
    dashboard.sort_by(SortKey::PriceChange24h).await;
    println!("\nTop movers (24h):");
    for coin in dashboard.visible_coins().await.iter().take(10) {
        let arrow = match coin.trend(ChangePeriod::TwentyFourHours) {
            PriceTrend::Up => "▲",
            PriceTrend::Down => "▼",
        };
        println!(
            "{:<8} ${:<14.4} {} {:>7.2}%",
            coin.display_symbol(),
            coin.current_price,
            arrow,
            coin.price_change_pct_24h.unwrap_or(0.0)
        );
    }

    // 3. Favorites view
    dashboard.toggle_favorite("bitcoin");
    dashboard.toggle_favorite("solana");
    dashboard.set_favorites_only(true).await;
    println!("\nFavorites:");
    for coin in dashboard.visible_coins().await {
        println!("{:<8} ${:.2}", coin.display_symbol(), coin.current_price);
    }

    // 4. Chart
    let history = dashboard.history_state().await;
    println!(
        "\n{} 7d chart: {} points{}",
        history.asset_id().unwrap_or("-"),
        history.points().len(),
        if history.is_fallback() { " (sample data)" } else { "" }
    );
    if let Some(price) = history.current_price() {
        println!("Current Price: ${:.2}", price);
    }

    println!("\nActive chain: {}", dashboard.active_chain_name().unwrap_or("none"));

    for metrics in dashboard.endpoint_metrics().await {
        println!(
            "{}: p50={:.0}ms, success_rate={:.1}%",
            metrics.endpoint,
            metrics.latency_p50_ms,
            metrics.success_rate * 100.0
        );
    }

    Ok(())
}
