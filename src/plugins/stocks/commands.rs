use super::quotes::QuoteSource;
use super::store::check_alerts;
use super::types::{PriceAlert, Thresholds};
use super::StockStore;
use crate::commands::Reply;
use crate::shared::errors::BotResult;

fn threshold_text(value: Option<f64>) -> String {
    value.map_or_else(|| "None".to_string(), |v| v.to_string())
}

pub fn add_stock(
    store: &StockStore,
    symbol: &str,
    buy_below: Option<f64>,
    sell_above: Option<f64>,
) -> BotResult<Reply> {
    let symbol = store.add(symbol, Thresholds { buy_below, sell_above })?;
    Ok(Reply::text(format!(
        "📈 Added stock **{}** to watchlist. Buy below: {}, Sell above: {}",
        symbol,
        threshold_text(buy_below),
        threshold_text(sell_above)
    )))
}

pub fn remove_stock(store: &StockStore, symbol: &str) -> BotResult<Reply> {
    let symbol = store.remove(symbol)?;
    Ok(Reply::text(format!("🗑️ Removed **{}** from watchlist.", symbol)))
}

pub fn list_stocks(store: &StockStore) -> Reply {
    let list = store.list();
    if list.is_empty() {
        return Reply::text("📉 Your stock watchlist is empty.");
    }

    let mut body = String::from("**Stock Watchlist:**\n");
    for (symbol, limits) in &list {
        body.push_str(&format!(
            "{} - Buy below: {}, Sell above: {}\n",
            symbol,
            threshold_text(limits.buy_below),
            threshold_text(limits.sell_above)
        ));
    }
    Reply::text(body.trim_end())
}

/// Fetches a price for every watched symbol.
///
/// Returns the prices that came back and the symbols whose lookup failed.
/// Symbols the provider has no price for appear in neither list.
pub async fn fetch_prices(store: &StockStore, quotes: &dyn QuoteSource) -> (Vec<(String, f64)>, Vec<String>) {
    let mut prices = Vec::new();
    let mut failed = Vec::new();

    for symbol in store.symbols() {
        match quotes.price(&symbol).await {
            Ok(Some(price)) => prices.push((symbol, price)),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(target: "stocks", symbol = %symbol, "Error fetching stock: {}", e);
                failed.push(symbol);
            }
        }
    }

    (prices, failed)
}

/// One pass of the threshold check used by the background job.
pub async fn price_alerts(store: &StockStore, quotes: &dyn QuoteSource) -> Vec<PriceAlert> {
    let (prices, _) = fetch_prices(store, quotes).await;
    check_alerts(&store.list(), &prices)
}

#[cfg(test)]
mod tests {
    use super::super::init_stock_store;
    use super::*;
    use crate::shared::errors::BotError;
    use async_trait::async_trait;

    struct FixedQuotes;

    #[async_trait]
    impl QuoteSource for FixedQuotes {
        async fn price(&self, symbol: &str) -> BotResult<Option<f64>> {
            match symbol {
                "AAPL" => Ok(Some(140.0)),
                "MSFT" => Ok(None),
                _ => Err(BotError::external("boom")),
            }
        }
    }

    #[test]
    fn test_add_and_list_replies() {
        let tmp = tempfile::tempdir().unwrap();
        let store = init_stock_store(tmp.path());

        let reply = add_stock(&store, "aapl", Some(150.0), None).unwrap();
        assert_eq!(
            reply.body,
            "📈 Added stock **AAPL** to watchlist. Buy below: 150, Sell above: None"
        );
        assert_eq!(
            list_stocks(&store).body,
            "**Stock Watchlist:**\nAAPL - Buy below: 150, Sell above: None"
        );
    }

    #[test]
    fn test_remove_missing_symbol() {
        let tmp = tempfile::tempdir().unwrap();
        let store = init_stock_store(tmp.path());

        assert!(matches!(remove_stock(&store, "TSLA"), Err(BotError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_fetch_prices_splits_failures() {
        let tmp = tempfile::tempdir().unwrap();
        let store = init_stock_store(tmp.path());
        for symbol in ["AAPL", "MSFT", "XXXX"] {
            store.add(symbol, Thresholds::default()).unwrap();
        }

        let (prices, failed) = fetch_prices(&store, &FixedQuotes).await;
        assert_eq!(prices, vec![("AAPL".to_string(), 140.0)]);
        assert_eq!(failed, vec!["XXXX".to_string()]);
    }

    #[tokio::test]
    async fn test_price_alerts_use_thresholds() {
        let tmp = tempfile::tempdir().unwrap();
        let store = init_stock_store(tmp.path());
        store
            .add("AAPL", Thresholds { buy_below: Some(150.0), sell_above: None })
            .unwrap();

        let alerts = price_alerts(&store, &FixedQuotes).await;
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].message().contains("below buy threshold $150"));
    }
}
