use super::types::{AlertKind, PriceAlert, Thresholds, Watchlist};
use super::StockStore;
use crate::shared::errors::{BotError, BotResult};

pub fn normalize_symbol(symbol: &str) -> BotResult<String> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric() || ".-^=".contains(c)) {
        return Err(BotError::validation(format!("Invalid ticker symbol: {}", symbol)));
    }
    Ok(symbol)
}

impl StockStore {
    /// Adds or replaces a symbol's thresholds.
    pub fn add(&self, symbol: &str, thresholds: Thresholds) -> BotResult<String> {
        let symbol = normalize_symbol(symbol)?;
        for value in [thresholds.buy_below, thresholds.sell_above].into_iter().flatten() {
            if !value.is_finite() || value < 0.0 {
                return Err(BotError::validation("Thresholds must be non-negative numbers"));
            }
        }

        self.0.mutate(|list| {
            list.insert(symbol.clone(), thresholds);
            Ok::<_, BotError>(())
        })?;
        tracing::info!(target: "stocks", symbol = %symbol, "Symbol added to watchlist");
        Ok(symbol)
    }

    pub fn remove(&self, symbol: &str) -> BotResult<String> {
        let symbol = normalize_symbol(symbol)?;
        self.0.mutate(|list| {
            list.remove(&symbol)
                .map(|_| ())
                .ok_or_else(|| BotError::not_found("Stock not found in watchlist."))
        })?;
        tracing::info!(target: "stocks", symbol = %symbol, "Symbol removed from watchlist");
        Ok(symbol)
    }

    pub fn list(&self) -> Watchlist {
        self.0.read().clone()
    }

    pub fn symbols(&self) -> Vec<String> {
        self.0.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }
}

/// Compares fetched prices against the watchlist thresholds.
///
/// Symbols missing from `prices` are skipped.
pub fn check_alerts(list: &Watchlist, prices: &[(String, f64)]) -> Vec<PriceAlert> {
    let mut alerts = Vec::new();

    for (symbol, price) in prices {
        let Some(limits) = list.get(symbol) else {
            continue;
        };
        if let Some(buy) = limits.buy_below {
            if *price < buy {
                alerts.push(PriceAlert {
                    symbol: symbol.clone(),
                    price: *price,
                    threshold: buy,
                    kind: AlertKind::BuyBelow,
                });
            }
        }
        if let Some(sell) = limits.sell_above {
            if *price > sell {
                alerts.push(PriceAlert {
                    symbol: symbol.clone(),
                    price: *price,
                    threshold: sell,
                    kind: AlertKind::SellAbove,
                });
            }
        }
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::super::init_stock_store;
    use super::*;

    #[test]
    fn test_add_uppercases_and_last_write_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let store = init_stock_store(tmp.path());

        store
            .add("aapl", Thresholds { buy_below: Some(150.0), sell_above: None })
            .unwrap();
        store
            .add("AAPL", Thresholds { buy_below: None, sell_above: Some(200.0) })
            .unwrap();

        let list = store.list();
        assert_eq!(list.len(), 1);
        assert_eq!(list["AAPL"], Thresholds { buy_below: None, sell_above: Some(200.0) });

        let reloaded = init_stock_store(tmp.path());
        assert_eq!(reloaded.list(), list);
    }

    #[test]
    fn test_document_keeps_null_thresholds() {
        let tmp = tempfile::tempdir().unwrap();
        let store = init_stock_store(tmp.path());
        store.add("MSFT", Thresholds::default()).unwrap();

        let raw = std::fs::read_to_string(store.0.path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(json["MSFT"]["buy_below"].is_null());
        assert!(json["MSFT"]["sell_above"].is_null());
    }

    #[test]
    fn test_remove_unknown_symbol_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let store = init_stock_store(tmp.path());

        assert!(matches!(store.remove("TSLA"), Err(BotError::NotFound(_))));
    }

    #[test]
    fn test_check_alerts_both_directions() {
        let mut list = Watchlist::new();
        list.insert("AAPL".into(), Thresholds { buy_below: Some(150.0), sell_above: Some(170.0) });
        list.insert("MSFT".into(), Thresholds { buy_below: None, sell_above: Some(400.0) });

        let prices = vec![
            ("AAPL".to_string(), 140.0),
            ("MSFT".to_string(), 410.5),
            ("GOOG".to_string(), 1.0),
        ];
        let alerts = check_alerts(&list, &prices);

        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].kind, AlertKind::BuyBelow);
        assert_eq!(alerts[1].symbol, "MSFT");
        assert!(alerts[1].message().contains("$410.50"));
    }
}
