use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub buy_below: Option<f64>,
    pub sell_above: Option<f64>,
}

pub type Watchlist = BTreeMap<String, Thresholds>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    BuyBelow,
    SellAbove,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceAlert {
    pub symbol: String,
    pub price: f64,
    pub threshold: f64,
    pub kind: AlertKind,
}

impl PriceAlert {
    pub fn message(&self) -> String {
        match self.kind {
            AlertKind::BuyBelow => format!(
                "📉 **{}** price is **${:.2}**, below buy threshold ${}!",
                self.symbol, self.price, self.threshold
            ),
            AlertKind::SellAbove => format!(
                "📈 **{}** price is **${:.2}**, above sell threshold ${}!",
                self.symbol, self.price, self.threshold
            ),
        }
    }
}
