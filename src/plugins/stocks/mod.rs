pub mod commands;
pub mod quotes;
pub mod store;
pub mod types;

use std::path::Path;

use crate::shared::paths::get_document_path;
use crate::storage::JsonStore;
use types::Watchlist;

/// Symbol → alert thresholds, persisted as `stocks.json`.
pub struct StockStore(pub(crate) JsonStore<Watchlist>);

pub fn init_stock_store(storage_dir: &Path) -> StockStore {
    let store = StockStore(JsonStore::open(get_document_path(storage_dir, "stocks")));
    tracing::info!(
        target: "stocks",
        "Stock watchlist initialized: {} symbols",
        store.0.read().len()
    );
    store
}
