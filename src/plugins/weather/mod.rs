pub mod client;
pub mod commands;
pub mod gate;

use std::path::Path;

use crate::shared::paths::get_document_path;
use gate::{GateLimits, RateGate};

/// Opens the weather API budget tracked in `weather_usage.json`.
pub fn init_weather_gate(storage_dir: &Path, limits: GateLimits) -> RateGate {
    let gate = RateGate::open(get_document_path(storage_dir, "weather_usage"), limits);
    tracing::info!(
        target: "weather",
        "Weather gate initialized: {} calls this month",
        gate.monthly_count()
    );
    gate
}
