pub mod app;
pub mod commands;
pub mod console;
pub mod core;
pub mod jobs;
pub mod plugins;
pub mod shared;
pub mod storage;

use std::path::PathBuf;
use std::sync::Arc;

use app::{App, Services};
use jobs::{spawn_jobs, ConsoleNotifier};
use plugins::projects::types::Member;

pub struct RunOptions {
    pub storage_dir: PathBuf,
    pub caller: Member,
    pub jobs: bool,
}

pub async fn run(options: RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    shared::paths::ensure_dir(&options.storage_dir)?;

    // Initialize logging first (before any store is opened)
    let _logging = core::logging::init_logging(&shared::paths::get_log_dir(&options.storage_dir))?;

    let settings = core::settings::load_settings(&options.storage_dir);
    let services = Services::from_settings(&settings);
    let app = Arc::new(App::open(&options.storage_dir, settings, services));

    let handles = if options.jobs {
        spawn_jobs(Arc::clone(&app), Arc::new(ConsoleNotifier))
    } else {
        Vec::new()
    };

    let result = console::run_console(app, options.caller).await;

    for handle in handles {
        handle.abort();
    }
    tracing::info!(target: "system", "Shutting down");
    result.map_err(Into::into)
}
