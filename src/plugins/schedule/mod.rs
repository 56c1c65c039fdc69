pub mod commands;
pub mod helpers;
pub mod store;
pub mod types;

use std::path::Path;

use crate::shared::paths::get_document_path;
use crate::storage::JsonStore;
use types::Schedule;

/// Category → date → tasks, persisted as `schedule.json`.
pub struct ScheduleStore(pub(crate) JsonStore<Schedule>);

/// Initialize the schedule store from the data directory.
pub fn init_schedule_store(storage_dir: &Path) -> ScheduleStore {
    let store = ScheduleStore(JsonStore::open(get_document_path(storage_dir, "schedule")));
    tracing::info!(
        target: "schedule",
        "Schedule store initialized: {} categories, {} tasks",
        store.0.read().categories.len(),
        store.total_tasks()
    );
    store
}
