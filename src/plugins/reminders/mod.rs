pub mod commands;
pub mod store;
pub mod types;

use std::path::Path;

use crate::shared::paths::get_document_path;
use crate::storage::JsonStore;
use types::ReminderBook;

/// Pending reminders, persisted as `reminders.json`.
pub struct ReminderStore(pub(crate) JsonStore<ReminderBook>);

pub fn init_reminder_store(storage_dir: &Path) -> ReminderStore {
    let store = ReminderStore(JsonStore::open(get_document_path(storage_dir, "reminders")));
    tracing::info!(
        target: "reminders",
        "Reminder store initialized: {} pending",
        store.0.read().reminders.len()
    );
    store
}
