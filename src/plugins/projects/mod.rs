pub mod board;
pub mod commands;
pub mod store;
pub mod types;

use std::path::Path;

use crate::shared::paths::get_document_path;
use crate::storage::JsonStore;
use types::ProjectBook;

/// The build-project board, persisted as `projects.json`.
pub struct ProjectStore(pub(crate) JsonStore<ProjectBook>);

pub fn init_project_store(storage_dir: &Path) -> ProjectStore {
    let store = ProjectStore(JsonStore::open(get_document_path(storage_dir, "projects")));
    tracing::info!(
        target: "projects",
        "Project board initialized: {} projects",
        store.0.read().projects.len()
    );
    store
}
