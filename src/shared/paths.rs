use std::path::{Path, PathBuf};

const APP_DIR: &str = "craftdesk";

/// Get the base storage directory following XDG Base Directory Specification.
/// Returns `$XDG_DATA_HOME/craftdesk` or `~/.local/share/craftdesk`.
pub fn get_storage_dir() -> PathBuf {
    if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg_data).join(APP_DIR);
    }

    dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Get the logs directory path.
/// Returns `{storage_dir}/logs`.
pub fn get_log_dir(storage_dir: &Path) -> PathBuf {
    storage_dir.join("logs")
}

/// Get the JSON document path for a named collection.
/// Returns `{storage_dir}/{name}.json`.
pub fn get_document_path(storage_dir: &Path, name: &str) -> PathBuf {
    storage_dir.join(format!("{}.json", name))
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_dir_structure() {
        let storage = get_storage_dir();
        assert!(storage.ends_with("craftdesk"));

        let logs = get_log_dir(&storage);
        assert!(logs.ends_with("logs"));

        let doc = get_document_path(&storage, "schedule");
        assert!(doc.ends_with("schedule.json"));
    }

    #[test]
    fn test_ensure_dir_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");

        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());

        // Second call is a no-op
        ensure_dir(&nested).unwrap();
    }
}
