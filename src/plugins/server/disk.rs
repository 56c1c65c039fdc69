//! On-disk footprint of the server's world and map folders.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::ServerError;
use crate::shared::errors::BotResult;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

#[async_trait]
pub trait DiskUsage: Send + Sync {
    /// Total size in bytes of the regular files under `path`.
    async fn folder_size(&self, path: &Path) -> BotResult<u64>;
}

/// Walks the folder tree with `tokio::fs`. Symlinks are counted by their own
/// size and never followed.
pub struct DirWalker;

fn disk_error(path: &Path, source: std::io::Error) -> ServerError {
    ServerError::Disk {
        path: path.display().to_string(),
        source,
    }
}

async fn walk(root: &Path) -> Result<u64, ServerError> {
    let mut total = 0;
    let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| disk_error(&dir, e))?;
        while let Some(entry) = entries.next_entry().await.map_err(|e| disk_error(&dir, e))? {
            let path = entry.path();
            let metadata = tokio::fs::symlink_metadata(&path)
                .await
                .map_err(|e| disk_error(&path, e))?;
            if metadata.is_dir() {
                pending.push(path);
            } else {
                total += metadata.len();
            }
        }
    }
    Ok(total)
}

#[async_trait]
impl DiskUsage for DirWalker {
    async fn folder_size(&self, path: &Path) -> BotResult<u64> {
        let bytes = walk(path).await?;
        tracing::debug!(target: "server", path = %path.display(), bytes, "Folder measured");
        Ok(bytes)
    }
}

pub fn format_gb(bytes: u64) -> String {
    format!("{:.2} GB", bytes as f64 / BYTES_PER_GB)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::errors::BotError;

    #[tokio::test]
    async fn test_walk_sums_nested_files() {
        let tmp = tempfile::tempdir().unwrap();
        let region = tmp.path().join("world").join("region");
        std::fs::create_dir_all(&region).unwrap();
        std::fs::write(tmp.path().join("world").join("level.dat"), vec![0u8; 100]).unwrap();
        std::fs::write(region.join("r.0.0.mca"), vec![0u8; 4096]).unwrap();

        let size = DirWalker.folder_size(&tmp.path().join("world")).await.unwrap();
        assert_eq!(size, 4196);
    }

    #[tokio::test]
    async fn test_missing_folder_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("world_the_end");

        match DirWalker.folder_size(&missing).await {
            Err(BotError::External(msg)) => assert!(msg.contains("world_the_end")),
            other => panic!("expected an external error, got {:?}", other),
        }
    }

    #[test]
    fn test_format_gb() {
        assert_eq!(format_gb(0), "0.00 GB");
        assert_eq!(format_gb(3 * 1024 * 1024 * 1024 / 2), "1.50 GB");
    }
}
