//! Storage capability used by the event store.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

/// Minimal file-system capability the event store needs.
pub trait Storage: Send + Sync + 'static {
    /// Whether a file or directory exists at `path`.
    fn exists(&self, path: &Path) -> impl Future<Output = io::Result<bool>> + Send;

    /// Read the whole file at `path`.
    fn read_all(&self, path: &Path) -> impl Future<Output = io::Result<Vec<u8>>> + Send;

    /// Replace the file at `path` with `contents`.
    ///
    /// Readers observe either the previous or the new contents, never a mix.
    fn write_all(
        &self,
        path: &Path,
        contents: &[u8],
    ) -> impl Future<Output = io::Result<()>> + Send;

    /// Create `path` and all missing parents.
    fn make_directories(&self, path: &Path) -> impl Future<Output = io::Result<()>> + Send;

    /// Delete the file at `path`.
    fn remove(&self, path: &Path) -> impl Future<Output = io::Result<()>> + Send;
}

/// Storage on the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStorage;

impl Storage for FsStorage {
    async fn exists(&self, path: &Path) -> io::Result<bool> {
        tokio::fs::try_exists(path).await
    }

    async fn read_all(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }

    async fn write_all(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let tmp_path = temp_path_for(path);

        // Write a sibling file first, then swap it in with a rename
        if let Err(e) = write_synced(&tmp_path, contents).await {
            tokio::fs::remove_file(&tmp_path).await.ok();
            return Err(e);
        }
        if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
            tokio::fs::remove_file(&tmp_path).await.ok();
            return Err(e);
        }
        Ok(())
    }

    async fn make_directories(&self, path: &Path) -> io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }

    async fn remove(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_file(path).await
    }
}

/// Write `contents` to a fresh file at `path` and sync it to disk.
///
/// The handle is closed when this returns, on success and on error.
async fn write_synced(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(contents).await?;
    file.flush().await?;
    file.sync_all().await
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "store".to_string());
    path.with_file_name(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()))
}

#[cfg(test)]
pub use memory::MemoryStorage;


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fs_write_all_replaces_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");

        FsStorage.write_all(&path, b"[1]").await.unwrap();
        FsStorage.write_all(&path, b"[1,2]").await.unwrap();

        assert_eq!(FsStorage.read_all(&path).await.unwrap(), b"[1,2]");
    }

    #[tokio::test]
    async fn test_fs_write_all_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");

        FsStorage.write_all(&path, b"[]").await.unwrap();

        let names: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("store.json")]);
    }

    #[tokio::test]
    async fn test_fs_write_into_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("store.json");

        assert!(FsStorage.write_all(&path, b"[]").await.is_err());
        assert!(!FsStorage.exists(&path).await.unwrap());
    }

    #[tokio::test]
    async fn test_fs_make_directories_is_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b").join("c");

        FsStorage.make_directories(&nested).await.unwrap();
        FsStorage.make_directories(&nested).await.unwrap();

        assert!(FsStorage.exists(&nested).await.unwrap());
    }

    #[tokio::test]
    async fn test_fs_remove() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("image.png");

        FsStorage.write_all(&path, b"png").await.unwrap();
        FsStorage.remove(&path).await.unwrap();

        assert!(!FsStorage.exists(&path).await.unwrap());
        assert_eq!(
            FsStorage.remove(&path).await.unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_memory_storage_simulated_failures() {
        let storage = MemoryStorage::new();
        storage.fail_writes(true);
        assert!(storage.write_all(Path::new("x.json"), b"[]").await.is_err());

        storage.fail_directories(true);
        assert!(storage.make_directories(Path::new("data")).await.is_err());
    }
}
