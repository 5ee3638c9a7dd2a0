mod marker;
mod sessions;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use hindsight_core::DirProvisioner;

pub use marker::FsMarkerSearch;
pub use sessions::{FsSessionStore, StoredSession};

/// Return the per-user store root: `<data_dir>/hindsight/`
/// (falls back to `~/.hindsight/`, then a relative `.hindsight-store`).
pub fn store_root() -> PathBuf {
    if let Some(data_dir) = dirs::data_dir() {
        data_dir.join("hindsight")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".hindsight")
    } else {
        PathBuf::from(".hindsight-store")
    }
}

/// Atomic write: write to temp file in same dir, then rename.
pub fn write_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("no parent dir for {}", path.display()))?;
    fs::create_dir_all(parent)?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.persist(path)?;
    Ok(())
}

/// Directory provisioning backed by `create_dir_all`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsDirs;

#[async_trait::async_trait]
impl DirProvisioner for FsDirs {
    async fn ensure_dir(&self, path: &Path) -> anyhow::Result<()> {
        fs::create_dir_all(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_root_is_not_empty() {
        let root = store_root();
        assert!(!root.as_os_str().is_empty());
    }

    #[test]
    fn write_atomic_creates_file_and_parents() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("test.txt");
        write_atomic(&path, b"hello world").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello world");
        write_atomic(&path, b"replaced").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "replaced");
    }

    #[tokio::test]
    async fn ensure_dir_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("reflect");
        FsDirs.ensure_dir(&dir).await.unwrap();
        FsDirs.ensure_dir(&dir).await.unwrap();
        assert!(dir.is_dir());
    }
}
