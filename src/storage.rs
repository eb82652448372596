use std::path::PathBuf;

use anyhow::Context;
use axum::async_trait;
use bytes::Bytes;
use tokio::fs;

/// Content area for uploaded avatar files.
#[async_trait]
pub trait AvatarStore: Send + Sync {
    async fn save(&self, filename: &str, body: Bytes) -> anyhow::Result<()>;
}

/// Stores avatars on the local filesystem; files are later served as static
/// content under /uploads.
#[derive(Clone)]
pub struct LocalDiskStore {
    root: PathBuf,
}

impl LocalDiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl AvatarStore for LocalDiskStore {
    async fn save(&self, filename: &str, body: Bytes) -> anyhow::Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("create upload dir {}", self.root.display()))?;
        let path = self.root.join(filename);
        fs::write(&path, &body)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_writes_file_under_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalDiskStore::new(dir.path());
        store
            .save("a1b2.png", Bytes::from_static(b"\x89PNG"))
            .await
            .expect("save should succeed");
        let written = std::fs::read(dir.path().join("a1b2.png")).expect("file exists");
        assert_eq!(written, b"\x89PNG");
    }

    #[tokio::test]
    async fn save_creates_missing_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("uploads");
        let store = LocalDiskStore::new(&nested);
        store
            .save("x.jpg", Bytes::from_static(b"jpeg"))
            .await
            .expect("save should succeed");
        assert!(nested.join("x.jpg").exists());
    }
}
