//! Uploaded-artifact store.
//!
//! Submissions and rendered certificates are opaque blobs to the engine;
//! it only keeps the URL a [`FileStore`] hands back. The local backend
//! writes under a root directory and returns `file://` URLs.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::trait_::{Result, StorageError};

/// File extensions accepted for student uploads.
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "pdf", "zip", "doc", "docx", "txt", "ppt", "pptx", "xls", "xlsx",
];

/// Check an upload filename against the extension allow-list.
///
/// The name must contain a dot; matching is case-insensitive on the part
/// after the last dot.
pub fn allowed_file(filename: &str) -> bool {
    let Some((_, ext)) = filename.rsplit_once('.') else {
        return false;
    };
    let ext = ext.to_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str())
}

/// Blob store for uploaded submissions and rendered certificates.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store a blob under the given name, returning the URL to record.
    async fn store(&self, name: &str, contents: &[u8]) -> Result<String>;

    /// Remove a previously stored blob. Missing blobs are not an error.
    async fn remove(&self, url: &str) -> Result<()>;
}

/// [`FileStore`] over a local directory.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Create a store rooted at `root`. The directory is created on first
    /// write, not here.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        // Uploads carry user-supplied names; strip any path components.
        let base = Path::new(name)
            .file_name()
            .ok_or_else(|| StorageError::Other(format!("bad file name: {name}")))?;
        Ok(self.root.join(base))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn store(&self, name: &str, contents: &[u8]) -> Result<String> {
        let path = self.path_for(name)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, contents).await?;
        Ok(format!("file://{}", path.display()))
    }

    async fn remove(&self, url: &str) -> Result<()> {
        let path = url.strip_prefix("file://").unwrap_or(url);
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
