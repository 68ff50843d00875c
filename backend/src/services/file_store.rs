use async_trait::async_trait;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Storage for uploaded documents and rendered exports, addressed by the
/// relative `file_path` recorded in the database.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Human-readable location, for logs.
    fn describe(&self) -> String;

    async fn read(&self, path: &str) -> io::Result<Vec<u8>>;

    /// Writes the whole file, creating parent directories. Returns bytes written.
    async fn write(&self, path: &str, contents: &[u8]) -> io::Result<u64>;

    /// Size of the stored file, or `None` when nothing is stored at `path`.
    async fn size(&self, path: &str) -> io::Result<Option<u64>>;
}

/// Files under a root directory on the local filesystem.
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Maps a stored path onto the root, refusing anything that could escape it.
    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        if !is_contained(path) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("path escapes the file store: {path:?}"),
            ));
        }

        let mut resolved = self.root.clone();
        for component in Path::new(path).components() {
            if let Component::Normal(part) = component {
                resolved.push(part);
            }
        }
        Ok(resolved)
    }
}

/// Whether `path` names something below a store root: relative, no `..`,
/// and at least one real component.
pub fn is_contained(path: &str) -> bool {
    let mut depth = 0usize;
    for component in Path::new(path).components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    depth > 0
}

#[async_trait]
impl FileStore for LocalFileStore {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    async fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        let full = self.resolve(path)?;
        tokio::fs::read(full).await
    }

    async fn write(&self, path: &str, contents: &[u8]) -> io::Result<u64> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, contents).await?;
        log::debug!("Stored {} bytes at {}", contents.len(), full.display());
        Ok(contents.len() as u64)
    }

    async fn size(&self, path: &str) -> io::Result<Option<u64>> {
        let full = self.resolve(path)?;
        match tokio::fs::metadata(full).await {
            Ok(meta) if meta.is_file() => Ok(Some(meta.len())),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}
