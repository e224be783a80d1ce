use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use ae_core::{DocumentChannel, Error, Result};

/// Directory-backed channel. Keys are relative paths under the root, so a
/// run's documents can be inspected with ordinary tools.
pub struct FsChannel {
    root: PathBuf,
}

impl FsChannel {
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(Error::Channel(format!("key escapes the channel root: {}", key)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl DocumentChannel for FsChannel {
    async fn read(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::NotFound(key.to_string())),
            Err(e) => Err(Error::Channel(format!("read {}: {}", key, e))),
        }
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Channel(format!("create {}: {}", parent.display(), e)))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| Error::Channel(format!("write {}: {}", key, e)))
    }
}
