use async_trait::async_trait;

use crate::Result;

/// Byte-level storage channel addressed by opaque string keys. The latest
/// write to a key wins; there is no versioning and no delete.
#[async_trait]
pub trait DocumentChannel: Send + Sync {
    /// Read the bytes stored under `key`. Fails with `Error::NotFound` if
    /// nothing was ever written there.
    async fn read(&self, key: &str) -> Result<Vec<u8>>;

    /// Store `bytes` under `key`, replacing any previous entry.
    async fn write(&self, key: &str, bytes: &[u8]) -> Result<()>;
}
