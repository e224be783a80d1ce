use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use ae_core::{DocumentChannel, Error, Result};

/// In-process channel backend. Keys map to byte buffers; the latest write
/// wins.
#[derive(Default)]
pub struct MemoryChannel {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentChannel for MemoryChannel {
    async fn read(&self, key: &str) -> Result<Vec<u8>> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .cloned()
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_then_reads_exact_bytes() {
        let channel = MemoryChannel::new();
        channel.write("articles/input.json", b"payload").await.unwrap();
        let bytes = channel.read("articles/input.json").await.unwrap();
        assert_eq!(bytes, b"payload");
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let channel = MemoryChannel::new();
        match channel.read("absent").await {
            Err(Error::NotFound(key)) => assert_eq!(key, "absent"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn latest_write_wins() {
        let channel = MemoryChannel::new();
        channel.write("k", b"first").await.unwrap();
        channel.write("k", b"second").await.unwrap();
        assert_eq!(channel.read("k").await.unwrap(), b"second");
        assert_eq!(channel.len().await, 1);
    }
}
