use std::path::Path;
use std::sync::Arc;

use ae_core::{DocumentChannel, Error, Result};

pub mod backends;
pub mod unreliable;

pub use backends::{FsChannel, MemoryChannel};
pub use unreliable::{Fate, FailureOdds, Outcome, RandomFate, ScriptedFate, UnreliableChannel};

/// Build a reliable base channel from its CLI name. Unreliability is layered
/// on separately with [`UnreliableChannel`].
pub fn create_channel(kind: &str, data_dir: &Path) -> Result<Arc<dyn DocumentChannel>> {
    match kind {
        "memory" => Ok(Arc::new(MemoryChannel::new())),
        "fs" => Ok(Arc::new(FsChannel::new(data_dir)?)),
        other => Err(Error::Channel(format!("unknown channel backend: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_knows_its_backends() {
        let dir = tempfile::tempdir().unwrap();
        assert!(create_channel("memory", dir.path()).is_ok());
        assert!(create_channel("fs", dir.path()).is_ok());
        assert!(create_channel("carrier-pigeon", dir.path()).is_err());
    }
}
