use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use ae_core::{DocumentChannel, Error, Result};

/// Per-call outcome of a channel operation. Exactly one is rolled for every
/// read and every write, independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Immediate channel error, no partial effect.
    Fail,
    /// Delay before completing successfully. Models a slow backend, not a
    /// hang forever.
    Stall,
    /// The operation "succeeds" but only a prefix of the bytes moves.
    /// Indistinguishable from success by signature alone.
    Truncate,
    Success,
}

/// Source of the failure-mode decision. Swappable so tests can force each
/// outcome deterministically.
pub trait Fate: Send + Sync {
    fn roll(&self) -> Outcome;

    /// Fraction of the payload that survives a truncation, in `[0.5, 0.9)`.
    fn truncation_fraction(&self) -> f64;
}

#[derive(Debug, Clone, Copy)]
pub struct FailureOdds {
    pub fail: f64,
    pub stall: f64,
    pub truncate: f64,
}

impl FailureOdds {
    pub fn new(fail: f64, stall: f64, truncate: f64) -> Result<Self> {
        let odds = Self { fail, stall, truncate };
        let total = fail + stall + truncate;
        if fail < 0.0 || stall < 0.0 || truncate < 0.0 || total > 1.0 {
            return Err(Error::Validation(format!(
                "failure odds must be non-negative and sum to at most 1.0, got {:.2}",
                total
            )));
        }
        Ok(odds)
    }

    /// Fully reliable: every roll is `Success`.
    pub fn none() -> Self {
        Self { fail: 0.0, stall: 0.0, truncate: 0.0 }
    }
}

impl Default for FailureOdds {
    fn default() -> Self {
        Self { fail: 0.2, stall: 0.1, truncate: 0.2 }
    }
}

/// Production fate source: one uniform draw per call, carved into mutually
/// exclusive bands (fail, stall, truncate, success).
pub struct RandomFate {
    odds: FailureOdds,
    rng: Mutex<StdRng>,
}

impl RandomFate {
    pub fn new(odds: FailureOdds) -> Self {
        Self {
            odds,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(odds: FailureOdds, seed: u64) -> Self {
        Self {
            odds,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Fate for RandomFate {
    fn roll(&self) -> Outcome {
        let x: f64 = self.rng.lock().unwrap().gen();
        if x < self.odds.fail {
            Outcome::Fail
        } else if x < self.odds.fail + self.odds.stall {
            Outcome::Stall
        } else if x < self.odds.fail + self.odds.stall + self.odds.truncate {
            Outcome::Truncate
        } else {
            Outcome::Success
        }
    }

    fn truncation_fraction(&self) -> f64 {
        self.rng.lock().unwrap().gen_range(0.5..0.9)
    }
}

/// Deterministic fate source for tests: plays back a fixed outcome sequence,
/// then succeeds forever.
pub struct ScriptedFate {
    outcomes: Mutex<VecDeque<Outcome>>,
    fraction: f64,
}

impl ScriptedFate {
    pub fn new(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            fraction: 0.5,
        }
    }

    pub fn with_fraction(mut self, fraction: f64) -> Self {
        self.fraction = fraction;
        self
    }
}

impl Fate for ScriptedFate {
    fn roll(&self) -> Outcome {
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Outcome::Success)
    }

    fn truncation_fraction(&self) -> f64 {
        self.fraction
    }
}

/// Decorator injecting the four failure modes in front of any inner channel.
pub struct UnreliableChannel {
    inner: Arc<dyn DocumentChannel>,
    fate: Arc<dyn Fate>,
    stall: Duration,
}

impl UnreliableChannel {
    pub fn new(inner: Arc<dyn DocumentChannel>, fate: Arc<dyn Fate>, stall: Duration) -> Self {
        Self { inner, fate, stall }
    }

    fn truncate<'a>(&self, bytes: &'a [u8]) -> &'a [u8] {
        let keep = (bytes.len() as f64 * self.fate.truncation_fraction()) as usize;
        &bytes[..keep.min(bytes.len())]
    }
}

#[async_trait]
impl DocumentChannel for UnreliableChannel {
    async fn read(&self, key: &str) -> Result<Vec<u8>> {
        match self.fate.roll() {
            Outcome::Fail => {
                debug!("💥 injected read failure for {}", key);
                Err(Error::Channel(format!("read failed: {}", key)))
            }
            Outcome::Stall => {
                debug!("🐌 injected read stall for {}", key);
                tokio::time::sleep(self.stall).await;
                self.inner.read(key).await
            }
            Outcome::Truncate => {
                let bytes = self.inner.read(key).await?;
                let kept = self.truncate(&bytes).to_vec();
                debug!("✂️ injected read truncation for {} ({} of {} bytes)", key, kept.len(), bytes.len());
                Ok(kept)
            }
            Outcome::Success => self.inner.read(key).await,
        }
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        match self.fate.roll() {
            Outcome::Fail => {
                debug!("💥 injected write failure for {}", key);
                Err(Error::Channel(format!("write failed: {}", key)))
            }
            Outcome::Stall => {
                debug!("🐌 injected write stall for {}", key);
                tokio::time::sleep(self.stall).await;
                self.inner.write(key, bytes).await
            }
            Outcome::Truncate => {
                let kept = self.truncate(bytes);
                debug!("✂️ injected write truncation for {} ({} of {} bytes)", key, kept.len(), bytes.len());
                self.inner.write(key, kept).await
            }
            Outcome::Success => self.inner.write(key, bytes).await,
        }
    }
}
