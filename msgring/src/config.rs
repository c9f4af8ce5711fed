use crate::MessageRing;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub(crate) const DEFAULT_CAPACITY: usize = 16384;
pub(crate) const DEFAULT_BATCH_SIZE: usize = 512;
pub(crate) const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(100);

/// Settings for a ring and the [`Flusher`](crate::Flusher) draining it.
///
/// Deserializes from e.g. `{"capacity": 4096, "batch_size": 256, "flush_interval_ms": 50}`;
/// missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of slots in the ring. Zero is allowed.
    pub capacity: usize,
    /// Most messages handed to the publisher in one call.
    pub batch_size: usize,
    /// How long the flusher sleeps between drains when nobody wakes it.
    #[serde(rename = "flush_interval_ms", with = "millis")]
    pub flush_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            batch_size: DEFAULT_BATCH_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }
}

impl Config {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_flush_interval(mut self, flush_interval: Duration) -> Self {
        self.flush_interval = flush_interval;
        self
    }

    /// Rejects settings a flusher cannot make progress with.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.batch_size > 0, "batch_size must be greater than zero");
        anyhow::ensure!(
            !self.flush_interval.is_zero(),
            "flush_interval must be greater than zero"
        );
        Ok(())
    }

    /// Builds an empty ring with the configured capacity.
    pub fn ring<T>(&self) -> MessageRing<T> {
        MessageRing::new(self.capacity)
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
