//! Weight memory persisted as a single JSON record in a key-value store.

use super::{HourlyMemory, WeightMemory};
use crate::error::MemoryError;
use crate::storage::KvStore;

/// Fixed key holding the hour-to-stats record.
pub const MEMORY_KEY: &str = "adaptive_weight_memory";

/// [`WeightMemory`] backed by any [`KvStore`].
///
/// Every write re-reads the record, folds the share in and stores it back, so
/// the read-modify-write of an hour stays inside one call.
#[derive(Debug)]
pub struct KvWeightMemory<S> {
    store: S,
}

impl<S: KvStore> KvWeightMemory<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Load the whole record; a missing key is an empty memory.
    pub fn load(&self) -> Result<HourlyMemory, MemoryError> {
        match self.store.kv_get(MEMORY_KEY)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| MemoryError::Corrupt {
                key: MEMORY_KEY.to_string(),
                source,
            }),
            None => Ok(HourlyMemory::new()),
        }
    }

    pub fn save(&self, memory: &HourlyMemory) -> Result<(), MemoryError> {
        let raw = serde_json::to_string(memory).map_err(MemoryError::Encode)?;
        self.store.kv_set(MEMORY_KEY, &raw)?;
        Ok(())
    }

    /// Forget everything learned so far.
    pub fn reset(&self) -> Result<(), MemoryError> {
        self.store.kv_delete(MEMORY_KEY)?;
        Ok(())
    }
}

impl<S: KvStore> WeightMemory for KvWeightMemory<S> {
    fn read(&self, hour: u8) -> Result<Option<f64>, MemoryError> {
        Ok(self.load()?.bias(hour))
    }

    fn write(&mut self, hour: u8, share: f64) -> Result<(), MemoryError> {
        let mut memory = self.load()?;
        memory.record(hour, share)?;
        self.save(&memory)
    }
}
