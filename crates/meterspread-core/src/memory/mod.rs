//! Adaptive weight memory.
//!
//! The engine reads a learned per-hour bias before drawing weights and writes
//! each bucket's share of the total back after a run. Memory is optional: a
//! run with [`NoMemory`] behaves as if nothing was ever learned.

mod hourly;
mod kv;

pub use hourly::{HourlyMemory, HourlyStats};
pub use kv::{KvWeightMemory, MEMORY_KEY};

use crate::error::MemoryError;

/// Per-hour bias store consulted and updated by the engine.
pub trait WeightMemory {
    /// Mean share previously observed for `hour`, if any.
    fn read(&self, hour: u8) -> Result<Option<f64>, MemoryError>;

    /// Fold one observed share into `hour`'s running mean.
    fn write(&mut self, hour: u8, share: f64) -> Result<(), MemoryError>;
}

/// Memory that never learns anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMemory;

impl WeightMemory for NoMemory {
    fn read(&self, _hour: u8) -> Result<Option<f64>, MemoryError> {
        Ok(None)
    }

    fn write(&mut self, _hour: u8, _share: f64) -> Result<(), MemoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_memory_reads_nothing() {
        let mut memory = NoMemory;
        memory.write(5, 0.3).unwrap();
        assert_eq!(memory.read(5).unwrap(), None);
    }
}
