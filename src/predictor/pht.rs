//! Implementation of a pattern history table (PHT).

use crate::error::ConfigError;
use crate::predictor::table::*;
use crate::predictor::counter::*;

/// A table of [SaturatingCounter], indexed by some value reduced modulo
/// the number of entries.
#[derive(Clone, Debug)]
pub struct PatternHistoryTable {
    /// Saturating counter configuration
    cfg: SaturatingCounterConfig,

    /// Table of counters
    data: Vec<SaturatingCounter>,
}
impl PatternHistoryTable {
    /// Create a table of 'size' counters. 'key' names the option which
    /// determines the size, for error reporting.
    pub fn new(key: &'static str, size: u64, cfg: SaturatingCounterConfig)
        -> Result<Self, ConfigError>
    {
        Ok(Self {
            cfg,
            data: alloc_table(key, size, cfg.build())?,
        })
    }

    pub fn config(&self) -> &SaturatingCounterConfig { &self.cfg }

    /// Iterate over the raw counter values.
    pub fn values(&self) -> impl Iterator<Item = u32> + '_ {
        self.data.iter().map(|c| c.value())
    }
}

impl PredictorTable for PatternHistoryTable {
    type Input = u64;
    type Entry = SaturatingCounter;

    fn size(&self) -> usize { self.data.len() }

    fn get_index(&self, input: u64) -> usize {
        (input % self.data.len() as u64) as usize
    }

    fn get_entry(&self, idx: usize) -> &SaturatingCounter {
        &self.data[idx]
    }

    fn get_entry_mut(&mut self, idx: usize) -> &mut SaturatingCounter {
        &mut self.data[idx]
    }

    fn reset(&mut self) {
        self.data.iter_mut().for_each(|c| c.reset());
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::branch::Outcome;

    #[test]
    fn index_wraps_modulo_size() {
        let pht = PatternHistoryTable::new(
            "table_size", 12, SaturatingCounterConfig { bits: 2, initial: 1 }
        ).unwrap();
        assert_eq!(pht.get_index(5), 5);
        assert_eq!(pht.get_index(17), 5);
        assert_eq!(pht.get_index(u64::MAX), (u64::MAX % 12) as usize);
    }

    #[test]
    fn reset_restores_every_entry() {
        let mut pht = PatternHistoryTable::new(
            "table_size", 4, SaturatingCounterConfig { bits: 2, initial: 1 }
        ).unwrap();
        for i in 0..4 {
            pht.get_entry_mut(i).update(Outcome::T);
        }
        assert!(pht.values().all(|v| v == 2));
        pht.reset();
        assert!(pht.values().all(|v| v == 1));
    }
}
