//! A table of saturating counters indexed by the program counter.

use crate::branch::Outcome;
use crate::config::PredictorOptions;
use crate::error::ConfigError;
use crate::predictor::BranchPredictor;
use crate::predictor::counter::*;
use crate::predictor::pht::*;
use crate::predictor::table::*;

/// Configuration for building a [`BimodalPredictor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BimodalConfig {
    /// Width of each counter in bits
    pub counter_bits: u64,
    /// Number of counters in the table
    pub table_size: u64,
    /// Value of every counter after construction or reset
    pub initial_state: u64,
}
impl BimodalConfig {
    pub const OPTIONS: [&'static str; 3] = [
        "counter_bits", "table_size", "initial_state"
    ];

    pub fn from_options(opts: &PredictorOptions) -> Result<Self, ConfigError> {
        Ok(Self {
            counter_bits: opts.required("counter_bits")?,
            table_size: opts.required("table_size")?,
            initial_state: opts.get_or("initial_state", 0),
        })
    }

    pub fn build(self) -> Result<BimodalPredictor, ConfigError> {
        let ctr = SaturatingCounterConfig::new(
            self.counter_bits, self.initial_state, "counter_bits", "counter"
        )?;
        let table = PatternHistoryTable::new("table_size", self.table_size, ctr)?;
        log::debug!("Bimodal: {} entries x {} bits", table.size(), ctr.bits);
        Ok(BimodalPredictor { cfg: self, table })
    }
}

/// A direct-mapped table of N-bit saturating counters.
///
/// Branches whose program counters are congruent modulo the table size
/// share a counter.
#[derive(Clone, Debug)]
pub struct BimodalPredictor {
    cfg: BimodalConfig,
    table: PatternHistoryTable,
}
impl BimodalPredictor {
    pub fn config(&self) -> &BimodalConfig { &self.cfg }
    pub fn table(&self) -> &PatternHistoryTable { &self.table }
}

impl BranchPredictor for BimodalPredictor {
    fn name(&self) -> &'static str { "Bimodal" }

    fn predict(&self, _opcode: &str, pc: u64, _tgt: u64) -> Outcome {
        let idx = self.table.get_index(pc);
        self.table.get_entry(idx).predict()
    }

    fn update(&mut self, _opcode: &str, pc: u64, _tgt: u64, outcome: Outcome) {
        let idx = self.table.get_index(pc);
        self.table.get_entry_mut(idx).update(outcome);
    }

    fn reset(&mut self) {
        self.table.reset();
    }
}
