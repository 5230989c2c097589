//! Helpers for collecting statistics.

use std::collections::*;
use itertools::*;

use crate::branch::Outcome;
use crate::config::PredictorOptions;

/// Container for the statistics gathered while replaying one trace.
///
/// "Takes" and "not-takes" are classified by the *actual* outcome: an
/// incorrect take is a taken branch which was predicted not-taken.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvaluationResult {
    /// Number of predictions made
    pub total_predictions: usize,

    /// Number of correct predictions
    pub correct_predicts: usize,
    pub correct_takes: usize,
    pub correct_not_takes: usize,

    /// Number of incorrect predictions
    pub incorrect_predicts: usize,
    pub incorrect_takes: usize,
    pub incorrect_not_takes: usize,

    /// Per-opcode statistics
    pub opcodes: BTreeMap<String, OpcodeStats>,
}
impl EvaluationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the result of a single prediction.
    pub fn record(&mut self, opcode: &str, predicted: Outcome, actual: Outcome) {
        let hit = predicted == actual;
        self.total_predictions += 1;
        match (hit, actual) {
            (true, Outcome::T) => self.correct_takes += 1,
            (true, Outcome::N) => self.correct_not_takes += 1,
            (false, Outcome::T) => self.incorrect_takes += 1,
            (false, Outcome::N) => self.incorrect_not_takes += 1,
        }
        if hit {
            self.correct_predicts += 1;
        } else {
            self.incorrect_predicts += 1;
        }

        let entry = self.get_mut(opcode);
        entry.occ += 1;
        if hit { entry.hits += 1; }
    }

    /// Return the fraction of correct predictions.
    pub fn accuracy(&self) -> f64 {
        if self.total_predictions == 0 {
            return 0.0;
        }
        self.correct_predicts as f64 / self.total_predictions as f64
    }

    /// Returns a reference to data collected for a particular opcode.
    pub fn get(&self, opcode: &str) -> Option<&OpcodeStats> {
        self.opcodes.get(opcode)
    }

    /// Returns a mutable reference to data collected for a particular opcode.
    /// Creates a new entry if one doesn't already exist.
    fn get_mut(&mut self, opcode: &str) -> &mut OpcodeStats {
        self.opcodes.entry(opcode.to_string()).or_default()
    }

    /// Returns the number of unique opcodes observed.
    pub fn num_unique_opcodes(&self) -> usize {
        self.opcodes.len()
    }

    /// Return opcodes ordered by how often they occurred (most frequent first).
    pub fn opcodes_by_occurrence(&self) -> Vec<(&str, &OpcodeStats)> {
        self.opcodes.iter()
            .sorted_by(|x, y| y.1.occ.cmp(&x.1.occ).then(x.0.cmp(y.0)))
            .map(|(op, s)| (op.as_str(), s))
            .collect()
    }
}

/// Container for per-opcode statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpcodeStats {
    /// Number of times this opcode was encountered.
    pub occ: usize,

    /// Number of correct predictions for this opcode.
    pub hits: usize,
}
impl OpcodeStats {
    /// Return the hit rate for this opcode.
    pub fn hit_rate(&self) -> f64 {
        if self.occ == 0 { 0.0 } else { self.hits as f64 / self.occ as f64 }
    }
}

/// An [EvaluationResult] along with the trace and predictor that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvaluationReport {
    pub trace: String,
    pub predictor: &'static str,
    pub options: PredictorOptions,
    pub result: EvaluationResult,
}
