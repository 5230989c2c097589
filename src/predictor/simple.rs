//! Static predictors which keep no state.

use crate::branch::Outcome;
use crate::predictor::BranchPredictor;

/// A simple predictor with no state: always predict 'taken'.
#[derive(Clone, Copy, Debug, Default)]
pub struct TakenPredictor;
impl BranchPredictor for TakenPredictor {
    fn name(&self) -> &'static str { "AlwaysTaken" }
    fn predict(&self, _opcode: &str, _pc: u64, _tgt: u64) -> Outcome {
        Outcome::T
    }
    fn update(&mut self, _: &str, _: u64, _: u64, _: Outcome) {}
    fn reset(&mut self) {}
}

/// A simple predictor with no state: always predict 'not-taken'.
#[derive(Clone, Copy, Debug, Default)]
pub struct NotTakenPredictor;
impl BranchPredictor for NotTakenPredictor {
    fn name(&self) -> &'static str { "AlwaysNotTaken" }
    fn predict(&self, _opcode: &str, _pc: u64, _tgt: u64) -> Outcome {
        Outcome::N
    }
    fn update(&mut self, _: &str, _: u64, _: u64, _: Outcome) {}
    fn reset(&mut self) {}
}

/// A simple predictor with no state: backward branches (usually loops) are
/// predicted 'taken', forward branches are predicted 'not-taken'.
#[derive(Clone, Copy, Debug, Default)]
pub struct BackwardTakenPredictor;
impl BranchPredictor for BackwardTakenPredictor {
    fn name(&self) -> &'static str { "BackTakeForwardNot" }
    fn predict(&self, _opcode: &str, pc: u64, tgt: u64) -> Outcome {
        let offset = tgt as i128 - pc as i128;
        Outcome::from(offset < 0)
    }
    fn update(&mut self, _: &str, _: u64, _: u64, _: Outcome) {}
    fn reset(&mut self) {}
}
