//! Replaying traces against a predictor.

use std::path::Path;

use crate::branch::*;
use crate::config::PredictorOptions;
use crate::error::{ EvalError, TraceError };
use crate::predictor::*;
use crate::stats::*;
use crate::trace::*;

/// The lifecycle of an [Evaluation].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvalState {
    NotStarted,
    Running,
    Completed,
}

/// A single run of some predictor over one trace.
///
/// The evaluation holds the only mutable reference to the predictor until
/// it is dropped, so a predictor cannot be shared between concurrent runs.
pub struct Evaluation<'p, P: BranchPredictor + ?Sized> {
    predictor: &'p mut P,
    state: EvalState,
    result: EvaluationResult,
}

impl<'p, P: BranchPredictor + ?Sized> Evaluation<'p, P> {
    pub fn new(predictor: &'p mut P) -> Self {
        Self {
            predictor,
            state: EvalState::NotStarted,
            result: EvaluationResult::new(),
        }
    }

    pub fn state(&self) -> EvalState { self.state }

    /// Statistics gathered so far.
    pub fn result(&self) -> &EvaluationResult { &self.result }

    fn expect_state(&self, state: EvalState, op: &'static str)
        -> Result<(), EvalError>
    {
        if self.state != state {
            return Err(EvalError::InvalidState { state: self.state, op });
        }
        Ok(())
    }

    /// Begin the run, optionally resetting the predictor first.
    pub fn start(&mut self, reset: bool) -> Result<(), EvalError> {
        self.expect_state(EvalState::NotStarted, "start")?;
        if reset {
            self.predictor.reset();
        }
        self.result = EvaluationResult::new();
        self.state = EvalState::Running;
        log::debug!("{}: starting evaluation (reset={})",
            self.predictor.name(), reset);
        Ok(())
    }

    /// Predict one branch, then train the predictor with its real outcome.
    /// Returns the prediction that was made.
    pub fn step(&mut self, record: &BranchRecord) -> Result<Outcome, EvalError> {
        self.expect_state(EvalState::Running, "step")?;
        let BranchRecord { opcode, pc, tgt, outcome } = record;

        let prediction = self.predictor.predict(opcode, *pc, *tgt);
        self.predictor.update(opcode, *pc, *tgt, *outcome);
        self.result.record(opcode, prediction, *outcome);

        log::trace!("{:>6} {:016x} -> {:016x} predicted {:?}, actual {:?}",
            opcode, pc, tgt, prediction, outcome);
        Ok(prediction)
    }

    /// End the run and return the accumulated statistics.
    ///
    /// The predictor is left in whatever state the last update produced.
    pub fn finish(&mut self) -> Result<EvaluationResult, EvalError> {
        self.expect_state(EvalState::Running, "finish")?;
        self.state = EvalState::Completed;
        let res = std::mem::take(&mut self.result);
        log::debug!("{}: {}/{} correct",
            self.predictor.name(), res.correct_predicts, res.total_predictions);
        Ok(res)
    }
}

/// Replay a sequence of records against a predictor.
///
/// The first error aborts the run and no result is produced. Updates made
/// to the predictor before the error are kept.
pub fn evaluate<P, I>(predictor: &mut P, records: I, reset: bool)
    -> Result<EvaluationResult, EvalError>
where
    P: BranchPredictor + ?Sized,
    I: IntoIterator<Item = Result<BranchRecord, TraceError>>,
{
    let mut eval = Evaluation::new(predictor);
    eval.start(reset)?;
    for record in records {
        eval.step(&record?)?;
    }
    eval.finish()
}

/// Replay a trace held in memory.
pub fn evaluate_str<P>(predictor: &mut P, text: &str, reset: bool)
    -> Result<EvaluationResult, EvalError>
where
    P: BranchPredictor + ?Sized,
{
    evaluate(predictor, TraceReader::from_text("<memory>", text), reset)
}

/// Replay a trace file.
pub fn evaluate_file<P>(predictor: &mut P, path: impl AsRef<Path>, reset: bool)
    -> Result<EvaluationResult, EvalError>
where
    P: BranchPredictor + ?Sized,
{
    evaluate(predictor, TraceReader::open(path)?, reset)
}

/// Replay each trace in a [TraceSet] against the same predictor instance,
/// producing one report per trace.
///
/// With 'reset' set, the predictor starts every trace from its initial
/// state. Otherwise, state carries over from one trace to the next.
pub fn evaluate_set<P>(
    predictor: &mut P,
    options: &PredictorOptions,
    traces: TraceSet,
    reset: bool,
) -> Result<Vec<EvaluationReport>, EvalError>
where
    P: BranchPredictor + ?Sized,
{
    let mut res = Vec::new();
    for reader in traces {
        let reader = reader?;
        let trace = reader.name().to_string();
        log::info!("Evaluating {} on {}", predictor.name(), trace);
        let result = evaluate(predictor, reader, reset)?;
        res.push(EvaluationReport {
            trace,
            predictor: predictor.name(),
            options: options.clone(),
            result,
        });
    }
    Ok(res)
}
