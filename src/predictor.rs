//! Implementations of different branch predictors.

pub mod table;
pub mod counter;
pub mod pht;
pub mod simple;
pub mod bimodal;
pub mod twolevel;
pub mod custom;

pub use table::*;
pub use counter::*;
pub use pht::*;
pub use simple::*;
pub use bimodal::*;
pub use twolevel::*;

use crate::branch::Outcome;
use crate::config::PredictorOptions;
use crate::error::ConfigError;

/// Interface to a branch predictor.
///
/// For each branch, [BranchPredictor::predict] is called first and
/// [BranchPredictor::update] is called afterwards with the real outcome.
pub trait BranchPredictor {
    /// A stable identifier for this kind of predictor.
    fn name(&self) -> &'static str;

    /// Return the predicted outcome for a branch without changing any state.
    fn predict(&self, opcode: &str, pc: u64, tgt: u64) -> Outcome;

    /// Update the internal state of the predictor with the correct outcome.
    fn update(&mut self, opcode: &str, pc: u64, tgt: u64, outcome: Outcome);

    /// Restore the state the predictor had right after construction.
    fn reset(&mut self);
}

impl<P: BranchPredictor + ?Sized> BranchPredictor for Box<P> {
    fn name(&self) -> &'static str { (**self).name() }
    fn predict(&self, opcode: &str, pc: u64, tgt: u64) -> Outcome {
        (**self).predict(opcode, pc, tgt)
    }
    fn update(&mut self, opcode: &str, pc: u64, tgt: u64, outcome: Outcome) {
        (**self).update(opcode, pc, tgt, outcome)
    }
    fn reset(&mut self) { (**self).reset() }
}

/// The set of predictors that can be selected by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PredictorKind {
    AlwaysTaken,
    AlwaysNotTaken,
    BackTakeForwardNot,
    Bimodal,
    TwoLevel,
    GShare,
    /// Placeholder for a user-supplied predictor, see [custom].
    Custom,
}
impl PredictorKind {
    pub const ALL: [Self; 7] = [
        Self::AlwaysTaken,
        Self::AlwaysNotTaken,
        Self::BackTakeForwardNot,
        Self::Bimodal,
        Self::TwoLevel,
        Self::GShare,
        Self::Custom,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::AlwaysTaken => "AlwaysTaken",
            Self::AlwaysNotTaken => "AlwaysNotTaken",
            Self::BackTakeForwardNot => "BackTakeForwardNot",
            Self::Bimodal => "Bimodal",
            Self::TwoLevel => "TwoLevel",
            Self::GShare => "GShare",
            Self::Custom => custom::NAME,
        }
    }

    /// Option keys understood by this kind of predictor.
    pub fn options(&self) -> &'static [&'static str] {
        match self {
            Self::Bimodal => &BimodalConfig::OPTIONS,
            Self::TwoLevel => &TwoLevelConfig::OPTIONS,
            Self::GShare => &GShareConfig::OPTIONS,
            _ => &[],
        }
    }

    /// Construct a predictor of this kind.
    ///
    /// Options which this kind does not understand are ignored.
    pub fn build(&self, opts: &PredictorOptions)
        -> Result<AnyPredictor, ConfigError>
    {
        opts.log_unrecognized(self.name(), self.options());
        let res = match self {
            Self::AlwaysTaken => AnyPredictor::Taken(TakenPredictor),
            Self::AlwaysNotTaken => AnyPredictor::NotTaken(NotTakenPredictor),
            Self::BackTakeForwardNot => {
                AnyPredictor::BackwardTaken(BackwardTakenPredictor)
            },
            Self::Bimodal => {
                let cfg = BimodalConfig::from_options(opts)?;
                AnyPredictor::Bimodal(cfg.build()?)
            },
            Self::TwoLevel => {
                let cfg = TwoLevelConfig::from_options(opts)?;
                AnyPredictor::TwoLevel(cfg.build()?)
            },
            Self::GShare => {
                let cfg = GShareConfig::from_options(opts)?;
                AnyPredictor::TwoLevel(cfg.build()?)
            },
            Self::Custom => custom::build(opts)?,
        };
        Ok(res)
    }
}

impl std::fmt::Display for PredictorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for PredictorKind {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, ConfigError> {
        Self::ALL.iter()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| ConfigError::UnknownPredictor(s.to_string()))
    }
}

/// Any one of the predictors in [PredictorKind].
#[derive(Clone, Debug)]
pub enum AnyPredictor {
    Taken(TakenPredictor),
    NotTaken(NotTakenPredictor),
    BackwardTaken(BackwardTakenPredictor),
    Bimodal(BimodalPredictor),
    /// Two-level or GShare
    TwoLevel(TwoLevelPredictor),
}

macro_rules! dispatch {
    ($self:expr, $p:ident => $e:expr) => {
        match $self {
            AnyPredictor::Taken($p) => $e,
            AnyPredictor::NotTaken($p) => $e,
            AnyPredictor::BackwardTaken($p) => $e,
            AnyPredictor::Bimodal($p) => $e,
            AnyPredictor::TwoLevel($p) => $e,
        }
    };
}

impl BranchPredictor for AnyPredictor {
    fn name(&self) -> &'static str {
        dispatch!(self, p => p.name())
    }
    fn predict(&self, opcode: &str, pc: u64, tgt: u64) -> Outcome {
        dispatch!(self, p => p.predict(opcode, pc, tgt))
    }
    fn update(&mut self, opcode: &str, pc: u64, tgt: u64, outcome: Outcome) {
        dispatch!(self, p => p.update(opcode, pc, tgt, outcome))
    }
    fn reset(&mut self) {
        dispatch!(self, p => p.reset())
    }
}
