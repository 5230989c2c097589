//! Error types for configuring predictors and replaying traces.

use thiserror::Error;

/// Top-level error type for the crate
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid predictor configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Evaluation failed: {0}")]
    Eval(#[from] EvalError),
}

/// Errors raised while building a predictor
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown predictor '{0}'")]
    UnknownPredictor(String),

    #[error("Predictor '{0}' is registered but has no implementation")]
    Unimplemented(&'static str),

    #[error("Missing required option '{0}'")]
    MissingOption(&'static str),

    #[error("Invalid option '{0}': expected key=value")]
    MalformedOption(String),

    #[error("Invalid value for option '{key}': '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("Option '{0}' must be greater than zero")]
    NotPositive(&'static str),

    #[error("Option '{key}' must be at most {max} (got {value})")]
    TooLarge { key: &'static str, value: u64, max: u64 },

    #[error("Initial {what} state must be in range [0, {limit}) (got {value})")]
    InitialState { what: &'static str, value: u64, limit: u128 },

    #[error("Failed to allocate {entries} entries for '{key}'")]
    Allocation { key: &'static str, entries: u64 },

    #[error("The number of PHT entries ({entries}) must be at least 2^{history_bits}")]
    PhtTooSmall { entries: u64, history_bits: u32 },
}

/// Errors raised while reading a trace
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("line {line}: expected 4 comma-separated fields, found {found}")]
    FieldCount { line: usize, found: usize },

    #[error("line {line}: invalid hexadecimal address '{value}'")]
    InvalidAddress { line: usize, value: String },

    #[error("line {line}: result type '{value}' not valid (expected '0' or '1')")]
    InvalidOutcome { line: usize, value: String },

    #[error("Failed to read trace '{0}': {1}")]
    Io(String, #[source] std::io::Error),
}

/// Errors raised by the trace evaluator
#[derive(Error, Debug)]
pub enum EvalError {
    #[error(transparent)]
    Trace(#[from] TraceError),

    #[error("Evaluation is {state:?}, cannot {op}")]
    InvalidState { state: crate::sim::EvalState, op: &'static str },
}

/// Type alias for Result with [Error]
pub type Result<T> = std::result::Result<T, Error>;
