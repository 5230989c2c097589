//! Evaluate branch prediction strategies against recorded branch traces.

pub mod branch;
pub mod config;
pub mod error;
pub mod history;
pub mod predictor;
pub mod sim;
pub mod stats;
pub mod trace;

pub use branch::*;
pub use config::*;
pub use error::{ Error, ConfigError, TraceError, EvalError };
pub use history::*;
pub use predictor::*;
pub use sim::*;
pub use stats::*;
pub use trace::*;
