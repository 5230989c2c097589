//! Extension point for a user-supplied predictor.
//!
//! [PredictorKind::Custom] is registered so that it shows up in listings
//! and can be requested by name, but building it fails until this module
//! provides a real implementation. To add one:
//!
//! 1. Define a predictor type here and implement [BranchPredictor] for it.
//! 2. Add a variant for it to [AnyPredictor].
//! 3. Construct it from [PredictorOptions] in [build] instead of returning
//!    [ConfigError::Unimplemented].
//!
//! [PredictorKind::Custom]: crate::predictor::PredictorKind::Custom
//! [BranchPredictor]: crate::predictor::BranchPredictor
//! [AnyPredictor]: crate::predictor::AnyPredictor

use crate::config::PredictorOptions;
use crate::error::ConfigError;
use crate::predictor::AnyPredictor;

pub const NAME: &str = "Custom";

pub fn build(_opts: &PredictorOptions) -> Result<AnyPredictor, ConfigError> {
    Err(ConfigError::Unimplemented(NAME))
}
