//! The building blocks of simulated trials.
pub(crate) mod noise;
pub(crate) mod steps;
pub(crate) mod utils;

pub(crate) use noise::{Noise, NoiseSource};
pub(crate) use steps::{Step, StepError, step_function};
pub(crate) use utils::{Interval, JsonValueError, NumConstant};
