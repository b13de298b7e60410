//! Detection of fixations and saccades in series of gaze samples.
pub mod datatype;
pub mod detectors;
pub mod differentiation;
pub(crate) mod iterators;
pub mod statistics;
pub mod threshold;
pub mod transforms;

use crate::error::ValidationError;
use std::fmt::Display;
use strum::{IntoEnumIterator, VariantNames};

pub use datatype::{Event, GazeSamples, SaccadeKinematics, TrialEvent};
pub(crate) use detectors::Detector;
pub use gaze_events_common::{Real, Time};
pub(crate) use iterators::EventFilter;

/// Parses a named option, listing the valid names if `given` is not one of them.
pub(crate) fn parse_named<T>(kind: &'static str, given: &str) -> Result<T, ValidationError>
where
    T: IntoEnumIterator + Display + VariantNames,
{
    T::iter()
        .find(|variant| variant.to_string() == given)
        .ok_or_else(|| ValidationError::Unknown {
            kind,
            given: given.to_owned(),
            supported: T::VARIANTS.join(", "),
        })
}
