//! Errors raised by the detection core.
//!
//! Errors fall into two groups. A [ValidationError] is a caller mistake and should never be
//! retried. A [DataQualityError] means a trial violates a precondition of an algorithm; batch
//! callers may log it and continue with the next trial, see [DetectionError::is_data_quality].
use crate::event_detection::{Real, Time};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("{name} must have shape (N, 2) but has shape ({rows}, {columns})")]
    Shape {
        name: &'static str,
        rows: usize,
        columns: usize,
    },
    #[error("length of {name} ({length}) does not match length of {other} ({other_length})")]
    LengthMismatch {
        name: &'static str,
        length: usize,
        other: &'static str,
        other_length: usize,
    },
    #[error("{name} must be greater than 0 but is {value}")]
    NotPositive { name: &'static str, value: String },
    #[error(
        "timesteps must be strictly increasing, but timestep {index} ({value}) does not exceed its predecessor ({previous})"
    )]
    NonIncreasingTimesteps {
        index: usize,
        value: Time,
        previous: Time,
    },
    #[error("insufficient samples for {method} method: requires at least {required}, but got {length}")]
    InsufficientSamples {
        method: &'static str,
        required: usize,
        length: usize,
    },
    #[error("'degree' ({degree}) must be less than 'window_length' ({window_length})")]
    DegreeNotLessThanWindow { degree: usize, window_length: usize },
    #[error("'window_length' must be odd but is {0}")]
    EvenWindowLength(usize),
    #[error(
        "'window_length' ({window_length}) must not exceed the number of samples ({length}) when no padding is used"
    )]
    WindowExceedsSamples { window_length: usize, length: usize },
    #[error("'{parameter}' must not be None for method '{method}'")]
    MissingMethodParameter {
        parameter: &'static str,
        method: &'static str,
    },
    #[error("Unknown {kind} '{given}'. Supported values are: {supported}")]
    Unknown {
        kind: &'static str,
        given: String,
        supported: String,
    },
    #[error("Invalid property '{name}'. Valid properties are: {valid}")]
    InvalidProperty { name: String, valid: String },
    #[error("threshold must be two-dimensional but has {0} components")]
    ThresholdDimension(usize),
    #[error("{name} must have 2 components but has {length}")]
    Dimension { name: &'static str, length: usize },
    #[error("threshold components must be finite but one is {0}")]
    NonFiniteThreshold(Real),
    #[error("velocities are required by {0} but were neither supplied nor derived")]
    MissingVelocities(&'static str),
    #[error("list of identifiers must not be empty")]
    EmptyIdentifiers,
    #[error("identifier '{identifier}' is missing from the {table} table")]
    MissingIdentifier {
        identifier: String,
        table: &'static str,
    },
    #[error("no events match the name '{0}'")]
    NoMatchingEvents(String),
    #[error("events named '{0}' exist, but none belongs to a trial with gaze samples")]
    NoJoinedEvents(String),
}

impl ValidationError {
    pub(crate) fn not_positive(name: &'static str, value: impl ToString) -> Self {
        Self::NotPositive {
            name,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DataQualityError {
    #[error(
        "interval between timesteps must be constant, but the interval before timestep {index} is {found} instead of {expected}"
    )]
    NonConstantInterval {
        index: usize,
        expected: Time,
        found: Time,
    },
    #[error(
        "minimum_duration ({minimum_duration}) must be divisible by the constant interval between timesteps ({interval})"
    )]
    IndivisibleDuration {
        minimum_duration: Time,
        interval: Time,
    },
    #[error(
        "threshold does not provide enough variance as required by minimum_threshold ({sigma:?} < {minimum_threshold})"
    )]
    DegenerateVariance {
        sigma: [Real; 2],
        minimum_threshold: Real,
    },
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DetectionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    DataQuality(#[from] DataQualityError),
}

impl DetectionError {
    /// Returns true if the error concerns the data of a single trial rather than the call itself.
    pub fn is_data_quality(&self) -> bool {
        matches!(self, Self::DataQuality(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_parameter() {
        let error = ValidationError::not_positive("dispersion_threshold", 0.0);
        assert_eq!(
            error.to_string(),
            "dispersion_threshold must be greater than 0 but is 0"
        );

        let error = DataQualityError::IndivisibleDuration {
            minimum_duration: 5,
            interval: 2,
        };
        assert!(
            error
                .to_string()
                .contains("minimum_duration (5) must be divisible by the constant interval")
        );
    }

    #[test]
    fn data_quality_is_distinguishable() {
        let error: DetectionError = DataQualityError::IndivisibleDuration {
            minimum_duration: 5,
            interval: 2,
        }
        .into();
        assert!(error.is_data_quality());

        let error: DetectionError = ValidationError::EmptyIdentifiers.into();
        assert!(!error.is_data_quality());
    }
}
