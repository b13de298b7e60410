//! Properties of events computed from the gaze samples they span.
mod processor;

pub use processor::{EventGazeProcessor, EventSummary, TrialGaze};

use crate::{
    error::ValidationError,
    event_detection::{
        Event, GazeSamples, Real,
        statistics::{Extent, nan_max, nan_mean, nan_median},
    },
};
use ndarray::{ArrayView2, s};
use serde::{Deserialize, Serialize};
use std::{fmt, ops::RangeInclusive, str::FromStr};
use strum::{Display, EnumString};

/// How the location of an event is aggregated over its samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum LocationMethod {
    #[default]
    Mean,
    Median,
}

/// The properties which can be computed for an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventProperty {
    /// Euclidean norm of the per-axis position ranges.
    Amplitude,
    /// Sum of the per-axis position ranges.
    Dispersion,
    /// Distance between the first and last position.
    Disposition,
    /// `offset - onset`
    Duration,
    /// Central position.
    Location(LocationMethod),
    /// Maximum velocity magnitude.
    PeakVelocity,
}

const VALID_PROPERTIES: [&str; 6] = [
    "amplitude",
    "dispersion",
    "disposition",
    "duration",
    "location",
    "peak_velocity",
];

impl FromStr for EventProperty {
    type Err = ValidationError;

    /// Parses a property name. The location method is given after a colon, as in
    /// `location:median`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidProperty {
            name: s.to_owned(),
            valid: VALID_PROPERTIES.join(", "),
        };
        match s.split_once(':') {
            Some(("location", method)) => method
                .parse()
                .map(Self::Location)
                .map_err(|_| invalid()),
            Some(_) => Err(invalid()),
            None => match s {
                "amplitude" => Ok(Self::Amplitude),
                "dispersion" => Ok(Self::Dispersion),
                "disposition" => Ok(Self::Disposition),
                "duration" => Ok(Self::Duration),
                "location" => Ok(Self::Location(LocationMethod::Mean)),
                "peak_velocity" => Ok(Self::PeakVelocity),
                _ => Err(invalid()),
            },
        }
    }
}

impl fmt::Display for EventProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Location(LocationMethod::Median) => write!(f, "location:median"),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// The value of a property, a scalar or one value per axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Scalar(Real),
    Vector([Real; 2]),
}

impl EventProperty {
    /// The name under which the property is reported.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Amplitude => "amplitude",
            Self::Dispersion => "dispersion",
            Self::Disposition => "disposition",
            Self::Duration => "duration",
            Self::Location(_) => "location",
            Self::PeakVelocity => "peak_velocity",
        }
    }

    /// Computes the property of an event over the given range of samples.
    pub fn compute(
        &self,
        event: &Event,
        samples: &GazeSamples,
        range: RangeInclusive<usize>,
    ) -> Result<PropertyValue, ValidationError> {
        let positions = samples.positions();
        let positions = positions.slice(s![range.clone(), ..]);
        Ok(match self {
            Self::Amplitude => {
                let [x, y] = extent(positions).ranges();
                PropertyValue::Scalar(x.hypot(y))
            }
            Self::Dispersion => PropertyValue::Scalar(extent(positions).dispersion()),
            Self::Disposition => {
                let first = positions.row(0);
                let last = positions.row(positions.nrows() - 1);
                PropertyValue::Scalar((first[0] - last[0]).hypot(first[1] - last[1]))
            }
            Self::Duration => PropertyValue::Scalar((event.offset - event.onset) as Real),
            Self::Location(method) => {
                let aggregate = |axis: usize| {
                    let values = positions.column(axis).into_iter().copied();
                    match method {
                        LocationMethod::Mean => nan_mean(values),
                        LocationMethod::Median => nan_median(values),
                    }
                };
                PropertyValue::Vector([aggregate(0), aggregate(1)])
            }
            Self::PeakVelocity => {
                let velocities = samples.require_velocities("peak_velocity")?;
                PropertyValue::Scalar(nan_max(
                    velocities
                        .slice(s![range, ..])
                        .rows()
                        .into_iter()
                        .map(|velocity| velocity[0].hypot(velocity[1])),
                ))
            }
        })
    }
}

fn extent(positions: ArrayView2<Real>) -> Extent {
    Extent::from_samples(
        positions
            .rows()
            .into_iter()
            .map(|position| [position[0], position[1]]),
    )
}
