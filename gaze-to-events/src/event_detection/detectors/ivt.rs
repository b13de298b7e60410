//! Velocity threshold identification (I-VT) of saccades.
use super::velocity::velocity_events;
use crate::{
    error::{DetectionError, ValidationError},
    event_detection::{Event, GazeSamples, Real},
};
use tracing::instrument;

#[derive(Clone, Debug, PartialEq)]
pub struct IvtParameters {
    /// Samples faster than this are saccade candidates.
    pub velocity_threshold: Real,
    /// The minimum number of consecutive candidate samples forming a saccade.
    pub minimum_duration: usize,
    /// Whether a saccade may span samples with missing velocity.
    pub include_nan: bool,
    pub name: String,
}

impl Default for IvtParameters {
    fn default() -> Self {
        Self {
            velocity_threshold: 20.0,
            minimum_duration: 1,
            include_nan: false,
            name: "saccade".to_owned(),
        }
    }
}

/// Detects saccades as runs of samples whose velocity magnitude exceeds a fixed threshold.
#[instrument(skip_all, fields(len = samples.len(), num_events))]
pub fn ivt(
    samples: &GazeSamples,
    parameters: &IvtParameters,
) -> Result<Vec<Event>, DetectionError> {
    if !(parameters.velocity_threshold > 0.0) {
        return Err(
            ValidationError::not_positive("velocity_threshold", parameters.velocity_threshold)
                .into(),
        );
    }
    if parameters.minimum_duration == 0 {
        return Err(ValidationError::not_positive("minimum_duration", 0).into());
    }
    let velocities = samples.require_velocities("ivt")?;
    let events = velocity_events(
        samples,
        velocities,
        |velocity| velocity[0].hypot(velocity[1]) > parameters.velocity_threshold,
        parameters.minimum_duration,
        parameters.include_nan,
        &parameters.name,
    );
    tracing::Span::current().record("num_events", events.len());
    Ok(events)
}
