//! Microsaccade detection with an elliptical velocity threshold scaled to the noise of each
//! trial (Engbert & Kliegl).
use super::velocity::velocity_events;
use crate::{
    error::{DetectionError, ValidationError},
    event_detection::{Event, GazeSamples, Real, threshold::Threshold},
};
use tracing::{debug, instrument};

#[derive(Clone, Debug, PartialEq)]
pub struct MicrosaccadeParameters {
    /// The per-axis noise level, or how to estimate it.
    pub threshold: Threshold,
    /// Multiple of the noise level giving the radii of the threshold ellipse, lambda.
    pub threshold_factor: Real,
    /// Noise levels below this are degenerate.
    pub minimum_threshold: Real,
    /// The minimum number of consecutive candidate samples forming a microsaccade.
    pub minimum_duration: usize,
    pub include_nan: bool,
    pub name: String,
}

impl Default for MicrosaccadeParameters {
    fn default() -> Self {
        Self {
            threshold: Threshold::default(),
            threshold_factor: 6.0,
            minimum_threshold: 1e-10,
            minimum_duration: 6,
            include_nan: false,
            name: "saccade".to_owned(),
        }
    }
}

/// Detects microsaccades as runs of samples whose velocity lies outside the ellipse with radii
/// `threshold_factor * sigma`.
#[instrument(skip_all, fields(len = samples.len(), num_events))]
pub fn microsaccades(
    samples: &GazeSamples,
    parameters: &MicrosaccadeParameters,
) -> Result<Vec<Event>, DetectionError> {
    if !(parameters.threshold_factor > 0.0) {
        return Err(
            ValidationError::not_positive("threshold_factor", parameters.threshold_factor).into(),
        );
    }
    if parameters.minimum_duration == 0 {
        return Err(ValidationError::not_positive("minimum_duration", 0).into());
    }
    let velocities = samples.require_velocities("microsaccades")?;
    let sigma = parameters
        .threshold
        .sigma(velocities, parameters.minimum_threshold)?;
    let radius = sigma.map(|sigma| sigma * parameters.threshold_factor);
    debug!("Threshold radius {radius:?}");

    let events = velocity_events(
        samples,
        velocities,
        |velocity| (velocity[0] / radius[0]).powi(2) + (velocity[1] / radius[1]).powi(2) > 1.0,
        parameters.minimum_duration,
        parameters.include_nan,
        &parameters.name,
    );
    tracing::Span::current().record("num_events", events.len());
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::DataQualityError, event_detection::threshold::SigmaMethod};

    /// Alternating noise of amplitude 1 with two bursts of 10 fast samples.
    fn noisy_velocities() -> Vec<[Real; 2]> {
        (0..100)
            .map(|index| {
                let noise = if index % 2 == 0 { 1.0 } else { -1.0 };
                match index {
                    20..30 => [50.0, 0.0],
                    70..80 => [0.0, -50.0],
                    _ => [noise, -noise],
                }
            })
            .collect()
    }

    fn with_velocities(velocities: &[[Real; 2]]) -> GazeSamples {
        GazeSamples::from_rows(&vec![[0.0, 0.0]; velocities.len()])
            .with_velocity_rows(velocities)
            .unwrap()
    }

    fn bounds(events: &[Event]) -> Vec<(i64, i64)> {
        events.iter().map(|event| (event.onset, event.offset)).collect()
    }

    #[test]
    fn bursts_are_detected_with_adaptive_threshold() {
        let samples = with_velocities(&noisy_velocities());
        let events = microsaccades(&samples, &MicrosaccadeParameters::default()).unwrap();
        assert_eq!(bounds(&events), vec![(20, 29), (70, 79)]);
    }

    #[test]
    fn explicit_threshold() {
        let samples = with_velocities(&noisy_velocities());
        let parameters = MicrosaccadeParameters {
            threshold: Threshold::Explicit([10.0, 10.0]),
            threshold_factor: 1.0,
            minimum_duration: 1,
            ..Default::default()
        };
        let events = microsaccades(&samples, &parameters).unwrap();
        assert_eq!(bounds(&events), vec![(20, 29), (70, 79)]);

        // Only the vertical burst leaves an ellipse which is wide along x.
        let parameters = MicrosaccadeParameters {
            threshold: Threshold::Explicit([60.0, 10.0]),
            ..parameters
        };
        let events = microsaccades(&samples, &parameters).unwrap();
        assert_eq!(bounds(&events), vec![(70, 79)]);
    }

    #[test]
    fn every_sigma_method_finds_the_bursts() {
        let samples = with_velocities(&noisy_velocities());
        for method in [
            SigmaMethod::Std,
            SigmaMethod::Mad,
            SigmaMethod::Engbert2003,
            SigmaMethod::Engbert2015,
        ] {
            let parameters = MicrosaccadeParameters {
                threshold: Threshold::Adaptive(method),
                threshold_factor: 3.0,
                ..Default::default()
            };
            let events = microsaccades(&samples, &parameters).unwrap();
            assert_eq!(bounds(&events), vec![(20, 29), (70, 79)], "{method}");
        }
    }

    #[test]
    fn constant_velocities_are_degenerate() {
        let samples = with_velocities(&[[1.0, 1.0]; 50]);
        let result = microsaccades(&samples, &MicrosaccadeParameters::default());
        let error = result.unwrap_err();
        assert!(error.is_data_quality());
        assert!(matches!(
            error,
            DetectionError::DataQuality(DataQualityError::DegenerateVariance { .. })
        ));
    }

    #[test]
    fn all_missing_yields_no_events() {
        let samples = with_velocities(&[[Real::NAN; 2]; 50]);
        let events = microsaccades(&samples, &MicrosaccadeParameters::default()).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn threshold_factor_must_be_positive() {
        let samples = with_velocities(&noisy_velocities());
        let parameters = MicrosaccadeParameters {
            threshold_factor: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            microsaccades(&samples, &parameters),
            Err(DetectionError::Validation(ValidationError::NotPositive {
                name: "threshold_factor",
                ..
            }))
        ));
    }
}
