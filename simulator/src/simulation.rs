use crate::simulation_elements::{
    Interval, JsonValueError, Noise, NoiseSource, NumConstant, Step, StepError, step_function,
};
use gaze_events_common::{
    Real, Time, TrialKey,
    recording::{Recording, TrialRecording, encode_sample},
};
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

///
/// This struct is created from the configuration JSON file.
///
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct Simulation {
    /// Number of samples per second, stored with the recording.
    pub(crate) sampling_rate: NumConstant<Real>,
    /// Interval between the timesteps of consecutive samples.
    #[serde(default = "unit_timestep")]
    pub(crate) timestep: Time,
    pub(crate) trials: Vec<TrialTemplate>,
}

fn unit_timestep() -> Time {
    1
}

fn single() -> usize {
    1
}

/// Describes one or more trials sharing the same positions, up to noise.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct TrialTemplate {
    #[serde(default)]
    pub(crate) trial: TrialKey,
    pub(crate) length: usize,
    #[serde(default)]
    pub(crate) start_value: [Real; 2],
    /// Must be sorted by index.
    #[serde(default)]
    pub(crate) steps: Vec<Step>,
    /// Inclusive index intervals of samples whose position is missing.
    #[serde(default)]
    pub(crate) missing: Vec<Interval<usize>>,
    /// Added independently to each axis.
    pub(crate) noise: Option<NoiseSource>,
    /// Number of trials generated from this template. If greater than one, the trials are told
    /// apart by a `repetition` identifier.
    #[serde(default = "single")]
    pub(crate) repeat: usize,
}

#[derive(Debug, Error)]
pub(crate) enum SimulationError {
    #[error("Json value error: {0}")]
    JsonValue(#[from] JsonValueError),
    #[error("Invalid steps in trial template {template}: {source}")]
    Step { template: usize, source: StepError },
    #[error("Timestep must be positive but is {0}")]
    NonPositiveTimestep(Time),
}

impl Simulation {
    #[instrument(skip_all, fields(num_templates = self.trials.len(), num_trials))]
    pub(crate) fn generate<R: Rng>(&self, rng: &mut R) -> Result<Recording, SimulationError> {
        if self.timestep <= 0 {
            return Err(SimulationError::NonPositiveTimestep(self.timestep));
        }
        let mut trials = Vec::new();
        for (index, template) in self.trials.iter().enumerate() {
            for repetition in 0..template.repeat {
                trials.push(template.generate(index, repetition, self.timestep, rng)?);
            }
        }
        tracing::Span::current().record("num_trials", trials.len());
        Ok(Recording {
            sampling_rate: self.sampling_rate.value()?,
            trials,
        })
    }
}

impl TrialTemplate {
    fn key(&self, repetition: usize) -> TrialKey {
        let mut key = self.trial.clone();
        if self.repeat > 1 {
            key.insert("repetition".to_owned(), repetition.to_string());
        }
        key
    }

    #[instrument(skip_all, level = "debug", fields(template = index, repetition = repetition))]
    fn generate<R: Rng>(
        &self,
        index: usize,
        repetition: usize,
        timestep: Time,
        rng: &mut R,
    ) -> Result<TrialRecording, SimulationError> {
        let mut positions = step_function(self.length, &self.steps, self.start_value)
            .map_err(|source| SimulationError::Step {
                template: index,
                source,
            })?;
        if let Some(source) = &self.noise {
            let mut noise = [Noise::new(source), Noise::new(source)];
            for position in &mut positions {
                for (component, noise) in position.iter_mut().zip(&mut noise) {
                    *component = noise.noisify(*component, rng)?;
                }
            }
        }
        for interval in &self.missing {
            positions
                .iter_mut()
                .enumerate()
                .filter(|(sample, _)| interval.is_in(*sample))
                .for_each(|(_, position)| *position = [Real::NAN; 2]);
        }
        Ok(TrialRecording {
            trial: self.key(repetition),
            time: Some((0..self.length as Time).map(|sample| sample * timestep).collect()),
            position: positions.into_iter().map(encode_sample).collect(),
            velocity: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    const CONFIG: &str = r#"{
        "sampling-rate": { "const": 500.0 },
        "timestep": 2,
        "trials": [
            {
                "trial": { "subject": "1" },
                "length": 10,
                "start-value": [0.0, 0.0],
                "steps": [{ "index": 5, "value": [3.0, 3.0] }],
                "missing": [{ "min": 2, "max": 3 }],
                "repeat": 2
            },
            {
                "trial": { "subject": "2" },
                "length": 50,
                "noise": {
                    "attributes": { "noise-type": "gaussian", "mean": { "const": 0.0 }, "sd": { "const": 0.1 } },
                    "smoothing-window-length": { "const": 4 }
                }
            }
        ]
    }"#;

    fn simulation() -> Simulation {
        serde_json::from_str(CONFIG).unwrap()
    }

    #[test]
    fn trials_follow_their_templates() {
        let recording = simulation().generate(&mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(recording.sampling_rate, 500.0);
        assert_eq!(recording.trials.len(), 3);

        let first = &recording.trials[0];
        assert_eq!(first.trial["subject"], "1");
        assert_eq!(first.trial["repetition"], "0");
        assert_eq!(recording.trials[1].trial["repetition"], "1");
        assert_eq!(first.time.as_deref(), Some(&[0, 2, 4, 6, 8, 10, 12, 14, 16, 18][..]));
        assert_eq!(first.position[1], [Some(0.0), Some(0.0)]);
        assert_eq!(first.position[2], [None, None]);
        assert_eq!(first.position[3], [None, None]);
        assert_eq!(first.position[5], [Some(3.0), Some(3.0)]);

        let noisy = &recording.trials[2];
        assert!(!noisy.trial.contains_key("repetition"));
        assert_eq!(noisy.position.len(), 50);
        assert!(noisy.position.iter().any(|position| position[0] != Some(0.0)));
    }

    #[test]
    fn seeded_generation_is_repeatable() {
        let simulation = simulation();
        let first = simulation.generate(&mut StdRng::seed_from_u64(42)).unwrap();
        let second = simulation.generate(&mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn invalid_configurations() {
        let mut zero_timestep = simulation();
        zero_timestep.timestep = 0;
        assert!(matches!(
            zero_timestep.generate(&mut StdRng::seed_from_u64(1)),
            Err(SimulationError::NonPositiveTimestep(0))
        ));

        let mut unsorted = simulation();
        unsorted.trials[1].steps = vec![
            Step {
                index: 4,
                value: [1.0, 1.0],
            },
            Step {
                index: 1,
                value: [2.0, 2.0],
            },
        ];
        assert!(matches!(
            unsorted.generate(&mut StdRng::seed_from_u64(1)),
            Err(SimulationError::Step {
                template: 1,
                source: StepError::Unsorted { index: 1 }
            })
        ));
    }
}
