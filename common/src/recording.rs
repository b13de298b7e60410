//! Serialisable gaze recordings.
//!
//! Missing samples are written as `null` components, since JSON has no representation of `NaN`.
//! In memory they are converted to `NaN`, which is how the detectors represent missing data.
use crate::{Real, Time, TrialKey};
use serde::{Deserialize, Serialize};

/// A single two-component sample as stored on disk.
pub type StoredSample = [Option<Real>; 2];

/// A gaze recording split into trials.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Recording {
    /// Number of samples per second, used to differentiate positions into velocities.
    pub sampling_rate: Real,
    pub trials: Vec<TrialRecording>,
}

/// The samples of one trial.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TrialRecording {
    #[serde(default)]
    pub trial: TrialKey,
    /// Timesteps of the samples. If absent, samples are numbered from zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Vec<Time>>,
    pub position: Vec<StoredSample>,
    /// Precomputed velocities, if the source provides them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<Vec<StoredSample>>,
}

impl TrialRecording {
    pub fn positions(&self) -> Vec<[Real; 2]> {
        self.position.iter().copied().map(decode_sample).collect()
    }

    pub fn velocities(&self) -> Option<Vec<[Real; 2]>> {
        self.velocity
            .as_ref()
            .map(|velocity| velocity.iter().copied().map(decode_sample).collect())
    }
}

/// Converts a stored sample into its in-memory form, mapping missing components to `NaN`.
pub fn decode_sample(sample: StoredSample) -> [Real; 2] {
    sample.map(|component| component.unwrap_or(Real::NAN))
}

/// Converts an in-memory sample into its stored form, mapping `NaN` components to `None`.
pub fn encode_sample(sample: [Real; 2]) -> StoredSample {
    sample.map(|component| (!component.is_nan()).then_some(component))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_components_round_trip_through_nan() {
        let stored = [Some(1.5), None];
        let decoded = decode_sample(stored);
        assert_eq!(decoded[0], 1.5);
        assert!(decoded[1].is_nan());
        assert_eq!(encode_sample(decoded), stored);
    }

    #[test]
    fn deserialize_trial_without_time_or_velocity() {
        let json = r#"{
            "sampling-rate": 1000.0,
            "trials": [
                { "trial": { "subject": "1" }, "position": [[0.0, 0.0], [null, 1.0]] }
            ]
        }"#;
        let recording: Recording = serde_json::from_str(json).unwrap();
        assert_eq!(recording.sampling_rate, 1000.0);
        let trial = &recording.trials[0];
        assert_eq!(trial.trial.get("subject").map(String::as_str), Some("1"));
        assert!(trial.time.is_none());
        assert!(trial.velocities().is_none());
        assert!(trial.positions()[1][0].is_nan());
    }
}
