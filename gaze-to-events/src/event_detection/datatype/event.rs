//! Events are the output of the detectors.
use super::super::{Real, Time};
use gaze_events_common::TrialKey;
use serde::{Deserialize, Serialize};

/// A detected event, bounded by the timesteps of its first and last sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Category of the event, e.g. `fixation` or `saccade`.
    pub name: String,
    pub onset: Time,
    pub offset: Time,
    /// Only set by the velocity based detectors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kinematics: Option<SaccadeKinematics>,
}

impl Event {
    pub fn new(name: impl Into<String>, onset: Time, offset: Time) -> Self {
        Self {
            name: name.into(),
            onset,
            offset,
            kinematics: None,
        }
    }

    pub(crate) fn with_kinematics(self, kinematics: SaccadeKinematics) -> Self {
        Self {
            kinematics: Some(kinematics),
            ..self
        }
    }

    pub fn duration(&self) -> Time {
        self.offset - self.onset
    }
}

/// Summary of the movement during a saccade.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SaccadeKinematics {
    /// Maximum velocity magnitude over the saccade's samples.
    pub peak_velocity: Real,
    /// Last position minus first position, per axis.
    pub displacement: [Real; 2],
    /// Range of positions per axis, signed by the direction from the minimum to the maximum.
    pub amplitude: [Real; 2],
}

/// An event together with the trial it was detected in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrialEvent {
    pub trial: TrialKey,
    #[serde(flatten)]
    pub event: Event,
}
