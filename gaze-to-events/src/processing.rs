//! Provides functions which detect the events of each trial of a recording using the specified
//! detector and settings.
use crate::parameters::{DetectorParameters, DetectorSettings, PositionSettings, VelocitySettings};
use gaze_events_common::{
    TrialKey,
    recording::{Recording, TrialRecording},
};
use gaze_to_events::{
    DetectionError, ValidationError,
    event_detection::{
        Event, GazeSamples, TrialEvent,
        detectors::{fill, fill::UNCLASSIFIED, idt, ivt, microsaccades},
    },
    properties::TrialGaze,
};
use rayon::prelude::*;
use tracing::{instrument, warn};

/// The events detected in one trial, together with the samples they were detected in.
#[derive(Debug)]
pub(crate) struct TrialDetection {
    pub(crate) gaze: TrialGaze,
    pub(crate) events: Vec<Event>,
}

impl TrialDetection {
    pub(crate) fn trial_events(&self) -> impl Iterator<Item = TrialEvent> + '_ {
        self.events.iter().map(|event| TrialEvent {
            trial: self.gaze.trial.clone(),
            event: event.clone(),
        })
    }
}

/// Identifies a trial by its recorded key, or by its position in the recording if it has none.
fn trial_key(index: usize, trial: &TrialRecording) -> TrialKey {
    if trial.trial.is_empty() {
        TrialKey::from([("trial".to_owned(), index.to_string())])
    } else {
        trial.trial.clone()
    }
}

/// Builds the samples of a trial.
///
/// The positions are transformed first, so derived velocities are in the transformed units.
/// Recorded velocities are used as they are, unless velocities are required and
/// [VelocitySettings::always_derive] is set, in which case they are derived from the positions.
fn trial_samples(
    trial: &TrialRecording,
    positions: &PositionSettings,
    velocities: Option<&VelocitySettings>,
) -> Result<GazeSamples, ValidationError> {
    let mut samples = GazeSamples::from_rows(&trial.positions());
    if let Some(time) = &trial.time {
        samples = samples.with_timesteps(time.clone())?;
    }
    if let Some(screen) = &positions.screen {
        samples = samples.with_positions_in_degrees(screen)?;
    }
    if let Some(smoothing) = &positions.smoothing {
        samples = samples.with_smoothed_positions(smoothing)?;
    }
    match (velocities, trial.velocities()) {
        (Some(settings), Some(recorded)) if !settings.always_derive => {
            samples.with_velocity_rows(&recorded)
        }
        (Some(settings), _) => {
            samples.with_derived_velocities(settings.sampling_rate, &settings.method)
        }
        (None, Some(recorded)) => samples.with_velocity_rows(&recorded),
        (None, None) => Ok(samples),
    }
}

/// Detects the events of a single trial.
/// # Parameters
/// - trial: the identifiers of the trial.
/// - recording: the samples of the trial.
/// - settings: the detector and its parameters.
#[instrument(skip_all, fields(trial = ?trial, len = recording.position.len(), num_events))]
fn find_trial_events(
    trial: TrialKey,
    recording: &TrialRecording,
    settings: &DetectorSettings,
) -> Result<TrialDetection, DetectionError> {
    let samples = trial_samples(recording, &settings.positions, settings.velocities.as_ref())?;
    let mut events = match &settings.detector {
        DetectorParameters::Idt(parameters) => idt(&samples, parameters)?,
        DetectorParameters::Ivt(parameters) => ivt(&samples, parameters)?,
        DetectorParameters::Microsaccades(parameters) => microsaccades(&samples, parameters)?,
    };
    if let Some(minimum_duration) = settings.fill {
        let gaps = fill(&samples, &events, minimum_duration, UNCLASSIFIED);
        events.extend(gaps);
        events.sort_by_key(|event| event.onset);
    }
    tracing::Span::current().record("num_events", events.len());
    Ok(TrialDetection {
        gaze: TrialGaze { trial, samples },
        events,
    })
}

/// Returns the names of the identifiers present in every trial.
pub(crate) fn shared_identifiers(detections: &[TrialDetection]) -> Vec<String> {
    let Some((first, rest)) = detections.split_first() else {
        return Vec::new();
    };
    first
        .gaze
        .trial
        .keys()
        .filter(|identifier| {
            rest.iter()
                .all(|detection| detection.gaze.trial.contains_key(*identifier))
        })
        .cloned()
        .collect()
}

/// Runs the detector over all trials of the recording in parallel.
///
/// The detections are returned in the order of the trials. A trial violating a precondition of
/// the detector is skipped with a warning, whereas invalid parameters or samples abort the run.
#[instrument(skip_all, fields(num_trials = recording.trials.len(), num_skipped))]
pub(crate) fn process(
    recording: &Recording,
    settings: &DetectorSettings,
) -> Result<Vec<TrialDetection>, ValidationError> {
    let detections: Vec<Option<TrialDetection>> = recording
        .trials
        .par_iter()
        .enumerate()
        .map(|(index, trial)| {
            match find_trial_events(trial_key(index, trial), trial, settings) {
                Ok(detection) => Ok(Some(detection)),
                Err(DetectionError::DataQuality(error)) => {
                    warn!("Skipping trial {index}: {error}");
                    Ok(None)
                }
                Err(DetectionError::Validation(error)) => Err(error),
            }
        })
        .collect::<Result<_, ValidationError>>()?;
    let num_skipped = detections.iter().filter(|detection| detection.is_none()).count();
    tracing::Span::current().record("num_skipped", num_skipped);
    Ok(detections.into_iter().flatten().collect())
}
