//! Dispersion threshold identification (I-DT) of fixations.
//!
//! A window of at least the minimum duration slides over the samples. Whenever the
//! dispersion of the window is within the threshold, the window is grown for as long as the
//! dispersion stays strictly below the threshold, and the grown window becomes a fixation.
//! Otherwise the window start advances by one sample.
use super::runs::Run;
use crate::{
    error::{DataQualityError, DetectionError, ValidationError},
    event_detection::{Event, GazeSamples, Real, Time, datatype::has_nan, statistics::Extent},
};
use itertools::Itertools;
use ndarray::ArrayView2;
use tracing::instrument;

#[derive(Clone, Debug, PartialEq)]
pub struct IdtParameters {
    /// The largest dispersion, in units of position, of the samples of a fixation.
    pub dispersion_threshold: Real,
    /// The minimum duration of a fixation, in units of timesteps.
    pub minimum_duration: Time,
    /// Whether a fixation may span samples with missing position.
    pub include_nan: bool,
    pub name: String,
}

impl Default for IdtParameters {
    fn default() -> Self {
        Self {
            dispersion_threshold: 1.0,
            minimum_duration: 100,
            include_nan: false,
            name: "fixation".to_owned(),
        }
    }
}

/// Detects fixations by dispersion threshold.
///
/// Requires a constant interval between timesteps which divides `minimum_duration`. Fewer
/// than two samples never form a fixation.
#[instrument(skip_all, fields(len = samples.len(), num_events))]
pub fn idt(
    samples: &GazeSamples,
    parameters: &IdtParameters,
) -> Result<Vec<Event>, DetectionError> {
    if !(parameters.dispersion_threshold > 0.0) {
        return Err(ValidationError::not_positive(
            "dispersion_threshold",
            parameters.dispersion_threshold,
        )
        .into());
    }
    if parameters.minimum_duration <= 0 {
        return Err(
            ValidationError::not_positive("minimum_duration", parameters.minimum_duration).into(),
        );
    }
    let Some(minimum_samples) =
        minimum_sample_duration(samples.timesteps(), parameters.minimum_duration)?
    else {
        return Ok(Vec::new());
    };

    let events: Vec<Event> = fixation_runs(
        samples.positions(),
        parameters.dispersion_threshold,
        minimum_samples,
        parameters.include_nan,
    )
    .into_iter()
    .map(|run| {
        Event::new(
            parameters.name.as_str(),
            samples.timesteps()[run.start],
            samples.timesteps()[run.end],
        )
    })
    .collect();
    tracing::Span::current().record("num_events", events.len());
    Ok(events)
}

/// Converts the minimum duration into a number of samples, or `None` if the timesteps do not
/// define an interval.
fn minimum_sample_duration(
    timesteps: &[Time],
    minimum_duration: Time,
) -> Result<Option<usize>, DataQualityError> {
    let mut intervals = timesteps.iter().tuple_windows().map(|(previous, next)| next - previous);
    let Some(interval) = intervals.next() else {
        return Ok(None);
    };
    if let Some((index, found)) = intervals
        .enumerate()
        .find(|&(_, found)| found != interval)
    {
        return Err(DataQualityError::NonConstantInterval {
            index: index + 2,
            expected: interval,
            found,
        });
    }
    if minimum_duration % interval != 0 {
        return Err(DataQualityError::IndivisibleDuration {
            minimum_duration,
            interval,
        });
    }
    Ok(Some((minimum_duration / interval) as usize))
}

fn sample(positions: ArrayView2<Real>, index: usize) -> [Real; 2] {
    [positions[[index, 0]], positions[[index, 1]]]
}

/// Returns the sample ranges of the fixations.
fn fixation_runs(
    positions: ArrayView2<Real>,
    threshold: Real,
    minimum_samples: usize,
    include_nan: bool,
) -> Vec<Run> {
    let length = positions.nrows();
    let mut runs = Vec::new();
    let mut win_start = 0;
    let mut win_end = minimum_samples;
    while win_start < length && win_end <= length {
        win_end = (win_start + minimum_samples).max(win_end).min(length);
        if win_end - win_start < minimum_samples {
            break;
        }
        let mut extent =
            Extent::from_samples((win_start..win_end).map(|index| sample(positions, index)));
        // A window of missing samples has NaN dispersion and is never accepted.
        if extent.dispersion() <= threshold {
            while extent.dispersion() < threshold && win_end < length {
                extent.push(sample(positions, win_end));
                win_end += 1;
            }
            runs.extend(window_runs(
                positions,
                win_start,
                win_end,
                minimum_samples,
                include_nan,
            ));
            win_start = win_end;
        } else {
            win_start += 1;
        }
    }
    runs
}

/// Splits an accepted window around its missing samples.
///
/// Only the samples before the last one in the window are checked for missing values. If
/// there are any, the last sample is dropped from the fixation.
fn window_runs(
    positions: ArrayView2<Real>,
    win_start: usize,
    win_end: usize,
    minimum_samples: usize,
    include_nan: bool,
) -> Vec<Run> {
    let missing = |index: usize| has_nan(positions.row(index));
    if !(win_start..win_end - 1).any(&missing) {
        return vec![Run::new(win_start, win_end - 1)];
    }
    let Some(run) = Run::new(win_start, win_end - 2).trim(&missing) else {
        return Vec::new();
    };
    let runs = if include_nan {
        vec![run]
    } else {
        run.split(&missing)
    };
    runs.into_iter()
        .filter(|run| run.len() >= minimum_samples)
        .collect()
}
