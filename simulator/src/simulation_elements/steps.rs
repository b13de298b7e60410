//! Piecewise constant gaze positions.
use gaze_events_common::Real;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub(crate) enum StepError {
    #[error("Steps must be sorted in ascending order, but step {index} is before its predecessor")]
    Unsorted { index: usize },
}

/// From `index` on, the position is `value`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct Step {
    pub(crate) index: usize,
    pub(crate) value: [Real; 2],
}

/// Creates `length` positions, starting at `start_value` and jumping to the value of each step
/// at its index. Steps beyond `length` have no effect.
pub(crate) fn step_function(
    length: usize,
    steps: &[Step],
    start_value: [Real; 2],
) -> Result<Vec<[Real; 2]>, StepError> {
    if let Some(index) = steps
        .windows(2)
        .position(|pair| pair[1].index < pair[0].index)
    {
        return Err(StepError::Unsorted { index: index + 1 });
    }
    let mut positions = vec![start_value; length];
    for step in steps {
        if let Some(tail) = positions.get_mut(step.index..) {
            tail.fill(step.value);
        }
    }
    Ok(positions)
}
