//! The run detection shared by the velocity threshold detectors.
use super::runs::{Run, RunDetector};
use crate::event_detection::{
    Event, EventFilter, GazeSamples, Real, SaccadeKinematics, datatype::has_nan,
    statistics::nan_max,
};
use ndarray::{ArrayView1, ArrayView2, s};

/// Detects runs of samples whose velocity passes `exceeds`.
///
/// With `include_nan`, samples with missing velocity join the runs, but never begin or end
/// one. Runs shorter than `minimum_duration` samples are discarded.
pub(super) fn velocity_events(
    samples: &GazeSamples,
    velocities: ArrayView2<Real>,
    exceeds: impl Fn(ArrayView1<Real>) -> bool,
    minimum_duration: usize,
    include_nan: bool,
    name: &str,
) -> Vec<Event> {
    let missing = |index: usize| has_nan(velocities.row(index));
    velocities
        .rows()
        .into_iter()
        .map(|velocity| exceeds(velocity) || (include_nan && has_nan(velocity)))
        .enumerate()
        .events(RunDetector::default())
        .filter_map(|run| if include_nan { run.trim(&missing) } else { Some(run) })
        .filter(|run| run.len() >= minimum_duration)
        .map(|run| {
            Event::new(name, samples.timesteps()[run.start], samples.timesteps()[run.end])
                .with_kinematics(kinematics(samples.positions(), velocities, run))
        })
        .collect()
}

fn kinematics(
    positions: ArrayView2<Real>,
    velocities: ArrayView2<Real>,
    run: Run,
) -> SaccadeKinematics {
    let range = run.start..=run.end;
    let peak_velocity = nan_max(
        velocities
            .slice(s![range.clone(), ..])
            .rows()
            .into_iter()
            .map(|velocity| velocity[0].hypot(velocity[1])),
    );
    let positions = positions.slice(s![range, ..]);
    let first = positions.row(0);
    let last = positions.row(run.len() - 1);
    SaccadeKinematics {
        peak_velocity,
        displacement: [last[0] - first[0], last[1] - first[1]],
        amplitude: [
            signed_amplitude(positions.column(0)),
            signed_amplitude(positions.column(1)),
        ],
    }
}

/// `max - min` of the values, negative if the first minimum comes after the first maximum.
fn signed_amplitude(values: ArrayView1<Real>) -> Real {
    let (Some((min_index, min)), Some((max_index, max))) = (
        first_extremum(values, |value, best| value < best),
        first_extremum(values, |value, best| value > best),
    ) else {
        return Real::NAN;
    };
    (max_index as Real - min_index as Real).signum() * (max - min)
}

fn first_extremum(
    values: ArrayView1<Real>,
    improves: impl Fn(Real, Real) -> bool,
) -> Option<(usize, Real)> {
    values
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, value)| !value.is_nan())
        .fold(None, |best, (index, value)| match best {
            Some((_, best_value)) if !improves(value, best_value) => best,
            _ => Some((index, value)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn amplitude_sign_follows_direction() {
        assert_eq!(signed_amplitude(array![0.0, 1.0, 3.0].view()), 3.0);
        assert_eq!(signed_amplitude(array![3.0, 1.0, 0.0].view()), -3.0);
        assert_eq!(signed_amplitude(array![1.0, 1.0, 1.0].view()), 0.0);
        assert_eq!(signed_amplitude(array![Real::NAN, 2.0, 0.0].view()), -2.0);
        assert!(signed_amplitude(array![Real::NAN, Real::NAN].view()).is_nan());
    }

    #[test]
    fn ties_resolve_to_first_occurrence() {
        // The first maximum precedes the minimum.
        assert_eq!(signed_amplitude(array![2.0, 0.0, 2.0].view()), -2.0);
    }

    #[test]
    fn kinematics_of_run() {
        let positions = array![[0.0, 0.0], [1.0, 0.0], [3.0, -1.0], [4.0, -2.0], [4.0, -2.0]];
        let velocities = array![[0.0, 0.0], [1.0, 0.0], [3.0, -4.0], [1.0, -1.0], [0.0, 0.0]];
        let kinematics = kinematics(positions.view(), velocities.view(), Run::new(1, 3));
        assert_eq!(kinematics.peak_velocity, 5.0);
        assert_eq!(kinematics.displacement, [3.0, -2.0]);
        assert_eq!(kinematics.amplitude, [3.0, -2.0]);
    }
}
