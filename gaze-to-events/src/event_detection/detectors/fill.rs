//! Classifies the samples not covered by any event.
use super::runs::RunDetector;
use crate::event_detection::{Event, EventFilter, GazeSamples, Time};

/// Name given to the gaps between events.
pub const UNCLASSIFIED: &str = "unclassified";

/// Returns an event for each gap between the given events.
///
/// A sample is covered by an event if its timestep lies within `[onset, offset]`. Gaps
/// spanning less than `minimum_duration` timesteps from their first to their last sample are
/// dropped.
pub fn fill(
    samples: &GazeSamples,
    events: &[Event],
    minimum_duration: Time,
    name: &str,
) -> Vec<Event> {
    let mut covered = vec![false; samples.len()];
    for range in events
        .iter()
        .filter_map(|event| samples.index_range(event.onset, event.offset))
    {
        covered[range].fill(true);
    }
    let timesteps = samples.timesteps();
    covered
        .into_iter()
        .map(|covered| !covered)
        .enumerate()
        .events(RunDetector::default())
        .map(|run| (timesteps[run.start], timesteps[run.end]))
        .filter(|(onset, offset)| offset - onset >= minimum_duration)
        .map(|(onset, offset)| Event::new(name, onset, offset))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(events: &[Event]) -> Vec<(Time, Time)> {
        events.iter().map(|event| (event.onset, event.offset)).collect()
    }

    #[test]
    fn gaps_between_events() {
        let samples = GazeSamples::from_rows(&[[0.0, 0.0]; 100]);
        let events = [Event::new("fixation", 10, 39), Event::new("saccade", 50, 59)];
        let filled = fill(&samples, &events, 0, UNCLASSIFIED);
        assert_eq!(bounds(&filled), vec![(0, 9), (40, 49), (60, 99)]);
        assert!(filled.iter().all(|event| event.name == UNCLASSIFIED));
    }

    #[test]
    fn short_gaps_are_dropped() {
        let samples = GazeSamples::from_rows(&[[0.0, 0.0]; 20]);
        let events = [Event::new("fixation", 2, 9), Event::new("fixation", 11, 19)];
        assert_eq!(bounds(&fill(&samples, &events, 1, UNCLASSIFIED)), vec![(0, 1)]);
    }

    #[test]
    fn fully_covered_yields_nothing() {
        let samples = GazeSamples::from_rows(&[[0.0, 0.0]; 20]);
        let events = [Event::new("fixation", 0, 19)];
        assert!(fill(&samples, &events, 0, UNCLASSIFIED).is_empty());
    }

    #[test]
    fn timestep_units() {
        let samples = GazeSamples::from_rows(&[[0.0, 0.0]; 10])
            .with_timesteps((0..50).step_by(5).collect())
            .unwrap();
        let events = [Event::new("fixation", 10, 30)];
        assert_eq!(
            bounds(&fill(&samples, &events, 5, UNCLASSIFIED)),
            vec![(0, 5), (35, 45)]
        );
    }
}
