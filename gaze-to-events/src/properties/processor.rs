//! Joins events with the gaze samples of their trials and computes event properties.
use super::{EventProperty, PropertyValue};
use crate::{
    error::ValidationError,
    event_detection::{GazeSamples, Time, TrialEvent},
};
use gaze_events_common::TrialKey;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument};

/// The gaze samples of one trial.
#[derive(Clone, Debug, PartialEq)]
pub struct TrialGaze {
    pub trial: TrialKey,
    pub samples: GazeSamples,
}

/// The requested properties of one event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    /// The identifiers the events and gaze were joined on.
    pub trial: TrialKey,
    pub name: String,
    pub onset: Time,
    pub offset: Time,
    pub properties: BTreeMap<String, PropertyValue>,
}

/// Computes a fixed list of properties for events.
#[derive(Clone, Debug, PartialEq)]
pub struct EventGazeProcessor {
    properties: Vec<EventProperty>,
}

impl EventGazeProcessor {
    /// Creates a processor from property names, failing on the first unknown name.
    pub fn new<S: AsRef<str>>(properties: &[S]) -> Result<Self, ValidationError> {
        Ok(Self {
            properties: properties
                .iter()
                .map(|property| property.as_ref().parse())
                .collect::<Result<_, _>>()?,
        })
    }

    pub fn from_properties(properties: Vec<EventProperty>) -> Self {
        Self { properties }
    }

    pub fn properties(&self) -> &[EventProperty] {
        &self.properties
    }

    /// Computes the properties of each event from the samples of its trial with timesteps
    /// in `[onset, offset]`.
    ///
    /// Events and gaze trials are joined on the `identifiers`. Only events called `name`
    /// are processed, if given. An event is processed once even if it occurs repeatedly,
    /// and events without samples are omitted.
    #[instrument(skip_all, fields(num_events = events.len(), num_trials = gaze.len()))]
    pub fn process<S: AsRef<str>>(
        &self,
        events: &[TrialEvent],
        gaze: &[TrialGaze],
        identifiers: &[S],
        name: Option<&str>,
    ) -> Result<Vec<EventSummary>, ValidationError> {
        if identifiers.is_empty() {
            return Err(ValidationError::EmptyIdentifiers);
        }
        let identifiers: Vec<&str> = identifiers.iter().map(AsRef::as_ref).collect();

        let mut samples_by_trial = HashMap::new();
        for trial in gaze {
            samples_by_trial
                .entry(project(&trial.trial, &identifiers, "gaze")?)
                .or_insert(&trial.samples);
        }

        let joined: Vec<_> = events
            .iter()
            .map(|event| -> Result<_, ValidationError> {
                Ok((project(&event.trial, &identifiers, "event")?, event))
            })
            .filter_ok(|(key, event)| {
                samples_by_trial.contains_key(key)
                    && name.is_none_or(|name| event.event.name == name)
            })
            .collect::<Result<_, ValidationError>>()?;
        if let (true, Some(name)) = (joined.is_empty(), name) {
            return Err(
                if events.iter().any(|trial_event| trial_event.event.name == name) {
                    ValidationError::NoJoinedEvents(name.to_owned())
                } else {
                    ValidationError::NoMatchingEvents(name.to_owned())
                },
            );
        }

        let mut summaries = Vec::new();
        for (key, trial_event) in joined.into_iter().unique_by(|(key, trial_event)| {
            let event = &trial_event.event;
            (key.clone(), event.name.clone(), event.onset, event.offset)
        }) {
            let Some(samples) = samples_by_trial.get(&key) else {
                continue;
            };
            let event = &trial_event.event;
            let Some(range) = samples.index_range(event.onset, event.offset) else {
                debug!("No samples within event {event:?}");
                continue;
            };
            let properties = self
                .properties
                .iter()
                .map(|property| -> Result<_, ValidationError> {
                    Ok((
                        property.to_string(),
                        property.compute(event, samples, range.clone())?,
                    ))
                })
                .collect::<Result<_, ValidationError>>()?;
            summaries.push(EventSummary {
                trial: identifiers
                    .iter()
                    .zip(key)
                    .map(|(identifier, value)| (identifier.to_string(), value))
                    .collect(),
                name: event.name.clone(),
                onset: event.onset,
                offset: event.offset,
                properties,
            });
        }
        Ok(summaries)
    }
}

/// The values of the identifiers of a trial.
fn project(
    trial: &TrialKey,
    identifiers: &[&str],
    table: &'static str,
) -> Result<Vec<String>, ValidationError> {
    identifiers
        .iter()
        .map(|&identifier| {
            trial
                .get(identifier)
                .cloned()
                .ok_or_else(|| ValidationError::MissingIdentifier {
                    identifier: identifier.to_owned(),
                    table,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_detection::{Event, Real};

    fn key(subject: &str, block: &str) -> TrialKey {
        TrialKey::from([
            ("subject".to_owned(), subject.to_owned()),
            ("block".to_owned(), block.to_owned()),
        ])
    }

    fn trial_event(subject: &str, name: &str, onset: Time, offset: Time) -> TrialEvent {
        TrialEvent {
            trial: key(subject, "1"),
            event: Event::new(name, onset, offset),
        }
    }

    fn gaze() -> Vec<TrialGaze> {
        let ramp: Vec<[Real; 2]> = (0..10).map(|index| [index as Real, 0.0]).collect();
        vec![
            TrialGaze {
                trial: key("a", "1"),
                samples: GazeSamples::from_rows(&ramp),
            },
            TrialGaze {
                trial: key("b", "1"),
                samples: GazeSamples::from_rows(&ramp)
                    .with_timesteps((100..110).collect())
                    .unwrap(),
            },
        ]
    }

    #[test]
    fn properties_per_trial() {
        let processor = EventGazeProcessor::new(&["duration", "dispersion"]).unwrap();
        let events = [
            trial_event("a", "fixation", 0, 4),
            trial_event("b", "fixation", 100, 102),
        ];
        let summaries = processor
            .process(&events, &gaze(), &["subject"], None)
            .unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].trial, TrialKey::from([("subject".to_owned(), "a".to_owned())]));
        assert_eq!(summaries[0].properties["duration"], PropertyValue::Scalar(4.0));
        assert_eq!(summaries[0].properties["dispersion"], PropertyValue::Scalar(4.0));
        assert_eq!(summaries[1].properties["dispersion"], PropertyValue::Scalar(2.0));
    }

    #[test]
    fn duplicates_and_empty_events_are_skipped() {
        let processor = EventGazeProcessor::new(&["duration"]).unwrap();
        let events = [
            trial_event("a", "fixation", 0, 4),
            trial_event("a", "fixation", 0, 4),
            trial_event("a", "fixation", 50, 60),
            trial_event("c", "fixation", 0, 4),
        ];
        let summaries = processor
            .process(&events, &gaze(), &["subject", "block"], None)
            .unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].trial, key("a", "1"));
    }

    #[test]
    fn name_filter() {
        let processor = EventGazeProcessor::new(&["duration"]).unwrap();
        let events = [
            trial_event("a", "fixation", 0, 4),
            trial_event("a", "saccade", 5, 6),
        ];
        let summaries = processor
            .process(&events, &gaze(), &["subject"], Some("saccade"))
            .unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].name, "saccade");

        assert_eq!(
            processor.process(&events, &gaze(), &["subject"], Some("blink")),
            Err(ValidationError::NoMatchingEvents("blink".to_owned()))
        );
    }

    #[test]
    fn unjoined_events_are_not_unknown_names() {
        let processor = EventGazeProcessor::new(&["duration"]).unwrap();
        let events = [trial_event("c", "saccade", 0, 4)];
        assert_eq!(
            processor.process(&events, &gaze(), &["subject"], Some("saccade")),
            Err(ValidationError::NoJoinedEvents("saccade".to_owned()))
        );
        assert_eq!(
            processor.process(&events, &gaze(), &["subject"], Some("fixation")),
            Err(ValidationError::NoMatchingEvents("fixation".to_owned()))
        );
    }

    #[test]
    fn location_mean_and_median_are_reported_separately() {
        let processor = EventGazeProcessor::new(&["location", "location:median"]).unwrap();
        let events = [trial_event("a", "fixation", 0, 3)];
        let summaries = processor
            .process(&events, &gaze(), &["subject"], None)
            .unwrap();
        let properties = &summaries[0].properties;
        assert_eq!(properties.len(), 2);
        assert_eq!(properties["location"], PropertyValue::Vector([1.5, 0.0]));
        assert_eq!(properties["location:median"], PropertyValue::Vector([1.5, 0.0]));
    }

    #[test]
    fn invalid_arguments() {
        assert_eq!(
            EventGazeProcessor::new(&["duration", "velocity"]),
            Err(ValidationError::InvalidProperty {
                name: "velocity".to_owned(),
                valid: "amplitude, dispersion, disposition, duration, location, peak_velocity"
                    .to_owned()
            })
        );
        let processor = EventGazeProcessor::new(&["duration"]).unwrap();
        let events = [trial_event("a", "fixation", 0, 4)];
        let no_identifiers: [&str; 0] = [];
        assert_eq!(
            processor.process(&events, &gaze(), &no_identifiers, None),
            Err(ValidationError::EmptyIdentifiers)
        );
        assert_eq!(
            processor.process(&events, &gaze(), &["session"], None),
            Err(ValidationError::MissingIdentifier {
                identifier: "session".to_owned(),
                table: "gaze"
            })
        );
    }

    #[test]
    fn no_events_is_not_an_error() {
        let processor = EventGazeProcessor::new(&["duration"]).unwrap();
        assert!(
            processor
                .process(&[], &gaze(), &["subject"], None)
                .unwrap()
                .is_empty()
        );
    }
}
