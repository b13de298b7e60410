//! Provides the event iterator and the trait for converting indexed sample iterators into
//! event iterators.
use crate::event_detection::Detector;
use tracing::trace;

/// Applies a detector to a source iterator.
#[derive(Clone)]
pub(crate) struct EventIter<I, D>
where
    I: Iterator<Item = (usize, D::Input)>,
    D: Detector,
{
    /// The indexed samples to apply the detector to.
    source: I,
    /// The detector to apply.
    detector: D,
}

impl<I, D> Iterator for EventIter<I, D>
where
    I: Iterator<Item = (usize, D::Input)>,
    D: Detector,
{
    type Item = D::Output;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.source.next() {
                Some((index, value)) => {
                    if let Some(event) = self.detector.signal(index, value) {
                        trace!("Event found {event:?}");
                        return Some(event);
                    }
                }
                None => {
                    return self.detector.finish();
                }
            }
        }
    }
}

/// Implemented for any iterator which supports the `events` method.
pub(crate) trait EventFilter<I, D>
where
    I: Iterator<Item = (usize, D::Input)>,
    D: Detector,
{
    fn events(self, detector: D) -> EventIter<I, D>;
}

impl<I, D> EventFilter<I, D> for I
where
    I: Iterator<Item = (usize, D::Input)>,
    D: Detector,
{
    /// Create an [EventIter] iterator, which applies a detector to the samples as they are
    /// consumed.
    ///
    /// # Parameters
    /// - detector: A detector which is to be applied as the iterator is consumed.
    fn events(self, detector: D) -> EventIter<I, D> {
        EventIter {
            source: self,
            detector,
        }
    }
}
