//! Merges consecutive flagged samples into runs.
use super::Detector;
use crate::event_detection::EventFilter;

/// An inclusive range of sample indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Run {
    pub(crate) start: usize,
    pub(crate) end: usize,
}

impl Run {
    pub(crate) fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub(crate) fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Shrinks the run to its first and last samples which are not `missing`.
    pub(crate) fn trim(self, missing: impl Fn(usize) -> bool) -> Option<Self> {
        let start = (self.start..=self.end).find(|&index| !missing(index))?;
        let end = (start..=self.end).rev().find(|&index| !missing(index))?;
        Some(Self::new(start, end))
    }

    /// Splits the run into the maximal sub-runs of samples which are not `missing`.
    pub(crate) fn split(self, missing: impl Fn(usize) -> bool) -> Vec<Self> {
        (self.start..=self.end)
            .map(|index| (index, !missing(index)))
            .events(RunDetector::default())
            .collect()
    }
}

/// Emits a [Run] for each maximal sequence of consecutive `true` inputs.
#[derive(Default, Clone)]
pub(crate) struct RunDetector {
    current: Option<Run>,
}

impl Detector for RunDetector {
    type Input = bool;
    type Output = Run;

    fn signal(&mut self, index: usize, flagged: bool) -> Option<Run> {
        if !flagged {
            return self.current.take();
        }
        match self.current.as_mut() {
            Some(run) if run.end + 1 == index => {
                run.end = index;
                None
            }
            _ => self.current.replace(Run::new(index, index)),
        }
    }

    fn finish(&mut self) -> Option<Run> {
        self.current.take()
    }
}
