//! Detectors turn gaze samples into events.
//!
//! Velocity based detectors share a streaming [Detector], applied by [EventIter] iterators to
//! a stream of per-sample decisions.
//!
//! [EventIter]: super::iterators::event::EventIter
pub mod fill;
pub mod idt;
pub mod ivt;
pub mod microsaccades;
mod runs;
mod velocity;

pub use fill::fill;
pub use idt::{IdtParameters, idt};
pub use ivt::{IvtParameters, ivt};
pub use microsaccades::{MicrosaccadeParameters, microsaccades};

use std::fmt::Debug;

/// Implement for detectors, which take in indexed sample values and output events.
pub(crate) trait Detector: Default + Clone {
    /// Per-sample input.
    type Input;
    /// Detected event.
    type Output: Debug;

    /// Takes in the value of the sample at `index` and possibly outputs an event.
    fn signal(&mut self, index: usize, value: Self::Input) -> Option<Self::Output>;

    /// Call when the samples are exhausted. If an event is in progress, it is dispatched.
    fn finish(&mut self) -> Option<Self::Output>;
}
