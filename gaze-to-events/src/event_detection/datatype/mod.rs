//! Provides the data types consumed and produced by the detectors.
mod event;
mod gaze;

pub use event::{Event, SaccadeKinematics, TrialEvent};
pub use gaze::GazeSamples;
pub(crate) use gaze::has_nan;
