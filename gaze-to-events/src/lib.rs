//! # Gaze to Events
//!
//! Detection of oculomotor events in eye tracking recordings.
//!
//! * [event_detection] derives velocities from positions, and finds fixations (I-DT),
//!   saccades (I-VT) and microsaccades in a series of [GazeSamples](event_detection::GazeSamples).
//! * [properties] joins the detected events with the samples of their trials and computes
//!   properties such as duration, dispersion or peak velocity.
//!
//! Missing samples are represented by `NaN` throughout.
pub mod error;
pub mod event_detection;
pub mod properties;

pub use error::{DataQualityError, DetectionError, ValidationError};
