//! Types and utilities shared by the gaze event components.
//!
//! * [recording] defines the on-disk format of gaze recordings, as produced by the simulator
//!   and consumed by `gaze-to-events`.
//! * [tracer] installs the tracing subscriber used by every binary.
pub mod recording;
pub mod tracer;

pub use const_format;
pub use git_version;

/// Scalar type of all positional, velocity and threshold values.
pub type Real = f64;

/// Timestep type. Recordings carry integer timestamps, usually milliseconds.
pub type Time = i64;

/// Identifies a trial by its identifier columns, e.g. `{"subject": "3", "session": "b"}`.
pub type TrialKey = std::collections::BTreeMap<String, String>;

/// Expands to the crate version, followed by the git revision it was built from.
#[macro_export]
macro_rules! version {
    () => {
        $crate::const_format::concatcp!(
            env!("CARGO_PKG_VERSION"),
            " (",
            $crate::git_version::git_version!(
                args = ["--tags", "--always", "--dirty"],
                fallback = "unknown"
            ),
            ")"
        )
    };
}
