//! Defines the parameters used by the various detectors offered by this component.
use clap::{Args, Parser, Subcommand};
use gaze_to_events::{
    ValidationError,
    event_detection::{
        Real, Time,
        detectors::{IdtParameters, IvtParameters, MicrosaccadeParameters},
        differentiation::{DifferentiationMethod, Padding, Pos2VelMethod},
        threshold::{SigmaMethod, Threshold},
        transforms::{Origin, Screen, Smoothing, SmoothingMethod},
    },
};

/// The settings applied to every trial of a recording.
#[derive(Debug)]
pub(crate) struct DetectorSettings {
    /// The detector to run, with its parameters.
    pub(crate) detector: DetectorParameters,
    /// Transforms applied to the positions of each trial before anything else.
    pub(crate) positions: PositionSettings,
    /// How velocities are obtained, or `None` if nothing requires them.
    pub(crate) velocities: Option<VelocitySettings>,
    /// If set, the samples outside all detected events are grouped into unclassified events
    /// spanning at least this many timesteps.
    pub(crate) fill: Option<Time>,
}

/// Transforms of the recorded positions, applied in order.
#[derive(Debug, Default)]
pub(crate) struct PositionSettings {
    /// Converts pixel coordinates to degrees of visual angle.
    pub(crate) screen: Option<Screen>,
    pub(crate) smoothing: Option<Smoothing>,
}

/// Determines how velocities are derived from positions.
#[derive(Debug)]
pub(crate) struct VelocitySettings {
    pub(crate) sampling_rate: Real,
    pub(crate) method: DifferentiationMethod,
    /// Derive velocities even for trials which carry their own.
    pub(crate) always_derive: bool,
}

/// A detector with validated parameters.
#[derive(Debug)]
pub(crate) enum DetectorParameters {
    Idt(IdtParameters),
    Ivt(IvtParameters),
    Microsaccades(MicrosaccadeParameters),
}

impl DetectorParameters {
    /// Returns true if the detector operates on velocities.
    pub(crate) fn requires_velocities(&self) -> bool {
        !matches!(self, Self::Idt(_))
    }
}

/// Options controlling the differentiation of positions into velocities.
#[derive(Debug, Clone, Args)]
pub(crate) struct VelocityOptions {
    /// Number of samples per second. Overrides the sampling rate stored in the recording.
    #[clap(long)]
    pub(crate) sampling_rate: Option<Real>,

    /// Method used to derive velocities: preceding, neighbors, smooth or savitzky_golay.
    #[clap(long, default_value = "smooth")]
    pub(crate) pos2vel_method: Pos2VelMethod,

    /// Number of samples in the Savitzky-Golay window. Must be odd.
    #[clap(long)]
    pub(crate) window_length: Option<usize>,

    /// Degree of the polynomial fitted by the Savitzky-Golay filter.
    #[clap(long)]
    pub(crate) degree: Option<usize>,

    /// Extension of the series beyond its ends for the Savitzky-Golay filter: mirror, nearest,
    /// wrap, none, or a constant value.
    #[clap(long, default_value = "nearest")]
    pub(crate) padding: Padding,

    /// If set, velocities are derived from positions even if the recording provides them.
    #[clap(long)]
    pub(crate) derive_velocities: bool,
}

impl VelocityOptions {
    pub(crate) fn settings(
        &self,
        recorded_sampling_rate: Real,
    ) -> Result<VelocitySettings, ValidationError> {
        Ok(VelocitySettings {
            sampling_rate: self.sampling_rate.unwrap_or(recorded_sampling_rate),
            method: DifferentiationMethod::from_name(
                self.pos2vel_method,
                self.window_length,
                self.degree,
                self.padding,
            )?,
            always_derive: self.derive_velocities,
        })
    }
}

/// Options controlling the transforms of the recorded positions.
#[derive(Debug, Clone, Args)]
pub(crate) struct PositionOptions {
    /// Width and height of the screen in pixels. If set, positions are taken to be pixel
    /// coordinates and are converted to degrees of visual angle.
    #[clap(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"], requires = "screen_size")]
    pub(crate) screen_resolution: Option<Vec<usize>>,

    /// Width and height of the screen in centimetres.
    #[clap(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"], requires = "distance")]
    pub(crate) screen_size: Option<Vec<Real>>,

    /// Distance between eye and screen in centimetres.
    #[clap(long, requires = "screen_resolution")]
    pub(crate) distance: Option<Real>,

    /// Location of the pixel origin: "center" or "lower left".
    #[clap(long, default_value = "lower left")]
    pub(crate) origin: Origin,

    /// Method used to smooth positions: moving_average, exponential_moving_average or
    /// savitzky_golay. If omitted, positions are not smoothed.
    #[clap(long, requires = "smoothing_window_length")]
    pub(crate) smooth: Option<SmoothingMethod>,

    /// Number of samples in the smoothing window.
    #[clap(long)]
    pub(crate) smoothing_window_length: Option<usize>,

    /// Degree of the polynomial fitted when smoothing with savitzky_golay.
    #[clap(long)]
    pub(crate) smoothing_degree: Option<usize>,

    /// Extension of the series beyond its ends when smoothing: mirror, nearest, wrap, none,
    /// or a constant value.
    #[clap(long, default_value = "nearest")]
    pub(crate) smoothing_padding: Padding,
}

impl PositionOptions {
    pub(crate) fn settings(&self) -> Result<PositionSettings, ValidationError> {
        let screen = match (&self.screen_resolution, &self.screen_size, self.distance) {
            (Some(resolution), Some(size), Some(distance)) => Some(Screen::new(
                pair("screen_resolution", resolution)?,
                pair("screen_size", size)?,
                distance,
                self.origin,
            )?),
            _ => None,
        };
        let smoothing = match (self.smooth, self.smoothing_window_length) {
            (Some(method), Some(window_length)) => Some(Smoothing::from_name(
                method,
                window_length,
                self.smoothing_degree,
                self.smoothing_padding,
            )?),
            (Some(method), None) => {
                return Err(ValidationError::MissingMethodParameter {
                    parameter: "window_length",
                    method: method.into(),
                });
            }
            (None, _) => None,
        };
        Ok(PositionSettings { screen, smoothing })
    }
}

fn pair<T: Copy>(name: &'static str, components: &[T]) -> Result<[T; 2], ValidationError> {
    <[T; 2]>::try_from(components).map_err(|_| ValidationError::Dimension {
        name,
        length: components.len(),
    })
}

/// Encapsulates the parameters specific to the dispersion threshold (I-DT) detector.
#[derive(Debug, Clone, Parser)]
pub(crate) struct IdtArgs {
    /// The largest dispersion, in units of position, of the samples of a fixation.
    #[clap(long, default_value = "1.0")]
    pub(crate) dispersion_threshold: Real,

    /// The minimum duration of a fixation, in units of timesteps.
    #[clap(long, default_value = "100")]
    pub(crate) minimum_duration: Time,

    /// If set, fixations may span samples with missing positions.
    #[clap(long)]
    pub(crate) include_nan: bool,

    /// Name given to the detected events.
    #[clap(long, default_value = "fixation")]
    pub(crate) name: String,
}

/// Encapsulates the parameters specific to the velocity threshold (I-VT) detector.
#[derive(Debug, Clone, Parser)]
pub(crate) struct IvtArgs {
    /// Samples whose velocity magnitude exceeds this value are saccade candidates.
    #[clap(long, default_value = "20.0")]
    pub(crate) velocity_threshold: Real,

    /// The minimum number of consecutive candidate samples forming a saccade.
    #[clap(long, default_value = "1")]
    pub(crate) minimum_duration: usize,

    /// If set, saccades may span samples with missing velocities.
    #[clap(long)]
    pub(crate) include_nan: bool,

    /// Name given to the detected events.
    #[clap(long, default_value = "saccade")]
    pub(crate) name: String,
}

/// Encapsulates the parameters specific to the microsaccade detector.
#[derive(Debug, Clone, Parser)]
pub(crate) struct MicrosaccadeArgs {
    /// Statistic estimating the velocity noise of each trial: std, mad, engbert2003 or engbert2015.
    #[clap(long, default_value = "engbert2015")]
    pub(crate) sigma_method: SigmaMethod,

    /// Fixed velocity noise levels, one per axis. If set, the noise is not estimated.
    #[clap(long, num_args = 2, value_names = ["SIGMA_X", "SIGMA_Y"], conflicts_with = "sigma_method")]
    pub(crate) threshold: Option<Vec<Real>>,

    /// Multiple of the noise level giving the radii of the velocity threshold ellipse.
    #[clap(long, default_value = "6.0")]
    pub(crate) threshold_factor: Real,

    /// Noise levels below this value are rejected as degenerate.
    #[clap(long, default_value = "1e-10")]
    pub(crate) minimum_threshold: Real,

    /// The minimum number of consecutive candidate samples forming a microsaccade.
    #[clap(long, default_value = "6")]
    pub(crate) minimum_duration: usize,

    /// If set, microsaccades may span samples with missing velocities.
    #[clap(long)]
    pub(crate) include_nan: bool,

    /// Name given to the detected events.
    #[clap(long, default_value = "saccade")]
    pub(crate) name: String,
}

/// Specifies which detector is to be used, and wraps the detector-specific options in each variant.
#[derive(Subcommand, Debug)]
pub(crate) enum Mode {
    /// Detects fixations as windows of samples whose dispersion stays within a threshold.
    Idt(IdtArgs),
    /// Detects saccades as runs of samples whose velocity exceeds a fixed threshold.
    Ivt(IvtArgs),
    /// Detects microsaccades with an elliptical velocity threshold adapted to each trial.
    Microsaccades(MicrosaccadeArgs),
}

impl Mode {
    pub(crate) fn parameters(&self) -> Result<DetectorParameters, ValidationError> {
        Ok(match self {
            Mode::Idt(args) => DetectorParameters::Idt(IdtParameters {
                dispersion_threshold: args.dispersion_threshold,
                minimum_duration: args.minimum_duration,
                include_nan: args.include_nan,
                name: args.name.clone(),
            }),
            Mode::Ivt(args) => DetectorParameters::Ivt(IvtParameters {
                velocity_threshold: args.velocity_threshold,
                minimum_duration: args.minimum_duration,
                include_nan: args.include_nan,
                name: args.name.clone(),
            }),
            Mode::Microsaccades(args) => DetectorParameters::Microsaccades(MicrosaccadeParameters {
                threshold: match &args.threshold {
                    Some(components) => Threshold::from_components(components)?,
                    None => Threshold::Adaptive(args.sigma_method),
                },
                threshold_factor: args.threshold_factor,
                minimum_threshold: args.minimum_threshold,
                minimum_duration: args.minimum_duration,
                include_nan: args.include_nan,
                name: args.name.clone(),
            }),
        })
    }
}
