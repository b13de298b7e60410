//! Estimation of the per-axis velocity noise used to size elliptical saccade thresholds.
use super::{
    Real, parse_named,
    statistics::{nan_median, nan_std},
};
use crate::error::{DataQualityError, DetectionError, ValidationError};
use ndarray::{ArrayView1, ArrayView2};
use std::str::FromStr;
use strum::{Display, EnumIter, VariantNames};

/// Statistic used to estimate the noise level `sigma` of each velocity axis.
///
/// All statistics ignore missing samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumIter, VariantNames)]
pub enum SigmaMethod {
    /// Standard deviation.
    #[strum(serialize = "std")]
    Std,
    /// Median absolute deviation from the median.
    #[strum(serialize = "mad")]
    Mad,
    /// `sqrt(median(v^2) - median(v)^2)`
    #[strum(serialize = "engbert2003")]
    Engbert2003,
    /// `sqrt(median((v - median(v))^2))`, which avoids the cancellation in [Self::Engbert2003].
    #[default]
    #[strum(serialize = "engbert2015")]
    Engbert2015,
}

impl FromStr for SigmaMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named("method", s)
    }
}

impl SigmaMethod {
    fn apply(self, axis: ArrayView1<Real>) -> Real {
        match self {
            Self::Std => nan_std(axis.iter().copied()),
            Self::Mad => {
                let median = nan_median(axis.iter().copied());
                nan_median(axis.iter().map(|value| (value - median).abs()))
            }
            Self::Engbert2003 => {
                let median = nan_median(axis.iter().copied());
                (nan_median(axis.iter().map(|value| value.powi(2))) - median.powi(2)).sqrt()
            }
            Self::Engbert2015 => {
                let median = nan_median(axis.iter().copied());
                nan_median(axis.iter().map(|value| (value - median).powi(2))).sqrt()
            }
        }
    }
}

/// Estimates `(sigma_x, sigma_y)` from an (N, 2) velocity matrix.
pub fn estimate_sigma(
    velocities: ArrayView2<Real>,
    method: SigmaMethod,
) -> Result<[Real; 2], ValidationError> {
    if velocities.ncols() != 2 {
        return Err(ValidationError::Shape {
            name: "velocities",
            rows: velocities.nrows(),
            columns: velocities.ncols(),
        });
    }
    Ok([
        method.apply(velocities.column(0)),
        method.apply(velocities.column(1)),
    ])
}

/// The per-axis velocity noise level, before scaling by the threshold factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Threshold {
    /// Estimated from the velocities of each trial.
    Adaptive(SigmaMethod),
    /// Fixed `(sigma_x, sigma_y)`.
    Explicit([Real; 2]),
}

impl Default for Threshold {
    fn default() -> Self {
        Self::Adaptive(SigmaMethod::default())
    }
}

impl Threshold {
    /// Creates an explicit threshold, which must have exactly one component per axis.
    pub fn from_components(components: &[Real]) -> Result<Self, ValidationError> {
        <[Real; 2]>::try_from(components)
            .map(Self::Explicit)
            .map_err(|_| ValidationError::ThresholdDimension(components.len()))
    }

    /// Returns `(sigma_x, sigma_y)` for the given velocities.
    ///
    /// A component below `minimum_threshold` means the velocities are too uniform to
    /// separate saccades from noise. Explicit components must be finite.
    pub(crate) fn sigma(
        &self,
        velocities: ArrayView2<Real>,
        minimum_threshold: Real,
    ) -> Result<[Real; 2], DetectionError> {
        let sigma = match *self {
            Self::Adaptive(method) => estimate_sigma(velocities, method)?,
            Self::Explicit(sigma) => {
                if let Some(&component) = sigma.iter().find(|component| !component.is_finite()) {
                    return Err(ValidationError::NonFiniteThreshold(component).into());
                }
                sigma
            }
        };
        if sigma.iter().any(|&component| component < minimum_threshold) {
            return Err(DataQualityError::DegenerateVariance {
                sigma,
                minimum_threshold,
            }
            .into());
        }
        Ok(sigma)
    }
}
