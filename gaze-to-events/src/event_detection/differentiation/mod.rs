//! Derives velocities and accelerations from position series.
//!
//! Each axis of an (N, 2) matrix is differentiated independently, so matrices of any number
//! of columns are accepted here.
mod finite_differences;
mod savitzky_golay;

pub(crate) use savitzky_golay::extended;
pub use savitzky_golay::{Padding, SavitzkyGolay, savitzky_golay};

use super::{Real, parse_named};
use crate::error::ValidationError;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use std::str::FromStr;
use strum::{Display, EnumIter, VariantNames};

type Stencil = fn(ArrayView1<Real>, Real) -> Result<Array1<Real>, ValidationError>;

/// The names accepted for a differentiation method.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumIter, VariantNames)]
#[strum(serialize_all = "snake_case")]
pub enum Pos2VelMethod {
    Preceding,
    Neighbors,
    #[default]
    Smooth,
    SavitzkyGolay,
}

impl FromStr for Pos2VelMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named("method", s)
    }
}

/// A fully parameterised differentiation method.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DifferentiationMethod {
    /// Difference to the preceding sample.
    Preceding,
    /// Difference between the two neighbouring samples.
    Neighbors,
    /// Difference of the means of the two following and the two preceding samples.
    #[default]
    Smooth,
    /// Derivative of a Savitzky-Golay filter.
    SavitzkyGolay {
        window_length: usize,
        degree: usize,
        padding: Padding,
    },
}

impl DifferentiationMethod {
    /// Builds a method from its name, requiring the filter parameters for
    /// [Pos2VelMethod::SavitzkyGolay].
    pub fn from_name(
        method: Pos2VelMethod,
        window_length: Option<usize>,
        degree: Option<usize>,
        padding: Padding,
    ) -> Result<Self, ValidationError> {
        Ok(match method {
            Pos2VelMethod::Preceding => Self::Preceding,
            Pos2VelMethod::Neighbors => Self::Neighbors,
            Pos2VelMethod::Smooth => Self::Smooth,
            Pos2VelMethod::SavitzkyGolay => Self::SavitzkyGolay {
                window_length: window_length.ok_or(ValidationError::MissingMethodParameter {
                    parameter: "window_length",
                    method: "savitzky_golay",
                })?,
                degree: degree.ok_or(ValidationError::MissingMethodParameter {
                    parameter: "degree",
                    method: "savitzky_golay",
                })?,
                padding,
            },
        })
    }

    pub fn name(&self) -> Pos2VelMethod {
        match self {
            Self::Preceding => Pos2VelMethod::Preceding,
            Self::Neighbors => Pos2VelMethod::Neighbors,
            Self::Smooth => Pos2VelMethod::Smooth,
            Self::SavitzkyGolay { .. } => Pos2VelMethod::SavitzkyGolay,
        }
    }

    fn differentiate_series(
        &self,
        series: ArrayView1<Real>,
        sampling_rate: Real,
        derivative: usize,
    ) -> Result<Array1<Real>, ValidationError> {
        if let Self::SavitzkyGolay {
            window_length,
            degree,
            padding,
        } = *self
        {
            return savitzky_golay(series, window_length, degree, derivative, sampling_rate, padding);
        }
        let stencil: Stencil = match self {
            Self::Preceding => finite_differences::preceding,
            Self::Neighbors => finite_differences::neighbors,
            _ => finite_differences::smooth,
        };
        (0..derivative).try_fold(series.to_owned(), |series, _| {
            stencil(series.view(), sampling_rate)
        })
    }
}

/// Computes the velocity of each column of the position matrix.
pub fn differentiate(
    positions: ArrayView2<Real>,
    sampling_rate: Real,
    method: &DifferentiationMethod,
) -> Result<Array2<Real>, ValidationError> {
    derive(positions, sampling_rate, method, 1)
}

/// Computes the acceleration of each column of the position matrix.
///
/// Finite difference stencils are applied twice, Savitzky-Golay filters evaluate the second
/// derivative directly.
pub fn pos2acc(
    positions: ArrayView2<Real>,
    sampling_rate: Real,
    method: &DifferentiationMethod,
) -> Result<Array2<Real>, ValidationError> {
    derive(positions, sampling_rate, method, 2)
}

fn derive(
    positions: ArrayView2<Real>,
    sampling_rate: Real,
    method: &DifferentiationMethod,
    derivative: usize,
) -> Result<Array2<Real>, ValidationError> {
    if !(sampling_rate > 0.0) {
        return Err(ValidationError::not_positive("sampling_rate", sampling_rate));
    }
    let mut output = Array2::from_elem(positions.raw_dim(), Real::NAN);
    for (column, mut target) in positions.columns().into_iter().zip(output.columns_mut()) {
        target.assign(&method.differentiate_series(column, sampling_rate, derivative)?);
    }
    Ok(output)
}
