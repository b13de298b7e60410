//! The validated sample container every detector operates on.
use super::super::{
    Real, Time,
    differentiation::{DifferentiationMethod, differentiate},
    transforms::{Screen, Smoothing, smooth},
};
use crate::error::ValidationError;
use itertools::Itertools;
use ndarray::{Array2, ArrayView1, ArrayView2};
use std::ops::RangeInclusive;

/// A series of gaze samples.
///
/// Positions, and velocities if present, are (N, 2) matrices. Missing samples are `NaN`.
/// Timesteps are strictly increasing, but may contain gaps.
///
/// All shape and length checks happen when the series is built, so detectors can index
/// the matrices freely.
#[derive(Clone, Debug, PartialEq)]
pub struct GazeSamples {
    timesteps: Vec<Time>,
    positions: Array2<Real>,
    velocities: Option<Array2<Real>>,
}

impl GazeSamples {
    /// Creates a series from a position matrix, with timesteps numbered from zero.
    pub fn new(positions: Array2<Real>) -> Result<Self, ValidationError> {
        check_two_components("positions", positions.view())?;
        Ok(Self {
            timesteps: (0..positions.nrows() as Time).collect(),
            positions,
            velocities: None,
        })
    }

    /// Creates a series from position rows, with timesteps numbered from zero.
    pub fn from_rows(positions: &[[Real; 2]]) -> Self {
        Self {
            timesteps: (0..positions.len() as Time).collect(),
            positions: Array2::from(positions.to_vec()),
            velocities: None,
        }
    }

    pub fn with_timesteps(mut self, timesteps: Vec<Time>) -> Result<Self, ValidationError> {
        check_length_matching("timesteps", timesteps.len(), self.len())?;
        if let Some((index, (&previous, &value))) = timesteps
            .iter()
            .tuple_windows()
            .enumerate()
            .find(|(_, (previous, value))| value <= previous)
        {
            return Err(ValidationError::NonIncreasingTimesteps {
                index: index + 1,
                value,
                previous,
            });
        }
        self.timesteps = timesteps;
        Ok(self)
    }

    pub fn with_velocities(mut self, velocities: Array2<Real>) -> Result<Self, ValidationError> {
        check_two_components("velocities", velocities.view())?;
        check_length_matching("velocities", velocities.nrows(), self.len())?;
        self.velocities = Some(velocities);
        Ok(self)
    }

    pub fn with_velocity_rows(self, velocities: &[[Real; 2]]) -> Result<Self, ValidationError> {
        self.with_velocities(Array2::from(velocities.to_vec()))
    }

    /// Converts the positions from pixel coordinates to degrees of visual angle.
    pub fn with_positions_in_degrees(mut self, screen: &Screen) -> Result<Self, ValidationError> {
        self.positions = screen.pix2deg(self.positions.view())?;
        Ok(self)
    }

    pub fn with_smoothed_positions(mut self, smoothing: &Smoothing) -> Result<Self, ValidationError> {
        self.positions = smooth(self.positions.view(), smoothing)?;
        Ok(self)
    }

    /// Replaces the velocities by the derivative of the positions.
    pub fn with_derived_velocities(
        mut self,
        sampling_rate: Real,
        method: &DifferentiationMethod,
    ) -> Result<Self, ValidationError> {
        self.velocities = Some(differentiate(self.positions.view(), sampling_rate, method)?);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.timesteps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timesteps.is_empty()
    }

    pub fn timesteps(&self) -> &[Time] {
        &self.timesteps
    }

    pub fn positions(&self) -> ArrayView2<'_, Real> {
        self.positions.view()
    }

    pub fn velocities(&self) -> Option<ArrayView2<'_, Real>> {
        self.velocities.as_ref().map(|velocities| velocities.view())
    }

    pub(crate) fn require_velocities(
        &self,
        required_by: &'static str,
    ) -> Result<ArrayView2<'_, Real>, ValidationError> {
        self.velocities()
            .ok_or(ValidationError::MissingVelocities(required_by))
    }

    /// Returns the indices of the samples whose timesteps lie within `[onset, offset]`.
    pub(crate) fn index_range(&self, onset: Time, offset: Time) -> Option<RangeInclusive<usize>> {
        let first = self.timesteps.partition_point(|&time| time < onset);
        let end = self.timesteps.partition_point(|&time| time <= offset);
        (first < end).then(|| first..=(end - 1))
    }
}

/// Returns true if any component of the sample is missing.
pub(crate) fn has_nan(sample: ArrayView1<Real>) -> bool {
    sample.iter().any(|value| value.is_nan())
}

fn check_two_components(
    name: &'static str,
    array: ArrayView2<Real>,
) -> Result<(), ValidationError> {
    if array.ncols() != 2 {
        return Err(ValidationError::Shape {
            name,
            rows: array.nrows(),
            columns: array.ncols(),
        });
    }
    Ok(())
}

fn check_length_matching(
    name: &'static str,
    length: usize,
    positions_length: usize,
) -> Result<(), ValidationError> {
    if length != positions_length {
        return Err(ValidationError::LengthMismatch {
            name,
            length,
            other: "positions",
            other_length: positions_length,
        });
    }
    Ok(())
}
