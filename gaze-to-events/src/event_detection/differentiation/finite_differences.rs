//! Finite difference stencils of the Microsaccade Toolbox.
//!
//! Each stencil maps a series of length N to a series of length N. Samples for which the
//! stencil does not fit within the series are `NaN`.
use super::super::Real;
use crate::error::ValidationError;
use ndarray::{Array1, ArrayView1, s};

/// `v[i] = (p[i] - p[i-1]) * sampling_rate`
pub(crate) fn preceding(
    series: ArrayView1<Real>,
    sampling_rate: Real,
) -> Result<Array1<Real>, ValidationError> {
    let n = check_length(series, "preceding", 2)?;
    let mut velocity = Array1::from_elem(n, Real::NAN);
    velocity
        .slice_mut(s![1..])
        .assign(&((&series.slice(s![1..]) - &series.slice(s![..n - 1])) * sampling_rate));
    Ok(velocity)
}

/// `v[i] = (p[i+1] - p[i-1]) * sampling_rate / 2`
pub(crate) fn neighbors(
    series: ArrayView1<Real>,
    sampling_rate: Real,
) -> Result<Array1<Real>, ValidationError> {
    let n = check_length(series, "neighbors", 3)?;
    let mut velocity = Array1::from_elem(n, Real::NAN);
    velocity
        .slice_mut(s![1..n - 1])
        .assign(&((&series.slice(s![2..]) - &series.slice(s![..n - 2])) * (sampling_rate / 2.0)));
    Ok(velocity)
}

/// `v[i] = (p[i+2] + p[i+1] - p[i-1] - p[i-2]) * sampling_rate / 6`
///
/// The second and penultimate samples fall back to [neighbors].
pub(crate) fn smooth(
    series: ArrayView1<Real>,
    sampling_rate: Real,
) -> Result<Array1<Real>, ValidationError> {
    let n = check_length(series, "smooth", 6)?;
    let mut velocity = Array1::from_elem(n, Real::NAN);
    // The difference of the means of the two following and the two preceding samples spans
    // three sample intervals, hence the division by 2 * 3.
    let sums = &series.slice(s![4..]) + &series.slice(s![3..n - 1])
        - series.slice(s![1..n - 3])
        - series.slice(s![..n - 4]);
    velocity
        .slice_mut(s![2..n - 2])
        .assign(&(sums * (sampling_rate / 6.0)));
    velocity[1] = (series[2] - series[0]) * sampling_rate / 2.0;
    velocity[n - 2] = (series[n - 1] - series[n - 3]) * sampling_rate / 2.0;
    Ok(velocity)
}

fn check_length(
    series: ArrayView1<Real>,
    method: &'static str,
    required: usize,
) -> Result<usize, ValidationError> {
    if series.len() < required {
        return Err(ValidationError::InsufficientSamples {
            method,
            required,
            length: series.len(),
        });
    }
    Ok(series.len())
}
