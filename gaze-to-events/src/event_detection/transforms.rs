//! Transforms of position series applied before detection: conversion of pixel coordinates
//! to degrees of visual angle, and smoothing.
use super::{
    Real, parse_named,
    differentiation::{Padding, SavitzkyGolay, extended},
};
use crate::error::ValidationError;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use std::str::FromStr;
use strum::{Display, EnumIter, IntoStaticStr, VariantNames};

/// Location of the origin of the pixel coordinate system on the screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumIter, VariantNames)]
pub enum Origin {
    #[strum(serialize = "center")]
    Center,
    #[default]
    #[strum(serialize = "lower left")]
    LowerLeft,
}

impl FromStr for Origin {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named("origin", s)
    }
}

/// Geometry of the screen the gaze was recorded on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Screen {
    /// Width and height in pixels.
    resolution: [usize; 2],
    /// Width and height in centimetres.
    size: [Real; 2],
    /// Distance of the eye from the screen in centimetres.
    distance: Real,
    origin: Origin,
}

impl Screen {
    pub fn new(
        resolution: [usize; 2],
        size: [Real; 2],
        distance: Real,
        origin: Origin,
    ) -> Result<Self, ValidationError> {
        if let Some(&component) = resolution.iter().find(|&&component| component == 0) {
            return Err(ValidationError::not_positive("screen_resolution", component));
        }
        if let Some(&component) = size.iter().find(|&&component| !(component > 0.0)) {
            return Err(ValidationError::not_positive("screen_size", component));
        }
        if !(distance > 0.0) {
            return Err(ValidationError::not_positive("distance", distance));
        }
        Ok(Self {
            resolution,
            size,
            distance,
            origin,
        })
    }

    /// Converts an (N, 2) matrix of pixel coordinates to degrees of visual angle, relative to
    /// the centre of the screen.
    pub fn pix2deg(&self, pixels: ArrayView2<Real>) -> Result<Array2<Real>, ValidationError> {
        if pixels.ncols() != 2 {
            return Err(ValidationError::Shape {
                name: "pixels",
                rows: pixels.nrows(),
                columns: pixels.ncols(),
            });
        }
        let mut degrees = pixels.to_owned();
        for (axis, mut column) in degrees.columns_mut().into_iter().enumerate() {
            let resolution = self.resolution[axis] as Real;
            let offset = match self.origin {
                Origin::Center => 0.0,
                Origin::LowerLeft => (resolution - 1.0) / 2.0,
            };
            let distance = self.distance * resolution / self.size[axis];
            column.mapv_inplace(|pixel| (pixel - offset).atan2(distance).to_degrees());
        }
        Ok(degrees)
    }
}

/// The names accepted for a smoothing method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter, IntoStaticStr, VariantNames)]
#[strum(serialize_all = "snake_case")]
pub enum SmoothingMethod {
    MovingAverage,
    ExponentialMovingAverage,
    SavitzkyGolay,
}

impl FromStr for SmoothingMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named("method", s)
    }
}

/// A fully parameterised smoothing method.
///
/// With [Padding::Interpolate], the averages are `NaN` where the series does not fill the
/// window.
#[derive(Clone, Debug, PartialEq)]
pub enum Smoothing {
    /// Mean of the `window_length` samples centred on each sample.
    MovingAverage {
        window_length: usize,
        padding: Padding,
    },
    /// Exponentially weighted mean with a span of `window_length` samples.
    ExponentialMovingAverage {
        window_length: usize,
        padding: Padding,
    },
    /// Savitzky-Golay filter.
    SavitzkyGolay(SavitzkyGolay),
}

impl Smoothing {
    /// Builds a smoothing method from its name, requiring the `degree` for
    /// [SmoothingMethod::SavitzkyGolay].
    pub fn from_name(
        method: SmoothingMethod,
        window_length: usize,
        degree: Option<usize>,
        padding: Padding,
    ) -> Result<Self, ValidationError> {
        if window_length == 0 {
            return Err(ValidationError::not_positive("window_length", window_length));
        }
        Ok(match method {
            SmoothingMethod::MovingAverage => Self::MovingAverage {
                window_length,
                padding,
            },
            SmoothingMethod::ExponentialMovingAverage => Self::ExponentialMovingAverage {
                window_length,
                padding,
            },
            SmoothingMethod::SavitzkyGolay => {
                let degree = degree.ok_or(ValidationError::MissingMethodParameter {
                    parameter: "degree",
                    method: "savitzky_golay",
                })?;
                Self::SavitzkyGolay(SavitzkyGolay::new(window_length, degree, 0, 1.0, padding)?)
            }
        })
    }

    pub fn apply(&self, series: ArrayView1<Real>) -> Result<Array1<Real>, ValidationError> {
        match self {
            Self::MovingAverage {
                window_length,
                padding,
            } => Ok(moving_average(series, *window_length, *padding)),
            Self::ExponentialMovingAverage {
                window_length,
                padding,
            } => Ok(exponential_moving_average(series, *window_length, *padding)),
            Self::SavitzkyGolay(filter) => filter.apply(series),
        }
    }
}

/// Smooths each column of the position matrix.
pub fn smooth(
    positions: ArrayView2<Real>,
    smoothing: &Smoothing,
) -> Result<Array2<Real>, ValidationError> {
    let mut output = Array2::from_elem(positions.raw_dim(), Real::NAN);
    for (column, mut target) in positions.columns().into_iter().zip(output.columns_mut()) {
        target.assign(&smoothing.apply(column)?);
    }
    Ok(output)
}

/// Number of samples added at each end of the series before averaging.
fn pad_width(window_length: usize, padding: Padding) -> usize {
    match padding {
        Padding::Interpolate => 0,
        _ => window_length.div_ceil(2),
    }
}

/// Value of the padded series at `index`, or `None` outside an unpadded series.
fn padded(series: ArrayView1<Real>, index: isize, padding: Padding) -> Option<Real> {
    let length = series.len() as isize;
    match padding {
        Padding::Interpolate if !(0..length).contains(&index) => None,
        _ => Some(extended(series, index, padding)),
    }
}

fn moving_average(series: ArrayView1<Real>, window_length: usize, padding: Padding) -> Array1<Real> {
    let before = (window_length / 2) as isize;
    Array1::from_shape_fn(series.len(), |index| {
        let first = index as isize - before;
        (first..first + window_length as isize)
            .map(|position| padded(series, position, padding))
            .sum::<Option<Real>>()
            .map_or(Real::NAN, |sum| sum / window_length as Real)
    })
}

/// Recursive exponential mean, `y[t] = (1 - alpha) y[t - 1] + alpha x[t]`, started on the
/// padding. Means over fewer than `window_length` samples are `NaN`.
fn exponential_moving_average(
    series: ArrayView1<Real>,
    window_length: usize,
    padding: Padding,
) -> Array1<Real> {
    let mut output = Array1::from_elem(series.len(), Real::NAN);
    if series.is_empty() {
        return output;
    }
    let alpha = 2.0 / (window_length as Real + 1.0);
    let width = pad_width(window_length, padding) as isize;
    let mut mean = None;
    for (count, position) in (-width..series.len() as isize).enumerate() {
        let value = extended(series, position, padding);
        let current = mean.map_or(value, |mean: Real| (1.0 - alpha) * mean + alpha * value);
        mean = Some(current);
        if position >= 0 && count + 1 >= window_length {
            output[position as usize] = current;
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use ndarray::array;

    fn screen(origin: Origin) -> Screen {
        Screen::new([100, 100], [100.0, 100.0], 100.0, origin).unwrap()
    }

    #[test]
    fn pixels_at_the_centre_are_zero_degrees() {
        let degrees = screen(Origin::Center)
            .pix2deg(array![[0.0, 0.0]].view())
            .unwrap();
        assert_eq!(degrees, array![[0.0, 0.0]]);

        let degrees = screen(Origin::LowerLeft)
            .pix2deg(array![[49.5, 49.5]].view())
            .unwrap();
        assert_approx_eq!(degrees[[0, 0]], 0.0);
        assert_approx_eq!(degrees[[0, 1]], 0.0);
    }

    #[test]
    fn pixels_one_distance_away_are_45_degrees() {
        let degrees = screen(Origin::Center)
            .pix2deg(array![[100.0, -100.0], [Real::NAN, 0.0]].view())
            .unwrap();
        assert_approx_eq!(degrees[[0, 0]], 45.0);
        assert_approx_eq!(degrees[[0, 1]], -45.0);
        assert!(degrees[[1, 0]].is_nan());
    }

    #[test]
    fn pixel_size_scales_the_distance() {
        // 2 pixels per centimetre, so 100 pixels lie 50cm from the centre at 50cm distance.
        let wide = Screen::new([200, 100], [100.0, 100.0], 50.0, Origin::Center).unwrap();
        let degrees = wide.pix2deg(array![[100.0, 50.0]].view()).unwrap();
        assert_approx_eq!(degrees[[0, 0]], 45.0);
        assert_approx_eq!(degrees[[0, 1]], 45.0);
    }

    #[test]
    fn screen_is_validated() {
        assert!(matches!(
            Screen::new([0, 100], [10.0, 10.0], 10.0, Origin::Center),
            Err(ValidationError::NotPositive {
                name: "screen_resolution",
                ..
            })
        ));
        assert!(matches!(
            Screen::new([100, 100], [10.0, Real::NAN], 10.0, Origin::Center),
            Err(ValidationError::NotPositive {
                name: "screen_size",
                ..
            })
        ));
        assert!(matches!(
            Screen::new([100, 100], [10.0, 10.0], -1.0, Origin::Center),
            Err(ValidationError::NotPositive {
                name: "distance",
                ..
            })
        ));
        assert_eq!("lower left".parse::<Origin>(), Ok(Origin::LowerLeft));
        assert!("upper left".parse::<Origin>().is_err());
    }

    #[test]
    fn moving_average_padding() {
        let series = array![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let nearest = moving_average(series.view(), 3, Padding::Nearest);
        assert_approx_eq!(nearest[0], 4.0 / 3.0);
        assert_approx_eq!(nearest[4], 5.0);
        assert_approx_eq!(nearest[7], 23.0 / 3.0);

        let constant = moving_average(series.view(), 3, Padding::Constant(0.0));
        assert_approx_eq!(constant[0], 1.0);

        let none = moving_average(series.view(), 3, Padding::Interpolate);
        assert!(none[0].is_nan());
        assert_approx_eq!(none[1], 2.0);
        assert!(none[7].is_nan());
    }

    #[test]
    fn exponential_moving_average_of_constant_series() {
        let series = Array1::from_elem(6, 2.0);
        let nearest = exponential_moving_average(series.view(), 3, Padding::Nearest);
        assert!(nearest.iter().all(|&value| (value - 2.0).abs() < 1e-12));

        let none = exponential_moving_average(series.view(), 3, Padding::Interpolate);
        assert!(none[0].is_nan());
        assert!(none[1].is_nan());
        assert_approx_eq!(none[2], 2.0);
    }

    #[test]
    fn exponential_moving_average_weights() {
        // alpha = 2 / (1 + 1) = 1 reproduces the series.
        let series = array![1.0, 5.0, 2.0];
        let output = exponential_moving_average(series.view(), 1, Padding::Interpolate);
        assert_eq!(output, series);

        // alpha = 0.5, started on the padding value 0.
        let output = exponential_moving_average(array![4.0, 4.0].view(), 3, Padding::Constant(0.0));
        assert_approx_eq!(output[0], 2.0);
        assert_approx_eq!(output[1], 3.0);
    }

    #[test]
    fn smoothing_by_name() {
        let smoothing =
            Smoothing::from_name(SmoothingMethod::SavitzkyGolay, 5, Some(2), Padding::Nearest)
                .unwrap();
        let positions = Array2::from_shape_fn((9, 2), |(row, column)| (row * column) as Real);
        let smoothed = smooth(positions.view(), &smoothing).unwrap();
        for (smoothed, position) in smoothed.column(1).iter().zip(positions.column(1)).skip(2).take(5) {
            assert_approx_eq!(smoothed, position);
        }

        assert_eq!(
            Smoothing::from_name(SmoothingMethod::SavitzkyGolay, 5, None, Padding::Nearest),
            Err(ValidationError::MissingMethodParameter {
                parameter: "degree",
                method: "savitzky_golay"
            })
        );
        assert!(matches!(
            Smoothing::from_name(SmoothingMethod::MovingAverage, 0, None, Padding::Nearest),
            Err(ValidationError::NotPositive {
                name: "window_length",
                ..
            })
        ));
        assert_eq!(
            "moving_average".parse::<SmoothingMethod>(),
            Ok(SmoothingMethod::MovingAverage)
        );
    }
}
