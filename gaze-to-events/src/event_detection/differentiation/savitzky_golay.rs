//! Savitzky-Golay smoothing and differentiation.
//!
//! The filter fits a polynomial of `degree` by least squares to each window of
//! `window_length` samples centred on a sample, and evaluates the `derivative` of that
//! polynomial at the centre. Because the fit is linear in the samples, this reduces to
//! correlating the series with a fixed set of coefficients.
use super::super::Real;
use crate::error::ValidationError;
use ndarray::{Array1, ArrayView1, s};
use std::{fmt, ops::Range, str::FromStr};

/// How the series is extended beyond its ends before filtering.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Padding {
    /// Reflect about the edge samples, `[d c b | a b c d | c b a]`.
    Mirror,
    /// Repeat the edge samples, `[a a a | a b c d | d d d]`.
    #[default]
    Nearest,
    /// Continue from the opposite end, `[b c d | a b c d | a b c]`.
    Wrap,
    /// Extend with a fixed value.
    Constant(Real),
    /// Do not extend. The edge samples are taken from a polynomial fitted to the first and
    /// last full windows.
    Interpolate,
}

impl fmt::Display for Padding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mirror => write!(f, "mirror"),
            Self::Nearest => write!(f, "nearest"),
            Self::Wrap => write!(f, "wrap"),
            Self::Constant(value) => write!(f, "{value}"),
            Self::Interpolate => write!(f, "none"),
        }
    }
}

impl FromStr for Padding {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mirror" => Ok(Self::Mirror),
            "nearest" => Ok(Self::Nearest),
            "wrap" => Ok(Self::Wrap),
            "none" => Ok(Self::Interpolate),
            other => other
                .parse()
                .map(Self::Constant)
                .map_err(|_| ValidationError::Unknown {
                    kind: "padding",
                    given: other.to_owned(),
                    supported: "mirror, nearest, wrap, none, or a number".to_owned(),
                }),
        }
    }
}

/// A Savitzky-Golay filter with precomputed coefficients.
#[derive(Clone, Debug, PartialEq)]
pub struct SavitzkyGolay {
    window_length: usize,
    degree: usize,
    derivative: usize,
    delta: Real,
    padding: Padding,
    coefficients: Vec<Real>,
}

impl SavitzkyGolay {
    pub fn new(
        window_length: usize,
        degree: usize,
        derivative: usize,
        sampling_rate: Real,
        padding: Padding,
    ) -> Result<Self, ValidationError> {
        if window_length == 0 {
            return Err(ValidationError::not_positive("window_length", window_length));
        }
        if window_length % 2 == 0 {
            return Err(ValidationError::EvenWindowLength(window_length));
        }
        if degree == 0 {
            return Err(ValidationError::not_positive("degree", degree));
        }
        if degree >= window_length {
            return Err(ValidationError::DegreeNotLessThanWindow {
                degree,
                window_length,
            });
        }
        if !(sampling_rate > 0.0) {
            return Err(ValidationError::not_positive("sampling_rate", sampling_rate));
        }
        let delta = 1.0 / sampling_rate;
        Ok(Self {
            window_length,
            degree,
            derivative,
            delta,
            padding,
            coefficients: coefficients(window_length, degree, derivative, delta),
        })
    }

    pub fn coefficients(&self) -> &[Real] {
        &self.coefficients
    }

    /// Filters the series, returning a series of the same length.
    pub fn apply(&self, series: ArrayView1<Real>) -> Result<Array1<Real>, ValidationError> {
        let length = series.len();
        if length == 0 {
            return Ok(Array1::zeros(0));
        }
        if self.padding == Padding::Interpolate && self.window_length > length {
            return Err(ValidationError::WindowExceedsSamples {
                window_length: self.window_length,
                length,
            });
        }
        let half = (self.window_length / 2) as isize;
        let mut output = Array1::from_shape_fn(length, |index| {
            self.coefficients
                .iter()
                .enumerate()
                .map(|(offset, coefficient)| {
                    coefficient
                        * extended(series, index as isize + offset as isize - half, self.padding)
                })
                .sum::<Real>()
        });
        if self.padding == Padding::Interpolate {
            self.interpolate_edges(series, &mut output);
        }
        Ok(output)
    }

    fn interpolate_edges(&self, series: ArrayView1<Real>, output: &mut Array1<Real>) {
        let length = series.len();
        let window = self.window_length;
        let half = window / 2;

        let head = self.edge_values(series.slice(s![..window]), 0..half);
        output.slice_mut(s![..half]).assign(&head);

        let tail = self.edge_values(series.slice(s![length - window..]), window - half..window);
        output.slice_mut(s![length - half..]).assign(&tail);
    }

    /// Fits a polynomial to a full window and evaluates its derivative at the given
    /// positions within the window.
    fn edge_values(&self, window: ArrayView1<Real>, positions: Range<usize>) -> Array1<Real> {
        let scale = (self.window_length - 1) as Real;
        let points: Vec<Real> = (0..self.window_length)
            .map(|position| position as Real / scale)
            .collect();
        let polynomial = least_squares_polynomial(&points, window, self.degree);
        let divisor = (scale * self.delta).powi(self.derivative as i32);
        positions
            .map(|position| {
                let point = position as Real / scale;
                polynomial
                    .iter()
                    .enumerate()
                    .skip(self.derivative)
                    .map(|(power, coefficient)| {
                        coefficient
                            * falling_factorial(power, self.derivative)
                            * point.powi((power - self.derivative) as i32)
                    })
                    .sum::<Real>()
                    / divisor
            })
            .collect()
    }
}

/// Applies a Savitzky-Golay filter to a series.
pub fn savitzky_golay(
    series: ArrayView1<Real>,
    window_length: usize,
    degree: usize,
    derivative: usize,
    sampling_rate: Real,
    padding: Padding,
) -> Result<Array1<Real>, ValidationError> {
    SavitzkyGolay::new(window_length, degree, derivative, sampling_rate, padding)?.apply(series)
}

/// Value of the padded series at `index`, which may lie outside the series.
pub(crate) fn extended(series: ArrayView1<Real>, index: isize, padding: Padding) -> Real {
    let length = series.len() as isize;
    let index = if (0..length).contains(&index) {
        index
    } else {
        match padding {
            Padding::Constant(value) => return value,
            Padding::Nearest | Padding::Interpolate => index.clamp(0, length - 1),
            Padding::Wrap => index.rem_euclid(length),
            Padding::Mirror if length == 1 => 0,
            Padding::Mirror => {
                let period = 2 * (length - 1);
                let index = index.rem_euclid(period);
                if index < length { index } else { period - index }
            }
        }
    };
    series[index as usize]
}

fn coefficients(window_length: usize, degree: usize, derivative: usize, delta: Real) -> Vec<Real> {
    if derivative > degree {
        return vec![0.0; window_length];
    }
    let half = (window_length / 2) as Real;
    // Positions within the window scaled to [-1, 1] to keep the normal equations well
    // conditioned.
    let points: Vec<Real> = (0..window_length)
        .map(|position| (position as Real - half) / half)
        .collect();
    let mut target = vec![0.0; degree + 1];
    if let Some(value) = target.get_mut(derivative) {
        *value = falling_factorial(derivative, derivative) / (half * delta).powi(derivative as i32);
    }
    let weights = solve(gram_matrix(&points, degree), target);
    points
        .iter()
        .map(|point| {
            weights
                .iter()
                .enumerate()
                .map(|(power, weight)| weight * point.powi(power as i32))
                .sum()
        })
        .collect()
}

/// Coefficients, lowest power first, of the least squares polynomial through the points.
fn least_squares_polynomial(points: &[Real], values: ArrayView1<Real>, degree: usize) -> Vec<Real> {
    let moments = (0..=degree)
        .map(|power| {
            points
                .iter()
                .zip(values.iter())
                .map(|(point, value)| point.powi(power as i32) * value)
                .sum()
        })
        .collect();
    solve(gram_matrix(points, degree), moments)
}

/// `G[a][b] = sum(x^(a + b))` over the points.
fn gram_matrix(points: &[Real], degree: usize) -> Vec<Vec<Real>> {
    (0..=degree)
        .map(|row| {
            (0..=degree)
                .map(|column| points.iter().map(|x| x.powi((row + column) as i32)).sum())
                .collect()
        })
        .collect()
}

/// Solves the square system by Gaussian elimination with partial pivoting.
///
/// The Gram matrices passed here are positive definite as the window is longer than the
/// polynomial degree.
fn solve(mut matrix: Vec<Vec<Real>>, mut rhs: Vec<Real>) -> Vec<Real> {
    let size = rhs.len();
    for column in 0..size {
        let pivot = (column..size)
            .max_by(|&a, &b| matrix[a][column].abs().total_cmp(&matrix[b][column].abs()))
            .unwrap_or(column);
        matrix.swap(column, pivot);
        rhs.swap(column, pivot);
        for row in column + 1..size {
            let factor = matrix[row][column] / matrix[column][column];
            for k in column..size {
                matrix[row][k] -= factor * matrix[column][k];
            }
            rhs[row] -= factor * rhs[column];
        }
    }
    let mut solution = vec![0.0; size];
    for row in (0..size).rev() {
        let known: Real = (row + 1..size)
            .map(|k| matrix[row][k] * solution[k])
            .sum();
        solution[row] = (rhs[row] - known) / matrix[row][row];
    }
    solution
}

/// `n! / (n - k)!`
fn falling_factorial(n: usize, k: usize) -> Real {
    (n + 1 - k..=n).map(|factor| factor as Real).product()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use ndarray::array;

    #[test]
    fn smoothing_coefficients() {
        let filter = SavitzkyGolay::new(5, 2, 0, 1.0, Padding::Nearest).unwrap();
        let expected = [-3.0, 12.0, 17.0, 12.0, -3.0].map(|value| value / 35.0);
        for (coefficient, expected) in filter.coefficients().iter().zip(expected) {
            assert_approx_eq!(coefficient, expected);
        }
    }

    #[test]
    fn first_derivative_coefficients() {
        let filter = SavitzkyGolay::new(5, 2, 1, 1.0, Padding::Nearest).unwrap();
        let expected = [-2.0, -1.0, 0.0, 1.0, 2.0].map(|value| value / 10.0);
        for (coefficient, expected) in filter.coefficients().iter().zip(expected) {
            assert_approx_eq!(coefficient, expected);
        }
    }

    #[test]
    fn single_sample_is_preserved() {
        let output = savitzky_golay(array![1.0].view(), 3, 1, 0, 1.0, Padding::Nearest).unwrap();
        assert_eq!(output.len(), 1);
        assert_approx_eq!(output[0], 1.0);
    }

    #[test]
    fn single_sample_without_padding_fails() {
        assert_eq!(
            savitzky_golay(array![1.0].view(), 3, 1, 0, 1.0, Padding::Interpolate),
            Err(ValidationError::WindowExceedsSamples {
                window_length: 3,
                length: 1
            })
        );
    }

    #[test]
    fn derivative_of_linear_series_without_padding() {
        let series = Array1::from_iter((0..10).map(|value| 2.0 * value as Real));
        let output = savitzky_golay(series.view(), 5, 2, 1, 1000.0, Padding::Interpolate).unwrap();
        for value in output {
            assert_approx_eq!(value, 2000.0, 1e-6);
        }
    }

    #[test]
    fn second_derivative_of_quadratic() {
        let series = Array1::from_iter((0..9).map(|value| (value as Real).powi(2)));
        let output = savitzky_golay(series.view(), 5, 2, 2, 1.0, Padding::Interpolate).unwrap();
        for value in output {
            assert_approx_eq!(value, 2.0, 1e-6);
        }
    }

    #[test]
    fn derivative_above_degree_is_zero() {
        let output =
            savitzky_golay(array![1.0, 4.0, 9.0].view(), 3, 1, 2, 1.0, Padding::Nearest).unwrap();
        assert_eq!(output, array![0.0, 0.0, 0.0]);
    }

    #[test]
    fn padding_modes() {
        let series = array![1.0, 2.0, 3.0, 4.0];
        let view = series.view();
        assert_eq!(extended(view, -2, Padding::Mirror), 3.0);
        assert_eq!(extended(view, 5, Padding::Mirror), 2.0);
        assert_eq!(extended(view, -2, Padding::Nearest), 1.0);
        assert_eq!(extended(view, 5, Padding::Wrap), 2.0);
        assert_eq!(extended(view, -1, Padding::Constant(7.0)), 7.0);
    }

    #[test]
    fn filter_output_at_padded_edges() {
        // A linear fit over three samples is their mean.
        let series = array![1.0, 2.0, 3.0, 4.0];
        for (padding, first, last) in [
            (Padding::Mirror, 5.0 / 3.0, 10.0 / 3.0),
            (Padding::Nearest, 4.0 / 3.0, 11.0 / 3.0),
            (Padding::Wrap, 7.0 / 3.0, 8.0 / 3.0),
            (Padding::Constant(0.0), 1.0, 7.0 / 3.0),
        ] {
            let output = savitzky_golay(series.view(), 3, 1, 0, 1.0, padding).unwrap();
            assert_approx_eq!(output[0], first);
            assert_approx_eq!(output[1], 2.0);
            assert_approx_eq!(output[2], 3.0);
            assert_approx_eq!(output[3], last);
        }
    }

    #[test]
    fn mirrored_quadratic_is_symmetric_at_the_edge() {
        let series = array![0.0, 1.0, 4.0, 9.0, 16.0];
        let output = savitzky_golay(series.view(), 5, 2, 0, 1.0, Padding::Mirror).unwrap();
        assert_approx_eq!(output[0], 0.0);
        assert_approx_eq!(output[2], 4.0);
        let slope = savitzky_golay(series.view(), 5, 2, 1, 1.0, Padding::Mirror).unwrap();
        assert_approx_eq!(slope[0], 0.0);
    }

    #[test]
    fn parameters_are_validated() {
        assert_eq!(
            SavitzkyGolay::new(4, 2, 1, 1.0, Padding::Nearest),
            Err(ValidationError::EvenWindowLength(4))
        );
        assert_eq!(
            SavitzkyGolay::new(5, 5, 1, 1.0, Padding::Nearest),
            Err(ValidationError::DegreeNotLessThanWindow {
                degree: 5,
                window_length: 5
            })
        );
        assert!(matches!(
            SavitzkyGolay::new(5, 0, 1, 1.0, Padding::Nearest),
            Err(ValidationError::NotPositive { name: "degree", .. })
        ));
    }

    #[test]
    fn padding_from_str() {
        assert_eq!("mirror".parse::<Padding>(), Ok(Padding::Mirror));
        assert_eq!("none".parse::<Padding>(), Ok(Padding::Interpolate));
        assert_eq!("0.5".parse::<Padding>(), Ok(Padding::Constant(0.5)));
        assert!("reflect".parse::<Padding>().is_err());
    }
}
