//! Descriptive statistics which ignore missing (`NaN`) values.
//!
//! Each function returns `NaN` if its input contains no valid values.
use super::Real;

pub fn nan_min(values: impl IntoIterator<Item = Real>) -> Real {
    values
        .into_iter()
        .filter(|value| !value.is_nan())
        .reduce(Real::min)
        .unwrap_or(Real::NAN)
}

pub fn nan_max(values: impl IntoIterator<Item = Real>) -> Real {
    values
        .into_iter()
        .filter(|value| !value.is_nan())
        .reduce(Real::max)
        .unwrap_or(Real::NAN)
}

pub fn nan_mean(values: impl IntoIterator<Item = Real>) -> Real {
    let (count, sum) = values
        .into_iter()
        .filter(|value| !value.is_nan())
        .fold((0usize, 0.0), |(count, sum), value| (count + 1, sum + value));
    if count == 0 {
        Real::NAN
    } else {
        sum / count as Real
    }
}

/// Population standard deviation.
pub fn nan_std(values: impl IntoIterator<Item = Real>) -> Real {
    let values = valid(values);
    let mean = nan_mean(values.iter().copied());
    nan_mean(values.iter().map(|value| (value - mean).powi(2))).sqrt()
}

/// The median, taking the mean of the two central values for an even number of values.
pub fn nan_median(values: impl IntoIterator<Item = Real>) -> Real {
    let mut values = valid(values);
    values.sort_unstable_by(Real::total_cmp);
    let middle = values.len() / 2;
    match values.len() {
        0 => Real::NAN,
        len if len % 2 == 1 => values[middle],
        _ => 0.5 * (values[middle - 1] + values[middle]),
    }
}

fn valid(values: impl IntoIterator<Item = Real>) -> Vec<Real> {
    values.into_iter().filter(|value| !value.is_nan()).collect()
}

/// Running per-axis extent of a set of two-dimensional samples.
///
/// Used to compute the dispersion of a window that grows one sample at a time.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Extent {
    min: [Real; 2],
    max: [Real; 2],
}

impl Default for Extent {
    fn default() -> Self {
        Self {
            min: [Real::NAN; 2],
            max: [Real::NAN; 2],
        }
    }
}

impl Extent {
    pub(crate) fn from_samples(samples: impl IntoIterator<Item = [Real; 2]>) -> Self {
        samples.into_iter().fold(Self::default(), |mut extent, sample| {
            extent.push(sample);
            extent
        })
    }

    pub(crate) fn push(&mut self, sample: [Real; 2]) {
        for (axis, value) in sample.into_iter().enumerate() {
            // `Real::min` and `Real::max` return the non-NaN operand.
            self.min[axis] = self.min[axis].min(value);
            self.max[axis] = self.max[axis].max(value);
        }
    }

    /// Per-axis `max - min`, `NaN` on an axis without valid values.
    pub(crate) fn ranges(&self) -> [Real; 2] {
        [self.max[0] - self.min[0], self.max[1] - self.min[1]]
    }

    /// Sum of the per-axis ranges.
    pub(crate) fn dispersion(&self) -> Real {
        self.ranges().into_iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn nan_values_are_ignored() {
        let values = [3.0, Real::NAN, 1.0, 2.0];
        assert_eq!(nan_min(values), 1.0);
        assert_eq!(nan_max(values), 3.0);
        assert_eq!(nan_mean(values), 2.0);
        assert_eq!(nan_median(values), 2.0);
    }

    #[test]
    fn no_valid_values_is_nan() {
        let values = [Real::NAN, Real::NAN];
        assert!(nan_min(values).is_nan());
        assert!(nan_max(values).is_nan());
        assert!(nan_mean(values).is_nan());
        assert!(nan_median(values).is_nan());
        assert!(nan_std(values).is_nan());
        assert!(nan_median([]).is_nan());
    }

    #[test]
    fn median_of_even_count() {
        assert_eq!(nan_median([4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn population_standard_deviation() {
        assert_approx_eq!(nan_std([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 2.0);
    }

    #[test]
    fn extent_ignores_nan() {
        let mut extent = Extent::from_samples([[0.0, 1.0], [Real::NAN, Real::NAN], [2.0, 0.5]]);
        assert_eq!(extent.ranges(), [2.0, 0.5]);
        assert_eq!(extent.dispersion(), 2.5);
        extent.push([-1.0, Real::NAN]);
        assert_eq!(extent.dispersion(), 3.5);
    }

    #[test]
    fn extent_without_valid_values_is_nan() {
        let extent = Extent::from_samples([[Real::NAN, 1.0]]);
        assert!(extent.dispersion().is_nan());
    }
}
