use super::utils::{Interval, JsonValueError, NumConstant};
use gaze_events_common::Real;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::Deserialize;
use std::collections::VecDeque;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct NoiseSource {
    attributes: NoiseAttributes,
    /// Length of the moving average window to apply to the noise.
    /// If no smoothing is required, omit it or set it to
    /// ```json
    /// "smoothing-window-length": { "const": 1 }
    /// ```
    #[serde(default = "unsmoothed")]
    smoothing_window_length: NumConstant<usize>,
}

fn unsmoothed() -> NumConstant<usize> {
    NumConstant::Const(1)
}

impl NoiseSource {
    pub(crate) fn sample<R: Rng>(&self, rng: &mut R) -> Result<Real, JsonValueError> {
        match &self.attributes {
            NoiseAttributes::Uniform(Interval { min, max }) => {
                let min = min.value()?;
                Ok((max.value()? - min) * rng.random::<Real>() + min)
            }
            NoiseAttributes::Gaussian { mean, sd } => {
                Ok(Normal::new(mean.value()?, sd.value()?)?.sample(rng))
            }
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "noise-type")]
pub(crate) enum NoiseAttributes {
    Uniform(Interval<NumConstant<Real>>),
    Gaussian {
        mean: NumConstant<Real>,
        sd: NumConstant<Real>,
    },
}

/// Adds smoothed noise to a series, one sample at a time.
pub(crate) struct Noise<'a> {
    source: &'a NoiseSource,
    prev: VecDeque<Real>,
}

impl<'a> Noise<'a> {
    pub(crate) fn new(source: &'a NoiseSource) -> Self {
        Self {
            source,
            prev: Default::default(),
        }
    }

    pub(crate) fn noisify<R: Rng>(&mut self, value: Real, rng: &mut R) -> Result<Real, JsonValueError> {
        let window_len = self.source.smoothing_window_length.value()?.max(1);
        while self.prev.len() >= window_len {
            self.prev.pop_front();
        }
        self.prev.push_back(self.source.sample(rng)?);
        Ok(value + self.prev.iter().sum::<Real>() / self.prev.len() as Real)
    }
}
