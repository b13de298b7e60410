use num::Num;
use serde::Deserialize;
use std::{
    env::{self, VarError},
    num::{ParseFloatError, ParseIntError},
    ops::RangeInclusive,
    str::FromStr,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum JsonValueError {
    #[error("Cannot Extract Environment Variable: {0}")]
    EnvVar(#[from] VarError),
    #[error("Invalid String to Float: {0}")]
    FloatFromStr(#[from] ParseFloatError),
    #[error("Invalid String to Int: {0}")]
    IntFromStr(#[from] ParseIntError),
    #[error("Invalid Normal Distribution: {0}")]
    NormalDistribution(#[from] rand_distr::NormalError),
}

/// A number given literally, or read from an environment variable.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum NumConstant<T> {
    Const(T),
    FromEnvVar(String),
}

impl<T> NumConstant<T>
where
    T: Num + FromStr + Copy,
    JsonValueError: From<<T as FromStr>::Err>,
{
    pub(crate) fn value(&self) -> Result<T, JsonValueError> {
        match self {
            Self::Const(v) => Ok(*v),
            Self::FromEnvVar(environment_variable) => Ok(env::var(environment_variable)?.parse()?),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct Interval<T>
where
    T: Clone,
{
    pub(crate) min: T,
    pub(crate) max: T,
}

impl<T: PartialOrd + Copy> Interval<T> {
    pub(crate) fn range_inclusive(&self) -> RangeInclusive<T> {
        self.min..=self.max
    }

    pub(crate) fn is_in(&self, value: T) -> bool {
        self.range_inclusive().contains(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_from_json() {
        let constant: NumConstant<f64> = serde_json::from_str(r#"{ "const": 2.5 }"#).unwrap();
        assert_eq!(constant.value().unwrap(), 2.5);
    }

    #[test]
    fn constant_from_missing_env_var() {
        let constant: NumConstant<usize> =
            serde_json::from_str(r#"{ "from-env-var": "GAZE_SIMULATOR_UNSET_VARIABLE" }"#)
                .unwrap();
        assert!(matches!(constant.value(), Err(JsonValueError::EnvVar(_))));
    }

    #[test]
    fn interval_is_inclusive() {
        let interval = Interval { min: 2, max: 4 };
        assert!(interval.is_in(2));
        assert!(interval.is_in(4));
        assert!(!interval.is_in(5));
    }
}
