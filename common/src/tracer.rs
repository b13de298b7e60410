//! Installs the global tracing subscriber.
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Error)]
pub enum TracerError {
    #[error("Invalid log filter \"{filter}\": {source}")]
    Filter {
        filter: String,
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("Tracing subscriber already installed: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Options used to initialise the tracing subscriber.
#[derive(Clone, Debug)]
pub struct TracerOptions {
    /// A filter in the `RUST_LOG` syntax, e.g. `info` or `gaze_to_events=trace`.
    /// If `None`, the `RUST_LOG` environment variable is used, falling back to `info`.
    log_filter: Option<String>,
}

impl TracerOptions {
    pub fn new(log_filter: Option<&str>) -> Self {
        Self {
            log_filter: log_filter.map(ToOwned::to_owned),
        }
    }

    fn env_filter(&self) -> Result<EnvFilter, TracerError> {
        match &self.log_filter {
            Some(filter) => EnvFilter::try_new(filter).map_err(|source| TracerError::Filter {
                filter: filter.clone(),
                source,
            }),
            None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))),
        }
    }
}

/// Installs a formatting subscriber writing to stderr, so that stdout remains free for data.
pub fn init_tracer(options: &TracerOptions) -> Result<(), TracerError> {
    let filter = options.env_filter()?;
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    debug!("Tracing initialised with {options:?}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_filter_is_reported() {
        let options = TracerOptions::new(Some("gaze_to_events=notalevel"));
        assert!(matches!(
            options.env_filter(),
            Err(TracerError::Filter { .. })
        ));
    }

    #[test]
    fn explicit_filter_is_accepted() {
        let options = TracerOptions::new(Some("gaze_to_events=trace,info"));
        assert!(options.env_filter().is_ok());
    }
}
