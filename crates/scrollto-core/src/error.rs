use thiserror::Error;

/// Failures to resolve DOM nodes for a scroll request.
///
/// These travel through the position stream rather than being returned
/// directly, so every caller observes them on the same channel as positions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Unable to find Target Element")]
    TargetNotFound,

    #[error("Unable to find Container Element")]
    ContainerNotFound,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown easing: {0}")]
    UnknownEasing(String),

    #[error("Unsupported Event '{0}'")]
    UnsupportedEvent(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

pub type Result<T> = std::result::Result<T, Error>;
