//! Error types for the retarded-interaction core and its configuration layer.

use std::path::PathBuf;
use thiserror::Error;

/// Failures of the core simulation machinery.
///
/// These are all programmer or configuration errors (e.g. a pre-roll region
/// too shallow for the dot geometry) and are never retried: the computation
/// is deterministic, so repeating it with the same inputs cannot succeed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BlochError {
    #[error("dots {src} and {dst} coincide: separation {distance:e} is below tolerance {tolerance:e}")]
    DegenerateGeometry {
        src: usize,
        dst: usize,
        distance: f64,
        tolerance: f64,
    },

    #[error("history time {time} lies outside [{start}, {end})")]
    OutOfRange { time: isize, start: isize, end: isize },

    #[error("cannot step past the history capacity of {capacity}")]
    CapacityExceeded { capacity: usize },

    #[error("interpolation offset {0} lies outside [0, 1)")]
    InvalidOffset(f64),

    #[error("no dot with index {dot} (system holds {ndots})")]
    NoSuchDot { dot: usize, ndots: usize },

    #[error("no history slot at level {level}, component {component}")]
    NoSuchSlot { level: usize, component: usize },

    #[error("dot id {0} is used more than once")]
    DuplicateDot(usize),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Failures while loading or validating a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Model(#[from] BlochError),
}
