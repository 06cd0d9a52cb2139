//! Photonix error types.

use std::sync::Arc;

use arcstr::ArcStr;
use geometry::prelude::*;

/// The result type returned by photonix operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A component generation or routing error.
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    /// Invalid or contradictory parameters.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A bend is tighter than its cross-section allows.
    #[error(
        "bend `{cell}` reaches a minimum radius of {radius_min} um, \
         below the {declared} um allowed by cross-section `{cross_section}` \
         (set `allow_min_radius_violation` to override)"
    )]
    RadiusViolation {
        /// The bend being generated.
        cell: ArcStr,
        /// The cross-section declaring the minimum.
        cross_section: ArcStr,
        /// The achieved minimum radius, in micrometers.
        radius_min: f64,
        /// The declared minimum radius, in micrometers.
        declared: f64,
    },
    /// The backbone builder could not connect the two ports.
    #[error("no Manhattan path from port `{port1}` to port `{port2}`: {reason}")]
    NoPath {
        /// The start port.
        port1: ArcStr,
        /// The end port.
        port2: ArcStr,
        /// Why synthesis failed.
        reason: String,
    },
    /// Bends and tapers do not fit along a backbone segment.
    #[error(
        "insufficient space routing `{port1}` to `{port2}`: segment {segment} \
         from {from:?} to {to:?} is {available} dbu long but needs {required} dbu"
    )]
    InsufficientSpace {
        /// The start port.
        port1: ArcStr,
        /// The end port.
        port2: ArcStr,
        /// The index of the backbone segment.
        segment: usize,
        /// The segment start.
        from: Point,
        /// The segment end.
        to: Point,
        /// The segment length.
        available: i64,
        /// The length consumed by bends and tapers on the segment.
        required: i64,
    },
    /// A placed element's port does not land on its backbone target.
    #[error(
        "port `{port}` of `{element}` does not coincide with the route: \
         expected {expected:?} facing {expected_orientation}, \
         found {found:?} facing {found_orientation}"
    )]
    ConnectionMismatch {
        /// The placed element.
        element: ArcStr,
        /// The port that failed to line up.
        port: ArcStr,
        /// Where the port should be.
        expected: Point,
        /// Where the port is.
        found: Point,
        /// The orientation the port should have.
        expected_orientation: f64,
        /// The orientation the port has.
        found_orientation: f64,
    },
    /// A port direction could not be used.
    #[error("port orientation error: {0}")]
    PortOrientation(String),
    /// A layout IR operation failed.
    #[error(transparent)]
    Layout(#[from] layir::Error),
    /// A cache key could not be built.
    #[error(transparent)]
    Cache(#[from] cache::Error),
    /// A PDK file could not be parsed.
    #[error("failed to parse PDK: {0}")]
    PdkParse(String),
    /// A PDK file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] Arc<std::io::Error>),
}

impl Error {
    /// Creates a [`Error::Configuration`] from a message.
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(Arc::new(value))
    }
}

impl From<toml::de::Error> for Error {
    fn from(value: toml::de::Error) -> Self {
        Self::PdkParse(value.to_string())
    }
}
