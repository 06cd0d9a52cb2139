//! Layout IR error types.

use arcstr::ArcStr;

/// The result type returned by layout IR operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A layout IR error.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A port was created with a non-positive width.
    #[error("port `{port}` has invalid width {width} (must be positive)")]
    InvalidWidth {
        /// The port name.
        port: ArcStr,
        /// The offending width, in database units.
        width: i64,
    },
    /// An operation required a port orientation, but the port has none.
    #[error("port `{0}` has no orientation")]
    UndefinedOrientation(ArcStr),
    /// Two ports in one cell would share a name.
    #[error("cell `{cell}` already has a port named `{port}`")]
    DuplicatePort {
        /// The cell name.
        cell: ArcStr,
        /// The duplicated port name.
        port: ArcStr,
    },
    /// A port lookup failed.
    #[error("cell `{cell}` has no port named `{port}`")]
    MissingPort {
        /// The cell (or instance) name.
        cell: ArcStr,
        /// The requested port name.
        port: ArcStr,
    },
    /// An instance lookup failed.
    #[error("cell `{cell}` has no instance named `{instance}`")]
    MissingInstance {
        /// The cell name.
        cell: ArcStr,
        /// The requested instance name.
        instance: ArcStr,
    },
    /// A port type string could not be parsed.
    #[error("invalid port type `{0}` (expected optical, electrical, placement, or vertical_<kind>)")]
    InvalidPortType(String),
}
