//! Non-fatal issues raised while generating components and routes.

use std::fmt::{Debug, Display};

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::pdk::GdsLayer;

/// A diagnostic issue that should be reported to users.
pub trait Diagnostic: Debug + Display {
    /// Returns an optional help message that should indicate
    /// what users need to do to resolve an issue.
    fn help(&self) -> Option<Box<dyn Display>> {
        None
    }

    /// Returns the severity of this issue.
    ///
    /// The default implementation returns [`Severity::default`].
    fn severity(&self) -> Severity {
        Default::default()
    }
}

/// An enumeration of possible severity levels.
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Severity {
    /// An informational message.
    Info,
    /// A warning.
    #[default]
    Warning,
    /// An error. Often, but not always, fatal.
    Error,
}

impl Severity {
    /// Returns log level corresponding to this severity.
    #[inline]
    pub const fn as_tracing_level(&self) -> Level {
        match *self {
            Self::Info => Level::INFO,
            Self::Warning => Level::WARN,
            Self::Error => Level::ERROR,
        }
    }

    /// Returns `true` if the severity is [`Severity::Error`].
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(*self, Self::Error)
    }
}

/// A collection of issues.
#[derive(Debug, Clone)]
pub struct IssueSet<T> {
    issues: Vec<T>,
    num_errors: usize,
    num_warnings: usize,
}

impl<T> IssueSet<T> {
    /// Creates a new, empty issue set.
    #[inline]
    pub fn new() -> Self {
        Self {
            issues: Vec::new(),
            num_errors: 0,
            num_warnings: 0,
        }
    }

    /// Returns an iterator over all issues in the set.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.issues.iter()
    }

    /// The number of issues in this issue set.
    #[inline]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Returns `true` if this issue set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl<T: Diagnostic> IssueSet<T> {
    /// Adds the given issue to the issue set.
    pub fn add(&mut self, issue: T) {
        match issue.severity() {
            Severity::Error => self.num_errors += 1,
            Severity::Warning => self.num_warnings += 1,
            Severity::Info => (),
        };
        self.issues.push(issue);
    }

    /// Returns `true` if this issue set contains an error.
    pub fn has_error(&self) -> bool {
        self.num_errors > 0
    }

    /// Returns `true` if this issue set contains a warning.
    pub fn has_warning(&self) -> bool {
        self.num_warnings > 0
    }

    /// The number of warnings in this issue set.
    #[inline]
    pub fn num_warnings(&self) -> usize {
        self.num_warnings
    }
}

impl<T> IntoIterator for IssueSet<T> {
    type Item = T;
    type IntoIter = <std::vec::Vec<T> as IntoIterator>::IntoIter;
    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_iter()
    }
}

impl<T> Default for IssueSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A non-fatal problem found while assembling a route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteIssue {
    cause: RouteCause,
    severity: Severity,
}

/// The cause of a [`RouteIssue`].
#[derive(Debug, Clone, PartialEq)]
pub enum RouteCause {
    /// A boundary port is joined directly to a route of a different width.
    WidthMismatch {
        /// The boundary port.
        port: ArcStr,
        /// The port width, in DBU.
        port_width: i64,
        /// The route cross-section width, in DBU.
        route_width: i64,
    },
    /// A width transition was needed, but no taper was given.
    TaperDisabled {
        /// The boundary port.
        port: ArcStr,
    },
    /// A boundary port is on a different layer than the route cross-section.
    LayerMismatch {
        /// The boundary port.
        port: ArcStr,
        /// The port layer.
        port_layer: GdsLayer,
        /// The route layer.
        route_layer: GdsLayer,
    },
}

impl RouteIssue {
    /// Creates a new route issue and logs it immediately.
    ///
    /// The log level will be selected according to the given severity.
    pub(crate) fn new_and_log(cause: RouteCause, severity: Severity) -> Self {
        let result = Self { cause, severity };
        match severity {
            Severity::Info => tracing::event!(Level::INFO, issue = ?result.cause, "{}", result),
            Severity::Warning => tracing::event!(Level::WARN, issue = ?result.cause, "{}", result),
            Severity::Error => tracing::event!(Level::ERROR, issue = ?result.cause, "{}", result),
        }
        result
    }

    /// The cause of this issue.
    #[inline]
    pub fn cause(&self) -> &RouteCause {
        &self.cause
    }
}

impl Diagnostic for RouteIssue {
    fn help(&self) -> Option<Box<dyn Display>> {
        match self.cause {
            RouteCause::WidthMismatch { .. } | RouteCause::TaperDisabled { .. } => Some(Box::new(
                "pass a taper or match the route cross-section width to the port",
            )),
            RouteCause::LayerMismatch { .. } => None,
        }
    }

    fn severity(&self) -> Severity {
        self.severity
    }
}

impl Display for RouteIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            RouteCause::WidthMismatch {
                port,
                port_width,
                route_width,
            } => write!(
                f,
                "port `{port}` has width {port_width} dbu but the route is {route_width} dbu wide"
            ),
            RouteCause::TaperDisabled { port } => {
                write!(f, "no taper available for port `{port}`; connecting directly")
            }
            RouteCause::LayerMismatch {
                port,
                port_layer,
                route_layer,
            } => write!(
                f,
                "port `{port}` is on layer {port_layer} but the route is on layer {route_layer}"
            ),
        }
    }
}
