//! Curved-bend geometry.

use geometry::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;

mod euler;

pub use euler::synthesize_bend;

/// A sampled bend centerline, in micrometers.
///
/// The path starts at the origin heading East (0 degrees) and ends heading
/// `angle` degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BendPath {
    /// The centerline samples, starting at the origin.
    pub points: Vec<DPoint>,
    /// The centerline length.
    pub length: f64,
    /// The smallest radius of curvature along the path.
    pub radius_min: f64,
    /// The radius of the circular arc with the same endpoints.
    pub radius_eff: f64,
    /// The x-coordinate of the end point.
    pub dx: f64,
    /// The y-coordinate of the end point.
    pub dy: f64,
    /// The signed turn, in degrees.
    pub angle: f64,
}

impl BendPath {
    /// The end point.
    pub fn end(&self) -> DPoint {
        DPoint::new(self.dx, self.dy)
    }
}

/// The parameters that fully determine a [`BendPath`].
///
/// Used as the bend cache key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BendSpec {
    /// The nominal radius, in micrometers.
    pub radius: f64,
    /// The signed turn, in degrees.
    pub angle: f64,
    /// The Euler fraction.
    pub p: f64,
    /// Whether `radius` is the effective (endpoint-matching) radius.
    pub effective_radius: bool,
    /// Points per full turn.
    pub npoints: usize,
}

impl BendSpec {
    /// Samples the bend described by this spec.
    pub fn synthesize(&self) -> Result<BendPath> {
        synthesize_bend(
            self.radius,
            self.angle,
            self.p,
            self.effective_radius,
            self.npoints,
        )
    }
}
