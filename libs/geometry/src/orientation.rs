//! Utilities and types for orienting layout objects.

use serde::{Deserialize, Serialize};

use crate::transform::Rotation;
use crate::wrap_angle;

/// An orientation of a geometric object.
///
/// Captures reflection and rotation, but not position or scaling.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Orientation {
    /// Reflect vertically (ie. about the x-axis).
    ///
    /// Applied before rotation.
    pub(crate) reflect_vert: bool,
    /// Counterclockwise rotation.
    ///
    /// Applied after reflecting vertically.
    pub(crate) angle: Rotation,
}

impl Orientation {
    /// Creates a new orientation with the given reflection and angle settings.
    #[inline]
    pub fn from_reflect_and_angle(reflect_vert: bool, angle: Rotation) -> Self {
        Self {
            reflect_vert,
            angle,
        }
    }

    /// Returns the identity orientation.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Whether this orientation reflects about the x-axis.
    #[inline]
    pub fn reflect_vert(&self) -> bool {
        self.reflect_vert
    }

    /// The counterclockwise rotation applied after any reflection.
    #[inline]
    pub fn angle(&self) -> Rotation {
        self.angle
    }

    /// Maps a direction angle (in degrees) through this orientation.
    ///
    /// The result is wrapped to `[0, 360)`.
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// # use geometry::transform::Rotation;
    /// let o = Orientation::from_reflect_and_angle(true, Rotation::R90);
    /// assert_eq!(o.apply_angle(30.), 60.);
    /// assert_eq!(Orientation::identity().apply_angle(-90.), 270.);
    /// ```
    pub fn apply_angle(&self, angle: f64) -> f64 {
        let reflected = if self.reflect_vert { -angle } else { angle };
        wrap_angle(reflected + self.angle.degrees())
    }
}

impl From<Rotation> for Orientation {
    fn from(value: Rotation) -> Self {
        Self {
            reflect_vert: false,
            angle: value,
        }
    }
}
