//! 2-D geometric operations relevant to photonic layout on an integer grid.
//!
//! # Examples
//!
//! Create a [rectangle](crate::rect::Rect):
//!
//! ```
//! # use geometry::prelude::*;
//! let rect = Rect::from_sides(10, 20, 30, 40);
//! ```
#![warn(missing_docs)]

extern crate self as geometry;

pub mod bbox;
pub mod cardinal;
pub mod dir;
pub mod orientation;
pub mod point;
pub mod polygon;
pub mod prelude;
pub mod rect;
pub mod shape;
pub mod snap;
pub mod transform;

/// Wraps the given angle to the interval `[0, 360)` degrees.
///
/// # Examples
///
/// ```
/// use geometry::wrap_angle;
///
/// assert_eq!(wrap_angle(10.), 10.);
/// assert_eq!(wrap_angle(-10.), 350.);
/// assert_eq!(wrap_angle(-740.), 340.);
/// assert_eq!(wrap_angle(725.), 5.);
/// assert_eq!(wrap_angle(360.), 0.);
/// assert_eq!(wrap_angle(-360.), 0.);
/// ```
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = ((angle % 360.) + 360.) % 360.;
    // `-1e-20 % 360 + 360` rounds to exactly 360.
    if wrapped >= 360. {
        0.
    } else {
        wrapped
    }
}

/// Returns `true` if the two angles (in degrees) describe the same direction
/// to within `1e-6` degrees.
///
/// ```
/// use geometry::angles_match;
///
/// assert!(angles_match(0., 360.));
/// assert!(angles_match(-90., 270.));
/// assert!(!angles_match(0., 180.));
/// ```
pub fn angles_match(a: f64, b: f64) -> bool {
    let diff = wrap_angle(a - b);
    diff < 1e-6 || 360. - diff < 1e-6
}
