//! Directional bucketing of ports.

use geometry::prelude::*;
use geometry::wrap_angle;

use crate::Port;

/// Maps an orientation to the side of a cell it faces.
///
/// Buckets are half-open: East is `[315, 360) ∪ [0, 45)`, North `[45, 135)`,
/// West `[135, 225)` and South `[225, 315)`. A port without an orientation
/// is treated as facing South.
///
/// ```
/// # use geometry::prelude::*;
/// # use photonix::ports::classify;
/// assert_eq!(classify(Some(44.9)), Cardinal::East);
/// assert_eq!(classify(Some(45.)), Cardinal::North);
/// assert_eq!(classify(Some(-45.)), Cardinal::East);
/// assert_eq!(classify(None), Cardinal::South);
/// ```
pub fn classify(orientation: Option<f64>) -> Cardinal {
    let Some(angle) = orientation else {
        return Cardinal::South;
    };
    let angle = wrap_angle(angle);
    if !(45.0..315.0).contains(&angle) {
        Cardinal::East
    } else if angle < 135. {
        Cardinal::North
    } else if angle < 225. {
        Cardinal::West
    } else {
        Cardinal::South
    }
}

/// Groups ports by the side they face, preserving input order within each side.
pub fn bucket_ports<'a>(ports: impl IntoIterator<Item = &'a Port>) -> Cardinals<Vec<&'a Port>> {
    let mut buckets = Cardinals::new(Vec::new(), Vec::new(), Vec::new(), Vec::new());
    for port in ports {
        buckets[classify(port.orientation())].push(port);
    }
    buckets
}
