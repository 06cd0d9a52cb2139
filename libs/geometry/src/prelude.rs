//! An import prelude that re-exports commonly used items.

pub use crate::bbox::Bbox;
pub use crate::cardinal::{Cardinal, Cardinals};
pub use crate::dir::Dir;
pub use crate::orientation::Orientation;
pub use crate::point::{DPoint, Point};
pub use crate::polygon::Polygon;
pub use crate::rect::Rect;
pub use crate::shape::Shape;
pub use crate::transform::{Rotation, Transform, Transformation, Translate};
