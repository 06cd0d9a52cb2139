//! Integer coordinate polygons.

use serde::{Deserialize, Serialize};

use crate::bbox::Bbox;
use crate::point::Point;
use crate::rect::Rect;
use crate::transform::{TransformMut, Transformation, TranslateMut};

/// A simple polygon given by its vertices in order.
#[derive(Debug, Default, Clone, Hash, Serialize, Deserialize, PartialEq, Eq)]
pub struct Polygon {
    /// Vector of points that make up the polygon.
    points: Vec<Point>,
}

impl Polygon {
    /// Creates a polygon with given vertices.
    ///
    /// Consecutive duplicate vertices (including a closing vertex equal
    /// to the first) are removed.
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let polygon = Polygon::from_verts(vec![
    ///     Point::new(0, 0),
    ///     Point::new(0, 0),
    ///     Point::new(4, 0),
    ///     Point::new(4, 4),
    ///     Point::new(0, 0),
    /// ]);
    /// assert_eq!(polygon.points().len(), 3);
    /// ```
    pub fn from_verts(mut points: Vec<Point>) -> Self {
        points.dedup();
        while points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        Self { points }
    }

    /// Returns the vertices of the polygon.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Twice the signed area of the polygon; positive for counterclockwise vertex order.
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let square = Polygon::from_verts(vec![
    ///     Point::new(0, 0),
    ///     Point::new(2, 0),
    ///     Point::new(2, 2),
    ///     Point::new(0, 2),
    /// ]);
    /// assert_eq!(square.signed_area2(), 8);
    /// ```
    pub fn signed_area2(&self) -> i64 {
        let n = self.points.len();
        (0..n)
            .map(|i| {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                a.x * b.y - b.x * a.y
            })
            .sum()
    }
}

impl Bbox for Polygon {
    fn bbox(&self) -> Option<Rect> {
        let left = self.points.iter().map(|p| p.x).min()?;
        let bot = self.points.iter().map(|p| p.y).min()?;
        let right = self.points.iter().map(|p| p.x).max()?;
        let top = self.points.iter().map(|p| p.y).max()?;
        Rect::from_sides_option(left, bot, right, top)
    }
}

impl TranslateMut for Polygon {
    fn translate_mut(&mut self, p: Point) {
        self.points.translate_mut(p);
    }
}

impl TransformMut for Polygon {
    fn transform_mut(&mut self, trans: Transformation) {
        self.points.transform_mut(trans);
    }
}

impl From<Rect> for Polygon {
    fn from(value: Rect) -> Self {
        Self::from_verts(value.corners().to_vec())
    }
}
