//! Axis-aligned rectangles.

use serde::{Deserialize, Serialize};

use crate::bbox::Bbox;
use crate::cardinal::{Cardinal, Cardinals};
use crate::point::Point;
use crate::transform::{TransformMut, Transformation, TranslateMut};

/// An axis-aligned rectangle, specified by lower-left and upper-right corners.
#[derive(Debug, Default, Copy, Clone, Hash, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    /// The lower-left corner.
    p0: Point,
    /// The upper-right corner.
    p1: Point,
}

impl Rect {
    /// Creates a rectangle with corners `(left, bot), (right, top)`.
    ///
    /// # Panics
    ///
    /// Panics if `left` is greater than `right`, or if `bot` is greater than `top`.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides(10, 20, 30, 40);
    /// assert_eq!(rect.width(), 20);
    /// ```
    pub fn from_sides(left: i64, bot: i64, right: i64, top: i64) -> Self {
        assert!(
            left <= right && bot <= top,
            "invalid rectangle: left={left}, bot={bot}, right={right}, top={top}"
        );
        Self {
            p0: Point::new(left, bot),
            p1: Point::new(right, top),
        }
    }

    /// Creates a rectangle with corners `(left, bot), (right, top)`,
    /// returning [`None`] if the sides are out of order.
    pub fn from_sides_option(left: i64, bot: i64, right: i64, top: i64) -> Option<Self> {
        if left > right || bot > top {
            None
        } else {
            Some(Self::from_sides(left, bot, right, top))
        }
    }

    /// Creates a rectangle spanning the two given (unordered) corners.
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::new(Point::new(5, -2), Point::new(-1, 7));
    /// assert_eq!(rect, Rect::from_sides(-1, -2, 5, 7));
    /// ```
    pub fn new(a: Point, b: Point) -> Self {
        Self::from_sides(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
    }

    /// Creates a rectangle of the given width and height centered at `center`.
    ///
    /// Odd dimensions put the extra unit above/right of the center.
    pub fn from_center(center: Point, width: i64, height: i64) -> Self {
        let left = center.x - width / 2;
        let bot = center.y - height / 2;
        Self::from_sides(left, bot, left + width, bot + height)
    }

    /// The left edge coordinate.
    pub const fn left(&self) -> i64 {
        self.p0.x
    }

    /// The bottom edge coordinate.
    pub const fn bot(&self) -> i64 {
        self.p0.y
    }

    /// The right edge coordinate.
    pub const fn right(&self) -> i64 {
        self.p1.x
    }

    /// The top edge coordinate.
    pub const fn top(&self) -> i64 {
        self.p1.y
    }

    /// The lower-left corner.
    pub const fn lower_left(&self) -> Point {
        self.p0
    }

    /// The upper-right corner.
    pub const fn upper_right(&self) -> Point {
        self.p1
    }

    /// The horizontal extent.
    pub const fn width(&self) -> i64 {
        self.p1.x - self.p0.x
    }

    /// The vertical extent.
    pub const fn height(&self) -> i64 {
        self.p1.y - self.p0.y
    }

    /// The center point, rounded towards negative infinity.
    pub const fn center(&self) -> Point {
        Point::new(
            (self.p0.x + self.p1.x).div_euclid(2),
            (self.p0.y + self.p1.y).div_euclid(2),
        )
    }

    /// The midpoint of the given side.
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides(0, 0, 100, 40);
    /// assert_eq!(rect.side_center(Cardinal::West), Point::new(0, 20));
    /// assert_eq!(rect.side_center(Cardinal::North), Point::new(50, 40));
    /// ```
    pub fn side_center(&self, side: Cardinal) -> Point {
        let c = self.center();
        match side {
            Cardinal::East => Point::new(self.right(), c.y),
            Cardinal::North => Point::new(c.x, self.top()),
            Cardinal::West => Point::new(self.left(), c.y),
            Cardinal::South => Point::new(c.x, self.bot()),
        }
    }

    /// The length of the given side.
    pub fn side_length(&self, side: Cardinal) -> i64 {
        match side {
            Cardinal::East | Cardinal::West => self.height(),
            Cardinal::North | Cardinal::South => self.width(),
        }
    }

    /// The smallest rectangle containing both `self` and `other`.
    pub fn union(self, other: Self) -> Self {
        Self::from_sides(
            self.left().min(other.left()),
            self.bot().min(other.bot()),
            self.right().max(other.right()),
            self.top().max(other.top()),
        )
    }

    /// Expands the rectangle by `amount` on all sides.
    pub fn expand_all(&self, amount: i64) -> Self {
        Self::from_sides(
            self.left() - amount,
            self.bot() - amount,
            self.right() + amount,
            self.top() + amount,
        )
    }

    /// Expands each side of the rectangle by its own amount.
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides(0, 0, 10, 10);
    /// let grown = rect.expand_sides(Cardinals::new(1, 2, 0, 4));
    /// assert_eq!(grown, Rect::from_sides(0, -4, 11, 12));
    /// ```
    pub fn expand_sides(&self, amounts: Cardinals<i64>) -> Self {
        Self::from_sides(
            self.left() - amounts[Cardinal::West],
            self.bot() - amounts[Cardinal::South],
            self.right() + amounts[Cardinal::East],
            self.top() + amounts[Cardinal::North],
        )
    }

    /// The four corners, counterclockwise from the lower left.
    pub fn corners(&self) -> [Point; 4] {
        [
            self.p0,
            Point::new(self.p1.x, self.p0.y),
            self.p1,
            Point::new(self.p0.x, self.p1.y),
        ]
    }
}

impl Bbox for Rect {
    fn bbox(&self) -> Option<Rect> {
        Some(*self)
    }
}

impl TranslateMut for Rect {
    fn translate_mut(&mut self, p: Point) {
        self.p0.translate_mut(p);
        self.p1.translate_mut(p);
    }
}

impl TransformMut for Rect {
    fn transform_mut(&mut self, trans: Transformation) {
        let mut p0 = self.p0;
        let mut p1 = self.p1;
        p0.transform_mut(trans);
        p1.transform_mut(trans);
        *self = Rect::new(p0, p1);
    }
}
