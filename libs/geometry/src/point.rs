//! 2-D points.

use serde::{Deserialize, Serialize};

use crate::dir::Dir;
use crate::snap::{round_half_even, snap_to_grid};
use crate::transform::{TransformMut, Transformation, TranslateMut};

/// A point on the integer layout grid, in database units.
#[derive(
    Debug, Copy, Clone, Default, Hash, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct Point {
    /// The x-coordinate of the point.
    pub x: i64,
    /// The y-coordinate of the point.
    pub y: i64,
}

impl Point {
    /// Creates a new [`Point`] from (x,y) coordinates.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Creates a new point from the given direction and coordinates.
    ///
    /// If `dir` is [`Dir::Horiz`], `a` becomes the x-coordinate and `b` becomes the y-coordinate.
    /// If `dir` is [`Dir::Vert`], `a` becomes the y-coordinate and `b` becomes the x-coordinate.
    pub const fn from_dir_coords(dir: Dir, a: i64, b: i64) -> Self {
        match dir {
            Dir::Horiz => Self::new(a, b),
            Dir::Vert => Self::new(b, a),
        }
    }

    /// Returns the origin, `(0, 0)`.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let origin = Point::zero();
    /// assert_eq!(origin, Point::new(0, 0));
    /// ```
    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0, y: 0 }
    }

    /// Gets the coordinate associated with direction `dir`.
    pub const fn coord(&self, dir: Dir) -> i64 {
        match dir {
            Dir::Horiz => self.x,
            Dir::Vert => self.y,
        }
    }

    /// The Manhattan (L1) distance between two points.
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// assert_eq!(Point::new(1, 2).manhattan_distance(Point::new(-2, 6)), 7);
    /// ```
    pub fn manhattan_distance(&self, other: Point) -> i64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// The dot product of the two points viewed as vectors.
    pub const fn dot(&self, other: Point) -> i64 {
        self.x * other.x + self.y * other.y
    }

    /// Scales both coordinates by `factor`.
    pub const fn scale(&self, factor: i64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Snaps the x and y coordinates of this point to the nearest multiple of `grid`.
    #[inline]
    pub fn snap_to_grid(&self, grid: i64) -> Self {
        Self::new(snap_to_grid(self.x, grid), snap_to_grid(self.y, grid))
    }

    /// Converts this point to continuous coordinates.
    pub fn to_dpoint(&self) -> DPoint {
        DPoint::new(self.x as f64, self.y as f64)
    }
}

impl TranslateMut for Point {
    fn translate_mut(&mut self, p: Point) {
        self.x += p.x;
        self.y += p.y;
    }
}

impl TransformMut for Point {
    fn transform_mut(&mut self, trans: Transformation) {
        *self = trans.mat * *self + trans.b;
    }
}

impl std::ops::Add<Point> for Point {
    type Output = Self;
    fn add(self, rhs: Point) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign<Point> for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub<Point> for Point {
    type Output = Self;
    fn sub(self, rhs: Point) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::SubAssign<Point> for Point {
    fn sub_assign(&mut self, rhs: Point) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl std::ops::Neg for Point {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

impl From<(i64, i64)> for Point {
    fn from(value: (i64, i64)) -> Self {
        Self {
            x: value.0,
            y: value.1,
        }
    }
}

/// A point with continuous coordinates.
///
/// Used for user-facing coordinates (e.g. micrometers) and for curve
/// sampling before geometry is committed to the integer grid.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, PartialOrd)]
pub struct DPoint {
    /// The x-coordinate of the point.
    pub x: f64,
    /// The y-coordinate of the point.
    pub y: f64,
}

impl DPoint {
    /// Creates a new [`DPoint`] from (x,y) coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the origin, `(0, 0)`.
    pub const fn zero() -> Self {
        Self { x: 0., y: 0. }
    }

    /// The Euclidean norm of the point viewed as a vector.
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// The Euclidean distance to `other`.
    pub fn distance(&self, other: DPoint) -> f64 {
        (*self - other).norm()
    }

    /// Rotates the point counterclockwise about the origin by `degrees`.
    ///
    /// ```
    /// # use geometry::point::DPoint;
    /// # use approx::assert_abs_diff_eq;
    /// let p = DPoint::new(1., 0.).rotate(90.);
    /// assert_abs_diff_eq!(p.x, 0., epsilon = 1e-12);
    /// assert_abs_diff_eq!(p.y, 1., epsilon = 1e-12);
    /// ```
    pub fn rotate(&self, degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Scales both coordinates by `factor`.
    pub fn scale(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Converts to grid units of size `pitch`, rounding half to even.
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let p = DPoint::new(2.5, -0.004);
    /// assert_eq!(p.to_grid(1.), Point::new(2, 0));
    /// assert_eq!(p.to_grid(0.001), Point::new(2500, -4));
    /// ```
    pub fn to_grid(&self, pitch: f64) -> Point {
        Point::new(
            round_half_even(self.x / pitch),
            round_half_even(self.y / pitch),
        )
    }
}

impl std::ops::Add<DPoint> for DPoint {
    type Output = Self;
    fn add(self, rhs: DPoint) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub<DPoint> for DPoint {
    type Output = Self;
    fn sub(self, rhs: DPoint) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(f64, f64)> for DPoint {
    fn from(value: (f64, f64)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl approx::AbsDiffEq for DPoint {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.x.abs_diff_eq(&other.x, epsilon) && self.y.abs_diff_eq(&other.y, epsilon)
    }
}

impl approx::RelativeEq for DPoint {
    fn default_max_relative() -> Self::Epsilon {
        f64::EPSILON
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.x.relative_eq(&other.x, epsilon, max_relative)
            && self.y.relative_eq(&other.y, epsilon, max_relative)
    }
}
