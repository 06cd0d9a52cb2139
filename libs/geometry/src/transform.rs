//! Transformation types and traits.

use impl_trait_for_tuples::impl_for_tuples;
use serde::{Deserialize, Serialize};

use crate::orientation::Orientation;
use crate::point::Point;
use crate::wrap_angle;

/// A transformation representing a Manhattan translation, rotation, and/or reflection of geometry.
///
/// Points are first reflected (if requested), then rotated, then translated.
/// Scaling is not supported, so all transformation matrices are unitary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transformation {
    /// The transformation matrix.
    pub(crate) mat: TransformationMatrix,
    /// The x-y translation applied after the transformation.
    pub(crate) b: Point,
}

impl Default for Transformation {
    fn default() -> Self {
        Self::identity()
    }
}

/// A Manhattan rotation: 0, 90, 180, or 270 degrees counterclockwise.
#[derive(Debug, Clone, Copy, Default, Eq, Hash, Ord, PartialOrd, PartialEq, Serialize, Deserialize)]
pub enum Rotation {
    /// 0 degrees; no rotation.
    #[default]
    R0,
    /// 90 degrees counterclockwise.
    R90,
    /// 180 degrees counterclockwise.
    R180,
    /// 270 degrees counterclockwise.
    R270,
}

impl Rotation {
    /// The angle of this rotation, in degrees.
    pub const fn degrees(&self) -> f64 {
        match self {
            Rotation::R0 => 0.,
            Rotation::R90 => 90.,
            Rotation::R180 => 180.,
            Rotation::R270 => 270.,
        }
    }

    /// The number of counterclockwise quarter turns.
    const fn quarter_turns(&self) -> u8 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 1,
            Rotation::R180 => 2,
            Rotation::R270 => 3,
        }
    }

    const fn from_quarter_turns(turns: u8) -> Self {
        match turns % 4 {
            0 => Rotation::R0,
            1 => Rotation::R90,
            2 => Rotation::R180,
            _ => Rotation::R270,
        }
    }

    /// The inverse rotation.
    pub const fn inverse(&self) -> Self {
        Self::from_quarter_turns(4 - self.quarter_turns())
    }
}

impl std::ops::Add<Rotation> for Rotation {
    type Output = Rotation;
    fn add(self, rhs: Rotation) -> Self::Output {
        Self::from_quarter_turns(self.quarter_turns() + rhs.quarter_turns())
    }
}

impl std::ops::Sub<Rotation> for Rotation {
    type Output = Rotation;
    fn sub(self, rhs: Rotation) -> Self::Output {
        self + rhs.inverse()
    }
}

/// Indicates that an angle was not a valid Manhattan angle.
///
/// Manhattan angles (in degrees) are 0, 90, 180, 270,
/// or any equivalent angle modulo 360 degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NonManhattanAngleError(pub f64);

impl std::fmt::Display for NonManhattanAngleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} degrees is not a Manhattan angle", self.0)
    }
}

impl std::error::Error for NonManhattanAngleError {}

impl TryFrom<f64> for Rotation {
    type Error = NonManhattanAngleError;
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let wrapped = wrap_angle(value);
        let turns = (wrapped / 90.).round();
        if (wrapped - turns * 90.).abs() > 1e-6 {
            return Err(NonManhattanAngleError(value));
        }
        Ok(Self::from_quarter_turns(turns as u8))
    }
}

/// A matrix representing a unitary transformation.
///
/// Can represent rotations, reflections, or combinations of rotations/reflections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransformationMatrix([[i8; 2]; 2]);

impl TransformationMatrix {
    /// The identity transformation.
    #[inline]
    pub fn identity() -> Self {
        Self([[1, 0], [0, 1]])
    }

    /// A matrix representing a reflection across the x-axis.
    pub fn reflect_vert() -> Self {
        Self([[1, 0], [0, -1]])
    }

    /// The inverse of the transformation matrix.
    pub fn inverse(&self) -> Self {
        let a = &self.0;
        // Orthogonal, so the inverse is the transpose.
        Self([[a[0][0], a[1][0]], [a[0][1], a[1][1]]])
    }

    /// The determinant (+1 for rotations, -1 when a reflection is included).
    pub fn det(&self) -> i8 {
        self.0[0][0] * self.0[1][1] - self.0[0][1] * self.0[1][0]
    }
}

impl From<Rotation> for TransformationMatrix {
    fn from(value: Rotation) -> Self {
        Self(match value {
            Rotation::R0 => [[1, 0], [0, 1]],
            Rotation::R90 => [[0, -1], [1, 0]],
            Rotation::R180 => [[-1, 0], [0, -1]],
            Rotation::R270 => [[0, 1], [-1, 0]],
        })
    }
}

/// Multiples two 2x2 matrices, returning a new 2x2 matrix
fn matmul_i8(a: &[[i8; 2]; 2], b: &[[i8; 2]; 2]) -> [[i8; 2]; 2] {
    [
        [
            a[0][0] * b[0][0] + a[0][1] * b[1][0],
            a[0][0] * b[0][1] + a[0][1] * b[1][1],
        ],
        [
            a[1][0] * b[0][0] + a[1][1] * b[1][0],
            a[1][0] * b[0][1] + a[1][1] * b[1][1],
        ],
    ]
}

impl std::ops::Mul<TransformationMatrix> for TransformationMatrix {
    type Output = Self;
    fn mul(self, rhs: TransformationMatrix) -> Self::Output {
        Self(matmul_i8(&self.0, &rhs.0))
    }
}

impl std::ops::Mul<Point> for TransformationMatrix {
    type Output = Point;
    fn mul(self, rhs: Point) -> Self::Output {
        let a = &self.0;
        Point::new(
            a[0][0] as i64 * rhs.x + a[0][1] as i64 * rhs.y,
            a[1][0] as i64 * rhs.x + a[1][1] as i64 * rhs.y,
        )
    }
}

impl Default for TransformationMatrix {
    #[inline]
    fn default() -> Self {
        Self::identity()
    }
}

impl Transformation {
    /// Returns the identity transform, leaving any transformed object unmodified.
    pub fn identity() -> Self {
        Self {
            mat: TransformationMatrix::identity(),
            b: Point::zero(),
        }
    }

    /// Returns a translation by `(x,y)`.
    pub fn translate(x: i64, y: i64) -> Self {
        Self {
            mat: TransformationMatrix::identity(),
            b: Point::new(x, y),
        }
    }

    /// Returns a rotation by `angle`.
    pub fn rotate(angle: Rotation) -> Self {
        Self {
            mat: TransformationMatrix::from(angle),
            b: Point::zero(),
        }
    }

    /// Returns a reflection about the x-axis.
    pub fn reflect_vert() -> Self {
        Self {
            mat: TransformationMatrix::reflect_vert(),
            b: Point::zero(),
        }
    }

    /// Creates a transform from an offset, a bool indicating
    /// whether or not to reflect vertically, and a rotation.
    ///
    /// The reflection is applied first, then the rotation, then the offset.
    pub fn from_opts(offset: Point, reflect_vert: bool, angle: Rotation) -> Self {
        let mut mat = TransformationMatrix::from(angle);
        if reflect_vert {
            mat = mat * TransformationMatrix::reflect_vert();
        }
        Self { mat, b: offset }
    }

    /// Creates a transform from an offset and [`Orientation`].
    pub fn from_offset_and_orientation(offset: Point, orientation: impl Into<Orientation>) -> Self {
        let o = orientation.into();
        Self::from_opts(offset, o.reflect_vert, o.angle)
    }

    /// Create a new [`Transformation`] that is the cascade of `parent` and `child`.
    ///
    /// "Parents" and "children" refer to typical layout-instance hierarchies,
    /// in which each layer of instance has a nested set of transformations relative to its top-level parent.
    ///
    /// Note this operation *is not* commutative.
    pub fn cascade(parent: Transformation, child: Transformation) -> Transformation {
        let b = parent.mat * child.b + parent.b;
        let mat = parent.mat * child.mat;
        Self { mat, b }
    }

    /// The point representing the translation of this transformation.
    pub fn offset_point(&self) -> Point {
        self.b
    }

    /// Returns an [`Orientation`] corresponding to this transformation.
    pub fn orientation(&self) -> Orientation {
        let reflect_vert = self.mat.det() < 0;
        // Undo the reflection to recover the pure rotation.
        let rot = if reflect_vert {
            self.mat * TransformationMatrix::reflect_vert()
        } else {
            self.mat
        };
        let angle = match (rot.0[0][0], rot.0[1][0]) {
            (1, 0) => Rotation::R0,
            (0, 1) => Rotation::R90,
            (-1, 0) => Rotation::R180,
            _ => Rotation::R270,
        };
        Orientation {
            reflect_vert,
            angle,
        }
    }

    /// Maps a direction angle (in degrees) through this transformation.
    ///
    /// Translation does not affect directions.
    pub fn apply_angle(&self, angle: f64) -> f64 {
        self.orientation().apply_angle(angle)
    }

    /// Returns the inverse [`Transformation`] of `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use geometry::prelude::*;
    /// use geometry::transform::Rotation;
    ///
    /// let trans = Transformation::cascade(
    ///     Transformation::rotate(Rotation::R90),
    ///     Transformation::translate(5, 10),
    /// );
    /// let inv = trans.inv();
    ///
    /// assert_eq!(Transformation::cascade(inv, trans), Transformation::identity());
    /// ```
    pub fn inv(&self) -> Transformation {
        let inv = self.mat.inverse();
        let invb = inv * self.b;
        Self { mat: inv, b: -invb }
    }
}

/// A trait for specifying how an object is changed by a [`Transformation`].
#[impl_for_tuples(32)]
pub trait TransformMut {
    /// Applies matrix-vector [`Transformation`] `trans`.
    fn transform_mut(&mut self, trans: Transformation);
}

impl<T: TransformMut> TransformMut for Vec<T> {
    fn transform_mut(&mut self, trans: Transformation) {
        for i in self.iter_mut() {
            i.transform_mut(trans);
        }
    }
}

impl<T: TransformMut> TransformMut for Option<T> {
    fn transform_mut(&mut self, trans: Transformation) {
        if let Some(inner) = self.as_mut() {
            inner.transform_mut(trans);
        }
    }
}

/// A trait for specifying how an object is changed by a [`Transformation`].
///
/// Takes in an owned copy of the shape and returns the transformed version.
pub trait Transform: TransformMut + Sized {
    /// Applies matrix-vector [`Transformation`] `trans`.
    ///
    /// Creates a new shape at a location equal to the transformation of the original.
    #[inline]
    fn transform(mut self, trans: Transformation) -> Self {
        self.transform_mut(trans);
        self
    }
}

impl<T: TransformMut + Sized> Transform for T {}

/// A trait for specifying how a shape is translated by a [`Point`].
#[impl_for_tuples(32)]
pub trait TranslateMut {
    /// Translates the shape by a [`Point`] through mutation.
    fn translate_mut(&mut self, p: Point);
}

impl<T: TranslateMut> TranslateMut for Vec<T> {
    fn translate_mut(&mut self, p: Point) {
        for i in self.iter_mut() {
            i.translate_mut(p);
        }
    }
}

impl<T: TranslateMut> TranslateMut for Option<T> {
    fn translate_mut(&mut self, p: Point) {
        if let Some(inner) = self.as_mut() {
            inner.translate_mut(p);
        }
    }
}

/// A trait for specifying how a shape is translated by a [`Point`].
///
/// Takes in an owned copy of the shape and returns the translated version.
pub trait Translate: TranslateMut + Sized {
    /// Translates the shape by a [`Point`] through mutation.
    ///
    /// Creates a new shape at a location equal to the translation of the original.
    fn translate(mut self, p: Point) -> Self {
        self.translate_mut(p);
        self
    }
}

impl<T: TranslateMut + Sized> Translate for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rect::Rect;

    fn all_orientations() -> Vec<Orientation> {
        let mut out = Vec::new();
        for reflect in [false, true] {
            for angle in [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270] {
                out.push(Orientation::from_reflect_and_angle(reflect, angle));
            }
        }
        out
    }

    #[test]
    fn matmul_works() {
        let a = [[1, 2], [3, 4]];
        let b = [[5, 6], [7, 8]];
        assert_eq!(matmul_i8(&a, &b), [[19, 22], [43, 50]]);
    }

    #[test]
    fn rotation_parses_manhattan_angles() {
        assert_eq!(Rotation::try_from(-90.), Ok(Rotation::R270));
        assert_eq!(Rotation::try_from(450.), Ok(Rotation::R90));
        assert!(Rotation::try_from(45.).is_err());
        assert_eq!(Rotation::R90 - Rotation::R180, Rotation::R270);
    }

    #[test]
    fn orientation_round_trips_through_transformation() {
        for o in all_orientations() {
            let tf = Transformation::from_offset_and_orientation(Point::new(520, 130), o);
            assert_eq!(tf.orientation(), o);
            assert_eq!(tf.offset_point(), Point::new(520, 130));
            assert_eq!(Transformation::cascade(tf, tf.inv()), Transformation::identity());
        }
    }

    #[test]
    fn point_transformations_work() {
        let pt = Point::new(2, 1);

        let reflected = pt.transform(Transformation::reflect_vert());
        assert_eq!(reflected, Point::new(2, -1));

        let r90 = pt.transform(Transformation::from_opts(
            Point::new(23, 11),
            false,
            Rotation::R90,
        ));
        assert_eq!(r90, Point::new(22, 13));

        // Reflect first, then rotate.
        let flip_r90 = pt.transform(Transformation::from_opts(Point::zero(), true, Rotation::R90));
        assert_eq!(flip_r90, Point::new(1, 2));
    }

    #[test]
    fn angles_follow_points() {
        for o in all_orientations() {
            let tf = Transformation::from_offset_and_orientation(Point::zero(), o);
            for angle in [0., 90., 180., 270.] {
                let unit = crate::cardinal::Cardinal::from_manhattan_angle(angle)
                    .unwrap()
                    .unit();
                let mapped = unit.transform(tf);
                let expected = crate::cardinal::Cardinal::from_manhattan_angle(tf.apply_angle(angle))
                    .unwrap()
                    .unit();
                assert_eq!(mapped, expected, "orientation {o:?}, angle {angle}");
            }
        }
    }

    #[test]
    fn translate_works_for_tuples() {
        let mut tuple = (
            Rect::from_sides(0, 0, 100, 200),
            Rect::from_sides(50, -50, 150, 0),
        );
        tuple.translate_mut(Point::new(5, 10));
        assert_eq!(
            tuple,
            (
                Rect::from_sides(5, 10, 105, 210),
                Rect::from_sides(55, -40, 155, 10)
            )
        );
    }

    #[test]
    fn transform_works_for_vecs() {
        let mut v = vec![
            Rect::from_sides(0, 0, 100, 200),
            Rect::from_sides(50, -50, 150, 0),
        ];
        v.transform_mut(Transformation::rotate(Rotation::R90));
        assert_eq!(
            v,
            vec![
                Rect::from_sides(-200, 0, 0, 100),
                Rect::from_sides(0, 50, 50, 150)
            ]
        );
    }
}
