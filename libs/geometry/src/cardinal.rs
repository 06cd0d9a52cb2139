//! The four compass directions a Manhattan port or route segment can face.

use std::fmt::Display;
use std::str::FromStr;

use array_map::{ArrayMap, Indexable};
use serde::{Deserialize, Serialize};

use crate::dir::Dir;
use crate::point::Point;
use crate::wrap_angle;

/// A compass direction.
///
/// Variants are declared in counterclockwise order starting from East,
/// so that `Cardinal::East as u8 * 90` is the direction's angle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
#[derive(Indexable)]
pub enum Cardinal {
    /// Facing +x (0 degrees).
    East,
    /// Facing +y (90 degrees).
    North,
    /// Facing -x (180 degrees).
    West,
    /// Facing -y (270 degrees).
    South,
}

/// Indicates that a string did not name a compass direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCardinalError(pub String);

impl Display for InvalidCardinalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "`{}` must be one of E, N, W, S", self.0)
    }
}

impl std::error::Error for InvalidCardinalError {}

impl Cardinal {
    /// All four directions, counterclockwise from East.
    pub const ALL: [Cardinal; 4] = [Self::East, Self::North, Self::West, Self::South];

    /// The angle of this direction, in degrees.
    pub const fn angle(&self) -> f64 {
        match *self {
            Self::East => 0.,
            Self::North => 90.,
            Self::West => 180.,
            Self::South => 270.,
        }
    }

    /// Returns the direction exactly matching a Manhattan angle, if any.
    ///
    /// ```
    /// # use geometry::cardinal::Cardinal;
    /// assert_eq!(Cardinal::from_manhattan_angle(-90.), Some(Cardinal::South));
    /// assert_eq!(Cardinal::from_manhattan_angle(450.), Some(Cardinal::North));
    /// assert_eq!(Cardinal::from_manhattan_angle(45.), None);
    /// ```
    pub fn from_manhattan_angle(angle: f64) -> Option<Self> {
        let angle = wrap_angle(angle);
        Self::ALL
            .into_iter()
            .find(|dir| crate::angles_match(angle, dir.angle()))
    }

    /// The unit vector pointing in this direction.
    pub const fn unit(&self) -> Point {
        match *self {
            Self::East => Point::new(1, 0),
            Self::North => Point::new(0, 1),
            Self::West => Point::new(-1, 0),
            Self::South => Point::new(0, -1),
        }
    }

    /// The direction of the unit vector from `from` towards `to`,
    /// if the two points differ along exactly one axis.
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// assert_eq!(Cardinal::between(Point::new(0, 0), Point::new(0, -4)), Some(Cardinal::South));
    /// assert_eq!(Cardinal::between(Point::new(0, 0), Point::new(1, 1)), None);
    /// assert_eq!(Cardinal::between(Point::new(2, 2), Point::new(2, 2)), None);
    /// ```
    pub fn between(from: Point, to: Point) -> Option<Self> {
        let d = to - from;
        match (d.x.signum(), d.y.signum()) {
            (1, 0) => Some(Self::East),
            (-1, 0) => Some(Self::West),
            (0, 1) => Some(Self::North),
            (0, -1) => Some(Self::South),
            _ => None,
        }
    }

    /// Returns the opposite direction.
    pub const fn opposite(&self) -> Self {
        match *self {
            Self::East => Self::West,
            Self::North => Self::South,
            Self::West => Self::East,
            Self::South => Self::North,
        }
    }

    /// The direction 90 degrees counterclockwise from this one.
    pub const fn ccw(&self) -> Self {
        match *self {
            Self::East => Self::North,
            Self::North => Self::West,
            Self::West => Self::South,
            Self::South => Self::East,
        }
    }

    /// The direction 90 degrees clockwise from this one.
    pub const fn cw(&self) -> Self {
        match *self {
            Self::East => Self::South,
            Self::North => Self::East,
            Self::West => Self::North,
            Self::South => Self::West,
        }
    }

    /// The axis along which this direction points.
    pub const fn dir(&self) -> Dir {
        match *self {
            Self::East | Self::West => Dir::Horiz,
            Self::North | Self::South => Dir::Vert,
        }
    }

    /// The single-letter abbreviation (`E`, `N`, `W`, or `S`).
    pub const fn abbrev(&self) -> &'static str {
        match *self {
            Self::East => "E",
            Self::North => "N",
            Self::West => "W",
            Self::South => "S",
        }
    }
}

impl Display for Cardinal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.abbrev())
    }
}

impl FromStr for Cardinal {
    type Err = InvalidCardinalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "E" => Ok(Self::East),
            "N" => Ok(Self::North),
            "W" => Ok(Self::West),
            "S" => Ok(Self::South),
            other => Err(InvalidCardinalError(other.to_string())),
        }
    }
}

impl std::ops::Not for Cardinal {
    type Output = Self;
    fn not(self) -> Self::Output {
        self.opposite()
    }
}

/// An association of a value with type `T` to each of the four [`Cardinal`]s.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct Cardinals<T> {
    inner: ArrayMap<Cardinal, T, 4>,
}

impl<T> Cardinals<T> {
    /// Creates a new [`Cardinals`] with the provided values for each direction.
    pub const fn new(east: T, north: T, west: T, south: T) -> Self {
        // IMPORTANT: the ordering of array elements here must match
        // the ordering of variants in the [`Cardinal`] enum.
        Self {
            inner: ArrayMap::new([east, north, west, south]),
        }
    }

    /// Iterates over `(direction, value)` pairs, counterclockwise from East.
    pub fn iter(&self) -> impl Iterator<Item = (Cardinal, &T)> {
        Cardinal::ALL.into_iter().map(move |dir| (dir, &self[dir]))
    }

    /// Maps a function over the provided [`Cardinals`], returning a new [`Cardinals`].
    pub fn map<B>(self, f: impl FnMut(&Cardinal, T) -> B) -> Cardinals<B> {
        Cardinals {
            inner: self.inner.map(f),
        }
    }
}

impl<T: Default> Cardinals<T> {
    /// Removes and returns the value for `dir`, leaving the default in its place.
    pub fn take(&mut self, dir: Cardinal) -> T {
        std::mem::take(&mut self[dir])
    }
}

impl<T> std::ops::Index<Cardinal> for Cardinals<T> {
    type Output = T;
    fn index(&self, index: Cardinal) -> &Self::Output {
        &self.inner[index]
    }
}

impl<T> std::ops::IndexMut<Cardinal> for Cardinals<T> {
    fn index_mut(&mut self, index: Cardinal) -> &mut Self::Output {
        &mut self.inner[index]
    }
}
