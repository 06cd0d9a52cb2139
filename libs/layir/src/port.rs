//! Oriented, width-tagged connection points.

use std::fmt::Display;
use std::str::FromStr;

use arcstr::ArcStr;
use geometry::cardinal::Cardinal;
use geometry::prelude::*;
use geometry::{angles_match, wrap_angle};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// The kind of signal a port carries.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum PortType {
    /// A waveguide port.
    Optical,
    /// A metal wire port.
    Electrical,
    /// A placement-only marker.
    Placement,
    /// An out-of-plane port such as a grating coupler or pad (`vertical_<kind>`).
    Vertical(ArcStr),
}

impl Display for PortType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Optical => write!(f, "optical"),
            Self::Electrical => write!(f, "electrical"),
            Self::Placement => write!(f, "placement"),
            Self::Vertical(kind) => write!(f, "vertical_{kind}"),
        }
    }
}

impl FromStr for PortType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "optical" => Ok(Self::Optical),
            "electrical" => Ok(Self::Electrical),
            "placement" => Ok(Self::Placement),
            other => match other.strip_prefix("vertical_") {
                Some(kind) if !kind.is_empty() => Ok(Self::Vertical(kind.into())),
                _ => Err(Error::InvalidPortType(other.to_string())),
            },
        }
    }
}

impl Serialize for PortType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PortType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A named, oriented connection point on a cell.
///
/// Positions and widths are in database units.
/// Orientations are in degrees, normalized to `[0, 360)`,
/// and point away from the cell into the connecting geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port<L> {
    name: ArcStr,
    center: Point,
    orientation: Option<f64>,
    width: i64,
    layer: L,
    port_type: PortType,
    /// The name of the cell or instance this port was read from.
    ///
    /// Used for lookups and messages only.
    parent: Option<ArcStr>,
}

impl<L> Port<L> {
    /// Creates a new port.
    ///
    /// Fails if `width` is not positive.
    pub fn new(
        name: impl Into<ArcStr>,
        center: Point,
        orientation: Option<f64>,
        width: i64,
        layer: L,
        port_type: PortType,
    ) -> Result<Self> {
        let name = name.into();
        if width <= 0 {
            return Err(Error::InvalidWidth { port: name, width });
        }
        Ok(Self {
            name,
            center,
            orientation: orientation.map(wrap_angle),
            width,
            layer,
            port_type,
            parent: None,
        })
    }

    /// The port name.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// The port center.
    #[inline]
    pub fn center(&self) -> Point {
        self.center
    }

    /// The port orientation in degrees, if defined.
    #[inline]
    pub fn orientation(&self) -> Option<f64> {
        self.orientation
    }

    /// The port orientation, failing if it is undefined.
    pub fn try_orientation(&self) -> Result<f64> {
        self.orientation
            .ok_or_else(|| Error::UndefinedOrientation(self.name.clone()))
    }

    /// The compass direction the port faces, if its orientation is exactly Manhattan.
    pub fn cardinal(&self) -> Option<Cardinal> {
        self.orientation.and_then(Cardinal::from_manhattan_angle)
    }

    /// The port width.
    #[inline]
    pub fn width(&self) -> i64 {
        self.width
    }

    /// The port layer.
    #[inline]
    pub fn layer(&self) -> &L {
        &self.layer
    }

    /// The port type.
    #[inline]
    pub fn port_type(&self) -> &PortType {
        &self.port_type
    }

    /// The name of the owning cell or instance, if known.
    #[inline]
    pub fn parent(&self) -> Option<&ArcStr> {
        self.parent.as_ref()
    }

    /// Renames the port in place.
    pub fn set_name(&mut self, name: impl Into<ArcStr>) {
        self.name = name.into();
    }

    /// Returns a copy of this port with a new name.
    pub fn with_name(mut self, name: impl Into<ArcStr>) -> Self {
        self.set_name(name);
        self
    }

    /// Returns a copy of this port attributed to `parent`.
    pub fn with_parent(mut self, parent: impl Into<ArcStr>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Returns a copy of this port with the orientation reversed.
    ///
    /// Fails if the port has no orientation.
    pub fn flipped(&self) -> Result<Self>
    where
        L: Clone,
    {
        let orientation = self.try_orientation()?;
        let mut port = self.clone();
        port.orientation = Some(wrap_angle(orientation + 180.));
        Ok(port)
    }

    /// Returns a copy of this port moved by `offset`.
    pub fn moved(&self, offset: Point) -> Self
    where
        L: Clone,
    {
        let mut port = self.clone();
        port.center += offset;
        port
    }

    /// Returns a copy of this port mapped through `trans`.
    pub fn transformed(&self, trans: Transformation) -> Self
    where
        L: Clone,
    {
        let mut port = self.clone();
        port.center = port.center.transform(trans);
        port.orientation = port.orientation.map(|o| trans.apply_angle(o));
        port
    }

    /// Returns `true` if the two ports can be joined: same position,
    /// opposite orientations, and equal widths.
    pub fn mates_with<L2>(&self, other: &Port<L2>) -> bool {
        self.center == other.center
            && self.width == other.width
            && match (self.orientation, other.orientation) {
                (Some(a), Some(b)) => angles_match(a, b + 180.),
                _ => false,
            }
    }
}

/// Returns `n` ports spaced by `pitch` and centered on `center`.
///
/// Ports are named `0`, `1`, ... in order of increasing offset.
///
/// # Examples
///
/// ```
/// use geometry::prelude::*;
/// use layir::{port_array, PortType};
///
/// let ports = port_array(Point::zero(), 500, 0., Point::new(0, 10_000), 3, (), PortType::Optical)?;
/// let ys: Vec<i64> = ports.iter().map(|p| p.center().y).collect();
/// assert_eq!(ys, vec![-10_000, 0, 10_000]);
/// # Ok::<(), layir::error::Error>(())
/// ```
pub fn port_array<L: Clone>(
    center: Point,
    width: i64,
    orientation: f64,
    pitch: Point,
    n: usize,
    layer: L,
    port_type: PortType,
) -> Result<Vec<Port<L>>> {
    let n = n as i64;
    (0..n)
        .map(|i| {
            // Offsets are computed at twice the resolution so odd counts stay exact.
            let k = 2 * i - (n - 1);
            let offset = Point::new(
                (k * pitch.x).div_euclid(2),
                (k * pitch.y).div_euclid(2),
            );
            Port::new(
                arcstr::format!("{i}"),
                center + offset,
                Some(orientation),
                width,
                layer.clone(),
                port_type.clone(),
            )
        })
        .collect()
}

/// A conjunction of optional port predicates.
///
/// An empty filter selects every port.
#[derive(Debug, Clone, PartialEq)]
pub struct PortFilter<L> {
    layer: Option<L>,
    prefix: Option<ArcStr>,
    suffix: Option<ArcStr>,
    orientation: Option<f64>,
    width: Option<i64>,
    layers_excluded: Vec<L>,
    port_type: Option<PortType>,
    names: Option<Vec<ArcStr>>,
}

impl<L> Default for PortFilter<L> {
    fn default() -> Self {
        Self {
            layer: None,
            prefix: None,
            suffix: None,
            orientation: None,
            width: None,
            layers_excluded: Vec::new(),
            port_type: None,
            names: None,
        }
    }
}

impl<L: PartialEq> PortFilter<L> {
    /// Creates a filter that matches every port.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects ports on `layer`.
    pub fn layer(mut self, layer: L) -> Self {
        self.layer = Some(layer);
        self
    }

    /// Selects ports whose name starts with `prefix`.
    pub fn prefix(mut self, prefix: impl Into<ArcStr>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Selects ports whose name ends with `suffix`.
    pub fn suffix(mut self, suffix: impl Into<ArcStr>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Selects ports facing `orientation` degrees.
    pub fn orientation(mut self, orientation: f64) -> Self {
        self.orientation = Some(orientation);
        self
    }

    /// Selects ports with exactly the given width.
    pub fn width(mut self, width: i64) -> Self {
        self.width = Some(width);
        self
    }

    /// Rejects ports on `layer`.
    pub fn exclude_layer(mut self, layer: L) -> Self {
        self.layers_excluded.push(layer);
        self
    }

    /// Selects ports of the given type.
    pub fn port_type(mut self, port_type: PortType) -> Self {
        self.port_type = Some(port_type);
        self
    }

    /// Selects ports whose name is in `names`.
    pub fn names<S: Into<ArcStr>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// The port type this filter requires, if any.
    pub fn required_port_type(&self) -> Option<&PortType> {
        self.port_type.as_ref()
    }

    /// Returns `true` if `port` satisfies every predicate.
    pub fn matches(&self, port: &Port<L>) -> bool {
        if let Some(layer) = &self.layer {
            if port.layer() != layer {
                return false;
            }
        }
        if let Some(prefix) = &self.prefix {
            if !port.name().starts_with(prefix.as_str()) {
                return false;
            }
        }
        if let Some(suffix) = &self.suffix {
            if !port.name().ends_with(suffix.as_str()) {
                return false;
            }
        }
        if let Some(orientation) = self.orientation {
            match port.orientation() {
                Some(o) if angles_match(o, orientation) => {}
                _ => return false,
            }
        }
        if self.layers_excluded.contains(port.layer()) {
            return false;
        }
        if let Some(width) = self.width {
            if port.width() != width {
                return false;
            }
        }
        if let Some(port_type) = &self.port_type {
            if port.port_type() != port_type {
                return false;
            }
        }
        if let Some(names) = &self.names {
            if !names.contains(port.name()) {
                return false;
            }
        }
        true
    }

    /// Returns the matching ports, preserving iteration order.
    pub fn select<'a>(&self, ports: impl IntoIterator<Item = &'a Port<L>>) -> Vec<&'a Port<L>>
    where
        L: 'a,
    {
        ports.into_iter().filter(|p| self.matches(p)).collect()
    }
}
