//! Port-driven instance placement.

use geometry::prelude::*;
use geometry::transform::Rotation;

use crate::error::{Error, Result};
use crate::Port;

/// The transformation that moves `port` to `center`, facing `orientation`.
///
/// With `mirror`, the child is reflected about its x-axis before rotating.
/// Fails if the required rotation is not a multiple of 90 degrees.
pub fn place_port_transform(
    port: &Port,
    center: Point,
    orientation: f64,
    mirror: bool,
) -> Result<Transformation> {
    let local = port.try_orientation()?;
    let local = if mirror { -local } else { local };
    let rotation = Rotation::try_from(orientation - local).map_err(|e| {
        Error::PortOrientation(format!(
            "cannot place port `{}` facing {orientation}: {e}",
            port.name()
        ))
    })?;
    let partial = Transformation::from_opts(Point::zero(), mirror, rotation);
    let offset = center - port.center().transform(partial);
    Ok(Transformation::from_opts(offset, mirror, rotation))
}

/// The transformation that connects `port` to `target`: same center,
/// opposite orientation.
pub fn mate_transform(port: &Port, target: &Port, mirror: bool) -> Result<Transformation> {
    let orientation = target.try_orientation()?;
    place_port_transform(port, target.center(), orientation + 180., mirror)
}

#[cfg(test)]
mod tests {
    use layir::PortType;
    use test_log::test;

    use super::*;
    use crate::pdk::GdsLayer;

    fn port(x: i64, y: i64, orientation: f64) -> Port {
        Port::new(
            "p",
            Point::new(x, y),
            Some(orientation),
            500,
            GdsLayer(1, 0),
            PortType::Optical,
        )
        .unwrap()
    }

    #[test]
    fn places_port_at_target() {
        let p = port(10_000, 10_000, 90.);
        for (mirror, orientation) in [(false, 0.), (false, 270.), (true, 180.), (true, 90.)] {
            let trans = place_port_transform(&p, Point::new(-3, 7), orientation, mirror).unwrap();
            let placed = p.transformed(trans);
            assert_eq!(placed.center(), Point::new(-3, 7));
            assert_eq!(placed.orientation(), Some(orientation));
        }
    }

    #[test]
    fn mating_flips_orientation() {
        let a = port(0, 0, 180.);
        let target = port(5_000, 2_000, 90.);
        let trans = mate_transform(&a, &target, false).unwrap();
        assert!(a.transformed(trans).mates_with(&target));
    }

    #[test]
    fn rejects_diagonal_targets() {
        let err = place_port_transform(&port(0, 0, 0.), Point::zero(), 45., false).unwrap_err();
        assert!(matches!(err, Error::PortOrientation(_)));
    }
}
