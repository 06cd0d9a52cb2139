//! Right-angle route backbones.
//!
//! A backbone is the list of corner points of a route, from the center of the
//! start port to the center of the end port, in DBU.

use geometry::prelude::*;
use itertools::Itertools;

use crate::error::{Error, Result};
use crate::Port;

/// Rotates `p` counterclockwise by the angle of `dir`.
fn rotate(p: Point, dir: Cardinal) -> Point {
    match dir {
        Cardinal::East => p,
        Cardinal::North => Point::new(-p.y, p.x),
        Cardinal::West => Point::new(-p.x, -p.y),
        Cardinal::South => Point::new(p.y, -p.x),
    }
}

/// Rotates `p` clockwise by the angle of `dir`.
fn unrotate(p: Point, dir: Cardinal) -> Point {
    match dir {
        Cardinal::North | Cardinal::South => rotate(p, dir.opposite()),
        Cardinal::East | Cardinal::West => rotate(p, dir),
    }
}

fn port_cardinal(port: &Port) -> Result<Cardinal> {
    port.cardinal().ok_or_else(|| {
        Error::PortOrientation(format!(
            "port `{}` must face a Manhattan direction to be routed, found {:?}",
            port.name(),
            port.orientation()
        ))
    })
}

/// Removes repeated points and the middle point of every collinear triple.
pub(crate) fn simplify(points: Vec<Point>) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for p in points.into_iter().dedup() {
        if out.len() >= 2 {
            let (a, b) = (out[out.len() - 2], out[out.len() - 1]);
            let collinear = (a.x == b.x && b.x == p.x) || (a.y == b.y && b.y == p.y);
            if collinear {
                out.pop();
            }
        }
        out.push(p);
    }
    out
}

/// The sign of `y`, treating zero as positive.
fn side(y: i64) -> i64 {
    if y >= 0 {
        1
    } else {
        -1
    }
}

/// Corners for an end port facing back along the start direction.
///
/// Coordinates are local: the start port is at the origin facing East and
/// the end port at `p` facing West.
fn facing(p: Point, a: i64, b: i64, r: i64) -> Vec<Point> {
    if p.y == 0 && p.x >= a + b {
        return vec![];
    }
    if p.x >= a + b + 2 * r && p.y.abs() >= 2 * r {
        let xm = (a + r + p.x - b - r) / 2;
        return vec![Point::new(xm, 0), Point::new(xm, p.y)];
    }
    let mut x1 = a + r;
    let x2 = p.x - b - r;
    let backward = x2 - x1 < 2 * r;
    if backward {
        x1 = x1.max(x2 + 2 * r);
    }
    let ym = if backward && p.y.abs() >= 4 * r {
        p.y / 2
    } else {
        p.y + side(p.y) * 2 * r
    };
    vec![
        Point::new(x1, 0),
        Point::new(x1, ym),
        Point::new(x2, ym),
        Point::new(x2, p.y),
    ]
}

/// Corners for an end port facing the same way as the start port.
fn u_turn(p: Point, a: i64, b: i64, r: i64) -> Vec<Point> {
    if p.y.abs() >= 2 * r {
        let xu = (a + r).max(p.x + b + r);
        return vec![Point::new(xu, 0), Point::new(xu, p.y)];
    }
    let x2 = p.x + b + r;
    let x1 = if x2 >= a + 3 * r {
        a + r
    } else {
        (a + r).max(x2 + 2 * r)
    };
    let ym = p.y + side(p.y) * 2 * r;
    vec![
        Point::new(x1, 0),
        Point::new(x1, ym),
        Point::new(x2, ym),
        Point::new(x2, p.y),
    ]
}

/// Corners for an end port facing North, so the route arrives heading South.
fn arrive_south(p: Point, a: i64, b: i64, r: i64) -> Vec<Point> {
    if p.x >= a + r && -p.y >= b + r {
        return vec![Point::new(p.x, 0)];
    }
    let ym = if p.y + b + r <= -2 * r {
        p.y + b + r
    } else {
        (p.y + b + r).max(2 * r)
    };
    let mut x1 = a + r;
    if (p.x - x1).abs() < 2 * r {
        x1 = x1.max(p.x + 2 * r);
    }
    vec![Point::new(x1, 0), Point::new(x1, ym), Point::new(p.x, ym)]
}

fn mirror_y(points: Vec<Point>) -> Vec<Point> {
    points.into_iter().map(|p| Point::new(p.x, -p.y)).collect()
}

/// Builds the backbone with the fewest corners joining `port1` to `port2`.
///
/// The route leaves `port1` along its orientation for at least
/// `start_straight`, enters `port2` against its orientation after at least
/// `end_straight`, and keeps every corner `bend_size` away from its
/// neighbors. All lengths are in DBU.
pub fn synthesize_backbone(
    port1: &Port,
    port2: &Port,
    start_straight: i64,
    end_straight: i64,
    bend_size: i64,
) -> Result<Vec<Point>> {
    if start_straight < 0 || end_straight < 0 || bend_size < 0 {
        return Err(Error::config(format!(
            "straight lengths and bend size must be non-negative, got {start_straight}, \
             {end_straight} and {bend_size} dbu"
        )));
    }
    let d1 = port_cardinal(port1)?;
    let d2 = port_cardinal(port2)?;
    let origin = port1.center();
    let p = unrotate(port2.center() - origin, d1);
    if p == Point::zero() {
        return Err(Error::NoPath {
            port1: port1.name().clone(),
            port2: port2.name().clone(),
            reason: format!("both ports are at {origin:?}"),
        });
    }
    let (a, b, r) = (start_straight, end_straight, bend_size);
    let corners = match unrotate(d2.unit(), d1) {
        u if u == Cardinal::West.unit() => facing(p, a, b, r),
        u if u == Cardinal::East.unit() => u_turn(p, a, b, r),
        u if u == Cardinal::North.unit() => arrive_south(p, a, b, r),
        _ => mirror_y(arrive_south(Point::new(p.x, -p.y), a, b, r)),
    };
    let points = std::iter::once(Point::zero())
        .chain(corners)
        .chain(std::iter::once(p))
        .map(|q| origin + rotate(q, d1))
        .collect();
    let backbone = simplify(points);
    tracing::debug!(
        port1 = %port1.name(),
        port2 = %port2.name(),
        corners = backbone.len() - 2,
        "synthesized backbone"
    );
    Ok(backbone)
}

/// The backbone `[port1, waypoints.., port2]`, with waypoints in micrometers
/// snapped to a grid of `grid` micrometers.
///
/// The result is not checked for Manhattan alignment here.
pub fn waypoint_backbone(port1: &Port, port2: &Port, waypoints: &[DPoint], grid: f64) -> Vec<Point> {
    std::iter::once(port1.center())
        .chain(waypoints.iter().map(|w| w.to_grid(grid)))
        .chain(std::iter::once(port2.center()))
        .collect()
}

#[cfg(test)]
mod tests {
    use layir::PortType;
    use test_log::test;

    use super::*;
    use crate::pdk::GdsLayer;

    fn port(name: &str, x: i64, y: i64, orientation: f64) -> Port {
        Port::new(
            name,
            Point::new(x, y),
            Some(orientation),
            500,
            GdsLayer(1, 0),
            PortType::Optical,
        )
        .unwrap()
    }

    fn pts(points: &[(i64, i64)]) -> Vec<Point> {
        points.iter().map(|&p| p.into()).collect()
    }

    /// Checks the corner spacing of a backbone against the bend size.
    fn assert_routable(backbone: &[Point], a: i64, b: i64, r: i64) {
        let n = backbone.len();
        for (i, (p, q)) in backbone.iter().tuple_windows().enumerate() {
            assert!(p.x == q.x || p.y == q.y, "segment {i} is not axis-aligned");
            let length = p.manhattan_distance(*q);
            let need = match (i == 0, i == n - 2) {
                (true, true) => a + b,
                (true, false) => a + r,
                (false, true) => r + b,
                (false, false) => 2 * r,
            };
            assert!(length >= need, "segment {i} is {length} long, needs {need}");
        }
    }

    #[test]
    fn facing_ports_on_axis_are_joined_directly() {
        let backbone =
            synthesize_backbone(&port("a", 0, 0, 0.), &port("b", 10, 0, 180.), 0, 0, 5).unwrap();
        assert_eq!(backbone, pts(&[(0, 0), (10, 0)]));
    }

    #[test]
    fn parallel_ports_make_a_u_turn() {
        let backbone =
            synthesize_backbone(&port("a", 0, 0, 0.), &port("b", 0, 20, 0.), 5, 5, 5).unwrap();
        assert_eq!(backbone, pts(&[(0, 0), (10, 0), (10, 20), (0, 20)]));
    }

    #[test]
    fn offset_facing_ports_make_a_z() {
        let backbone = synthesize_backbone(
            &port("a", 0, 0, 0.),
            &port("b", 100, 40, 180.),
            0,
            0,
            10,
        )
        .unwrap();
        assert_eq!(backbone, pts(&[(0, 0), (50, 0), (50, 40), (100, 40)]));
    }

    #[test]
    fn small_offsets_use_four_corners() {
        for (x, y, o) in [
            (100, 4, 180.),
            (15, 4, 180.),
            (-50, 0, 180.),
            (-50, 60, 180.),
            (30, 5, 0.),
            (-30, -5, 0.),
            (3, 0, 0.),
        ] {
            let backbone =
                synthesize_backbone(&port("a", 0, 0, 0.), &port("b", x, y, o), 2, 3, 10)
                    .unwrap();
            assert!(backbone.len() >= 4, "{backbone:?}");
            assert_routable(&backbone, 2, 3, 10);
        }
    }

    #[test]
    fn perpendicular_ports() {
        let backbone =
            synthesize_backbone(&port("a", 0, 0, 0.), &port("b", 50, -50, 90.), 0, 0, 10)
                .unwrap();
        assert_eq!(backbone, pts(&[(0, 0), (50, 0), (50, -50)]));
        let backbone =
            synthesize_backbone(&port("a", 0, 0, 0.), &port("b", 50, 50, 270.), 0, 0, 10)
                .unwrap();
        assert_eq!(backbone, pts(&[(0, 0), (50, 0), (50, 50)]));
        for (x, y, o) in [(5, -50, 90.), (50, 50, 90.), (-40, 3, 270.), (0, -5, 270.)] {
            let backbone =
                synthesize_backbone(&port("a", 0, 0, 0.), &port("b", x, y, o), 4, 4, 10)
                    .unwrap();
            assert_eq!(backbone.len(), 5, "{backbone:?}");
            assert_routable(&backbone, 4, 4, 10);
        }
    }

    #[test]
    fn rotated_start_ports() {
        // The U-turn scenario, rotated to leave northwards.
        let backbone =
            synthesize_backbone(&port("a", 0, 0, 90.), &port("b", -20, 0, 90.), 5, 5, 5)
                .unwrap();
        assert_eq!(backbone, pts(&[(0, 0), (0, 10), (-20, 10), (-20, 0)]));
        let backbone =
            synthesize_backbone(&port("a", 7, 7, 180.), &port("b", -43, -43, 90.), 0, 0, 10)
                .unwrap();
        assert_eq!(backbone, pts(&[(7, 7), (-43, 7), (-43, -43)]));
    }

    #[test]
    fn degenerate_ports_fail() {
        let err = synthesize_backbone(&port("a", 0, 0, 0.), &port("b", 0, 0, 180.), 0, 0, 5)
            .unwrap_err();
        assert!(matches!(err, Error::NoPath { .. }));
        let err = synthesize_backbone(&port("a", 0, 0, 45.), &port("b", 9, 0, 180.), 0, 0, 5)
            .unwrap_err();
        assert!(err.to_string().contains("`a`"));
        let err = synthesize_backbone(&port("a", 0, 0, 0.), &port("b", 9, 0, 180.), -1, 0, 5)
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn simplify_collapses_runs() {
        assert_eq!(
            simplify(pts(&[(0, 0), (0, 0), (5, 0), (10, 0), (10, 10), (10, 10), (10, 20)])),
            pts(&[(0, 0), (10, 0), (10, 20)])
        );
    }

    #[test]
    fn waypoints_are_snapped_but_kept() {
        let backbone = waypoint_backbone(
            &port("a", 0, 0, 0.),
            &port("b", 20_000, 30_000, 270.),
            &[DPoint::new(20.0004, 0.)],
            0.001,
        );
        assert_eq!(backbone, pts(&[(0, 0), (20_000, 0), (20_000, 30_000)]));
    }
}
