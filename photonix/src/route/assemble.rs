//! Instantiates bends, straights and tapers along a backbone.

use std::sync::Arc;

use arcstr::ArcStr;
use geometry::prelude::*;
use geometry::{angles_match, wrap_angle};
use itertools::Itertools;
use serde_json::json;

use crate::components::in_out_ports;
use crate::diagnostics::{IssueSet, RouteCause, RouteIssue, Severity};
use crate::error::{Error, Result};
use crate::pdk::CrossSection;
use crate::place::{mate_transform, place_port_transform};
use crate::registry::ComponentSpec;
use crate::route::backbone::simplify;
use crate::{Component, Context, Port};

/// How a 90 degree bend cell occupies a corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BendFootprint {
    /// The distance from the input port to the corner, along the input direction.
    pub(crate) in_length: i64,
    /// The distance from the corner to the output port, along the output direction.
    pub(crate) out_length: i64,
    /// Whether the unmirrored bend turns left.
    pub(crate) left: bool,
}

impl BendFootprint {
    /// Measures `bend` with its input port at the origin facing West.
    pub(crate) fn of(bend: &Component) -> Result<Self> {
        let (input, output) = in_out_ports(bend)?;
        let norm = place_port_transform(&input, Point::zero(), 180., false)?;
        let out = output.transformed(norm);
        let left = match out.cardinal() {
            Some(Cardinal::North) => true,
            Some(Cardinal::South) => false,
            _ => {
                return Err(Error::config(format!(
                    "bend `{}` must turn by 90 degrees, but port `{}` faces {:?} \
                     when `{}` faces 180",
                    bend.name(),
                    out.name(),
                    out.orientation(),
                    input.name()
                )))
            }
        };
        let (in_length, out_length) = (out.center().x, out.center().y.abs());
        if in_length < 0 {
            return Err(Error::config(format!(
                "bend `{}` doubles back on its input",
                bend.name()
            )));
        }
        Ok(Self {
            in_length,
            out_length,
            left,
        })
    }

    /// The spacing a corner needs from its neighbors.
    pub(crate) fn size(&self) -> i64 {
        self.in_length.max(self.out_length)
    }
}

/// A taper joining a boundary port to the route cross-section.
#[derive(Debug, Clone)]
pub(crate) struct EndTaper {
    cell: Arc<Component>,
    /// The port facing the boundary port.
    outer: ArcStr,
    /// The port facing the route.
    inner: ArcStr,
    length: i64,
}

/// Decides whether `port` needs a taper to reach a route drawn with `xs`.
///
/// `layer` is passed to the taper when the route overrides its layer.
pub(crate) fn fit_end(
    ctx: &Context,
    port: &Port,
    xs: &CrossSection,
    layer: Option<&ArcStr>,
    taper: Option<&ComponentSpec>,
    allow_width_mismatch: bool,
    issues: &mut IssueSet<RouteIssue>,
) -> Result<Option<EndTaper>> {
    let pdk = ctx.pdk();
    let route_layer = pdk.layer(&xs.layer)?;
    if *port.layer() != route_layer {
        issues.add(RouteIssue::new_and_log(
            RouteCause::LayerMismatch {
                port: port.name().clone(),
                port_layer: *port.layer(),
                route_layer,
            },
            Severity::Warning,
        ));
    }
    let route_width = pdk.to_dbu(xs.width);
    if port.width() == route_width {
        return Ok(None);
    }
    if allow_width_mismatch {
        let cause = match taper {
            Some(_) => RouteCause::WidthMismatch {
                port: port.name().clone(),
                port_width: port.width(),
                route_width,
            },
            None => RouteCause::TaperDisabled {
                port: port.name().clone(),
            },
        };
        issues.add(RouteIssue::new_and_log(cause, Severity::Warning));
        return Ok(None);
    }
    let Some(taper) = taper else {
        return Err(Error::config(format!(
            "port `{}` is {} dbu wide but cross-section `{}` is {route_width} dbu; \
             pass a taper or allow the width mismatch",
            port.name(),
            port.width(),
            xs.name()
        )));
    };
    let mut overrides = json!({
        "width1": pdk.to_um(port.width()),
        "width2": xs.width,
        "cross_section": xs.name().as_str(),
    });
    if let Some(layer) = layer {
        overrides["layer"] = json!(layer.as_str());
    }
    let cell = ctx.get_component(taper, &overrides)?;
    let (outer, inner) = in_out_ports(&cell)?;
    Ok(Some(EndTaper {
        length: outer.center().manhattan_distance(inner.center()),
        outer: outer.name().clone(),
        inner: inner.name().clone(),
        cell,
    }))
}

impl EndTaper {
    /// The length of route the taper occupies.
    pub(crate) fn length(&self) -> i64 {
        self.length
    }
}

/// Checks a backbone and returns the direction of each segment.
///
/// Repeated points and straight runs are collapsed first. Fails on diagonal
/// segments, reversals, and end segments that do not leave `port1` or enter
/// `port2` along their orientations.
pub(crate) fn validate_backbone(
    backbone: Vec<Point>,
    port1: &Port,
    port2: &Port,
) -> Result<(Vec<Point>, Vec<Cardinal>)> {
    let points: Vec<Point> = backbone.into_iter().dedup().collect();
    if points.len() < 2 {
        return Err(Error::config(format!(
            "route from `{}` to `{}` needs at least two distinct backbone points",
            port1.name(),
            port2.name()
        )));
    }
    for (i, (p, q)) in points.iter().tuple_windows().enumerate() {
        if Cardinal::between(*p, *q).is_none() {
            return Err(Error::config(format!(
                "backbone segment {i} from {p:?} to {q:?} is not axis-aligned"
            )));
        }
    }
    for (i, (p, q, r)) in points.iter().tuple_windows().enumerate() {
        if Cardinal::between(*p, *q).map(|d| d.opposite()) == Cardinal::between(*q, *r) {
            return Err(Error::config(format!(
                "backbone reverses direction at point {} ({q:?})",
                i + 1
            )));
        }
    }
    let points = simplify(points);
    let dirs: Vec<Cardinal> = points
        .iter()
        .tuple_windows()
        .filter_map(|(p, q)| Cardinal::between(*p, *q))
        .collect();

    let leave = port1.cardinal();
    let enter = port2.cardinal().map(|c| c.opposite());
    let (first, last) = (dirs[0], dirs[dirs.len() - 1]);
    if leave != Some(first) {
        return Err(Error::config(format!(
            "backbone leaves port `{}` heading {first}, but the port faces {:?}",
            port1.name(),
            port1.orientation()
        )));
    }
    if enter != Some(last) {
        return Err(Error::config(format!(
            "backbone enters port `{}` heading {last}, but the port faces {:?}",
            port2.name(),
            port2.orientation()
        )));
    }
    Ok((points, dirs))
}

/// The outcome of [`Walker`]: the route cell and its bookkeeping.
#[derive(Debug)]
pub(crate) struct Assembled {
    pub(crate) cell: Component,
    pub(crate) length_straights: i64,
    pub(crate) length: f64,
    pub(crate) n_bend90: usize,
}

/// Places cells one after another, each input on the previous output.
struct Walker {
    cell: Component,
    cursor: Port,
    last: ArcStr,
}

/// Positions within this many DBU are considered coincident.
const TOLERANCE: i64 = 1;

impl Walker {
    fn place(&mut self, child: &Arc<Component>, base_name: &str, entry: &str, exit: &str, mirror: bool) -> Result<()> {
        let trans = mate_transform(child.port(entry)?, &self.cursor, mirror)?;
        let inst = self.cell.add_instance(child.clone(), base_name, trans);
        let placed = inst.port(entry)?;
        let next = inst.port(exit)?;
        let name = inst.name().clone();
        let expected = wrap_angle(self.cursor.try_orientation()? + 180.);
        check(&name, &placed, self.cursor.center(), expected)?;
        self.cursor = next;
        self.last = name;
        Ok(())
    }

    /// Checks that the cursor is at `expected`, heading `orientation`.
    fn expect(&self, expected: Point, orientation: f64) -> Result<()> {
        check(&self.last, &self.cursor, expected, orientation)
    }
}

fn check(element: &ArcStr, port: &Port, expected: Point, orientation: f64) -> Result<()> {
    let found_orientation = port.try_orientation()?;
    if port.center().manhattan_distance(expected) > TOLERANCE
        || !angles_match(found_orientation, orientation)
    {
        return Err(Error::ConnectionMismatch {
            element: element.clone(),
            port: port.name().clone(),
            expected,
            found: port.center(),
            expected_orientation: wrap_angle(orientation),
            found_orientation,
        });
    }
    Ok(())
}

/// What [`assemble`] places along a validated backbone.
pub(crate) struct Parts<'a> {
    pub(crate) bend: &'a Arc<Component>,
    pub(crate) footprint: BendFootprint,
    pub(crate) straight: &'a ComponentSpec,
    pub(crate) tapers: [Option<EndTaper>; 2],
    /// Cross-section parameters passed to every straight.
    pub(crate) xs_params: serde_json::Value,
}

/// Builds the route cell `name` along `points`, whose segments head `dirs`.
pub(crate) fn assemble(
    ctx: &Context,
    name: ArcStr,
    port1: &Port,
    port2: &Port,
    points: &[Point],
    dirs: &[Cardinal],
    parts: &Parts<'_>,
) -> Result<Assembled> {
    let pdk = ctx.pdk();
    let fp = parts.footprint;
    let [start_taper, end_taper] = &parts.tapers;
    let n = dirs.len();
    let bend_length = parts
        .bend
        .info_f64("length")
        .unwrap_or_else(|| pdk.to_um(fp.in_length + fp.out_length));

    let mut walker = Walker {
        cell: Component::new(name),
        cursor: port1.clone(),
        last: port1.name().clone(),
    };
    let mut length_straights = 0;
    let mut length = 0.;

    if let Some(taper) = start_taper {
        walker.place(&taper.cell, "taper", &taper.outer, &taper.inner, false)?;
        walker.expect(points[0] + dirs[0].unit().scale(taper.length), dirs[0].angle())?;
        length += pdk.to_um(taper.length);
    }

    for (i, &dir) in dirs.iter().enumerate() {
        let (from, to) = (points[i], points[i + 1]);
        let start = match (i, start_taper) {
            (0, Some(taper)) => taper.length,
            (0, None) => 0,
            _ => fp.out_length,
        };
        let end = match (i + 1 == n, end_taper) {
            (true, Some(taper)) => taper.length,
            (true, None) => 0,
            (false, _) => fp.in_length,
        };
        let available = from.manhattan_distance(to);
        let straight_length = available - start - end;
        if straight_length < 0 {
            return Err(Error::InsufficientSpace {
                port1: port1.name().clone(),
                port2: port2.name().clone(),
                segment: i,
                from,
                to,
                available,
                required: start + end,
            });
        }
        if straight_length > 0 {
            let mut params = parts.xs_params.clone();
            params["length"] = json!(pdk.to_um(straight_length));
            let straight = ctx.get_component(parts.straight, &params)?;
            let (entry, exit) = in_out_ports(&straight)?;
            walker.place(&straight, "straight", entry.name(), exit.name(), false)?;
            length_straights += straight_length;
            length += pdk.to_um(straight_length);
        }
        walker.expect(to - dir.unit().scale(end), dir.angle())?;

        if i + 1 < n {
            let next = dirs[i + 1];
            let turn_left = next == dir.ccw();
            let (entry, exit) = in_out_ports(parts.bend)?;
            walker.place(
                parts.bend,
                "bend",
                entry.name(),
                exit.name(),
                turn_left != fp.left,
            )?;
            walker.expect(to + next.unit().scale(fp.out_length), next.angle())?;
            length += bend_length;
        }
    }

    if let Some(taper) = end_taper {
        walker.place(&taper.cell, "taper", &taper.inner, &taper.outer, false)?;
        length += pdk.to_um(taper.length);
    }
    walker.expect(port2.center(), wrap_angle(port2.try_orientation()? + 180.))?;

    Ok(Assembled {
        cell: walker.cell,
        length_straights,
        length,
        n_bend90: n - 1,
    })
}

#[cfg(test)]
mod tests {
    use layir::PortType;
    use test_log::test;

    use super::*;
    use crate::components::{wire_corner, WireCornerParams};
    use crate::pdk::{GdsLayer, Pdk};

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

    #[test]
    fn footprint_of_builtin_bends() {
        let ctx = Context::new(Pdk::generic().unwrap());
        let bend = ctx.get_component(&"bend_euler".into(), &json!({})).unwrap();
        let fp = BendFootprint::of(&bend).unwrap();
        assert_eq!((fp.in_length, fp.out_length, fp.left), (10_000, 10_000, true));
        let cw = ctx
            .get_component(&"bend_euler".into(), &json!({"direction": "cw"}))
            .unwrap();
        assert!(!BendFootprint::of(&cw).unwrap().left);
        let corner = wire_corner(&ctx, &WireCornerParams::default()).unwrap();
        assert_eq!(BendFootprint::of(&corner).unwrap().size(), 5_000);
        let straight = ctx.get_component(&"straight".into(), &json!({})).unwrap();
        assert!(matches!(
            BendFootprint::of(&straight),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn backbone_validation() {
        let (a, b) = (port("a", 0, 0, 0.), port("b", 20, 20, 270.));
        let (points, dirs) =
            validate_backbone(pts(&[(0, 0), (10, 0), (20, 0), (20, 20)]), &a, &b).unwrap();
        assert_eq!(points, pts(&[(0, 0), (20, 0), (20, 20)]));
        assert_eq!(dirs, vec![Cardinal::East, Cardinal::North]);

        for backbone in [
            pts(&[(0, 0)]),
            pts(&[(0, 0), (20, 20)]),
            pts(&[(0, 0), (30, 0), (20, 0), (20, 20)]),
            pts(&[(0, 0), (0, 20), (20, 20)]),
            pts(&[(0, 0), (20, 0), (20, 30), (20, 20)]),
        ] {
            assert!(
                matches!(validate_backbone(backbone.clone(), &a, &b), Err(Error::Configuration(_))),
                "{backbone:?}"
            );
        }
    }

    #[test]
    fn mismatched_widths() {
        let ctx = Context::new(Pdk::generic().unwrap());
        let xs = ctx.pdk().cross_section("xs_sc").unwrap().clone();
        let wide = Port::new("w", Point::zero(), Some(0.), 1_000, GdsLayer(1, 0), PortType::Optical)
            .unwrap();
        let taper = ComponentSpec::factory("taper");

        let mut issues = IssueSet::new();
        let fit = fit_end(&ctx, &wide, &xs, None, Some(&taper), false, &mut issues)
            .unwrap()
            .unwrap();
        assert_eq!(fit.length(), 10_000);
        assert!(issues.is_empty());

        let fit = fit_end(&ctx, &wide, &xs, None, Some(&taper), true, &mut issues).unwrap();
        assert!(fit.is_none());
        let fit = fit_end(&ctx, &wide, &xs, None, None, true, &mut issues).unwrap();
        assert!(fit.is_none());
        let causes: Vec<&RouteCause> = issues.iter().map(|i| i.cause()).collect();
        assert!(matches!(causes[0], RouteCause::WidthMismatch { .. }));
        assert!(matches!(causes[1], RouteCause::TaperDisabled { .. }));

        let err = fit_end(&ctx, &wide, &xs, None, None, false, &mut issues).unwrap_err();
        assert!(err.to_string().contains("`w`"));
    }
}
