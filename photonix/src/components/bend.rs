use std::sync::Arc;

use arcstr::ArcStr;
use geometry::prelude::*;
use geometry::wrap_angle;
use serde::{Deserialize, Serialize};

use crate::bend::BendSpec;
use crate::components::extrude::extrude;
use crate::components::{
    add_cladding, in_out_ports, straight, wire_corner, xs_port, xs_strips, StraightParams,
    WireCornerParams,
};
use crate::error::Result;
use crate::place::mate_transform;
use crate::{Component, Context};

/// The turn direction of a bend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BendDirection {
    /// Counterclockwise (left).
    #[default]
    Ccw,
    /// Clockwise (right); the bend is mirrored about the x-axis.
    Cw,
}

/// Parameters of [`bend_euler`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct BendEulerParams {
    /// The radius, in micrometers. Defaults to the cross-section radius.
    pub radius: Option<f64>,
    /// The turn, in degrees.
    pub angle: f64,
    /// The Euler fraction.
    pub p: f64,
    /// If `true`, `radius` is the effective radius: the end points match a
    /// circular arc of that radius. Otherwise it is the minimum radius.
    pub with_arc_floorplan: bool,
    /// Points per full turn. Defaults to the PDK setting.
    pub npoints: Option<usize>,
    /// Overrides the cross-section layer.
    pub layer: Option<ArcStr>,
    /// Overrides the cross-section width.
    pub width: Option<f64>,
    /// The turn direction.
    pub direction: BendDirection,
    /// The cross-section name.
    pub cross_section: ArcStr,
    /// Accept bends tighter than the cross-section minimum radius.
    pub allow_min_radius_violation: bool,
}

impl Default for BendEulerParams {
    fn default() -> Self {
        Self {
            radius: None,
            angle: 90.,
            p: 0.5,
            with_arc_floorplan: true,
            npoints: None,
            layer: None,
            width: None,
            direction: BendDirection::Ccw,
            cross_section: arcstr::literal!("xs_sc"),
            allow_min_radius_violation: false,
        }
    }
}

/// An Euler bend starting at the origin heading East.
///
/// Falls back to a [`wire_corner`] when neither the parameters nor the
/// cross-section give a radius.
pub fn bend_euler(ctx: &Context, params: &BendEulerParams) -> Result<Arc<Component>> {
    let pdk = ctx.pdk();
    let xs = pdk
        .cross_section(&params.cross_section)?
        .clone()
        .with_width(params.width)
        .with_layer(params.layer.clone());
    let Some(radius) = params.radius.or(xs.radius) else {
        tracing::debug!(
            cross_section = %params.cross_section,
            "no bend radius, using a wire corner"
        );
        return wire_corner(
            ctx,
            &WireCornerParams {
                cross_section: params.cross_section.clone(),
                width: params.width,
                layer: params.layer.clone(),
            },
        );
    };
    let angle = match params.direction {
        BendDirection::Ccw => params.angle,
        BendDirection::Cw => -params.angle,
    };

    ctx.cell("bend_euler", params, |name| {
        let path = ctx.bend_path(&BendSpec {
            radius,
            angle,
            p: params.p,
            effective_radius: params.with_arc_floorplan,
            npoints: params.npoints.unwrap_or(pdk.bend_points()),
        })?;
        if params.allow_min_radius_violation {
            if let Err(e) = xs.check_radius(&name, path.radius_min) {
                tracing::warn!("{e}");
            }
        } else {
            xs.check_radius(&name, path.radius_min)?;
        }

        let mut cell = Component::new(name);
        for (layer, width, offset) in xs_strips(&xs) {
            let outline = extrude(&path.points, 0., angle, width, offset);
            cell.add_polygon(
                pdk.layer(layer)?,
                outline.into_iter().map(|p| pdk.point_to_dbu(p)).collect(),
            );
        }
        let end_orientation = wrap_angle(angle);
        if let Some(core) = cell.bbox() {
            let mut open = vec![Cardinal::West];
            open.extend(Cardinal::from_manhattan_angle(end_orientation));
            add_cladding(&mut cell, pdk, &xs, core, &open)?;
        }
        cell.add_port(xs_port(pdk, &xs, 0, Point::zero(), 180.)?)?;
        cell.add_port(xs_port(pdk, &xs, 1, pdk.point_to_dbu(path.end()), end_orientation)?)?;

        cell.set_info("length", path.length);
        cell.set_info("dx", path.dx);
        cell.set_info("dy", path.dy);
        cell.set_info("radius", radius);
        cell.set_info("radius_min", path.radius_min);
        cell.set_info("n_bend_90", (angle / 90.).abs());
        cell.set_info("width", xs.width);
        cell.set_info("cross_section", xs.name().as_str());
        Ok(cell)
    })
}

/// Parameters of [`bend_circular`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct BendCircularParams {
    /// The radius, in micrometers. Defaults to the cross-section radius.
    pub radius: Option<f64>,
    /// The turn, in degrees.
    pub angle: f64,
    /// Points per full turn. Defaults to the PDK setting.
    pub npoints: Option<usize>,
    /// Overrides the cross-section layer.
    pub layer: Option<ArcStr>,
    /// Overrides the cross-section width.
    pub width: Option<f64>,
    /// The turn direction.
    pub direction: BendDirection,
    /// The cross-section name.
    pub cross_section: ArcStr,
    /// Accept bends tighter than the cross-section minimum radius.
    pub allow_min_radius_violation: bool,
}

impl Default for BendCircularParams {
    fn default() -> Self {
        let euler = BendEulerParams::default();
        Self {
            radius: euler.radius,
            angle: euler.angle,
            npoints: euler.npoints,
            layer: euler.layer,
            width: euler.width,
            direction: euler.direction,
            cross_section: euler.cross_section,
            allow_min_radius_violation: euler.allow_min_radius_violation,
        }
    }
}

/// A circular arc bend: an Euler bend with `p = 0`.
pub fn bend_circular(ctx: &Context, params: &BendCircularParams) -> Result<Arc<Component>> {
    bend_euler(
        ctx,
        &BendEulerParams {
            radius: params.radius,
            angle: params.angle,
            p: 0.,
            with_arc_floorplan: false,
            npoints: params.npoints,
            layer: params.layer.clone(),
            width: params.width,
            direction: params.direction,
            cross_section: params.cross_section.clone(),
            allow_min_radius_violation: params.allow_min_radius_violation,
        },
    )
}

/// An S-bend: two Euler bends, the second mirrored and joined to the first.
pub fn bend_euler_s(ctx: &Context, params: &BendEulerParams) -> Result<Arc<Component>> {
    let bend = bend_euler(ctx, params)?;
    ctx.cell("bend_euler_s", params, |name| {
        let (input, output) = in_out_ports(&bend)?;
        let mut cell = Component::new(name);
        let b1 = cell
            .add_instance(bend.clone(), "b1", Transformation::identity())
            .port(output.name())?;
        let trans = mate_transform(&input, &b1, true)?;
        let b2 = cell
            .add_instance(bend.clone(), "b2", trans)
            .port(output.name())?;
        cell.add_port(input.clone())?;
        cell.add_port(b2)?;
        if let Some(length) = bend.info_f64("length") {
            cell.set_info("length", 2. * length);
        }
        Ok(cell)
    })
}

/// Parameters of [`bend_straight_bend`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct BendStraightBendParams {
    /// The length of the middle straight, in micrometers.
    pub straight_length: f64,
    /// The turn of each bend, in degrees.
    pub angle: f64,
    /// The Euler fraction.
    pub p: f64,
    /// If `true`, the bend radius is the effective radius.
    pub with_arc_floorplan: bool,
    /// Points per full turn.
    pub npoints: usize,
    /// The turn direction of the first bend.
    pub direction: BendDirection,
    /// The cross-section name.
    pub cross_section: ArcStr,
}

impl Default for BendStraightBendParams {
    fn default() -> Self {
        Self {
            straight_length: 10.,
            angle: 90.,
            p: 0.5,
            with_arc_floorplan: true,
            npoints: 720,
            direction: BendDirection::Ccw,
            cross_section: arcstr::literal!("xs_sc"),
        }
    }
}

/// Two Euler bends with a straight in between; the second bend is mirrored.
pub fn bend_straight_bend(
    ctx: &Context,
    params: &BendStraightBendParams,
) -> Result<Arc<Component>> {
    let bend = bend_euler(
        ctx,
        &BendEulerParams {
            angle: params.angle,
            p: params.p,
            with_arc_floorplan: params.with_arc_floorplan,
            npoints: Some(params.npoints),
            direction: params.direction,
            cross_section: params.cross_section.clone(),
            ..Default::default()
        },
    )?;
    let middle = straight(
        ctx,
        &StraightParams {
            length: params.straight_length,
            cross_section: params.cross_section.clone(),
            ..Default::default()
        },
    )?;
    ctx.cell("bend_straight_bend", params, |name| {
        let (input, output) = in_out_ports(&bend)?;
        let (s_in, s_out) = in_out_ports(&middle)?;
        let mut cell = Component::new(name);
        let b1 = cell
            .add_instance(bend.clone(), "b1", Transformation::identity())
            .port(output.name())?;
        let trans = mate_transform(&s_in, &b1, false)?;
        let s = cell
            .add_instance(middle.clone(), "s", trans)
            .port(s_out.name())?;
        let trans = mate_transform(&input, &s, true)?;
        let b2 = cell
            .add_instance(bend.clone(), "b2", trans)
            .port(output.name())?;
        cell.add_port(input.clone())?;
        cell.add_port(b2)?;
        Ok(cell)
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use test_log::test;

    use super::*;
    use crate::error::Error;
    use crate::pdk::{GdsLayer, Pdk};

    fn ctx() -> Context {
        Context::new(Pdk::generic().unwrap())
    }

    #[test]
    fn default_bend_uses_cross_section_radius() {
        let ctx = ctx();
        let bend = bend_euler(&ctx, &BendEulerParams::default()).unwrap();
        let o1 = bend.port("o1").unwrap();
        let o2 = bend.port("o2").unwrap();
        assert_eq!(o1.center(), Point::zero());
        assert_eq!(o1.orientation(), Some(180.));
        assert_eq!(o2.center(), Point::new(10_000, 10_000));
        assert_eq!(o2.orientation(), Some(90.));
        assert_eq!(bend.info_f64("radius"), Some(10.));
        assert_eq!(bend.info_f64("n_bend_90"), Some(1.));
        let radius_min = bend.info_f64("radius_min").unwrap();
        assert!(radius_min < 10. && radius_min > 5.);
    }

    #[test]
    fn cladding_stays_behind_port_faces() {
        let ctx = ctx();
        let bend = bend_euler(&ctx, &BendEulerParams::default()).unwrap();
        let clad = bend
            .elements()
            .find(|e| *e.layer() == GdsLayer(111, 0))
            .and_then(|e| e.shape().rect())
            .unwrap();
        let core = bend
            .elements()
            .find(|e| *e.layer() == GdsLayer(1, 0))
            .and_then(|e| e.shape().bbox())
            .unwrap();
        assert_eq!(clad.left(), core.left());
        assert_eq!(clad.top(), core.top());
        assert_eq!(clad.right(), core.right() + 3_000);
        assert_eq!(clad.bot(), core.bot() - 3_000);
    }

    #[test]
    fn clockwise_bends_turn_right() {
        let ctx = ctx();
        let bend = bend_euler(
            &ctx,
            &BendEulerParams {
                direction: BendDirection::Cw,
                ..Default::default()
            },
        )
        .unwrap();
        let o2 = bend.port("o2").unwrap();
        assert_eq!(o2.center(), Point::new(10_000, -10_000));
        assert_eq!(o2.orientation(), Some(270.));
    }

    #[test]
    fn radius_violation_requires_override() {
        let ctx = ctx();
        let tight = BendEulerParams {
            radius: Some(3.),
            ..Default::default()
        };
        let err = bend_euler(&ctx, &tight).unwrap_err();
        assert!(matches!(err, Error::RadiusViolation { declared, .. } if declared == 5.));
        assert!(err.to_string().contains("xs_sc"));

        let bend = bend_euler(
            &ctx,
            &BendEulerParams {
                allow_min_radius_violation: true,
                ..tight
            },
        )
        .unwrap();
        assert!(bend.info_f64("radius_min").unwrap() < 5.);
    }

    #[test]
    fn no_radius_falls_back_to_wire_corner() {
        let ctx = ctx();
        let bend = bend_euler(
            &ctx,
            &BendEulerParams {
                cross_section: "xs_m3".into(),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(bend.name().starts_with("wire_corner_"));
        assert!(bend.try_port("e2").is_some());
    }

    #[test]
    fn one_eighty_bend_returns_west() {
        let ctx = ctx();
        let bend = bend_euler(
            &ctx,
            &BendEulerParams {
                angle: 180.,
                ..Default::default()
            },
        )
        .unwrap();
        let o2 = bend.port("o2").unwrap();
        assert_eq!(o2.center(), Point::new(0, 20_000));
        assert_eq!(o2.orientation(), Some(180.));
        assert_eq!(bend.info_f64("n_bend_90"), Some(2.));
    }

    #[test]
    fn circular_bend_reaches_declared_radius() {
        let ctx = ctx();
        let bend = bend_circular(
            &ctx,
            &BendCircularParams {
                radius: Some(5.),
                ..Default::default()
            },
        )
        .unwrap();
        assert_abs_diff_eq!(bend.info_f64("radius_min").unwrap(), 5., epsilon = 1e-9);
        assert_eq!(bend.port("o2").unwrap().center(), Point::new(5_000, 5_000));
    }

    #[test]
    fn s_bend_offsets_and_keeps_heading() {
        let ctx = ctx();
        let s = bend_euler_s(&ctx, &BendEulerParams::default()).unwrap();
        let o2 = s.port("o2").unwrap();
        assert_eq!(o2.center(), Point::new(20_000, 20_000));
        assert_eq!(o2.orientation(), Some(0.));
        assert_eq!(s.instances().count(), 2);
    }

    #[test]
    fn bend_straight_bend_adds_middle_length() {
        let ctx = ctx();
        let c = bend_straight_bend(&ctx, &BendStraightBendParams::default()).unwrap();
        let o2 = c.port("o2").unwrap();
        assert_eq!(o2.center(), Point::new(20_000, 30_000));
        assert_eq!(o2.orientation(), Some(0.));
    }
}
