use std::sync::Arc;

use arcstr::ArcStr;
use geometry::prelude::*;
use geometry::snap::snap_to_grid;
use layir::PortType;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::{Component, Context, Port};

/// Parameters of [`taper`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TaperParams {
    /// The length, in micrometers.
    pub length: f64,
    /// The width of the West port, in micrometers.
    pub width1: f64,
    /// The width of the East port, in micrometers. Defaults to `width1`.
    pub width2: Option<f64>,
    /// If `false`, only the West port is created.
    pub with_two_ports: bool,
    /// The cross-section name.
    pub cross_section: ArcStr,
    /// Overrides the cross-section layer.
    pub layer: Option<ArcStr>,
    /// Overrides the cross-section port names.
    pub port_names: Option<[ArcStr; 2]>,
    /// Overrides the cross-section port types.
    pub port_types: Option<[PortType; 2]>,
    /// Draws the cross-section cladding.
    pub with_bbox: bool,
}

impl Default for TaperParams {
    fn default() -> Self {
        Self {
            length: 10.,
            width1: 0.5,
            width2: None,
            with_two_ports: true,
            cross_section: arcstr::literal!("xs_sc"),
            layer: None,
            port_names: None,
            port_types: None,
            with_bbox: true,
        }
    }
}

/// A linear taper from `width1` at the origin to `width2` at `(length, 0)`.
///
/// Only the core is tapered; extra sections widen by the same amount.
pub fn taper(ctx: &Context, params: &TaperParams) -> Result<Arc<Component>> {
    if !(params.length > 0.) {
        return Err(Error::config(format!(
            "taper length must be positive, got {}",
            params.length
        )));
    }
    if !(params.width1 > 0.) || params.width2.is_some_and(|w| !(w > 0.)) {
        return Err(Error::config(format!(
            "taper widths must be positive, got {} and {:?}",
            params.width1, params.width2
        )));
    }
    let pdk = ctx.pdk();
    let xs = pdk
        .cross_section(&params.cross_section)?
        .clone()
        .with_layer(params.layer.clone());
    ctx.cell("taper", params, |name| {
        let length = pdk.to_dbu(params.length);
        // Both ends are kept on a two-unit grid so every edge lands on the grid.
        let w1 = snap_to_grid(pdk.to_dbu(params.width1), 2);
        let w2 = match params.width2 {
            Some(w) => snap_to_grid(pdk.to_dbu(w), 2),
            None => w1,
        };
        let mut cell = Component::new(name);

        let layer = pdk.layer(&xs.layer)?;
        cell.add_polygon(layer, trapezoid(length, w1, w2, 0));
        let delta = w2 - w1;
        for section in &xs.sections {
            let w = pdk.to_dbu(section.width);
            cell.add_polygon(
                pdk.layer(&section.layer)?,
                trapezoid(length, w, w + delta, pdk.to_dbu(section.offset)),
            );
        }
        if params.with_bbox {
            let half = w1.max(w2) / 2;
            for (bbox_layer, offset) in xs.bbox() {
                let grow = half + pdk.to_dbu(offset);
                cell.add_shape(
                    pdk.layer(bbox_layer)?,
                    Rect::from_sides(0, -grow, length, grow),
                );
            }
        }

        let names = params.port_names.as_ref().unwrap_or(&xs.port_names);
        let types = params.port_types.as_ref().unwrap_or(&xs.port_types);
        cell.add_port(Port::new(
            names[0].clone(),
            Point::zero(),
            Some(180.),
            w1,
            layer,
            types[0].clone(),
        )?)?;
        if params.with_two_ports {
            cell.add_port(Port::new(
                names[1].clone(),
                Point::new(length, 0),
                Some(0.),
                w2,
                layer,
                types[1].clone(),
            )?)?;
        }
        cell.set_info("length", params.length);
        cell.set_info("width1", pdk.to_um(w1));
        cell.set_info("width2", pdk.to_um(w2));
        Ok(cell)
    })
}

fn trapezoid(length: i64, w1: i64, w2: i64, offset: i64) -> Vec<Point> {
    vec![
        Point::new(0, offset + w1 / 2),
        Point::new(length, offset + w2 / 2),
        Point::new(length, offset - w2 / 2),
        Point::new(0, offset - w1 / 2),
    ]
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::pdk::{GdsLayer, Pdk};

    fn ctx() -> Context {
        Context::new(Pdk::generic().unwrap())
    }

    #[test]
    fn taper_widens_linearly() {
        let ctx = ctx();
        let t = taper(
            &ctx,
            &TaperParams {
                width2: Some(2.),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(t.port("o1").unwrap().width(), 500);
        let o2 = t.port("o2").unwrap();
        assert_eq!(o2.width(), 2_000);
        assert_eq!(o2.center(), Point::new(10_000, 0));
        let core = t
            .elements()
            .find(|e| *e.layer() == GdsLayer(1, 0))
            .and_then(|e| e.shape().polygon().cloned())
            .unwrap();
        assert_eq!(
            core.points(),
            &[
                Point::new(0, 250),
                Point::new(10_000, 1_000),
                Point::new(10_000, -1_000),
                Point::new(0, -250),
            ]
        );
        assert_eq!(t.info_f64("width2"), Some(2.));
    }

    #[test]
    fn far_width_snaps_to_even_units() {
        let ctx = ctx();
        let t = taper(
            &ctx,
            &TaperParams {
                width2: Some(0.603),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(t.port("o2").unwrap().width(), 602);
    }

    #[test]
    fn near_width_snaps_to_even_units() {
        let ctx = ctx();
        let t = taper(
            &ctx,
            &TaperParams {
                width1: 0.501,
                width2: Some(1.),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(t.port("o1").unwrap().width(), 500);
        let core = t
            .elements()
            .find(|e| *e.layer() == GdsLayer(1, 0))
            .and_then(|e| e.shape().polygon().cloned())
            .unwrap();
        assert_eq!(core.points()[0], Point::new(0, 250));
        assert_eq!(core.points()[3], Point::new(0, -250));
    }

    #[test]
    fn single_port_and_custom_names() {
        let ctx = ctx();
        let t = taper(
            &ctx,
            &TaperParams {
                with_two_ports: false,
                cross_section: "xs_heater_metal".into(),
                width1: 11.,
                width2: Some(2.5),
                port_names: Some(["a".into(), "b".into()]),
                with_bbox: false,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(t.num_ports(), 1);
        let a = t.port("a").unwrap();
        assert_eq!(a.width(), 11_000);
        assert_eq!(*a.port_type(), PortType::Electrical);
    }

    #[test]
    fn rejects_degenerate_tapers() {
        let ctx = ctx();
        for params in [
            TaperParams {
                length: 0.,
                ..Default::default()
            },
            TaperParams {
                width2: Some(-1.),
                ..Default::default()
            },
        ] {
            assert!(matches!(
                taper(&ctx, &params),
                Err(Error::Configuration(_))
            ));
        }
    }
}
