use std::sync::Arc;

use arcstr::ArcStr;
use geometry::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{xs_port, xs_strips};
use crate::error::{Error, Result};
use crate::{Component, Context};

/// Parameters of [`straight`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct StraightParams {
    /// The length, in micrometers.
    pub length: f64,
    /// Overrides the cross-section width.
    pub width: Option<f64>,
    /// Overrides the cross-section layer.
    pub layer: Option<ArcStr>,
    /// The cross-section name.
    pub cross_section: ArcStr,
}

impl Default for StraightParams {
    fn default() -> Self {
        Self {
            length: 10.,
            width: None,
            layer: None,
            cross_section: arcstr::literal!("xs_sc"),
        }
    }
}

/// A straight waveguide or wire along +x.
///
/// Ports face 180 degrees at the origin and 0 degrees at `(length, 0)`.
pub fn straight(ctx: &Context, params: &StraightParams) -> Result<Arc<Component>> {
    if !(params.length >= 0.) {
        return Err(Error::config(format!(
            "straight length must be non-negative, got {}",
            params.length
        )));
    }
    let pdk = ctx.pdk();
    let xs = pdk
        .cross_section(&params.cross_section)?
        .clone()
        .with_width(params.width)
        .with_layer(params.layer.clone());
    ctx.cell("straight", params, |name| {
        let length = pdk.to_dbu(params.length);
        let mut cell = Component::new(name);
        let mut half_width = 0;
        for (layer, width, offset) in xs_strips(&xs) {
            let width = pdk.to_dbu(width);
            let bot = pdk.to_dbu(offset) - width / 2;
            half_width = half_width.max(bot + width).max(-bot);
            if length > 0 {
                cell.add_shape(pdk.layer(layer)?, Rect::from_sides(0, bot, length, bot + width));
            }
        }
        if length > 0 {
            for (layer, offset) in xs.bbox() {
                let grow = half_width + pdk.to_dbu(offset);
                cell.add_shape(pdk.layer(layer)?, Rect::from_sides(0, -grow, length, grow));
            }
        }
        cell.add_port(xs_port(pdk, &xs, 0, Point::zero(), 180.)?)?;
        cell.add_port(xs_port(pdk, &xs, 1, Point::new(length, 0), 0.)?)?;
        cell.set_info("length", pdk.to_um(length));
        cell.set_info("width", xs.width);
        cell.set_info("cross_section", xs.name().as_str());
        Ok(cell)
    })
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
    fn straight_has_two_ports() {
        let ctx = ctx();
        let s = straight(
            &ctx,
            &StraightParams {
                length: 12.5,
                ..Default::default()
            },
        )
        .unwrap();
        let o1 = s.port("o1").unwrap();
        let o2 = s.port("o2").unwrap();
        assert_eq!(o1.center(), Point::zero());
        assert_eq!(o1.orientation(), Some(180.));
        assert_eq!(o2.center(), Point::new(12_500, 0));
        assert_eq!(o2.orientation(), Some(0.));
        assert_eq!(o1.width(), 500);
        assert_eq!(s.info_f64("length"), Some(12.5));
        // Cladding stays within the port faces.
        let bbox = s.bbox().unwrap();
        assert_eq!((bbox.left(), bbox.right()), (0, 12_500));
        assert_eq!(bbox.top(), 3_250);
        assert!(s.elements().any(|e| *e.layer() == GdsLayer(111, 0)));
    }

    #[test]
    fn width_override_changes_ports() {
        let ctx = ctx();
        let s = straight(
            &ctx,
            &StraightParams {
                width: Some(1.2),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(s.port("o2").unwrap().width(), 1_200);
    }

    #[test]
    fn electrical_cross_sections_name_ports() {
        let ctx = ctx();
        let s = straight(
            &ctx,
            &StraightParams {
                cross_section: "xs_m3".into(),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(s.try_port("e1").is_some());
        assert!(s.try_port("e2").is_some());
    }

    #[test]
    fn zero_length_is_allowed_negative_is_not() {
        let ctx = ctx();
        let s = straight(
            &ctx,
            &StraightParams {
                length: 0.,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(s.elements().count(), 0);
        let err = straight(
            &ctx,
            &StraightParams {
                length: -1.,
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
