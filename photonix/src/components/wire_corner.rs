use std::sync::Arc;

use arcstr::ArcStr;
use geometry::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::xs_port;
use crate::error::Result;
use crate::{Component, Context};

/// Parameters of [`wire_corner`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct WireCornerParams {
    /// The cross-section name.
    pub cross_section: ArcStr,
    /// Overrides the cross-section width.
    pub width: Option<f64>,
    /// Overrides the cross-section layer.
    pub layer: Option<ArcStr>,
}

impl Default for WireCornerParams {
    fn default() -> Self {
        Self {
            cross_section: arcstr::literal!("xs_m3"),
            width: None,
            layer: None,
        }
    }
}

/// A zero-radius 90 degree corner: a square centered on the origin.
///
/// The input port faces West on the left edge; the output port faces North
/// on the top edge.
pub fn wire_corner(ctx: &Context, params: &WireCornerParams) -> Result<Arc<Component>> {
    let pdk = ctx.pdk();
    let xs = pdk
        .cross_section(&params.cross_section)?
        .clone()
        .with_width(params.width)
        .with_layer(params.layer.clone());
    ctx.cell("wire_corner", params, |name| {
        let width = pdk.to_dbu(xs.width);
        let square = Rect::from_center(Point::zero(), width, width);
        let mut cell = Component::new(name);
        cell.add_shape(pdk.layer(&xs.layer)?, square);
        cell.add_port(xs_port(pdk, &xs, 0, Point::new(square.left(), 0), 180.)?)?;
        cell.add_port(xs_port(pdk, &xs, 1, Point::new(0, square.top()), 90.)?)?;
        cell.set_info("length", xs.width);
        cell.set_info("cross_section", xs.name().as_str());
        Ok(cell)
    })
}
