use std::sync::Arc;

use arcstr::ArcStr;
use geometry::prelude::*;
use layir::PortType;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pdk::{GdsLayer, Pdk};
use crate::{Component, Context, Port};

/// Parameters of [`pad`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PadParams {
    /// The x and y size, in micrometers.
    pub size: [f64; 2],
    /// The pad layer name.
    pub layer: ArcStr,
    /// Cladding layer names.
    pub bbox_layers: Vec<ArcStr>,
    /// Cladding growth for each of `bbox_layers`, in micrometers.
    pub bbox_offsets: Vec<f64>,
    /// Moves the compass ports inwards from the pad edge, in micrometers.
    pub port_inclusion: f64,
    /// The orientation of the `pad` port, in degrees.
    pub port_orientation: f64,
}

impl Default for PadParams {
    fn default() -> Self {
        Self {
            size: [100., 100.],
            layer: arcstr::literal!("M3"),
            bbox_layers: Vec::new(),
            bbox_offsets: Vec::new(),
            port_inclusion: 0.,
            port_orientation: 0.,
        }
    }
}

/// Names of the compass ports, keyed by the side they face.
const COMPASS_PORTS: [(&str, Cardinal); 4] = [
    ("e1", Cardinal::West),
    ("e2", Cardinal::North),
    ("e3", Cardinal::East),
    ("e4", Cardinal::South),
];

/// Adds electrical ports `e1` (West) through `e4` (South) at the side centers
/// of `rect`, moved `inclusion` DBU inwards.
pub(crate) fn add_compass_ports(
    cell: &mut Component,
    rect: Rect,
    layer: GdsLayer,
    inclusion: i64,
) -> Result<()> {
    for (name, side) in COMPASS_PORTS {
        let center = rect.side_center(side) - side.unit().scale(inclusion);
        cell.add_port(Port::new(
            name,
            center,
            Some(side.angle()),
            rect.side_length(side),
            layer,
            PortType::Electrical,
        )?)?;
    }
    Ok(())
}

fn size_dbu(pdk: &Pdk, size: [f64; 2]) -> Result<(i64, i64)> {
    let (x, y) = (pdk.to_dbu(size[0]), pdk.to_dbu(size[1]));
    if x <= 0 || y <= 0 {
        return Err(Error::config(format!(
            "pad size must be positive, got {size:?}"
        )));
    }
    Ok((x, y))
}

/// A rectangular pad centered on the origin.
///
/// Carries compass ports `e1`..`e4` and a `vertical_dc` port named `pad` at
/// the center.
pub fn pad(ctx: &Context, params: &PadParams) -> Result<Arc<Component>> {
    let pdk = ctx.pdk();
    let (xsize, ysize) = size_dbu(pdk, params.size)?;
    if params.bbox_layers.len() != params.bbox_offsets.len() {
        return Err(Error::config(format!(
            "pad has {} bbox layers but {} bbox offsets",
            params.bbox_layers.len(),
            params.bbox_offsets.len()
        )));
    }
    ctx.cell("pad", params, |name| {
        let layer = pdk.layer(&params.layer)?;
        let rect = Rect::from_center(Point::zero(), xsize, ysize);
        let mut cell = Component::new(name);
        cell.add_shape(layer, rect);
        add_compass_ports(&mut cell, rect, layer, pdk.to_dbu(params.port_inclusion))?;
        for (bbox_layer, offset) in params.bbox_layers.iter().zip(&params.bbox_offsets) {
            cell.add_shape(pdk.layer(bbox_layer)?, rect.expand_all(pdk.to_dbu(*offset)));
        }
        let width = match Cardinal::from_manhattan_angle(params.port_orientation) {
            Some(Cardinal::North | Cardinal::South) => xsize,
            _ => ysize,
        };
        cell.add_port(Port::new(
            "pad",
            Point::zero(),
            Some(params.port_orientation),
            width,
            layer,
            PortType::Vertical(arcstr::literal!("dc")),
        )?)?;
        cell.set_info("size", params.size.to_vec());
        cell.set_info("xsize", params.size[0]);
        cell.set_info("ysize", params.size[1]);
        Ok(cell)
    })
}

/// Parameters of [`pad_array`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PadArrayParams {
    /// The x and y pitch, in micrometers.
    pub spacing: [f64; 2],
    /// The number of columns.
    pub columns: usize,
    /// The number of rows.
    pub rows: usize,
    /// The orientation of every port, in degrees.
    pub port_orientation: f64,
    /// The pad size, in micrometers.
    pub size: [f64; 2],
    /// The pad layer name.
    pub layer: ArcStr,
}

impl Default for PadArrayParams {
    fn default() -> Self {
        Self {
            spacing: [150., 150.],
            columns: 6,
            rows: 1,
            port_orientation: 0.,
            size: [100., 100.],
            layer: arcstr::literal!("M3"),
        }
    }
}

/// A `rows` by `columns` grid of pads with the first pad at the origin.
///
/// Pad `(row, col)` exposes an electrical port `e{row+1}{col+1}` at its center.
pub fn pad_array(ctx: &Context, params: &PadArrayParams) -> Result<Arc<Component>> {
    if params.rows == 0 || params.columns == 0 {
        return Err(Error::config(format!(
            "pad array needs at least one row and column, got {} x {}",
            params.rows, params.columns
        )));
    }
    let pdk = ctx.pdk();
    let (xsize, ysize) = size_dbu(pdk, params.size)?;
    let pad = pad(
        ctx,
        &PadParams {
            size: params.size,
            layer: params.layer.clone(),
            port_orientation: params.port_orientation,
            ..Default::default()
        },
    )?;
    ctx.cell("pad_array", params, |name| {
        let layer = pdk.layer(&params.layer)?;
        let pitch = pdk.point_to_dbu(DPoint::new(params.spacing[0], params.spacing[1]));
        let width = match Cardinal::from_manhattan_angle(params.port_orientation) {
            Some(Cardinal::North | Cardinal::South) => xsize,
            _ => ysize,
        };
        let mut cell = Component::new(name);
        for row in 0..params.rows {
            for col in 0..params.columns {
                let center = Point::new(col as i64 * pitch.x, row as i64 * pitch.y);
                cell.add_instance(
                    pad.clone(),
                    &format!("pad_{row}_{col}"),
                    Transformation::translate(center.x, center.y),
                );
                cell.add_port(Port::new(
                    arcstr::format!("e{}{}", row + 1, col + 1),
                    center,
                    Some(params.port_orientation),
                    width,
                    layer,
                    PortType::Electrical,
                )?)?;
            }
        }
        Ok(cell)
    })
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn ctx() -> Context {
        Context::new(Pdk::generic().unwrap())
    }

    #[test]
    fn pad_has_compass_and_vertical_ports() {
        let ctx = ctx();
        let pad = pad(
            &ctx,
            &PadParams {
                size: [80., 60.],
                port_orientation: 90.,
                ..Default::default()
            },
        )
        .unwrap();
        let names: Vec<&str> = pad.ports().map(|p| p.name().as_str()).collect();
        assert_eq!(names, vec!["e1", "e2", "e3", "e4", "pad"]);
        let e1 = pad.port("e1").unwrap();
        assert_eq!(e1.center(), Point::new(-40_000, 0));
        assert_eq!(e1.orientation(), Some(180.));
        assert_eq!(e1.width(), 60_000);
        assert_eq!(pad.port("e2").unwrap().width(), 80_000);
        let vertical = pad.port("pad").unwrap();
        assert_eq!(vertical.port_type().to_string(), "vertical_dc");
        assert_eq!(vertical.width(), 80_000);
        assert_eq!(pad.info_f64("xsize"), Some(80.));
    }

    #[test]
    fn port_inclusion_moves_ports_inwards() {
        let ctx = ctx();
        let pad = pad(
            &ctx,
            &PadParams {
                port_inclusion: 5.,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(pad.port("e3").unwrap().center(), Point::new(45_000, 0));
        assert_eq!(pad.port("e4").unwrap().center(), Point::new(0, -45_000));
    }

    #[test]
    fn pad_cladding_grows_outline() {
        let ctx = ctx();
        let pad = pad(
            &ctx,
            &PadParams {
                bbox_layers: vec!["PAD".into()],
                bbox_offsets: vec![2.],
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(
            pad.bbox(),
            Some(Rect::from_sides(-52_000, -52_000, 52_000, 52_000))
        );
        let err = super::pad(
            &ctx,
            &PadParams {
                bbox_layers: vec!["PAD".into()],
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn pad_array_names_ports_by_row_and_column() {
        let ctx = ctx();
        let array = pad_array(
            &ctx,
            &PadArrayParams {
                columns: 3,
                rows: 2,
                port_orientation: 270.,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(array.num_ports(), 6);
        assert_eq!(array.instances().count(), 6);
        let e23 = array.port("e23").unwrap();
        assert_eq!(e23.center(), Point::new(300_000, 150_000));
        assert_eq!(e23.orientation(), Some(270.));
        assert_eq!(e23.width(), 100_000);
        assert_eq!(*e23.port_type(), PortType::Electrical);
    }
}
