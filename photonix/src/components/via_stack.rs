use std::sync::Arc;

use arcstr::ArcStr;
use geometry::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::pad::add_compass_ports;
use crate::error::{Error, Result};
use crate::{Component, Context};

/// A square via drawn in arrays between two metal layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViaSpec {
    /// The via layer name.
    pub layer: ArcStr,
    /// The via side length, in micrometers.
    #[serde(default = "ViaSpec::default_size")]
    pub size: f64,
    /// The center-to-center via pitch, in micrometers.
    #[serde(default = "ViaSpec::default_pitch")]
    pub pitch: f64,
    /// The minimum metal enclosure around the array, in micrometers.
    #[serde(default = "ViaSpec::default_enclosure")]
    pub enclosure: f64,
}

impl ViaSpec {
    /// Creates a via on `layer` with the default dimensions.
    pub fn new(layer: impl Into<ArcStr>) -> Self {
        Self {
            layer: layer.into(),
            size: Self::default_size(),
            pitch: Self::default_pitch(),
            enclosure: Self::default_enclosure(),
        }
    }

    fn default_size() -> f64 {
        0.7
    }

    fn default_pitch() -> f64 {
        2.
    }

    fn default_enclosure() -> f64 {
        1.
    }
}

/// Parameters of [`via_stack`].
///
/// `vias[i]` is drawn on top of `layers[i]`; `None` skips it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ViaStackParams {
    /// The x and y size of each metal rectangle, in micrometers.
    pub size: [f64; 2],
    /// Metal layer names, bottom to top.
    pub layers: Vec<ArcStr>,
    /// Vias drawn over each metal layer.
    pub vias: Vec<Option<ViaSpec>>,
}

impl Default for ViaStackParams {
    fn default() -> Self {
        Self {
            size: [11., 11.],
            layers: vec!["M1".into(), "M2".into(), "M3".into()],
            vias: vec![Some(ViaSpec::new("VIA1")), Some(ViaSpec::new("VIA2")), None],
        }
    }
}

impl ViaStackParams {
    /// The stack from a heater layer up to `M3`.
    pub fn heater() -> Self {
        Self {
            size: [11., 11.],
            layers: vec!["HEATER".into(), "M2".into(), "M3".into()],
            vias: vec![None, Some(ViaSpec::new("VIA1")), Some(ViaSpec::new("VIA2"))],
        }
    }
}

/// Returns the number of vias fitting along `width` and the margin from the
/// edge to the first via. All values are in database units.
fn via_array_1d(width: i64, size: i64, pitch: i64, enclosure: i64) -> Option<(i64, i64)> {
    let usable = width - size - 2 * enclosure;
    if usable < 0 {
        return None;
    }
    let n = usable / pitch + 1;
    Some((n, (width - (n - 1) * pitch - size) / 2))
}

/// Concentric metal rectangles on each of `layers`, joined by via arrays.
///
/// Electrical compass ports `e1`..`e4` sit on the top layer.
pub fn via_stack(ctx: &Context, params: &ViaStackParams) -> Result<Arc<Component>> {
    if params.layers.is_empty() {
        return Err(Error::config("via stack needs at least one layer"));
    }
    if params.layers.len() != params.vias.len() {
        return Err(Error::config(format!(
            "via stack has {} layers but {} vias",
            params.layers.len(),
            params.vias.len()
        )));
    }
    let pdk = ctx.pdk();
    let (w, h) = (pdk.to_dbu(params.size[0]), pdk.to_dbu(params.size[1]));
    if w <= 0 || h <= 0 {
        return Err(Error::config(format!(
            "via stack size must be positive, got {:?}",
            params.size
        )));
    }
    ctx.cell("via_stack", params, |name| {
        let rect = Rect::from_center(Point::zero(), w, h);
        let mut cell = Component::new(name);
        let mut top = None;
        for (layer, via) in params.layers.iter().zip(&params.vias) {
            let layer = pdk.layer(layer)?;
            cell.add_shape(layer, rect);
            top = Some(layer);
            let Some(via) = via else {
                continue;
            };
            let size = pdk.to_dbu(via.size);
            let pitch = pdk.to_dbu(via.pitch);
            let enclosure = pdk.to_dbu(via.enclosure);
            if size <= 0 || pitch <= 0 {
                return Err(Error::config(format!(
                    "via `{}` needs a positive size and pitch",
                    via.layer
                )));
            }
            let (Some((nx, mx)), Some((ny, my))) = (
                via_array_1d(w, size, pitch, enclosure),
                via_array_1d(h, size, pitch, enclosure),
            ) else {
                return Err(Error::config(format!(
                    "via `{}` of size {} um with enclosure {} um does not fit in {:?} um",
                    via.layer, via.size, via.enclosure, params.size
                )));
            };
            let via_layer = pdk.layer(&via.layer)?;
            for i in 0..nx {
                for j in 0..ny {
                    let left = rect.left() + mx + i * pitch;
                    let bot = rect.bot() + my + j * pitch;
                    cell.add_shape(
                        via_layer,
                        Rect::from_sides(left, bot, left + size, bot + size),
                    );
                }
            }
        }
        if let Some(top) = top {
            add_compass_ports(&mut cell, rect, top, 0)?;
        }
        cell.set_info("xsize", params.size[0]);
        cell.set_info("ysize", params.size[1]);
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
    fn via_arrays_are_centered() {
        assert_eq!(via_array_1d(11_000, 700, 2_000, 1_000), Some((5, 1_150)));
        assert_eq!(via_array_1d(2_700, 700, 2_000, 1_000), Some((1, 1_000)));
        assert_eq!(via_array_1d(2_000, 700, 2_000, 1_000), None);
    }

    #[test]
    fn default_stack_draws_layers_and_vias() {
        let ctx = ctx();
        let stack = via_stack(&ctx, &ViaStackParams::default()).unwrap();
        let count = |layer: GdsLayer| stack.elements().filter(|e| *e.layer() == layer).count();
        assert_eq!(count(GdsLayer(41, 0)), 1);
        assert_eq!(count(GdsLayer(45, 0)), 1);
        assert_eq!(count(GdsLayer(49, 0)), 1);
        assert_eq!(count(GdsLayer(44, 0)), 25);
        assert_eq!(count(GdsLayer(43, 0)), 25);
        let e3 = stack.port("e3").unwrap();
        assert_eq!(e3.center(), Point::new(5_500, 0));
        assert_eq!(*e3.layer(), GdsLayer(49, 0));
        assert_eq!(e3.width(), 11_000);
    }

    #[test]
    fn heater_stack_has_no_via_on_heater() {
        let ctx = ctx();
        let stack = via_stack(&ctx, &ViaStackParams::heater()).unwrap();
        assert!(stack.elements().any(|e| *e.layer() == GdsLayer(47, 0)));
        assert_eq!(stack.elements().count(), 3 + 25 + 25);
    }

    #[test]
    fn mismatched_or_tight_stacks_fail() {
        let ctx = ctx();
        let err = via_stack(
            &ctx,
            &ViaStackParams {
                vias: vec![None],
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        let err = via_stack(
            &ctx,
            &ViaStackParams {
                size: [2., 2.],
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("does not fit"));
    }
}
