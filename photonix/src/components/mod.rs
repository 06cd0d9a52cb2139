//! Parametric component factories.
//!
//! Every factory takes a [`Context`] and a validated parameter struct and
//! returns a shared cell through the context's cell cache, so identical
//! parameters yield the same [`Arc<Component>`].

use std::sync::Arc;

use arcstr::ArcStr;
use geometry::prelude::*;
use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::pdk::{CrossSection, Pdk};
use crate::place::mate_transform;
use crate::{Component, Port};

mod bend;
mod cutback;
mod extrude;
mod heater;
mod pad;
mod straight;
mod taper;
mod via_stack;
mod wire_corner;

pub use bend::{
    bend_circular, bend_euler, bend_euler_s, bend_straight_bend, BendCircularParams,
    BendDirection, BendEulerParams, BendStraightBendParams,
};
pub use cutback::{cutback_loss_sizes, cutback_loss_spiral_lengths, CutbackSize};
pub use heater::{straight_heater_metal_undercut, HeaterParams};
pub use pad::{pad, pad_array, PadArrayParams, PadParams};
pub use straight::{straight, StraightParams};
pub use taper::{taper, TaperParams};
pub use via_stack::{via_stack, ViaSpec, ViaStackParams};
pub use wire_corner::{wire_corner, WireCornerParams};

/// Creates port `idx` (0 or 1) of a cell drawn with `xs`.
///
/// The port takes its name, type, layer and width from the cross-section.
pub(crate) fn xs_port(
    pdk: &Pdk,
    xs: &CrossSection,
    idx: usize,
    center: Point,
    orientation: f64,
) -> Result<Port> {
    Ok(Port::new(
        xs.port_names[idx].clone(),
        center,
        Some(orientation),
        pdk.to_dbu(xs.width),
        pdk.layer(&xs.layer)?,
        xs.port_types[idx].clone(),
    )?)
}

/// Iterates over `(layer, width, offset)` for the core and each section of `xs`.
pub(crate) fn xs_strips(xs: &CrossSection) -> impl Iterator<Item = (&ArcStr, f64, f64)> {
    std::iter::once((&xs.layer, xs.width, 0.)).chain(
        xs.sections
            .iter()
            .map(|section| (&section.layer, section.width, section.offset)),
    )
}

/// The input and output ports of a two-port cell: its first two ports.
pub(crate) fn in_out_ports(cell: &Component) -> Result<(Port, Port)> {
    let mut ports = cell.ports();
    match (ports.next(), ports.next()) {
        (Some(a), Some(b)) => Ok((a.clone(), b.clone())),
        _ => Err(Error::config(format!(
            "cell `{}` needs at least two ports, found {}",
            cell.name(),
            cell.num_ports()
        ))),
    }
}

/// A cell with its input and output port names, used by [`place_sequence`].
pub(crate) type SequenceElement = (Arc<Component>, ArcStr, ArcStr);

/// Places one instance per character of `sequence`, each connected input to
/// output after the previous one.
///
/// The first element sits at the origin unmoved. Returns the input port of the
/// first element and the output port of the last.
pub(crate) fn place_sequence(
    cell: &mut Component,
    sequence: &str,
    symbols: &IndexMap<char, SequenceElement>,
) -> Result<(Port, Port)> {
    let mut first: Option<Port> = None;
    let mut last: Option<Port> = None;
    for (i, symbol) in sequence.chars().enumerate() {
        let (child, input, output) = symbols.get(&symbol).ok_or_else(|| {
            Error::config(format!("sequence symbol `{symbol}` has no component"))
        })?;
        let trans = match &last {
            None => Transformation::identity(),
            Some(prev) => mate_transform(child.port(input)?, prev, false)?,
        };
        let inst = cell.add_instance(child.clone(), &format!("s{i}"), trans);
        if first.is_none() {
            first = Some(inst.port(input)?);
        }
        last = Some(inst.port(output)?);
    }
    match (first, last) {
        (Some(first), Some(last)) => Ok((first, last)),
        _ => Err(Error::config("component sequence is empty")),
    }
}

/// Draws the cladding of `xs` around `rect` on every side not listed in `open`.
pub(crate) fn add_cladding(
    cell: &mut Component,
    pdk: &Pdk,
    xs: &CrossSection,
    rect: Rect,
    open: &[Cardinal],
) -> Result<()> {
    for (layer, offset) in xs.bbox() {
        let offset = pdk.to_dbu(offset);
        let amounts = Cardinals::new(0, 0, 0, 0).map(|side, _| {
            if open.contains(side) {
                0
            } else {
                offset
            }
        });
        cell.add_shape(pdk.layer(layer)?, rect.expand_sides(amounts));
    }
    Ok(())
}
