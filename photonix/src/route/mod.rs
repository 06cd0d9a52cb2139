//! Manhattan route synthesis.
//!
//! A route is built in three steps: a backbone of corner points is chosen
//! (or taken from waypoints), validated, and then walked to place tapers,
//! straights and bends into a fresh route cell. The route cell is placed in
//! the destination cell and exposes only the two boundary ports.

use std::sync::Arc;

use arcstr::ArcStr;
use derive_builder::Builder;
use geometry::prelude::*;
use layir::PortType;
use serde_json::json;

use crate::diagnostics::{IssueSet, RouteIssue};
use crate::error::{Error, Result};
use crate::registry::ComponentSpec;
use crate::{Component, Context, Port};

mod assemble;
mod backbone;

pub use backbone::{synthesize_backbone, waypoint_backbone};

use assemble::{assemble, fit_end, validate_backbone, BendFootprint, Parts};

/// Options for [`route_single`].
#[derive(Debug, Clone, Builder)]
#[builder(default)]
pub struct RouteSingle {
    /// The 90 degree bend placed at each corner.
    #[builder(setter(into))]
    pub bend: ComponentSpec,
    /// The straight placed along each segment.
    #[builder(setter(into))]
    pub straight: ComponentSpec,
    /// The taper used at width transitions, if any.
    #[builder(setter(into))]
    pub taper: Option<ComponentSpec>,
    /// The minimum straight length after the start port, in micrometers.
    pub start_straight_length: f64,
    /// The minimum straight length before the end port, in micrometers.
    pub end_straight_length: f64,
    /// The cross-section of the route.
    #[builder(setter(into))]
    pub cross_section: ArcStr,
    /// Overrides the cross-section layer.
    #[builder(setter(into, strip_option))]
    pub layer: Option<ArcStr>,
    /// Overrides the cross-section width, in micrometers.
    #[builder(setter(strip_option))]
    pub width: Option<f64>,
    /// Explicit corner points, in micrometers.
    #[builder(setter(into, strip_option))]
    pub waypoints: Option<Vec<DPoint>>,
    /// The type both ports must have.
    pub port_type: PortType,
    /// Joins ports of a different width directly, with a warning.
    pub allow_width_mismatch: bool,
    /// The names of the boundary ports on the route cell.
    ///
    /// Defaults to the names of the two ports.
    #[builder(setter(into, strip_option))]
    pub port_names: Option<[ArcStr; 2]>,
}

impl Default for RouteSingle {
    fn default() -> Self {
        Self {
            bend: ComponentSpec::factory("bend_euler"),
            straight: ComponentSpec::factory("straight"),
            taper: Some(ComponentSpec::factory("taper")),
            start_straight_length: 0.,
            end_straight_length: 0.,
            cross_section: arcstr::literal!("xs_sc"),
            layer: None,
            width: None,
            waypoints: None,
            port_type: PortType::Optical,
            allow_width_mismatch: false,
            port_names: None,
        }
    }
}

impl RouteSingle {
    /// Returns a new [`RouteSingleBuilder`].
    #[inline]
    pub fn builder() -> RouteSingleBuilder {
        RouteSingleBuilder::default()
    }

    /// Options for metal routes: hard corners on `xs_m3`, no tapers,
    /// width mismatches allowed.
    pub fn electrical() -> Self {
        Self::from(&RouteElectrical::default())
    }

    /// The cross-section parameters shared by the bend and the straights.
    fn xs_params(&self) -> serde_json::Value {
        let mut params = json!({ "cross_section": self.cross_section.as_str() });
        if let Some(layer) = &self.layer {
            params["layer"] = json!(layer.as_str());
        }
        if let Some(width) = self.width {
            params["width"] = json!(width);
        }
        params
    }
}

/// Options for [`route_single_electrical`].
#[derive(Debug, Clone, Builder)]
#[builder(default)]
pub struct RouteElectrical {
    /// The minimum straight length after the start port, in micrometers.
    pub start_straight_length: f64,
    /// The minimum straight length before the end port, in micrometers.
    pub end_straight_length: f64,
    /// Overrides the cross-section layer.
    #[builder(setter(into, strip_option))]
    pub layer: Option<ArcStr>,
    /// Overrides the cross-section width, in micrometers.
    #[builder(setter(strip_option))]
    pub width: Option<f64>,
    /// The cross-section of the route.
    #[builder(setter(into))]
    pub cross_section: ArcStr,
    /// Joins ports of a different width directly, with a warning.
    pub allow_width_mismatch: bool,
}

impl Default for RouteElectrical {
    fn default() -> Self {
        Self {
            start_straight_length: 0.,
            end_straight_length: 0.,
            layer: None,
            width: None,
            cross_section: arcstr::literal!("xs_m3"),
            allow_width_mismatch: true,
        }
    }
}

impl RouteElectrical {
    /// Returns a new [`RouteElectricalBuilder`].
    #[inline]
    pub fn builder() -> RouteElectricalBuilder {
        RouteElectricalBuilder::default()
    }
}

impl From<&RouteElectrical> for RouteSingle {
    fn from(value: &RouteElectrical) -> Self {
        Self {
            bend: ComponentSpec::factory("wire_corner"),
            taper: None,
            start_straight_length: value.start_straight_length,
            end_straight_length: value.end_straight_length,
            cross_section: value.cross_section.clone(),
            layer: value.layer.clone(),
            width: value.width,
            port_type: PortType::Electrical,
            allow_width_mismatch: value.allow_width_mismatch,
            ..Default::default()
        }
    }
}

/// A route placed in a cell.
#[derive(Debug, Clone)]
pub struct ManhattanRoute {
    /// The route cell.
    pub cell: Arc<Component>,
    /// The name of the route instance in the destination cell.
    pub instance_name: ArcStr,
    /// The corner points the route follows, in DBU.
    pub backbone: Vec<Point>,
    /// The boundary ports, in destination cell coordinates.
    pub ports: [Port; 2],
    /// The total length of the straights, in micrometers.
    pub length_straights: f64,
    /// The total length of the route, in micrometers.
    pub length: f64,
    /// The number of 90 degree bends.
    pub n_bend90: usize,
    /// Non-fatal problems found while routing.
    pub issues: IssueSet<RouteIssue>,
}

/// Routes `port1` to `port2` and places the route in `cell`.
///
/// Both ports are in `cell` coordinates and point into the route. Fails
/// without modifying `cell` if the route cannot be built.
pub fn route_single(
    ctx: &Context,
    cell: &mut Component,
    port1: &Port,
    port2: &Port,
    options: &RouteSingle,
) -> Result<ManhattanRoute> {
    let span = tracing::info_span!("route_single", port1 = %port1.name(), port2 = %port2.name());
    let _guard = span.enter();

    for port in [port1, port2] {
        if *port.port_type() != options.port_type {
            return Err(Error::config(format!(
                "port `{}` is {} but the route expects {} ports",
                port.name(),
                port.port_type(),
                options.port_type
            )));
        }
    }
    let pdk = ctx.pdk();
    let xs = pdk
        .cross_section(&options.cross_section)?
        .clone()
        .with_layer(options.layer.clone())
        .with_width(options.width);
    let xs_params = options.xs_params();
    let bend = ctx.get_component(&options.bend, &xs_params)?;
    let footprint = BendFootprint::of(&bend)?;

    let mut issues = IssueSet::new();
    let tapers = [port1, port2].map(|port| {
        fit_end(
            ctx,
            port,
            &xs,
            options.layer.as_ref(),
            options.taper.as_ref(),
            options.allow_width_mismatch,
            &mut issues,
        )
    });
    let [start_taper, end_taper] = tapers;
    let tapers = [start_taper?, end_taper?];
    let taper_length = |i: usize| tapers[i].as_ref().map(|t| t.length()).unwrap_or_default();

    let backbone = match &options.waypoints {
        Some(waypoints) => waypoint_backbone(port1, port2, waypoints, pdk.grid()),
        None => synthesize_backbone(
            port1,
            port2,
            pdk.to_dbu(options.start_straight_length) + taper_length(0),
            pdk.to_dbu(options.end_straight_length) + taper_length(1),
            footprint.size(),
        )?,
    };
    let (points, dirs) = validate_backbone(backbone, port1, port2)?;

    let name = arcstr::format!("route_{}_{}", port1.name(), port2.name());
    let parts = Parts {
        bend: &bend,
        footprint,
        straight: &options.straight,
        tapers,
        xs_params,
    };
    let mut assembled = assemble(ctx, name, port1, port2, &points, &dirs, &parts)?;

    let [name1, name2] = options
        .port_names
        .clone()
        .unwrap_or_else(|| [port1.name().clone(), port2.name().clone()]);
    let ports = [port1.clone().with_name(name1), port2.clone().with_name(name2)];
    assembled.cell.set_ports(ports.clone())?;
    let length_straights = pdk.to_um(assembled.length_straights);
    assembled.cell.set_info("length", assembled.length);
    assembled.cell.set_info("n_bend_90", assembled.n_bend90);
    assembled.cell.set_info("cross_section", xs.name().as_str());

    let route_cell = Arc::new(assembled.cell);
    let instance_name = cell
        .add_instance(route_cell.clone(), "route", Transformation::identity())
        .name()
        .clone();
    tracing::info!(
        length = assembled.length,
        n_bend90 = assembled.n_bend90,
        issues = issues.len(),
        "placed route"
    );
    Ok(ManhattanRoute {
        cell: route_cell,
        instance_name,
        backbone: points,
        ports,
        length_straights,
        length: assembled.length,
        n_bend90: assembled.n_bend90,
        issues,
    })
}

/// Synthesizes a route between two ports; see [`route_single`].
#[inline]
pub fn synthesize_route(
    ctx: &Context,
    cell: &mut Component,
    port1: &Port,
    port2: &Port,
    options: &RouteSingle,
) -> Result<ManhattanRoute> {
    route_single(ctx, cell, port1, port2, options)
}

/// Routes two electrical ports with hard corners and no tapers.
pub fn route_single_electrical(
    ctx: &Context,
    cell: &mut Component,
    port1: &Port,
    port2: &Port,
    options: &RouteElectrical,
) -> Result<ManhattanRoute> {
    route_single(ctx, cell, port1, port2, &RouteSingle::from(options))
}
