use std::sync::Arc;

use arcstr::ArcStr;
use geometry::prelude::*;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::components::{
    place_sequence, straight, taper, via_stack, StraightParams, TaperParams, ViaStackParams,
};
use crate::error::{Error, Result};
use crate::{Component, Context, Port, PortFilter};

/// Parameters of [`straight_heater_metal_undercut`].
///
/// Lengths are in micrometers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct HeaterParams {
    /// The total length.
    pub length: f64,
    /// The heater-only length between undercut trenches.
    pub length_undercut_spacing: f64,
    /// The length of each undercut trench.
    pub length_undercut: f64,
    /// The bare waveguide at each end.
    pub length_straight: f64,
    /// The minimum heated length before the first trench.
    pub length_straight_input: f64,
    /// The bare waveguide cross-section.
    pub cross_section: ArcStr,
    /// The heater metal cross-section, used for the tapers.
    pub cross_section_heater: ArcStr,
    /// The waveguide-with-heater cross-section.
    pub cross_section_waveguide_heater: ArcStr,
    /// The waveguide-with-heater-and-trench cross-section.
    pub cross_section_heater_undercut: ArcStr,
    /// If `false`, trenches are replaced by plain heated waveguide.
    pub with_undercut: bool,
    /// The via stacks at each end; `None` omits them and the tapers.
    pub via_stack: Option<ViaStackParams>,
    /// Exposes only the West via stack ports facing this way.
    pub port_orientation1: Option<f64>,
    /// Exposes only the East via stack ports facing this way.
    pub port_orientation2: Option<f64>,
    /// The length of the tapers from via stack to heater.
    pub heater_taper_length: Option<f64>,
    /// The heater sheet resistance, used for the `resistance` info entry.
    pub ohms_per_square: Option<f64>,
}

impl Default for HeaterParams {
    fn default() -> Self {
        Self {
            length: 320.,
            length_undercut_spacing: 6.,
            length_undercut: 30.,
            length_straight: 0.1,
            length_straight_input: 15.,
            cross_section: arcstr::literal!("xs_sc"),
            cross_section_heater: arcstr::literal!("xs_heater_metal"),
            cross_section_waveguide_heater: arcstr::literal!("xs_sc_heater_metal"),
            cross_section_heater_undercut: arcstr::literal!("xs_sc_heater_metal_undercut"),
            with_undercut: true,
            via_stack: Some(ViaStackParams::heater()),
            port_orientation1: None,
            port_orientation2: None,
            heater_taper_length: Some(5.),
            ohms_per_square: None,
        }
    }
}

/// Segment lengths of a heater, in micrometers.
#[derive(Debug, Clone, Copy, PartialEq)]
struct HeaterLayout {
    periods: usize,
    input: f64,
}

impl HeaterParams {
    fn layout(&self) -> Result<HeaterLayout> {
        let period = self.length_undercut + self.length_undercut_spacing;
        if !(period > 0.) {
            return Err(Error::config(format!(
                "heater undercut period must be positive, got {period} um"
            )));
        }
        let periods = ((self.length - 2. * self.length_straight_input) / period).floor();
        if !(periods >= 1.) {
            return Err(Error::config(format!(
                "heater length {} um is too short for one {period} um undercut period \
                 with {} um inputs",
                self.length, self.length_straight_input
            )));
        }
        let input = (self.length - periods * period) / 2.;
        if self.length_straight > input {
            return Err(Error::config(format!(
                "length_straight {} um exceeds the heater input length {input} um",
                self.length_straight
            )));
        }
        Ok(HeaterLayout {
            periods: periods as usize,
            input: input - self.length_straight,
        })
    }
}

/// Ports of `ports` facing `orientation`, or all of them if it is `None`.
fn ports_facing(ports: Vec<Port>, orientation: Option<f64>, side: &str) -> Result<Vec<Port>> {
    let Some(orientation) = orientation else {
        return Ok(ports);
    };
    let filter = PortFilter::new().orientation(orientation);
    let available: Vec<f64> = ports.iter().filter_map(|p| p.orientation()).collect();
    let selected: Vec<Port> = ports.into_iter().filter(|p| filter.matches(p)).collect();
    if selected.is_empty() {
        return Err(Error::PortOrientation(format!(
            "no {side} via stack port faces {orientation}, available orientations are {available:?}"
        )));
    }
    Ok(selected)
}

/// A straight waveguide with a metal heater and optional undercut trenches.
///
/// The waveguide runs from `o1` at the origin to `o2` at `(length, 0)`. Via
/// stack ports are exposed with `l_` and `r_` prefixes.
pub fn straight_heater_metal_undercut(
    ctx: &Context,
    params: &HeaterParams,
) -> Result<Arc<Component>> {
    let layout = params.layout()?;
    let pdk = ctx.pdk();
    let heater_width = pdk.cross_section(&params.cross_section_heater)?.width;

    let section = |length: f64, cross_section: &ArcStr| {
        straight(
            ctx,
            &StraightParams {
                length,
                cross_section: cross_section.clone(),
                ..Default::default()
            },
        )
    };
    let undercut_xs = if params.with_undercut {
        &params.cross_section_heater_undercut
    } else {
        &params.cross_section_waveguide_heater
    };
    let o1 = arcstr::literal!("o1");
    let o2 = arcstr::literal!("o2");
    let symbols = IndexMap::from([
        (
            '_',
            (
                section(params.length_straight, &params.cross_section)?,
                o1.clone(),
                o2.clone(),
            ),
        ),
        (
            '-',
            (
                section(layout.input, &params.cross_section_waveguide_heater)?,
                o1.clone(),
                o2.clone(),
            ),
        ),
        (
            'U',
            (
                section(params.length_undercut, undercut_xs)?,
                o1.clone(),
                o2.clone(),
            ),
        ),
        (
            'H',
            (
                section(
                    params.length_undercut_spacing,
                    &params.cross_section_waveguide_heater,
                )?,
                o1.clone(),
                o2.clone(),
            ),
        ),
    ]);
    let sequence = format!("_-{}-_", "UH".repeat(layout.periods));

    let via = params
        .via_stack
        .as_ref()
        .map(|stack| via_stack(ctx, stack))
        .transpose()?;
    let taper_length = params.heater_taper_length.filter(|l| *l > 0.);
    let heater_taper = match (&via, taper_length) {
        (Some(via), Some(length)) => Some(taper(
            ctx,
            &TaperParams {
                length,
                width1: pdk.to_um(via.port("e1")?.width()),
                width2: Some(heater_width),
                cross_section: params.cross_section_heater.clone(),
                port_names: Some([arcstr::literal!("e1"), arcstr::literal!("e2")]),
                port_types: Some([layir::PortType::Electrical, layir::PortType::Electrical]),
                ..Default::default()
            },
        )?),
        _ => None,
    };

    ctx.cell("straight_heater_metal_undercut", params, |name| {
        let mut cell = Component::new(name);
        let (input, output) = place_sequence(&mut cell, &sequence, &symbols)?;
        cell.add_port(input.with_name(o1.clone()))?;
        cell.add_port(output.clone().with_name(o2.clone()))?;

        if let Some(via) = &via {
            let via_width = via.bbox().map(|b| b.width()).unwrap_or_default();
            let dx = via_width / 2 + pdk.to_dbu(taper_length.unwrap_or_default())
                - pdk.to_dbu(params.length_straight);
            let west: Vec<Port> = cell
                .add_instance(via.clone(), "via_stack_w", Transformation::translate(-dx, 0))
                .ports()
                .collect();
            let east: Vec<Port> = cell
                .add_instance(
                    via.clone(),
                    "via_stack_e",
                    Transformation::translate(output.center().x + dx, 0),
                )
                .ports()
                .collect();

            if let Some(heater_taper) = &heater_taper {
                let input = heater_taper.port("e1")?;
                for (inst, target) in [("taper_w", "e3"), ("taper_e", "e1")] {
                    let ports = if inst == "taper_w" { &west } else { &east };
                    let target = ports
                        .iter()
                        .find(|p| p.name() == target)
                        .ok_or_else(|| Error::config(format!("via stack has no port `{target}`")))?;
                    let trans = crate::place::mate_transform(input, target, false)?;
                    cell.add_instance(heater_taper.clone(), inst, trans);
                }
            }

            for (prefix, ports, orientation) in [
                ("l", west, params.port_orientation1),
                ("r", east, params.port_orientation2),
            ] {
                let side = if prefix == "l" { "West" } else { "East" };
                for port in ports_facing(ports, orientation, side)? {
                    let name = arcstr::format!("{prefix}_{}", port.name());
                    cell.add_port(port.with_name(name))?;
                }
            }
        }

        cell.set_info("length", params.length);
        cell.set_info(
            "resistance",
            params
                .ohms_per_square
                .map(|ohms| ohms * heater_width * params.length)
                .unwrap_or_default(),
        );
        Ok(cell)
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use test_log::test;

    use super::*;
    use crate::pdk::{GdsLayer, Pdk};

    fn ctx() -> Context {
        Context::new(Pdk::generic().unwrap())
    }

    #[test]
    fn layout_fits_whole_periods() {
        let layout = HeaterParams::default().layout().unwrap();
        assert_eq!(layout.periods, 8);
        assert_relative_eq!(layout.input, 15.9, epsilon = 1e-9);
    }

    #[test]
    fn heater_spans_requested_length() {
        let ctx = ctx();
        let heater = straight_heater_metal_undercut(&ctx, &HeaterParams::default()).unwrap();
        let o1 = heater.port("o1").unwrap();
        let o2 = heater.port("o2").unwrap();
        assert_eq!(o1.center(), Point::zero());
        assert_eq!(o2.center(), Point::new(320_000, 0));
        assert_eq!(o2.orientation(), Some(0.));
        // 20 sequence elements, 2 via stacks, 2 tapers.
        assert_eq!(heater.instances().count(), 24);
        assert_eq!(heater.num_ports(), 10);
        assert!(heater.try_port("l_e3").is_some());
        assert!(heater.try_port("r_e1").is_some());

        let taper_w = heater.instance("taper_w").unwrap();
        let e2 = taper_w.port("e2").unwrap();
        assert_eq!(e2.center(), Point::new(100, 0));
        let taper_e = heater.instance("taper_e").unwrap();
        assert_eq!(taper_e.port("e2").unwrap().center(), Point::new(319_900, 0));
        assert_eq!(
            heater.instance("via_stack_w").unwrap().transformation().offset_point(),
            Point::new(-10_400, 0)
        );
    }

    #[test]
    fn undercut_can_be_disabled() {
        let ctx = ctx();
        let has_trench = |cell: &Component| {
            cell.instances()
                .any(|inst| inst.child().elements().any(|e| *e.layer() == GdsLayer(4, 0)))
        };
        let with = straight_heater_metal_undercut(&ctx, &HeaterParams::default()).unwrap();
        assert!(has_trench(&with));
        let without = straight_heater_metal_undercut(
            &ctx,
            &HeaterParams {
                with_undercut: false,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(!has_trench(&without));
    }

    #[test]
    fn port_orientations_select_via_ports() {
        let ctx = ctx();
        let heater = straight_heater_metal_undercut(
            &ctx,
            &HeaterParams {
                port_orientation1: Some(90.),
                port_orientation2: Some(90.),
                ..Default::default()
            },
        )
        .unwrap();
        let names: Vec<&str> = heater.ports().map(|p| p.name().as_str()).collect();
        assert_eq!(names, vec!["o1", "o2", "l_e2", "r_e2"]);

        let err = straight_heater_metal_undercut(
            &ctx,
            &HeaterParams {
                port_orientation1: Some(45.),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::PortOrientation(_)));
    }

    #[test]
    fn resistance_uses_sheet_resistance() {
        let ctx = ctx();
        let heater = straight_heater_metal_undercut(
            &ctx,
            &HeaterParams {
                ohms_per_square: Some(0.1),
                via_stack: None,
                ..Default::default()
            },
        )
        .unwrap();
        assert_relative_eq!(heater.info_f64("resistance").unwrap(), 80., epsilon = 1e-9);
        assert_eq!(heater.num_ports(), 2);
    }

    #[test]
    fn invalid_lengths_are_rejected() {
        for params in [
            HeaterParams {
                length: 40.,
                ..Default::default()
            },
            HeaterParams {
                length_straight: 20.,
                ..Default::default()
            },
        ] {
            assert!(matches!(params.layout(), Err(Error::Configuration(_))));
        }
    }
}
