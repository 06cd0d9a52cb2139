//! Process configuration: database unit, layers and cross-sections.
//!
//! A [`Pdk`] is loaded once and is read-only afterwards. It is handed to
//! component factories and routers through a [`Context`](crate::Context).

use std::path::Path;

use arcstr::ArcStr;
use geometry::prelude::*;
use geometry::snap::to_grid;
use indexmap::IndexMap;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

mod cross_section;
mod layers;

pub use cross_section::{CrossSection, Section};
pub use layers::{GdsLayer, LayerMap};

const GENERIC_PDK: &str = include_str!("generic.toml");

/// A process design kit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Pdk {
    name: ArcStr,
    /// Micrometers per database unit.
    dbu: Decimal,
    /// Points per full turn used when sampling bends.
    #[serde(default = "default_bend_points")]
    bend_points: usize,
    #[serde(default)]
    layers: LayerMap,
    #[serde(default)]
    cross_sections: IndexMap<ArcStr, CrossSection>,
}

fn default_bend_points() -> usize {
    720
}

impl Pdk {
    /// The generic PDK bundled with this crate.
    pub fn generic() -> Result<Self> {
        Self::from_toml_str(GENERIC_PDK)
    }

    /// Parses and validates a PDK from TOML.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut pdk: Pdk = toml::from_str(s)?;
        for (name, xs) in pdk.cross_sections.iter_mut() {
            xs.set_name(name.clone());
        }
        pdk.validate()?;
        tracing::debug!(
            pdk = %pdk.name,
            layers = pdk.layers.iter().count(),
            cross_sections = pdk.cross_sections.len(),
            "loaded PDK"
        );
        Ok(pdk)
    }

    /// Reads a PDK from a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)?;
        Self::from_toml_str(&s).map_err(|e| match e {
            Error::PdkParse(msg) => Error::PdkParse(format!("{}: {msg}", path.display())),
            e => e,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.dbu <= Decimal::ZERO {
            return Err(Error::config(format!(
                "PDK `{}` has non-positive database unit {}",
                self.name, self.dbu
            )));
        }
        if self.bend_points < 4 {
            return Err(Error::config(format!(
                "PDK `{}` samples bends with {} points per turn (at least 4 required)",
                self.name, self.bend_points
            )));
        }
        for xs in self.cross_sections.values() {
            xs.validate(&self.layers)?;
        }
        Ok(())
    }

    /// The PDK name.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// Micrometers per database unit.
    #[inline]
    pub fn dbu(&self) -> Decimal {
        self.dbu
    }

    /// Micrometers per database unit, as a float.
    pub fn grid(&self) -> f64 {
        self.dbu.to_f64().unwrap_or_default()
    }

    /// Points per full turn used when sampling bends.
    #[inline]
    pub fn bend_points(&self) -> usize {
        self.bend_points
    }

    /// Converts micrometers to database units, rounding half to even.
    ///
    /// ```
    /// # use photonix::pdk::Pdk;
    /// let pdk = Pdk::generic()?;
    /// assert_eq!(pdk.to_dbu(0.5), 500);
    /// assert_eq!(pdk.to_dbu(0.0025), 2);
    /// assert_eq!(pdk.to_dbu(0.0035), 4);
    /// # Ok::<(), photonix::error::Error>(())
    /// ```
    pub fn to_dbu(&self, um: f64) -> i64 {
        Decimal::from_f64(um)
            .and_then(|um| um.checked_div(self.dbu))
            .map(|v| v.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven))
            .and_then(|v| v.to_i64())
            .unwrap_or_else(|| to_grid(um, self.grid()))
    }

    /// Converts database units to micrometers.
    pub fn to_um(&self, dbu: i64) -> f64 {
        Decimal::from(dbu)
            .checked_mul(self.dbu)
            .and_then(|v| v.to_f64())
            .unwrap_or_else(|| dbu as f64 * self.grid())
    }

    /// Converts a point in micrometers to database units.
    pub fn point_to_dbu(&self, p: DPoint) -> Point {
        Point::new(self.to_dbu(p.x), self.to_dbu(p.y))
    }

    /// Converts a point in database units to micrometers.
    pub fn point_to_um(&self, p: Point) -> DPoint {
        DPoint::new(self.to_um(p.x), self.to_um(p.y))
    }

    /// Looks up a layer by name.
    pub fn layer(&self, name: &str) -> Result<GdsLayer> {
        self.layers.get(name)
    }

    /// The layer registry.
    #[inline]
    pub fn layers(&self) -> &LayerMap {
        &self.layers
    }

    /// Looks up a cross-section by name.
    pub fn cross_section(&self, name: &str) -> Result<&CrossSection> {
        self.cross_sections.get(name).ok_or_else(|| {
            Error::config(format!(
                "unknown cross-section `{name}` in PDK `{}`",
                self.name
            ))
        })
    }

    /// Iterates over the registered cross-sections.
    pub fn cross_sections(&self) -> impl Iterator<Item = &CrossSection> {
        self.cross_sections.values()
    }

    /// Registers a cross-section, replacing any existing one of the same name.
    pub fn add_cross_section(
        &mut self,
        name: impl Into<ArcStr>,
        mut xs: CrossSection,
    ) -> Result<()> {
        let name = name.into();
        xs.set_name(name.clone());
        xs.validate(&self.layers)?;
        self.cross_sections.insert(name, xs);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use test_log::test;

    use super::*;

    #[test]
    fn generic_pdk_loads() {
        let pdk = Pdk::generic().unwrap();
        assert_eq!(pdk.name(), "generic");
        assert_eq!(pdk.dbu(), dec!(0.001));
        assert_eq!(pdk.layer("WG").unwrap(), GdsLayer(1, 0));
        let xs = pdk.cross_section("xs_sc").unwrap();
        assert_eq!(xs.name(), "xs_sc");
        assert_eq!(xs.radius, Some(10.));
        let m3 = pdk.cross_section("xs_m3").unwrap();
        assert_eq!(m3.port_names[0].as_str(), "e1");
        assert_eq!(m3.radius, None);
    }

    #[test]
    fn unit_conversion_rounds_half_to_even() {
        let pdk = Pdk::generic().unwrap();
        assert_eq!(pdk.to_dbu(10.), 10_000);
        assert_eq!(pdk.to_dbu(-0.0005), 0);
        assert_eq!(pdk.to_dbu(0.0015), 2);
        assert_eq!(pdk.to_dbu(9.999_999_999_999_998), 10_000);
        assert_eq!(pdk.to_um(2_500), 2.5);
        assert_eq!(
            pdk.point_to_dbu(DPoint::new(1.25, -3.)),
            Point::new(1_250, -3_000)
        );
    }

    #[test]
    fn unknown_names_are_configuration_errors() {
        let pdk = Pdk::generic().unwrap();
        let err = pdk.cross_section("xs_missing").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("xs_missing"));
        assert!(pdk.layer("NOPE").is_err());
    }

    #[test]
    fn rejects_invalid_files() {
        let err = Pdk::from_toml_str("name = \"bad\"\ndbu = \"0\"\n").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let err = Pdk::from_toml_str(
            r#"
            name = "bad"
            dbu = "0.001"
            [layers]
            WG = [1, 0]
            [cross_sections.xs]
            layer = "WG"
            width = 0.5
            bbox_layers = ["WG"]
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("bbox"));

        let err = Pdk::from_toml_str("name = 1").unwrap_err();
        assert!(matches!(err, Error::PdkParse(_)));
    }

    #[test]
    fn add_cross_section_validates() {
        let mut pdk = Pdk::generic().unwrap();
        let mut xs = pdk.cross_section("xs_sc").unwrap().clone();
        xs.radius_min = Some(8.);
        pdk.add_cross_section("xs_tight", xs.clone()).unwrap();
        assert_eq!(pdk.cross_section("xs_tight").unwrap().name(), "xs_tight");

        xs.layer = "MISSING".into();
        assert!(pdk.add_cross_section("xs_bad", xs).is_err());
    }
}
