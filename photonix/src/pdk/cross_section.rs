//! Cross-section recipes.

use arcstr::ArcStr;
use layir::PortType;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pdk::layers::LayerMap;

/// A named geometry recipe: a core layer and width, optional bend radii,
/// extra sections, and cladding.
///
/// Cross-sections are immutable values. Overrides such as
/// [`CrossSection::with_width`] return modified copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrossSection {
    #[serde(skip)]
    name: ArcStr,
    /// The core layer name.
    pub layer: ArcStr,
    /// The core width, in micrometers.
    pub width: f64,
    /// The default bend radius, in micrometers.
    #[serde(default)]
    pub radius: Option<f64>,
    /// The smallest radius a bend may reach without an explicit override.
    #[serde(default)]
    pub radius_min: Option<f64>,
    /// Additional sections drawn alongside the core.
    #[serde(default)]
    pub sections: Vec<Section>,
    /// Cladding layers.
    #[serde(default)]
    pub bbox_layers: Vec<ArcStr>,
    /// Cladding growth for each of `bbox_layers`, in micrometers.
    #[serde(default)]
    pub bbox_offsets: Vec<f64>,
    /// Names of the input and output ports.
    #[serde(default = "default_port_names")]
    pub port_names: [ArcStr; 2],
    /// Types of the input and output ports.
    #[serde(default = "default_port_types")]
    pub port_types: [PortType; 2],
}

/// A strip drawn parallel to the core of a [`CrossSection`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Section {
    /// The layer name.
    pub layer: ArcStr,
    /// The strip width, in micrometers.
    pub width: f64,
    /// The offset of the strip center from the core center, in micrometers.
    #[serde(default)]
    pub offset: f64,
}

fn default_port_names() -> [ArcStr; 2] {
    [arcstr::literal!("o1"), arcstr::literal!("o2")]
}

fn default_port_types() -> [PortType; 2] {
    [PortType::Optical, PortType::Optical]
}

impl CrossSection {
    /// The registry name of this cross-section.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<ArcStr>) {
        self.name = name.into();
    }

    /// Returns a copy with the core width replaced, if `width` is given.
    pub fn with_width(mut self, width: Option<f64>) -> Self {
        if let Some(width) = width {
            self.width = width;
        }
        self
    }

    /// Returns a copy with the core layer replaced, if `layer` is given.
    pub fn with_layer(mut self, layer: Option<ArcStr>) -> Self {
        if let Some(layer) = layer {
            self.layer = layer;
        }
        self
    }

    /// Checks widths, radii and layer references against `layers`.
    pub fn validate(&self, layers: &LayerMap) -> Result<()> {
        let name = &self.name;
        if !(self.width > 0.) {
            return Err(Error::config(format!(
                "cross-section `{name}` has non-positive width {}",
                self.width
            )));
        }
        layers.get(&self.layer)?;
        for radius in [self.radius, self.radius_min].into_iter().flatten() {
            if !(radius > 0.) {
                return Err(Error::config(format!(
                    "cross-section `{name}` has non-positive radius {radius}"
                )));
            }
        }
        for section in &self.sections {
            layers.get(&section.layer)?;
            if !(section.width > 0.) {
                return Err(Error::config(format!(
                    "cross-section `{name}` has a section on `{}` with non-positive width {}",
                    section.layer, section.width
                )));
            }
        }
        if self.bbox_layers.len() != self.bbox_offsets.len() {
            return Err(Error::config(format!(
                "cross-section `{name}` has {} bbox layers but {} bbox offsets",
                self.bbox_layers.len(),
                self.bbox_offsets.len()
            )));
        }
        for layer in &self.bbox_layers {
            layers.get(layer)?;
        }
        Ok(())
    }

    /// Fails with [`Error::RadiusViolation`] if `radius_min` is tighter than
    /// this cross-section allows.
    pub fn check_radius(&self, cell: &str, radius_min: f64) -> Result<()> {
        match self.radius_min {
            // Tolerates the floating point error of the bend integrator.
            Some(declared) if radius_min < declared - 1e-9 => Err(Error::RadiusViolation {
                cell: cell.into(),
                cross_section: self.name.clone(),
                radius_min,
                declared,
            }),
            _ => Ok(()),
        }
    }

    /// Iterates over `(layer, offset)` cladding pairs.
    pub fn bbox(&self) -> impl Iterator<Item = (&ArcStr, f64)> {
        self.bbox_layers.iter().zip(self.bbox_offsets.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::pdk::GdsLayer;

    fn xs() -> CrossSection {
        let mut xs: CrossSection = toml::from_str(
            r#"
            layer = "WG"
            width = 0.5
            radius = 10.0
            radius_min = 5.0
            "#,
        )
        .unwrap();
        xs.set_name("xs_test");
        xs
    }

    #[test]
    fn defaults_to_optical_ports() {
        let xs = xs();
        assert_eq!(xs.port_names[0].as_str(), "o1");
        assert_eq!(xs.port_types[1], PortType::Optical);
        assert!(xs.sections.is_empty());
    }

    #[test]
    fn radius_check_names_cross_section() {
        let xs = xs();
        assert!(xs.check_radius("bend", 5.0).is_ok());
        let err = xs.check_radius("bend", 4.0).unwrap_err();
        assert!(matches!(err, Error::RadiusViolation { declared, .. } if declared == 5.0));
        assert!(err.to_string().contains("xs_test"));
    }

    #[test]
    fn validate_rejects_unknown_layers() {
        let xs = xs();
        let mut layers = LayerMap::default();
        assert!(xs.validate(&layers).is_err());
        layers.insert("WG", GdsLayer(1, 0));
        assert!(xs.validate(&layers).is_ok());
        assert!(xs.with_width(Some(0.)).validate(&layers).is_err());
    }
}
