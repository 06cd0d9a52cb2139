//! GDS layer identifiers and the named layer registry.

use std::fmt::Display;

use arcstr::ArcStr;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A GDS `(layer, datatype)` pair.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
pub struct GdsLayer(pub u16, pub u16);

impl Display for GdsLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.0, self.1)
    }
}

/// Named layers, in declaration order.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMap {
    layers: IndexMap<ArcStr, GdsLayer>,
}

impl LayerMap {
    /// Looks up a layer by name.
    pub fn get(&self, name: &str) -> Result<GdsLayer> {
        self.layers
            .get(name)
            .copied()
            .ok_or_else(|| Error::config(format!("unknown layer `{name}`")))
    }

    /// Returns `true` if a layer named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.layers.contains_key(name)
    }

    /// Adds or replaces a layer.
    pub fn insert(&mut self, name: impl Into<ArcStr>, layer: GdsLayer) {
        self.layers.insert(name.into(), layer);
    }

    /// Iterates over `(name, layer)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&ArcStr, &GdsLayer)> {
        self.layers.iter()
    }
}
