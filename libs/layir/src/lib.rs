//! A layer-generic layout intermediate representation.
//!
//! Cells own shapes, ports, and instances of other (shared, immutable) cells.
//! The layer type `L` is supplied by the caller.

pub mod error;
mod port;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use arcstr::ArcStr;
use geometry::bbox::union_option;
use geometry::prelude::*;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use crate::error::{Error, Result};
pub use crate::port::{port_array, Port, PortFilter, PortType};

/// A layout cell.
#[derive(Debug, Clone)]
pub struct Cell<L> {
    name: ArcStr,
    instances: IndexMap<ArcStr, Instance<L>>,
    elements: Vec<Element<L>>,
    ports: IndexMap<ArcStr, Port<L>>,
    info: IndexMap<ArcStr, serde_json::Value>,
}

/// A primitive layout shape consisting of a layer and a geometric shape.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Element<L> {
    layer: L,
    shape: Shape,
}

/// A placement of a shared child cell.
#[derive(Debug, Clone)]
pub struct Instance<L> {
    child: Arc<Cell<L>>,
    name: ArcStr,
    trans: Transformation,
}

impl<L> Cell<L> {
    /// Creates an empty cell.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            instances: Default::default(),
            elements: Default::default(),
            ports: Default::default(),
            info: Default::default(),
        }
    }

    /// The name of the cell.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// Renames the cell.
    pub fn set_name(&mut self, name: impl Into<ArcStr>) {
        self.name = name.into();
    }

    /// Iterate over the ports of this cell in insertion order.
    #[inline]
    pub fn ports(&self) -> impl Iterator<Item = &Port<L>> {
        self.ports.values()
    }

    /// The number of ports on this cell.
    pub fn num_ports(&self) -> usize {
        self.ports.len()
    }

    /// Adds a port, failing if a port with the same name exists.
    pub fn add_port(&mut self, port: Port<L>) -> Result<()> {
        let name = port.name().clone();
        if self.ports.contains_key(&name) {
            return Err(Error::DuplicatePort {
                cell: self.name.clone(),
                port: name,
            });
        }
        let port = port.with_parent(self.name.clone());
        self.ports.insert(name, port);
        Ok(())
    }

    /// Adds each port in order, failing on the first duplicate.
    pub fn add_ports(&mut self, ports: impl IntoIterator<Item = Port<L>>) -> Result<()> {
        for port in ports {
            self.add_port(port)?;
        }
        Ok(())
    }

    /// Get a port of this cell by name.
    pub fn port(&self, name: &str) -> Result<&Port<L>> {
        self.ports.get(name).ok_or_else(|| Error::MissingPort {
            cell: self.name.clone(),
            port: name.into(),
        })
    }

    /// Get a port of this cell by name.
    #[inline]
    pub fn try_port(&self, name: &str) -> Option<&Port<L>> {
        self.ports.get(name)
    }

    /// Replaces all ports, keeping the given order.
    ///
    /// Fails without modifying the cell if two ports share a name.
    pub fn set_ports(&mut self, ports: impl IntoIterator<Item = Port<L>>) -> Result<()> {
        let mut map = IndexMap::new();
        for port in ports {
            let name = port.name().clone();
            if map.contains_key(&name) {
                return Err(Error::DuplicatePort {
                    cell: self.name.clone(),
                    port: name,
                });
            }
            map.insert(name, port.with_parent(self.name.clone()));
        }
        self.ports = map;
        Ok(())
    }

    /// Takes the ports out of the cell, leaving it with none.
    pub fn take_ports(&mut self) -> Vec<Port<L>> {
        std::mem::take(&mut self.ports).into_values().collect()
    }

    /// Adds a shape on `layer`.
    pub fn add_shape(&mut self, layer: L, shape: impl Into<Shape>) {
        self.elements.push(Element {
            layer,
            shape: shape.into(),
        });
    }

    /// Creates a polygon from a list of points on `layer`.
    pub fn add_polygon(&mut self, layer: L, points: Vec<Point>) {
        self.add_shape(layer, Polygon::from_verts(points));
    }

    /// Iterates over the shapes drawn directly in this cell.
    pub fn elements(&self) -> impl Iterator<Item = &Element<L>> {
        self.elements.iter()
    }

    /// Places a reference to `child` with the given transformation.
    ///
    /// The instance is named after `base_name`, suffixed with `_1`, `_2`, ...
    /// if that name is already in use.
    pub fn add_instance(
        &mut self,
        child: Arc<Cell<L>>,
        base_name: &str,
        trans: Transformation,
    ) -> &Instance<L> {
        let name = self.unique_instance_name(base_name);
        let instance = Instance {
            child,
            name: name.clone(),
            trans,
        };
        self.instances.entry(name).or_insert(instance)
    }

    fn unique_instance_name(&self, base_name: &str) -> ArcStr {
        if !self.instances.contains_key(base_name) {
            return base_name.into();
        }
        let mut i = 1;
        loop {
            let name = arcstr::format!("{}_{}", base_name, i);
            if !self.instances.contains_key(&name) {
                tracing::debug!(cell = %self.name, base_name, name = %name, "renamed instance");
                return name;
            }
            i += 1;
        }
    }

    /// Gets the instance with the given name.
    pub fn instance(&self, name: &str) -> Result<&Instance<L>> {
        self.instances.get(name).ok_or_else(|| Error::MissingInstance {
            cell: self.name.clone(),
            instance: name.into(),
        })
    }

    /// Iterate over the instances of this cell in insertion order.
    #[inline]
    pub fn instances(&self) -> impl Iterator<Item = &Instance<L>> {
        self.instances.values()
    }

    /// Metadata recorded by the cell's generator.
    pub fn info(&self) -> &IndexMap<ArcStr, serde_json::Value> {
        &self.info
    }

    /// Records a metadata entry, replacing any previous value.
    pub fn set_info(&mut self, key: impl Into<ArcStr>, value: impl Into<serde_json::Value>) {
        self.info.insert(key.into(), value.into());
    }

    /// Reads a numeric metadata entry.
    pub fn info_f64(&self, key: &str) -> Option<f64> {
        self.info.get(key).and_then(serde_json::Value::as_f64)
    }
}

impl<L: PartialEq> Cell<L> {
    /// Returns the ports matching `filter`, in insertion order.
    pub fn select_ports(&self, filter: &PortFilter<L>) -> Vec<&Port<L>> {
        filter.select(self.ports.values())
    }
}

impl<L> Bbox for Cell<L> {
    fn bbox(&self) -> Option<Rect> {
        let shapes = self
            .elements
            .iter()
            .fold(None, |bbox, elt| union_option(bbox, elt.shape.bbox()));
        self.instances
            .values()
            .fold(shapes, |bbox, inst| union_option(bbox, inst.bbox()))
    }
}

impl<L> Element<L> {
    /// The layer the shape is drawn on.
    #[inline]
    pub fn layer(&self) -> &L {
        &self.layer
    }

    /// The geometric shape.
    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }
}

impl<L> Instance<L> {
    /// The instantiated cell.
    #[inline]
    pub fn child(&self) -> &Arc<Cell<L>> {
        &self.child
    }

    /// The instance name, unique within its parent.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// The placement of the child within the parent.
    #[inline]
    pub fn transformation(&self) -> Transformation {
        self.trans
    }
}

impl<L: Clone> Instance<L> {
    /// The child's ports, mapped into the parent's coordinates.
    pub fn ports(&self) -> impl Iterator<Item = Port<L>> + '_ {
        self.child
            .ports()
            .map(move |p| p.transformed(self.trans).with_parent(self.name.clone()))
    }

    /// Looks up a child port by name, mapped into the parent's coordinates.
    pub fn port(&self, name: &str) -> Result<Port<L>> {
        let port = self.child.try_port(name).ok_or_else(|| Error::MissingPort {
            cell: self.name.clone(),
            port: name.into(),
        })?;
        Ok(port
            .transformed(self.trans)
            .with_parent(self.name.clone()))
    }
}

impl<L> Bbox for Instance<L> {
    fn bbox(&self) -> Option<Rect> {
        self.child.bbox().map(|r| r.transform(self.trans))
    }
}
