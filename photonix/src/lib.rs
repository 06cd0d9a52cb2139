//! Parametric photonic components and Manhattan route synthesis.
//!
//! Components are built by factories that take a [`Context`] (holding the
//! PDK, the component registry and the cell caches) and a validated parameter
//! struct. Routes join two oriented ports with straights, bends and tapers
//! placed along a right-angle backbone.
//!
//! # Examples
//!
//! ```
//! use geometry::prelude::*;
//! use photonix::route::{route_single, RouteSingle};
//! use photonix::{Component, Context, Port, PortType};
//!
//! let ctx = Context::new(photonix::pdk::Pdk::generic()?);
//! let layer = ctx.pdk().layer("WG")?;
//! let p1 = Port::new("a", Point::zero(), Some(0.), 500, layer, PortType::Optical)?;
//! let p2 = Port::new("b", Point::new(100_000, 50_000), Some(180.), 500, layer, PortType::Optical)?;
//!
//! let mut top = Component::new("top");
//! let route = route_single(&ctx, &mut top, &p1, &p2, &RouteSingle::default())?;
//! assert_eq!(route.n_bend90, 2);
//! # Ok::<(), photonix::error::Error>(())
//! ```
#![warn(missing_docs)]

pub mod bend;
pub mod components;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod pdk;
pub mod place;
pub mod ports;
pub mod registry;
pub mod route;


pub use context::Context;
pub use layir::PortType;

use pdk::GdsLayer;

/// A layout cell on PDK layers.
pub type Component = layir::Cell<GdsLayer>;

/// A port on a PDK layer.
pub type Port = layir::Port<GdsLayer>;

/// A port filter over PDK layers.
pub type PortFilter = layir::PortFilter<GdsLayer>;
