//! Port classification, ordering, renaming and selection.

use arcstr::ArcStr;
use layir::PortType;

use crate::error::{Error, Result};
use crate::{Component, Port, PortFilter};

mod classify;
mod order;
mod select;

pub use classify::{bucket_ports, classify};
pub use order::{
    classify_and_rename_ports, map_ports_to_orientation, sort_ports, sort_ports_clockwise,
    sort_ports_counter_clockwise, PortOrdering,
};
pub use select::{get_ports_facing, select_ports};

/// Renames the ports of `cell` matching `filter` according to `ordering`.
///
/// Ports not matching the filter keep their names. Fails without modifying the
/// cell if the new names collide with each other or with the remaining ports.
pub fn rename_ports_by_orientation(
    cell: &mut Component,
    filter: &PortFilter,
    ordering: PortOrdering,
    prefix: &str,
) -> Result<()> {
    let mut ports: Vec<Port> = cell.ports().cloned().collect();
    rename_matching(&mut ports, filter, ordering, prefix);
    cell.set_ports(ports)?;
    Ok(())
}

/// Renames the ports in `ports` matching `filter`, leaving the rest as they are.
fn rename_matching(ports: &mut [Port], filter: &PortFilter, ordering: PortOrdering, prefix: &str) {
    let selected: Vec<usize> = (0..ports.len())
        .filter(|&i| filter.matches(&ports[i]))
        .collect();
    let mut renamed: Vec<Port> = selected.iter().map(|&i| ports[i].clone()).collect();
    classify_and_rename_ports(&mut renamed, ordering, prefix);
    for (i, port) in selected.into_iter().zip(renamed) {
        ports[i] = port;
    }
}

/// Options for [`auto_rename_ports`].
#[derive(Debug, Clone, Default)]
pub struct AutoRename {
    /// Rename only ports of this type.
    ///
    /// When set, a cell without any such port is an error.
    pub port_type: Option<PortType>,
    /// The ordering applied within each port type.
    pub ordering: PortOrdering,
    /// Overrides the per-type prefix.
    pub prefix: Option<ArcStr>,
}

/// The default name prefix for ports of `port_type`.
pub fn default_prefix(port_type: &PortType) -> ArcStr {
    match port_type {
        PortType::Optical => arcstr::literal!("o"),
        PortType::Electrical => arcstr::literal!("e"),
        PortType::Placement => arcstr::literal!("p"),
        PortType::Vertical(_) => arcstr::literal!("v"),
    }
}

/// Renames optical, electrical and placement ports independently, each
/// with its own prefix (`o`, `e`, `p`).
///
/// With [`AutoRename::port_type`] set, only that type is renamed. Fails
/// without modifying the cell if the new names collide.
pub fn auto_rename_ports(cell: &mut Component, options: &AutoRename) -> Result<()> {
    match &options.port_type {
        Some(port_type) => {
            let filter = PortFilter::new().port_type(port_type.clone());
            if cell.select_ports(&filter).is_empty() {
                return Err(Error::config(format!(
                    "cell `{}` has no {port_type} ports to rename",
                    cell.name()
                )));
            }
            let prefix = options
                .prefix
                .clone()
                .unwrap_or_else(|| default_prefix(port_type));
            rename_ports_by_orientation(cell, &filter, options.ordering, &prefix)
        }
        None => {
            let mut ports: Vec<Port> = cell.ports().cloned().collect();
            for port_type in [PortType::Optical, PortType::Electrical, PortType::Placement] {
                let prefix = options
                    .prefix
                    .clone()
                    .unwrap_or_else(|| default_prefix(&port_type));
                let filter = PortFilter::new().port_type(port_type);
                rename_matching(&mut ports, &filter, options.ordering, &prefix);
            }
            cell.set_ports(ports)?;
            Ok(())
        }
    }
}
