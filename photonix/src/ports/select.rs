//! Port selection helpers.

use geometry::prelude::*;

use crate::error::{Error, Result};
use crate::ports::classify::classify;
use crate::ports::order::{sort_ports, PortOrdering};
use crate::{Port, PortFilter};

/// Returns copies of the ports matching `filter`, optionally sorted by `ordering`.
///
/// Without an ordering, the input order is preserved.
pub fn select_ports<'a>(
    ports: impl IntoIterator<Item = &'a Port>,
    filter: &PortFilter,
    ordering: Option<PortOrdering>,
) -> Vec<Port> {
    let selected: Vec<Port> = filter.select(ports).into_iter().cloned().collect();
    match ordering {
        Some(ordering) => sort_ports(selected, ordering),
        None => selected,
    }
}

/// Returns the ports facing `direction` (`"E"`, `"N"`, `"W"` or `"S"`),
/// in input order.
pub fn get_ports_facing<'a>(
    ports: impl IntoIterator<Item = &'a Port>,
    direction: &str,
) -> Result<Vec<Port>> {
    let direction: Cardinal = direction.parse().map_err(|_| {
        Error::PortOrientation(format!(
            "`{direction}` is not a direction (expected one of E, N, W, S)"
        ))
    })?;
    Ok(ports
        .into_iter()
        .filter(|p| classify(p.orientation()) == direction)
        .cloned()
        .collect())
}
