//! Deterministic port orderings and renaming.

use std::cmp::Ordering;

use arcstr::ArcStr;
use geometry::prelude::*;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ports::classify::classify;
use crate::Port;

/// A rule for ordering and naming the ports of a cell.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortOrdering {
    /// A single ring starting at the bottom of the West side:
    /// West (south to north), North (west to east), East (north to south),
    /// South (east to west). Ports are named `{prefix}1`, `{prefix}2`, ...
    #[default]
    Clockwise,
    /// A single ring starting at the bottom of the East side:
    /// East (south to north), North (east to west), West (north to south),
    /// South (west to east).
    CounterClockwise,
    /// A clockwise ring starting at the top of the East side:
    /// East (north to south), South (east to west), West (south to north),
    /// North (west to east).
    ClockwiseTopRight,
    /// Per-side groups in ascending secondary coordinate,
    /// named `{prefix}E0`, `{prefix}E1`, `{prefix}N0`, ...
    FacingSide,
    /// Per-side groups in descending secondary coordinate.
    FacingSideCcw,
}

#[derive(Clone, Copy)]
enum Key {
    AscX,
    DescX,
    AscY,
    DescY,
}

impl Key {
    fn cmp(&self, a: &Port, b: &Port) -> Ordering {
        let (a, b) = (a.center(), b.center());
        match self {
            Key::AscX => (a.x, a.y).cmp(&(b.x, b.y)),
            Key::DescX => (b.x, b.y).cmp(&(a.x, a.y)),
            Key::AscY => (a.y, a.x).cmp(&(b.y, b.x)),
            Key::DescY => (b.y, b.x).cmp(&(a.y, a.x)),
        }
    }
}

impl PortOrdering {
    /// The sides in visiting order, each with its sort key.
    fn sides(&self) -> [(Cardinal, Key); 4] {
        use Cardinal::*;
        match self {
            Self::Clockwise => [
                (West, Key::AscY),
                (North, Key::AscX),
                (East, Key::DescY),
                (South, Key::DescX),
            ],
            Self::CounterClockwise => [
                (East, Key::AscY),
                (North, Key::DescX),
                (West, Key::DescY),
                (South, Key::AscX),
            ],
            Self::ClockwiseTopRight => [
                (East, Key::DescY),
                (South, Key::DescX),
                (West, Key::AscY),
                (North, Key::AscX),
            ],
            Self::FacingSide => [
                (East, Key::AscY),
                (North, Key::AscX),
                (West, Key::AscY),
                (South, Key::AscX),
            ],
            Self::FacingSideCcw => [
                (East, Key::DescY),
                (North, Key::DescX),
                (West, Key::DescY),
                (South, Key::DescX),
            ],
        }
    }

    fn per_side(&self) -> bool {
        matches!(self, Self::FacingSide | Self::FacingSideCcw)
    }
}

/// Returns `(index into ports, new name)` pairs in the order given by `ordering`.
fn assign_names(ports: &[Port], ordering: PortOrdering, prefix: &str) -> Vec<(usize, ArcStr)> {
    let mut buckets = Cardinals::new(Vec::new(), Vec::new(), Vec::new(), Vec::new());
    for (i, port) in ports.iter().enumerate() {
        buckets[classify(port.orientation())].push(i);
    }
    let mut names = Vec::with_capacity(ports.len());
    for (side, key) in ordering.sides() {
        let mut side_ports = buckets.take(side);
        side_ports.sort_by(|&a, &b| key.cmp(&ports[a], &ports[b]));
        for (i, idx) in side_ports.into_iter().enumerate() {
            let name = if ordering.per_side() {
                arcstr::format!("{prefix}{}{i}", side.abbrev())
            } else {
                arcstr::format!("{prefix}{}", names.len() + 1)
            };
            names.push((idx, name));
        }
    }
    names
}

/// Renames `ports` in place according to `ordering`. Geometry is unchanged.
///
/// Renaming is stable: applying the same ordering twice yields the same names.
pub fn classify_and_rename_ports(ports: &mut [Port], ordering: PortOrdering, prefix: &str) {
    for (i, name) in assign_names(ports, ordering, prefix) {
        ports[i].set_name(name);
    }
}

/// Returns the ports reordered by `ordering`, without renaming them.
pub fn sort_ports(ports: Vec<Port>, ordering: PortOrdering) -> Vec<Port> {
    let order = assign_names(&ports, ordering, "");
    let mut slots: Vec<Option<Port>> = ports.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|(i, _)| slots[i].take())
        .collect()
}

/// Returns the ports in clockwise ring order.
pub fn sort_ports_clockwise(ports: Vec<Port>) -> Vec<Port> {
    sort_ports(ports, PortOrdering::Clockwise)
}

/// Returns the ports in counterclockwise ring order.
pub fn sort_ports_counter_clockwise(ports: Vec<Port>) -> Vec<Port> {
    sort_ports(ports, PortOrdering::CounterClockwise)
}

/// Returns a mapping from the names `ordering` would assign to the current names,
/// without modifying the ports.
pub fn map_ports_to_orientation(
    ports: &[Port],
    ordering: PortOrdering,
    prefix: &str,
) -> IndexMap<ArcStr, ArcStr> {
    assign_names(ports, ordering, prefix)
        .into_iter()
        .map(|(i, name)| (name, ports[i].name().clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use layir::PortType;
    use test_log::test;

    use super::*;
    use crate::pdk::GdsLayer;

    fn port(name: &str, x: i64, y: i64, orientation: f64) -> Port {
        Port::new(
            name,
            Point::new(x, y),
            Some(orientation),
            500,
            GdsLayer(1, 0),
            PortType::Optical,
        )
        .unwrap()
    }

    /// Two ports on each side of a 100 x 100 box.
    fn ring() -> Vec<Port> {
        vec![
            port("w_lo", 0, 25, 180.),
            port("w_hi", 0, 75, 180.),
            port("n_lo", 25, 100, 90.),
            port("n_hi", 75, 100, 90.),
            port("e_lo", 100, 25, 0.),
            port("e_hi", 100, 75, 0.),
            port("s_lo", 25, 0, 270.),
            port("s_hi", 75, 0, 270.),
        ]
    }

    fn names_in_order(ports: &[Port], ordering: PortOrdering) -> Vec<String> {
        map_ports_to_orientation(ports, ordering, "")
            .into_values()
            .map(|name| name.to_string())
            .collect()
    }

    #[test]
    fn clockwise_ring_starts_bottom_left() {
        assert_eq!(
            names_in_order(&ring(), PortOrdering::Clockwise),
            vec!["w_lo", "w_hi", "n_lo", "n_hi", "e_hi", "e_lo", "s_hi", "s_lo"]
        );
    }

    #[test]
    fn counter_clockwise_ring_starts_bottom_right() {
        assert_eq!(
            names_in_order(&ring(), PortOrdering::CounterClockwise),
            vec!["e_lo", "e_hi", "n_hi", "n_lo", "w_hi", "w_lo", "s_lo", "s_hi"]
        );
    }

    #[test]
    fn clockwise_top_right() {
        assert_eq!(
            names_in_order(&ring(), PortOrdering::ClockwiseTopRight),
            vec!["e_hi", "e_lo", "s_hi", "s_lo", "w_lo", "w_hi", "n_lo", "n_hi"]
        );
    }

    #[test]
    fn rename_assigns_sequential_names() {
        let mut ports = ring();
        classify_and_rename_ports(&mut ports, PortOrdering::Clockwise, "o");
        let names: Vec<&str> = ports.iter().map(|p| p.name().as_str()).collect();
        assert_eq!(names, vec!["o1", "o2", "o3", "o4", "o6", "o5", "o8", "o7"]);
    }

    #[test]
    fn facing_side_names() {
        let mut ports = ring();
        classify_and_rename_ports(&mut ports, PortOrdering::FacingSide, "e");
        let names: Vec<&str> = ports.iter().map(|p| p.name().as_str()).collect();
        assert_eq!(
            names,
            vec!["eW0", "eW1", "eN0", "eN1", "eE0", "eE1", "eS0", "eS1"]
        );

        let mut ports = ring();
        classify_and_rename_ports(&mut ports, PortOrdering::FacingSideCcw, "");
        let names: Vec<&str> = ports.iter().map(|p| p.name().as_str()).collect();
        assert_eq!(names, vec!["W1", "W0", "N1", "N0", "E1", "E0", "S1", "S0"]);
    }

    #[test]
    fn renaming_is_idempotent() {
        for ordering in [
            PortOrdering::Clockwise,
            PortOrdering::CounterClockwise,
            PortOrdering::ClockwiseTopRight,
            PortOrdering::FacingSide,
            PortOrdering::FacingSideCcw,
        ] {
            let mut once = ring();
            classify_and_rename_ports(&mut once, ordering, "o");
            let mut twice = once.clone();
            classify_and_rename_ports(&mut twice, ordering, "o");
            assert_eq!(once, twice, "{ordering:?}");
        }
    }

    #[test]
    fn sorting_keeps_geometry() {
        let sorted = sort_ports_counter_clockwise(ring());
        assert_eq!(sorted.len(), 8);
        assert_eq!(sorted[0].name(), "e_lo");
        assert_eq!(sorted[0].center(), Point::new(100, 25));
        let sorted = sort_ports_clockwise(sorted);
        assert_eq!(sorted[0].name(), "w_lo");
    }
}
