use std::sync::Arc;

use approx::assert_relative_eq;
use geometry::prelude::*;
use test_log::test;

use crate::{Cell, Error, Port, PortFilter, PortType};

fn port(name: &str, x: i64, y: i64, orientation: f64) -> Port<u8> {
    Port::new(name, Point::new(x, y), Some(orientation), 500, 1, PortType::Optical).unwrap()
}

#[test]
fn port_rejects_non_positive_width() {
    let err = Port::new("o1", Point::zero(), Some(0.), 0, 1u8, PortType::Optical).unwrap_err();
    assert_eq!(
        err,
        Error::InvalidWidth {
            port: "o1".into(),
            width: 0
        }
    );
}

#[test]
fn port_orientation_is_normalized() {
    let p = port("o1", 0, 0, -90.);
    assert_relative_eq!(p.orientation().unwrap(), 270.);
    assert_eq!(p.cardinal(), Some(Cardinal::South));
}

#[test]
fn flipped_requires_orientation() {
    let p = Port::new("o1", Point::zero(), None, 10, 1u8, PortType::Electrical).unwrap();
    assert_eq!(p.flipped(), Err(Error::UndefinedOrientation("o1".into())));
    let q = port("o2", 0, 0, 90.).flipped().unwrap();
    assert_relative_eq!(q.orientation().unwrap(), 270.);
}

#[test]
fn port_types_round_trip_through_strings() {
    for s in ["optical", "electrical", "placement", "vertical_dc", "vertical_te"] {
        let t: PortType = s.parse().unwrap();
        assert_eq!(t.to_string(), s);
    }
    assert!("vertical_".parse::<PortType>().is_err());
    assert!("rf".parse::<PortType>().is_err());
}

#[test]
fn duplicate_port_names_are_rejected() {
    let mut cell = Cell::new("c");
    cell.add_port(port("o1", 0, 0, 180.)).unwrap();
    let err = cell.add_port(port("o1", 10, 0, 0.)).unwrap_err();
    assert!(matches!(err, Error::DuplicatePort { .. }));
    assert_eq!(cell.port("o1").unwrap().parent().unwrap(), "c");
}

#[test]
fn filter_preserves_insertion_order() {
    let mut cell = Cell::new("c");
    cell.add_port(port("o2", 0, 0, 0.)).unwrap();
    cell.add_port(port("e1", 0, 0, 0.)).unwrap();
    cell.add_port(port("o1", 0, 0, 180.)).unwrap();
    let names: Vec<_> = cell
        .select_ports(&PortFilter::new().prefix("o"))
        .iter()
        .map(|p| p.name().clone())
        .collect();
    assert_eq!(names, vec!["o2", "o1"]);

    let facing_east = cell.select_ports(&PortFilter::new().orientation(360.));
    assert_eq!(facing_east.len(), 2);
    let excluded = cell.select_ports(&PortFilter::new().exclude_layer(1));
    assert!(excluded.is_empty());
}

#[test]
fn instance_ports_follow_transformation() {
    let mut child = Cell::new("child");
    child.add_port(port("o1", 0, 0, 180.)).unwrap();
    child.add_port(port("o2", 1000, 0, 0.)).unwrap();
    child.add_shape(1, Rect::from_sides(0, -250, 1000, 250));
    let child = Arc::new(child);

    let mut parent = Cell::new("parent");
    let trans = Transformation::from_opts(Point::new(5, 5), false, Rotation::R90);
    let name = parent.add_instance(child.clone(), "child", trans).name().clone();
    assert_eq!(name, "child");
    let second = parent
        .add_instance(child, "child", Transformation::identity())
        .name()
        .clone();
    assert_eq!(second, "child_1");

    let inst = parent.instance("child").unwrap();
    let o2 = inst.port("o2").unwrap();
    assert_eq!(o2.center(), Point::new(5, 1005));
    assert_relative_eq!(o2.orientation().unwrap(), 90.);
    assert_eq!(o2.parent().unwrap(), "child");
    assert_eq!(parent.bbox(), Some(Rect::from_sides(-245, -250, 1000, 1005)));
}

#[test]
fn mating_ports_are_antiparallel() {
    let a = port("a", 10, 0, 0.);
    let b = port("b", 10, 0, 180.);
    assert!(a.mates_with(&b));
    assert!(!a.mates_with(&a));
}

#[test]
fn instance_names_are_uniquified() {
    let child = Arc::new(Cell::<u8>::new("via"));
    let mut parent = Cell::new("parent");
    let names: Vec<String> = (0..3)
        .map(|_| {
            parent
                .add_instance(child.clone(), "via", Transformation::identity())
                .name()
                .to_string()
        })
        .collect();
    assert_eq!(names, vec!["via", "via_1", "via_2"]);
    assert_eq!(parent.instances().count(), 3);
}
