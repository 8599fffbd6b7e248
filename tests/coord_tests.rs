use std::collections::BTreeMap;

use broadside::{Coord, GRID_SIZE};

#[test]
fn parses_and_displays_every_cell() {
    for col in b'A'..=b'E' {
        for row in b'1'..=b'5' {
            let text = format!("{}{}", col as char, row as char);
            let coord: Coord = text.parse().unwrap();
            assert_eq!(coord.to_string(), text);
        }
    }
}

#[test]
fn rejects_out_of_notation_input() {
    for bad in ["", "A", "A0", "A6", "F1", "AA", "A11", "1A", "Z9", "É1", "a1", "c4"] {
        assert!(bad.parse::<Coord>().is_err(), "{:?} should not parse", bad);
    }
}

#[test]
fn zero_based_accessors_match_notation() {
    let coord: Coord = "C4".parse().unwrap();
    assert_eq!(coord.col(), 2);
    assert_eq!(coord.row(), 3);
}

#[test]
fn new_checks_bounds() {
    assert!(Coord::new(0, 0).is_some());
    assert!(Coord::new(GRID_SIZE - 1, GRID_SIZE - 1).is_some());
    assert!(Coord::new(GRID_SIZE, 0).is_none());
    assert!(Coord::new(0, GRID_SIZE).is_none());
}

#[test]
fn offset_clips_at_edges() {
    let a1: Coord = "A1".parse().unwrap();
    assert_eq!(a1.offset(1, 0), "B1".parse().ok());
    assert_eq!(a1.offset(0, 1), "A2".parse().ok());
    assert_eq!(a1.offset(-1, 0), None);
    assert_eq!(a1.offset(0, -1), None);
    let e5: Coord = "E5".parse().unwrap();
    assert_eq!(e5.offset(1, 0), None);
    assert_eq!(e5.offset(0, 1), None);
    assert_eq!(e5.offset(-1, -1), "D4".parse().ok());
}

#[test]
fn neighbor_counts_by_location() {
    let corner: Coord = "A1".parse().unwrap();
    assert_eq!(corner.neighbors().count(), 3);
    let edge: Coord = "C1".parse().unwrap();
    assert_eq!(edge.neighbors().count(), 5);
    let center: Coord = "C3".parse().unwrap();
    assert_eq!(center.neighbors().count(), 8);
}

#[test]
fn all_covers_the_grid_once() {
    let coords: Vec<Coord> = Coord::all().collect();
    assert_eq!(coords.len(), 25);
    let mut unique = coords.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 25);
}

#[test]
fn ordering_is_column_major() {
    let a1: Coord = "A1".parse().unwrap();
    let a5: Coord = "A5".parse().unwrap();
    let b1: Coord = "B1".parse().unwrap();
    assert!(a1 < a5);
    assert!(a5 < b1);
    let mut coords: Vec<Coord> = ["B1", "A5", "A1"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
    coords.sort();
    let shown: Vec<String> = coords.iter().map(|c| c.to_string()).collect();
    assert_eq!(shown, ["A1", "A5", "B1"]);
}

#[test]
fn serializes_as_notation_string() {
    let coord: Coord = "C4".parse().unwrap();
    assert_eq!(serde_json::to_string(&coord).unwrap(), "\"C4\"");
    let back: Coord = serde_json::from_str("\"C4\"").unwrap();
    assert_eq!(back, coord);
    assert!(serde_json::from_str::<Coord>("\"F9\"").is_err());
}

#[test]
fn works_as_json_map_key() {
    let mut map = BTreeMap::new();
    map.insert("B2".parse::<Coord>().unwrap(), 7u8);
    let json = serde_json::to_string(&map).unwrap();
    assert_eq!(json, "{\"B2\":7}");
    let back: BTreeMap<Coord, u8> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, map);
}
