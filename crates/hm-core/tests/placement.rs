//! Integration tests: placement of new nodes and connection curves
//! computed from the resulting positions.

use hm_core::geometry::{CurveConfig, connection_curve, control_points, node_center};
use hm_core::layout::{LayoutConfig, MIN_NODE_SIZE, place_child, place_root};
use hm_core::{Point, Size};

const CONFIG: LayoutConfig = LayoutConfig {
    base_radius: 150.0,
    radius_step: 30.0,
    angle_step: std::f64::consts::PI / 6.0,
    child_offset: 200.0,
};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

// ─── Root spiral ─────────────────────────────────────────────────────────

#[test]
fn first_root_is_centered_on_radius_150() {
    let size = Size::new(140.0, 80.0);
    let pos = place_root(0, size, &CONFIG);
    assert_close(pos.x, 150.0 - 70.0);
    assert_close(pos.y, -40.0);
}

#[test]
fn root_radius_grows_by_step() {
    for n in 0..12 {
        let pos = place_root(n, MIN_NODE_SIZE, &CONFIG);
        let center = node_center(pos, MIN_NODE_SIZE);
        let radius = center.to_vec2().hypot();
        assert_close(radius, 150.0 + 30.0 * n as f64);
    }
}

#[test]
fn twelfth_root_completes_a_turn() {
    let first = node_center(place_root(0, MIN_NODE_SIZE, &CONFIG), MIN_NODE_SIZE);
    let thirteenth = node_center(place_root(12, MIN_NODE_SIZE, &CONFIG), MIN_NODE_SIZE);
    // Same direction, larger radius.
    assert_close(first.y, 0.0);
    assert_close(thirteenth.y, 0.0);
    assert!(thirteenth.x > first.x);
}

// ─── Child ring ──────────────────────────────────────────────────────────

#[test]
fn children_sit_at_fixed_offset() {
    let parent = Point::new(-50.0, 75.0);
    for count in 0..8 {
        let pos = place_child(parent, count, MIN_NODE_SIZE, &CONFIG);
        let center = node_center(pos, MIN_NODE_SIZE);
        assert_close((center - parent).hypot(), 200.0);
    }
}

// ─── Curves between placed nodes ─────────────────────────────────────────

#[test]
fn curve_between_parent_and_child() {
    let parent_pos = place_root(0, MIN_NODE_SIZE, &CONFIG);
    let child_pos = place_child(parent_pos.to_point(), 1, MIN_NODE_SIZE, &CONFIG);

    let start = node_center(parent_pos, MIN_NODE_SIZE);
    let end = node_center(child_pos, MIN_NODE_SIZE);
    let curve = connection_curve(start, Some(end), &CurveConfig::default());

    assert_eq!(curve.p0, start);
    assert_eq!(curve.p3, end);
    let (c1, c2) = control_points(start, end, &CurveConfig::default());
    assert_eq!((curve.p1, curve.p2), (c1, c2));
    // Both controls sit on the chord, half the distance away from their end.
    let distance = (end - start).hypot();
    assert_close((c1 - start).hypot(), distance * 0.5);
    assert_close((end - c2).hypot(), distance * 0.5);
}

#[test]
fn horizontal_example_from_geometry_rules() {
    let (c1, c2) = control_points(
        Point::new(0.0, 0.0),
        Point::new(100.0, 0.0),
        &CurveConfig::default(),
    );
    assert_close(c1.x, 50.0);
    assert_close(c1.y, 0.0);
    assert_close(c2.x, 50.0);
    assert_close(c2.y, 0.0);
}
