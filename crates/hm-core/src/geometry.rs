//! Connection curves.
//!
//! A connection is drawn as a cubic Bézier between the centers of its two
//! nodes. Both control points lie on the straight line between the
//! endpoints, pulled in from each end by a distance proportional to the
//! endpoint distance (capped).

use crate::layout::NodeSizes;
use crate::model::{Connection, MindMap, Position};
use kurbo::{BezPath, CubicBez, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    /// Control distance as a fraction of the endpoint distance.
    pub tension: f64,
    /// Upper bound on the control distance.
    pub max_control_distance: f64,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            tension: 0.5,
            max_control_distance: 200.0,
        }
    }
}

/// Center of a node's bounding box.
pub fn node_center(position: Position, size: Size) -> Point {
    Point::new(
        position.x + size.width / 2.0,
        position.y + size.height / 2.0,
    )
}

/// The two control points for a curve from `start` to `end`.
pub fn control_points(start: Point, end: Point, config: &CurveConfig) -> (Point, Point) {
    let delta = end - start;
    let distance = delta.hypot();
    let control = (distance * config.tension).min(config.max_control_distance);
    let angle = delta.y.atan2(delta.x);
    let offset = Vec2::new(control * angle.cos(), control * angle.sin());
    (start + offset, end - offset)
}

/// Curve for a connection.
///
/// `end` is `None` while a connection is being drawn and the pointer has
/// not moved yet; the curve then collapses onto `start`.
pub fn connection_curve(start: Point, end: Option<Point>, config: &CurveConfig) -> CubicBez {
    let end = end.unwrap_or(start);
    let (ctrl1, ctrl2) = control_points(start, end, config);
    CubicBez::new(start, ctrl1, ctrl2, end)
}

/// Curve between the centers of a connection's two nodes, using their
/// current positions and sizes. `None` if either node is gone.
pub fn curve_between(
    map: &MindMap,
    sizes: &NodeSizes,
    connection: &Connection,
    config: &CurveConfig,
) -> Option<CubicBez> {
    let source = map.find_node(connection.source)?;
    let target = map.find_node(connection.target)?;
    let start = node_center(source.position, sizes.size_of(source));
    let end = node_center(target.position, sizes.size_of(target));
    Some(connection_curve(start, Some(end), config))
}

pub fn to_bez_path(curve: &CubicBez) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(curve.p0);
    path.curve_to(curve.p1, curve.p2, curve.p3);
    path
}

/// SVG path data (`M … C …`) for a curve.
pub fn to_svg_path(curve: &CubicBez) -> String {
    to_bez_path(curve).to_svg()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeData;

    fn assert_point(p: Point, x: f64, y: f64) {
        assert!(
            (p.x - x).abs() < 1e-9 && (p.y - y).abs() < 1e-9,
            "expected ({x}, {y}), got ({}, {})",
            p.x,
            p.y
        );
    }

    #[test]
    fn horizontal_controls_meet_in_the_middle() {
        let (c1, c2) = control_points(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            &CurveConfig::default(),
        );
        assert_point(c1, 50.0, 0.0);
        assert_point(c2, 50.0, 0.0);
    }

    #[test]
    fn control_distance_is_capped() {
        let (c1, c2) = control_points(
            Point::new(0.0, 0.0),
            Point::new(0.0, 1000.0),
            &CurveConfig::default(),
        );
        assert_point(c1, 0.0, 200.0);
        assert_point(c2, 0.0, 800.0);
    }

    #[test]
    fn missing_end_collapses_to_start() {
        let start = Point::new(12.0, -7.0);
        let curve = connection_curve(start, None, &CurveConfig::default());
        for p in [curve.p0, curve.p1, curve.p2, curve.p3] {
            assert_point(p, 12.0, -7.0);
        }
    }

    #[test]
    fn center_of_box() {
        let c = node_center(Position::new(10.0, 20.0), Size::new(120.0, 60.0));
        assert_point(c, 70.0, 50.0);
    }

    #[test]
    fn curve_follows_node_centers() {
        let mut map = MindMap::new();
        let mut a = NodeData::titled("a").with_id("geo_a");
        a.position = Some(Position::new(0.0, 0.0));
        let mut b = NodeData::titled("b").with_id("geo_b");
        b.position = Some(Position::new(300.0, 0.0));
        map.add_node(a).unwrap();
        map.add_node(b).unwrap();
        let conn = map.add_connection("geo_a".into(), "geo_b".into()).unwrap();

        let sizes = NodeSizes::new();
        let curve = curve_between(&map, &sizes, &conn, &CurveConfig::default()).unwrap();
        assert_point(curve.p0, 60.0, 30.0);
        assert_point(curve.p3, 360.0, 30.0);
        assert_point(curve.p1, 210.0, 30.0);

        map.remove_node("geo_b".into()).unwrap();
        assert!(curve_between(&map, &sizes, &conn, &CurveConfig::default()).is_none());
    }

    #[test]
    fn svg_path_starts_with_move_and_cubic() {
        let curve = connection_curve(
            Point::new(0.0, 0.0),
            Some(Point::new(100.0, 0.0)),
            &CurveConfig::default(),
        );
        let d = to_svg_path(&curve);
        assert!(d.starts_with('M'), "{d}");
        assert!(d.contains('C'), "{d}");
    }
}
