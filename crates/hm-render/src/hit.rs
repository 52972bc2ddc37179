//! Hit testing: point → node or connection lookup.
//!
//! Walks nodes from the most recently added (drawn on top) to the oldest
//! and tests the point against each node's actual outline, so clicking
//! the empty corner of an oval's bounding box misses it.

use hm_core::geometry::{CurveConfig, curve_between};
use hm_core::id::NodeId;
use hm_core::layout::NodeSizes;
use hm_core::model::{Connection, IdeaNode, MindMap, Shape};
use kurbo::{BezPath, Ellipse, ParamCurveNearest, Point, Rect, Shape as _, Size};

/// Bounding box of a node at its current position.
pub fn node_rect(node: &IdeaNode, size: Size) -> Rect {
    Rect::from_origin_size(node.position.to_point(), size)
}

/// Triangle with its apex at the top-center and its base along the bottom edge.
pub fn triangle_path(rect: Rect) -> BezPath {
    let mut path = BezPath::new();
    path.move_to((rect.center().x, rect.y0));
    path.line_to((rect.x1, rect.y1));
    path.line_to((rect.x0, rect.y1));
    path.close_path();
    path
}

/// True if `point` lies inside the node's outline.
pub fn node_contains(node: &IdeaNode, size: Size, point: Point) -> bool {
    let rect = node_rect(node, size);
    match node.shape {
        Shape::Rectangle => rect.contains(point),
        Shape::Oval => Ellipse::from_rect(rect).contains(point),
        Shape::Triangle => triangle_path(rect).contains(point),
    }
}

/// Find the topmost node at `point`.
/// Returns `None` if no node is hit (background).
pub fn hit_test(map: &MindMap, sizes: &NodeSizes, point: Point) -> Option<NodeId> {
    map.all_nodes()
        .into_iter()
        .rev()
        .find(|node| node_contains(node, sizes.size_of(node), point))
        .map(|node| node.id)
}

/// All nodes whose bounding boxes intersect `area`, in insertion order.
/// Used for rubber-band selection.
pub fn hit_test_rect(map: &MindMap, sizes: &NodeSizes, area: Rect) -> Vec<NodeId> {
    let area = area.abs();
    map.nodes()
        .filter(|node| {
            let r = node_rect(node, sizes.size_of(node));
            r.x0 < area.x1 && r.x1 > area.x0 && r.y0 < area.y1 && r.y1 > area.y0
        })
        .map(|node| node.id)
        .collect()
}

/// Topmost connection whose curve passes within `tolerance` of `point`.
pub fn hit_test_connection(
    map: &MindMap,
    sizes: &NodeSizes,
    point: Point,
    tolerance: f64,
    config: &CurveConfig,
) -> Option<Connection> {
    let limit = tolerance * tolerance;
    map.all_connections().into_iter().rev().find(|connection| {
        curve_between(map, sizes, connection, config)
            .is_some_and(|curve| curve.nearest(point, 1e-3).distance_sq <= limit)
    })
}
