//! Placement heuristics for new nodes.
//!
//! Root nodes go on an outward spiral around the canvas origin; child
//! nodes go on a circle around their parent. Both center the new node's
//! bounding box on the computed point. Overlaps are possible and accepted.

use crate::id::NodeId;
use crate::model::{IdeaNode, Position};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::PI;

/// Smallest box a node is drawn in.
pub const MIN_NODE_SIZE: Size = Size::new(120.0, 60.0);

const TEXT_PADDING: f64 = 10.0;
const CHAR_WIDTH: f64 = 8.0;
const LINE_HEIGHT: f64 = 20.0;

/// Tunables for root and child placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Spiral radius for the first root node.
    pub base_radius: f64,
    /// Radius added per existing root node.
    pub radius_step: f64,
    /// Angle between consecutive placements, in radians.
    pub angle_step: f64,
    /// Distance from a parent to its new child.
    pub child_offset: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_radius: 150.0,
            radius_step: 30.0,
            angle_step: PI / 6.0,
            child_offset: 200.0,
        }
    }
}

/// Position for the `index`-th root node (0-based, by count of existing roots).
pub fn place_root(index: usize, size: Size, config: &LayoutConfig) -> Position {
    let n = index as f64;
    let angle = n * config.angle_step;
    let radius = config.base_radius + n * config.radius_step;
    let pos = Position::new(
        radius * angle.cos() - size.width / 2.0,
        radius * angle.sin() - size.height / 2.0,
    );
    log::trace!("root #{index} placed at ({}, {})", pos.x, pos.y);
    pos
}

/// Position for a new child of a node at `parent`, given the current node count.
pub fn place_child(parent: Point, count: usize, size: Size, config: &LayoutConfig) -> Position {
    let angle = count as f64 * config.angle_step;
    let pos = Position::new(
        parent.x + config.child_offset * angle.cos() - size.width / 2.0,
        parent.y + config.child_offset * angle.sin() - size.height / 2.0,
    );
    log::trace!("child #{count} placed at ({}, {})", pos.x, pos.y);
    pos
}

/// Estimate a node's box from its text: the title line plus an optional
/// `[keyword, ...]` line, padded and clamped to `MIN_NODE_SIZE`.
pub fn intrinsic_size(node: &IdeaNode) -> Size {
    text_size(&node.title, &node.keywords)
}

/// Box needed for a title and keyword list.
pub fn text_size(title: &str, keywords: &[String]) -> Size {
    let mut lines: Vec<usize> = title.lines().map(|l| l.chars().count()).collect();
    if lines.is_empty() {
        lines.push(0);
    }
    if !keywords.is_empty() {
        let joined = keywords.join(", ");
        lines.push(joined.chars().count() + 2);
    }
    let widest = lines.iter().copied().max().unwrap_or(0) as f64;
    Size::new(
        (widest * CHAR_WIDTH + 2.0 * TEXT_PADDING).max(MIN_NODE_SIZE.width),
        (lines.len() as f64 * LINE_HEIGHT + 2.0 * TEXT_PADDING).max(MIN_NODE_SIZE.height),
    )
}

/// Bounding boxes reported by the presentation layer, keyed by node.
#[derive(Debug, Clone, Default)]
pub struct NodeSizes {
    sizes: HashMap<NodeId, Size>,
}

impl NodeSizes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: NodeId, size: Size) {
        self.sizes.insert(id, size);
    }

    pub fn remove(&mut self, id: NodeId) {
        self.sizes.remove(&id);
    }

    pub fn clear(&mut self) {
        self.sizes.clear();
    }

    /// Reported size, or the intrinsic estimate if none was reported.
    pub fn size_of(&self, node: &IdeaNode) -> Size {
        self.sizes
            .get(&node.id)
            .copied()
            .unwrap_or_else(|| intrinsic_size(node))
    }
}
