//! Core graph model for mind maps.
//!
//! A mind map is a set of idea nodes plus the connections drawn between
//! them. Nodes live in a `StableDiGraph` so removing one drops every
//! incident connection in the same step. Connections are graph edges
//! weighted with an insertion sequence number; parallel connections and
//! self-loops are allowed.

use crate::error::MapError;
use crate::event::MapEvent;
use crate::id::NodeId;
use kurbo::Point;
use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;

/// Title given to nodes created with a blank title.
pub const DEFAULT_TITLE: &str = "Untitled";

// ─── Colors ──────────────────────────────────────────────────────────────

/// Opaque RGB color, written as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Helper to parse a single hex digit.
pub fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RGB` or `#RRGGBB`. The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        match bytes.len() {
            3 => {
                let r = hex_val(bytes[0])?;
                let g = hex_val(bytes[1])?;
                let b = hex_val(bytes[2])?;
                Some(Self::rgb(r * 17, g * 17, b * 17))
            }
            6 => {
                let r = hex_val(bytes[0])? << 4 | hex_val(bytes[1])?;
                let g = hex_val(bytes[2])? << 4 | hex_val(bytes[3])?;
                let b = hex_val(bytes[4])? << 4 | hex_val(bytes[5])?;
                Some(Self::rgb(r, g, b))
            }
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// HSL lightness on a 0–255 scale.
    pub fn lightness(&self) -> u8 {
        let max = self.r.max(self.g).max(self.b) as u16;
        let min = self.r.min(self.g).min(self.b) as u16;
        ((max + min) / 2) as u8
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color `{s}`")))
    }
}

// ─── Shapes ──────────────────────────────────────────────────────────────

/// Outline drawn for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Shape {
    #[default]
    Oval,
    Rectangle,
    Triangle,
}

impl Shape {
    pub const ALL: [Shape; 3] = [Shape::Oval, Shape::Rectangle, Shape::Triangle];

    /// Case-insensitive parse of `oval`, `rectangle`, `triangle`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Shape::ALL
            .into_iter()
            .find(|shape| shape.as_str().eq_ignore_ascii_case(s))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Oval => "oval",
            Shape::Rectangle => "rectangle",
            Shape::Triangle => "triangle",
        }
    }
}

impl Serialize for Shape {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Shape {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Shape::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("unknown shape `{s}`")))
    }
}

// ─── Positions ───────────────────────────────────────────────────────────

/// Top-left corner of a node's bounding box, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_point(self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl From<Point> for Position {
    fn from(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

// ─── Node records ────────────────────────────────────────────────────────

/// Typed interchange record between dialogs, the canvas, and the codec.
///
/// Every field is optional on input. A field holding the wrong JSON type
/// is replaced by its default rather than rejecting the whole record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeData {
    #[serde(deserialize_with = "lenient_id")]
    pub id: Option<NodeId>,
    #[serde(deserialize_with = "lenient")]
    pub title: String,
    #[serde(deserialize_with = "lenient")]
    pub description: String,
    #[serde(deserialize_with = "lenient")]
    pub keywords: SmallVec<[String; 4]>,
    #[serde(deserialize_with = "lenient")]
    pub color: Color,
    #[serde(deserialize_with = "lenient")]
    pub shape: Shape,
    #[serde(deserialize_with = "lenient")]
    pub image: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub position: Option<Position>,
}

impl NodeData {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Build a record from one element of a document's `nodes` array.
    pub fn from_record(record: &Value) -> Result<Self, MapError> {
        if !record.is_object() {
            return Err(MapError::InvalidRecord(format!(
                "expected an object, found {}",
                json_type_name(record)
            )));
        }
        NodeData::deserialize(record).map_err(|e| MapError::InvalidRecord(e.to_string()))
    }
}

/// Interpret a JSON string or number as a node id.
pub fn id_from_value(value: &Value) -> Option<NodeId> {
    match value {
        Value::String(s) => Some(NodeId::intern(s)),
        Value::Number(n) => Some(NodeId::intern(&n.to_string())),
        _ => None,
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(T::default());
    }
    match serde_json::from_value(value) {
        Ok(v) => Ok(v),
        Err(err) => {
            log::warn!(
                "using default {} for malformed field: {err}",
                std::any::type_name::<T>()
            );
            Ok(T::default())
        }
    }
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NodeId>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(id_from_value(&value))
}

// ─── Nodes & connections ─────────────────────────────────────────────────

/// A single idea on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct IdeaNode {
    pub id: NodeId,
    pub title: String,
    pub description: String,
    pub keywords: SmallVec<[String; 4]>,
    pub color: Color,
    pub shape: Shape,
    /// Path to an image file. Not checked for existence.
    pub image: Option<String>,
    pub position: Position,
}

impl IdeaNode {
    pub fn from_data(id: NodeId, data: NodeData) -> Self {
        let mut node = Self {
            id,
            title: String::new(),
            description: String::new(),
            keywords: SmallVec::new(),
            color: Color::default(),
            shape: Shape::default(),
            image: None,
            position: data.position.unwrap_or_default(),
        };
        node.apply(data);
        node
    }

    /// Replace descriptive attributes. Id and position are untouched.
    pub fn apply(&mut self, data: NodeData) {
        self.title = if data.title.trim().is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            data.title
        };
        self.description = data.description;
        self.keywords = data.keywords;
        self.color = data.color;
        self.shape = data.shape;
        self.image = data.image;
    }

    pub fn to_data(&self) -> NodeData {
        NodeData {
            id: Some(self.id),
            title: self.title.clone(),
            description: self.description.clone(),
            keywords: self.keywords.clone(),
            color: self.color,
            shape: self.shape,
            image: self.image.clone(),
            position: Some(self.position),
        }
    }
}

/// A link between two nodes. Stored with an orientation (parent → child
/// for auto-created links) but matched as an unordered pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub source: NodeId,
    pub target: NodeId,
}

impl Connection {
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self { source, target }
    }

    pub fn involves(&self, id: NodeId) -> bool {
        self.source == id || self.target == id
    }

    /// True if this connection joins `a` and `b`, in either direction.
    pub fn joins(&self, a: NodeId, b: NodeId) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

// ─── Mind map ────────────────────────────────────────────────────────────

/// The complete mind map: nodes, connections, and an id index.
///
/// Every mutation queues a `MapEvent`. The owner is expected to call
/// `drain_events` after each batch of changes; the queue is otherwise
/// only emptied by `clear`, which drops anything still pending.
#[derive(Debug, Clone, Default)]
pub struct MindMap {
    /// Nodes as graph vertices, connections as edges weighted by insertion sequence.
    graph: StableDiGraph<IdeaNode, u64>,

    /// Index from NodeId → NodeIndex for fast lookup.
    id_index: HashMap<NodeId, NodeIndex>,

    /// Node insertion order, used for listing and serialization.
    order: Vec<NodeIndex>,

    next_seq: u64,

    /// Change notifications not yet taken by `drain_events`.
    events: Vec<MapEvent>,
}

impl MindMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node built from `data`. A missing id is generated.
    pub fn add_node(&mut self, data: NodeData) -> Result<&IdeaNode, MapError> {
        let id = match data.id {
            Some(id) if self.id_index.contains_key(&id) => return Err(MapError::DuplicateId(id)),
            Some(id) => id,
            None => self.fresh_id(),
        };
        let node = IdeaNode::from_data(id, data);
        let idx = self.graph.add_node(node);
        self.id_index.insert(id, idx);
        self.order.push(idx);
        log::debug!("added node {id}");
        self.events.push(MapEvent::NodeAdded(id));
        Ok(&self.graph[idx])
    }

    /// Remove a node and every connection touching it.
    ///
    /// Returns `NodeNotFound` if the id is absent.
    pub fn remove_node(&mut self, id: NodeId) -> Result<IdeaNode, MapError> {
        let idx = self.index_of(id).ok_or(MapError::NodeNotFound(id))?;
        let connections = self.incident(idx);
        let node = self
            .graph
            .remove_node(idx)
            .ok_or(MapError::NodeNotFound(id))?;
        self.id_index.remove(&id);
        self.order.retain(|&i| i != idx);
        log::debug!(
            "removed node {id} with {} connection(s)",
            connections.len()
        );
        self.events.push(MapEvent::NodeRemoved { id, connections });
        Ok(node)
    }

    /// Connect two existing nodes. Parallel connections and self-loops are kept.
    pub fn add_connection(
        &mut self,
        source: NodeId,
        target: NodeId,
    ) -> Result<Connection, MapError> {
        let s = self.index_of(source).ok_or(MapError::NodeNotFound(source))?;
        let t = self.index_of(target).ok_or(MapError::NodeNotFound(target))?;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.graph.add_edge(s, t, seq);
        let connection = Connection::new(source, target);
        log::debug!("connected {source} -> {target}");
        self.events.push(MapEvent::ConnectionAdded(connection));
        Ok(connection)
    }

    /// Remove the earliest connection joining `a` and `b` (either direction).
    pub fn remove_connection(&mut self, a: NodeId, b: NodeId) -> Option<Connection> {
        let ia = self.index_of(a)?;
        let ib = self.index_of(b)?;
        let edge: EdgeIndex = self
            .graph
            .edge_references()
            .filter(|e| {
                (e.source() == ia && e.target() == ib) || (e.source() == ib && e.target() == ia)
            })
            .min_by_key(|e| *e.weight())
            .map(|e| e.id())?;
        let (s, t) = self.graph.edge_endpoints(edge)?;
        let connection = Connection::new(self.graph[s].id, self.graph[t].id);
        self.graph.remove_edge(edge);
        log::debug!(
            "disconnected {} -> {}",
            connection.source,
            connection.target
        );
        self.events.push(MapEvent::ConnectionRemoved(connection));
        Some(connection)
    }

    pub fn find_node(&self, id: NodeId) -> Option<&IdeaNode> {
        self.index_of(id).map(|idx| &self.graph[idx])
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.id_index.contains_key(&id)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &IdeaNode> + '_ {
        self.order.iter().map(|&idx| &self.graph[idx])
    }

    /// Snapshot of all nodes, in insertion order.
    pub fn all_nodes(&self) -> Vec<&IdeaNode> {
        self.nodes().collect()
    }

    /// Snapshot of all connections, in insertion order.
    pub fn all_connections(&self) -> Vec<Connection> {
        let mut edges: Vec<_> = self.graph.edge_references().collect();
        edges.sort_by_key(|e| *e.weight());
        edges
            .into_iter()
            .map(|e| Connection::new(self.graph[e.source()].id, self.graph[e.target()].id))
            .collect()
    }

    /// Connections touching `id`, in insertion order.
    pub fn connections_of(&self, id: NodeId) -> Vec<Connection> {
        match self.index_of(id) {
            Some(idx) => self.incident(idx),
            None => Vec::new(),
        }
    }

    /// Replace a node's descriptive attributes, keeping its id and position.
    pub fn update_node(&mut self, id: NodeId, data: NodeData) -> Result<&IdeaNode, MapError> {
        let idx = self.index_of(id).ok_or(MapError::NodeNotFound(id))?;
        self.graph[idx].apply(data);
        self.events.push(MapEvent::NodeUpdated(id));
        Ok(&self.graph[idx])
    }

    pub fn set_position(&mut self, id: NodeId, position: Position) -> Result<(), MapError> {
        let idx = self.index_of(id).ok_or(MapError::NodeNotFound(id))?;
        self.graph[idx].position = position;
        self.events.push(MapEvent::NodeMoved { id, position });
        Ok(())
    }

    /// Number of nodes without an incoming connection.
    pub fn root_count(&self) -> usize {
        self.order
            .iter()
            .filter(|&&idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .count()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn connection_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn clear(&mut self) {
        self.graph.clear();
        self.id_index.clear();
        self.order.clear();
        self.next_seq = 0;
        log::debug!("cleared mind map");
        // Earlier notifications refer to nodes that no longer exist.
        self.events.clear();
        self.events.push(MapEvent::Cleared);
    }

    /// Take all change notifications queued since the last call.
    pub fn drain_events(&mut self) -> Vec<MapEvent> {
        std::mem::take(&mut self.events)
    }

    fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    fn incident(&self, idx: NodeIndex) -> Vec<Connection> {
        let mut edges: Vec<_> = self
            .graph
            .edge_references()
            .filter(|e| e.source() == idx || e.target() == idx)
            .collect();
        edges.sort_by_key(|e| *e.weight());
        edges
            .into_iter()
            .map(|e| Connection::new(self.graph[e.source()].id, self.graph[e.target()].id))
            .collect()
    }

    fn fresh_id(&self) -> NodeId {
        loop {
            let id = NodeId::generate();
            if !self.id_index.contains_key(&id) {
                return id;
            }
        }
    }
}
