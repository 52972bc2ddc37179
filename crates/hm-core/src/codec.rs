//! JSON persistence.
//!
//! A saved mind map is an object with two arrays:
//!
//! ```json
//! {
//!     "nodes": [{ "id": "…", "title": "…", "description": "…", "keywords": [],
//!                 "color": "#RRGGBB", "shape": "oval", "image": null,
//!                 "position": { "x": 0.0, "y": 0.0 } }],
//!     "connections": [{ "source": "…", "target": "…" }]
//! }
//! ```
//!
//! Decoding checks only the top-level structure. Node records are passed
//! on as raw JSON and turned into `NodeData` leniently during import.

use crate::error::MapError;
use crate::layout::{LayoutConfig, place_root, text_size};
use crate::model::{Connection, IdeaNode, MindMap, NodeData, id_from_value, json_type_name};
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;

pub const NODES_KEY: &str = "nodes";
pub const CONNECTIONS_KEY: &str = "connections";

/// A decoded document whose top-level structure has been checked.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Raw node records, in file order.
    pub nodes: Vec<Value>,
    /// Connection records that named both endpoints.
    pub connections: Vec<Connection>,
    /// Connection records dropped for lacking `source` or `target`.
    pub incomplete_connections: usize,
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    nodes: Vec<NodeData>,
    connections: &'a [Connection],
}

/// Serialize a mind map into a JSON value.
///
/// Object keys in the returned value are not guaranteed to keep the file's
/// field order; use `to_json_string` when writing to disk.
pub fn encode(map: &MindMap) -> Result<Value, MapError> {
    let connections = map.all_connections();
    let doc = DocumentRef {
        nodes: map.nodes().map(IdeaNode::to_data).collect(),
        connections: &connections,
    };
    Ok(serde_json::to_value(doc)?)
}

/// Serialize a mind map as pretty-printed JSON (4-space indent).
pub fn to_json_string(map: &MindMap) -> Result<String, MapError> {
    let connections = map.all_connections();
    let doc = DocumentRef {
        nodes: map.nodes().map(IdeaNode::to_data).collect(),
        connections: &connections,
    };
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    doc.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| MapError::Format(e.to_string()))
}

pub fn from_json_str(text: &str) -> Result<Document, MapError> {
    let root: Value = serde_json::from_str(text)?;
    decode(root)
}

/// Check the document structure and split it into node and connection records.
pub fn decode(root: Value) -> Result<Document, MapError> {
    let mut obj = match root {
        Value::Object(obj) => obj,
        other => {
            return Err(MapError::Format(format!(
                "root must be an object, found {}",
                json_type_name(&other)
            )));
        }
    };
    let nodes = take_array(&mut obj, NODES_KEY)?;
    let records = take_array(&mut obj, CONNECTIONS_KEY)?;

    let mut connections = Vec::with_capacity(records.len());
    let mut incomplete_connections = 0;
    for record in &records {
        match connection_from_record(record) {
            Some(c) => connections.push(c),
            None => {
                log::debug!("dropping incomplete connection record {record}");
                incomplete_connections += 1;
            }
        }
    }

    Ok(Document {
        nodes,
        connections,
        incomplete_connections,
    })
}

fn take_array(obj: &mut serde_json::Map<String, Value>, key: &str) -> Result<Vec<Value>, MapError> {
    match obj.remove(key) {
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(MapError::Format(format!(
            "`{key}` must be an array, found {}",
            json_type_name(&other)
        ))),
        None => Err(MapError::Format(format!("missing `{key}` section"))),
    }
}

fn connection_from_record(record: &Value) -> Option<Connection> {
    let obj = record.as_object()?;
    let source = id_from_value(obj.get("source")?)?;
    let target = id_from_value(obj.get("target")?)?;
    Some(Connection::new(source, target))
}

/// What happened while rebuilding a mind map from a document.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub nodes: usize,
    pub connections: usize,
    /// Records that could not be applied, in file order.
    pub skipped: Vec<MapError>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Rebuild a mind map from a decoded document.
///
/// Bad records are skipped and reported instead of failing the import.
/// Nodes without a stored position are placed like new root nodes.
pub fn import_document(document: Document, layout: &LayoutConfig) -> (MindMap, ImportReport) {
    let mut map = MindMap::new();
    let mut report = ImportReport::default();

    for record in &document.nodes {
        let mut data = match NodeData::from_record(record) {
            Ok(data) => data,
            Err(err) => {
                log::warn!("skipping node record: {err}");
                report.skipped.push(err);
                continue;
            }
        };
        if data.position.is_none() {
            let size = text_size(&data.title, &data.keywords);
            data.position = Some(place_root(map.root_count(), size, layout));
        }
        match map.add_node(data) {
            Ok(_) => report.nodes += 1,
            Err(err) => {
                log::warn!("skipping node record: {err}");
                report.skipped.push(err);
            }
        }
    }

    for connection in document.connections {
        match map.add_connection(connection.source, connection.target) {
            Ok(_) => report.connections += 1,
            Err(err) => {
                log::warn!("skipping connection: {err}");
                report.skipped.push(err);
            }
        }
    }

    // A freshly imported map starts with an empty event queue.
    map.drain_events();
    (map, report)
}
