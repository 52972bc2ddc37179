//! Editor session: the authoritative mind map plus everything the canvas
//! needs around it (selection, reported node sizes, the connection being
//! drawn, the current file).
//!
//! The session never paints. Every change is queued as a `MapEvent`;
//! the host drains `events()` after each call and redraws what they touch.

use crate::dialog::IdeaForm;
use crate::input::InputEvent;
use crate::shortcuts::{EditorAction, ShortcutMap};
use crate::tools::{CanvasCommand, CanvasTool};
use hm_core::codec::{ImportReport, from_json_str, import_document, to_json_string};
use hm_core::error::MapError;
use hm_core::event::MapEvent;
use hm_core::geometry::{CurveConfig, connection_curve, curve_between, node_center};
use hm_core::id::NodeId;
use hm_core::layout::{LayoutConfig, MIN_NODE_SIZE, NodeSizes, place_child, place_root, text_size};
use hm_core::model::{Connection, IdeaNode, MindMap, NodeData, Position};
use hm_render::{CanvasTheme, hit_test, hit_test_connection};
use kurbo::{CubicBez, Point, Size};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Map(#[from] MapError),

    #[error("cannot {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no node is selected")]
    NoSelection,

    #[error("no connection is being drawn")]
    NoPendingLink,
}

/// Tunables for a session. Every field has a default, so a partial JSON
/// file is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub layout: LayoutConfig,
    pub curve: CurveConfig,
    /// Smallest box assumed for a new node before the canvas reports one.
    pub default_size: Size,
    /// How close (in canvas units) a click must be to a curve to hit it.
    pub hit_tolerance: f64,
    pub theme: CanvasTheme,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            curve: CurveConfig::default(),
            default_size: MIN_NODE_SIZE,
            hit_tolerance: 6.0,
            theme: CanvasTheme::default(),
        }
    }
}

/// A connection being drawn from `from` toward the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingLink {
    pub from: NodeId,
    /// `None` until the pointer first moves.
    pub cursor: Option<Point>,
}

#[derive(Debug, Default)]
pub struct Editor {
    map: MindMap,
    sizes: NodeSizes,
    selection: Option<NodeId>,
    pending: Option<PendingLink>,
    tool: CanvasTool,
    config: EditorConfig,
    path: Option<PathBuf>,
    /// Events synthesized when the whole map is replaced.
    replayed: Vec<MapEvent>,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn map(&self) -> &MindMap {
        &self.map
    }

    pub fn sizes(&self) -> &NodeSizes {
        &self.sizes
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn selection(&self) -> Option<NodeId> {
        self.selection
    }

    pub fn pending_link(&self) -> Option<PendingLink> {
        self.pending
    }

    /// File the map was last opened from or saved to.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Take all change notifications queued since the last call.
    pub fn events(&mut self) -> Vec<MapEvent> {
        let mut events = std::mem::take(&mut self.replayed);
        events.extend(self.map.drain_events());
        events
    }

    // ─── File ────────────────────────────────────────────────────────────

    pub fn new_map(&mut self) {
        self.map.clear();
        self.reset_view_state();
        self.path = None;
    }

    /// Replace the map with the contents of a JSON document.
    pub fn import_str(&mut self, text: &str) -> Result<ImportReport, EditorError> {
        let document = from_json_str(text)?;
        let (map, report) = import_document(document, &self.config.layout);
        self.replace_map(map);
        Ok(report)
    }

    pub fn export_string(&self) -> Result<String, EditorError> {
        Ok(to_json_string(&self.map)?)
    }

    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<ImportReport, EditorError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EditorError::Io {
            action: "read",
            path: path.to_path_buf(),
            source,
        })?;
        let report = self.import_str(&text)?;
        log::info!(
            "opened {} ({} nodes, {} connections, {} skipped)",
            path.display(),
            report.nodes,
            report.connections,
            report.skipped.len()
        );
        self.path = Some(path.to_path_buf());
        Ok(report)
    }

    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), EditorError> {
        let path = path.as_ref();
        let text = self.export_string()?;
        std::fs::write(path, text).map_err(|source| EditorError::Io {
            action: "write",
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("saved {}", path.display());
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    // ─── Nodes ───────────────────────────────────────────────────────────

    /// Add a node with no parent, placed on the root spiral.
    pub fn create_root(&mut self, form: IdeaForm) -> Result<NodeId, EditorError> {
        let mut data = form.into_data();
        let size = self.placement_size(&data);
        data.position = Some(place_root(self.map.root_count(), size, &self.config.layout));
        let id = self.map.add_node(data)?.id;
        Ok(id)
    }

    /// Add a node around `parent` and connect the parent to it.
    pub fn add_child(&mut self, parent: NodeId, form: IdeaForm) -> Result<NodeId, EditorError> {
        let anchor = self
            .map
            .find_node(parent)
            .ok_or(MapError::NodeNotFound(parent))?
            .position
            .to_point();
        let mut data = form.into_data();
        let size = self.placement_size(&data);
        data.position = Some(place_child(anchor, self.map.len(), size, &self.config.layout));
        let id = self.map.add_node(data)?.id;
        self.map.add_connection(parent, id)?;
        Ok(id)
    }

    pub fn add_child_to_selection(&mut self, form: IdeaForm) -> Result<NodeId, EditorError> {
        let parent = self.selection.ok_or(EditorError::NoSelection)?;
        self.add_child(parent, form)
    }

    /// Replace a node's descriptive fields. Its id, position and
    /// connections are kept.
    pub fn edit_node(&mut self, id: NodeId, form: IdeaForm) -> Result<&IdeaNode, EditorError> {
        self.update_node(id, form.into_data())
    }

    /// Replace a node's fields with an already-built record, bypassing
    /// the form's trimming and keyword splitting.
    pub fn update_node(&mut self, id: NodeId, data: NodeData) -> Result<&IdeaNode, EditorError> {
        // The text changed, so any size reported for the old text is stale.
        self.sizes.remove(id);
        Ok(self.map.update_node(id, data)?)
    }

    pub fn edit_selected(&mut self, form: IdeaForm) -> Result<&IdeaNode, EditorError> {
        let id = self.selection.ok_or(EditorError::NoSelection)?;
        self.edit_node(id, form)
    }

    /// Remove a node and its connections.
    pub fn delete_node(&mut self, id: NodeId) -> Result<IdeaNode, EditorError> {
        let node = self.map.remove_node(id)?;
        self.sizes.remove(id);
        if self.selection == Some(id) {
            self.selection = None;
        }
        if self.pending.is_some_and(|p| p.from == id) {
            self.cancel_link();
        }
        if self.tool.dragged_node() == Some(id) {
            self.tool.reset();
        }
        Ok(node)
    }

    pub fn delete_selected(&mut self) -> Result<IdeaNode, EditorError> {
        let id = self.selection.ok_or(EditorError::NoSelection)?;
        self.delete_node(id)
    }

    pub fn select(&mut self, id: Option<NodeId>) -> Result<(), EditorError> {
        if let Some(id) = id
            && !self.map.contains(id)
        {
            return Err(MapError::NodeNotFound(id).into());
        }
        self.selection = id;
        Ok(())
    }

    /// Move a node and return the recomputed curves of its connections.
    pub fn move_node(
        &mut self,
        id: NodeId,
        position: Position,
    ) -> Result<Vec<(Connection, CubicBez)>, EditorError> {
        self.map.set_position(id, position)?;
        Ok(self.incident_curves(id))
    }

    /// Record the size the canvas drew a node at.
    pub fn set_node_size(&mut self, id: NodeId, size: Size) -> Result<(), EditorError> {
        if !self.map.contains(id) {
            return Err(MapError::NodeNotFound(id).into());
        }
        self.sizes.set(id, size);
        Ok(())
    }

    // ─── Connections ─────────────────────────────────────────────────────

    pub fn connection_curve(&self, connection: &Connection) -> Option<CubicBez> {
        curve_between(&self.map, &self.sizes, connection, &self.config.curve)
    }

    /// Every connection with its current curve, in insertion order.
    pub fn curves(&self) -> Vec<(Connection, CubicBez)> {
        self.map
            .all_connections()
            .into_iter()
            .filter_map(|c| self.connection_curve(&c).map(|curve| (c, curve)))
            .collect()
    }

    pub fn incident_curves(&self, id: NodeId) -> Vec<(Connection, CubicBez)> {
        self.map
            .connections_of(id)
            .into_iter()
            .filter_map(|c| self.connection_curve(&c).map(|curve| (c, curve)))
            .collect()
    }

    /// The topmost connection whose curve passes within
    /// `hit_tolerance` of `point`.
    pub fn connection_at(&self, point: Point) -> Option<Connection> {
        hit_test_connection(
            &self.map,
            &self.sizes,
            point,
            self.config.hit_tolerance,
            &self.config.curve,
        )
    }

    pub fn link_nodes(&mut self, source: NodeId, target: NodeId) -> Result<Connection, EditorError> {
        Ok(self.map.add_connection(source, target)?)
    }

    pub fn delete_connection(&mut self, a: NodeId, b: NodeId) -> Result<Connection, EditorError> {
        self.map
            .remove_connection(a, b)
            .ok_or(EditorError::Map(MapError::ConnectionNotFound { from: a, to: b }))
    }

    /// Start drawing a connection from `from`.
    pub fn begin_link(&mut self, from: NodeId) -> Result<(), EditorError> {
        if !self.map.contains(from) {
            return Err(MapError::NodeNotFound(from).into());
        }
        log::debug!("linking from {from}");
        self.pending = Some(PendingLink { from, cursor: None });
        Ok(())
    }

    /// Follow the pointer with the pending connection.
    pub fn update_link(&mut self, cursor: Point) -> Result<CubicBez, EditorError> {
        let pending = self.pending.as_mut().ok_or(EditorError::NoPendingLink)?;
        pending.cursor = Some(cursor);
        self.pending_curve().ok_or(EditorError::NoPendingLink)
    }

    /// Drop the pending connection. Dropping on empty space or back on the
    /// start node cancels it.
    pub fn finish_link(&mut self, target: Option<NodeId>) -> Result<Option<Connection>, EditorError> {
        let pending = self.pending.take().ok_or(EditorError::NoPendingLink)?;
        match target {
            Some(target) if target != pending.from => {
                Ok(Some(self.link_nodes(pending.from, target)?))
            }
            _ => {
                log::debug!("link from {} cancelled", pending.from);
                Ok(None)
            }
        }
    }

    /// Returns whether a link was being drawn.
    pub fn cancel_link(&mut self) -> bool {
        self.tool.reset();
        self.pending.take().is_some()
    }

    /// Curve from the pending link's start node to the pointer, or a
    /// zero-length curve before the pointer has moved.
    pub fn pending_curve(&self) -> Option<CubicBez> {
        let pending = self.pending?;
        let node = self.map.find_node(pending.from)?;
        let start = node_center(node.position, self.sizes.size_of(node));
        Some(connection_curve(start, pending.cursor, &self.config.curve))
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Feed a pointer or key event from the canvas.
    ///
    /// Pointer events are applied directly. Key events resolve to an
    /// `EditorAction`; `CancelLink` is handled here, the rest are returned
    /// for the host to carry out.
    pub fn handle_input(&mut self, event: &InputEvent) -> Result<Option<EditorAction>, EditorError> {
        if let InputEvent::Key { key, modifiers } = event {
            let action = ShortcutMap::resolve(
                key,
                modifiers.ctrl,
                modifiers.shift,
                modifiers.alt,
                modifiers.meta,
            );
            if action == Some(EditorAction::CancelLink) {
                self.cancel_link();
            }
            return Ok(action);
        }

        let hit = event
            .position()
            .and_then(|point| hit_test(&self.map, &self.sizes, point));
        let commands = self.tool.handle(event, hit);
        for command in commands {
            self.apply(command)?;
        }
        Ok(None)
    }

    fn apply(&mut self, command: CanvasCommand) -> Result<(), EditorError> {
        match command {
            CanvasCommand::Select(id) => self.select(id),
            CanvasCommand::MoveBy { id, dx, dy } => {
                let current = self
                    .map
                    .find_node(id)
                    .ok_or(MapError::NodeNotFound(id))?
                    .position;
                self.move_node(id, Position::new(current.x + dx, current.y + dy))?;
                Ok(())
            }
            CanvasCommand::BeginLink(from) => self.begin_link(from),
            CanvasCommand::UpdateLink(point) => self.update_link(point).map(|_| ()),
            CanvasCommand::FinishLink(target) => self.finish_link(target).map(|_| ()),
        }
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn placement_size(&self, data: &NodeData) -> Size {
        let text = text_size(&data.title, &data.keywords);
        Size::new(
            text.width.max(self.config.default_size.width),
            text.height.max(self.config.default_size.height),
        )
    }

    fn reset_view_state(&mut self) {
        self.sizes.clear();
        self.selection = None;
        self.pending = None;
        self.tool.reset();
    }

    fn replace_map(&mut self, map: MindMap) {
        let mut replayed = vec![MapEvent::Cleared];
        replayed.extend(map.nodes().map(|node| MapEvent::NodeAdded(node.id)));
        replayed.extend(
            map.all_connections()
                .into_iter()
                .map(MapEvent::ConnectionAdded),
        );
        self.map = map;
        self.replayed = replayed;
        self.reset_view_state();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn editor() -> Editor {
        Editor::new(EditorConfig::default())
    }

    #[test]
    fn first_root_lands_on_spiral_start() {
        let mut ed = editor();
        let id = ed.create_root(IdeaForm::titled("Root")).unwrap();
        let node = ed.map().find_node(id).unwrap();
        assert_eq!(node.position, Position::new(90.0, -30.0));
    }

    #[test]
    fn second_root_uses_root_count() {
        let mut ed = editor();
        let a = ed.create_root(IdeaForm::titled("A")).unwrap();
        ed.add_child(a, IdeaForm::titled("child")).unwrap();
        // One root so far, the child has an incoming connection.
        let b = ed.create_root(IdeaForm::titled("B")).unwrap();
        let pos = ed.map().find_node(b).unwrap().position;
        let angle = std::f64::consts::PI / 6.0;
        assert!((pos.x - (180.0 * angle.cos() - 60.0)).abs() < 1e-9);
        assert!((pos.y - (180.0 * angle.sin() - 30.0)).abs() < 1e-9);
    }

    #[test]
    fn child_is_connected_and_offset() {
        let mut ed = editor();
        let root = ed.create_root(IdeaForm::titled("Root")).unwrap();
        let child = ed.add_child(root, IdeaForm::titled("Leaf")).unwrap();

        // One node on the canvas: angle 30°, 200 from the parent's origin.
        let angle = std::f64::consts::PI / 6.0;
        let pos = ed.map().find_node(child).unwrap().position;
        assert!((pos.x - (90.0 + 200.0 * angle.cos() - 60.0)).abs() < 1e-9);
        assert!((pos.y - (-30.0 + 200.0 * angle.sin() - 30.0)).abs() < 1e-9);
        assert_eq!(ed.map().all_connections(), vec![Connection::new(root, child)]);
    }

    #[test]
    fn add_child_to_missing_parent_fails() {
        let mut ed = editor();
        let err = ed
            .add_child(NodeId::intern("ed_ghost"), IdeaForm::titled("x"))
            .unwrap_err();
        assert!(matches!(err, EditorError::Map(MapError::NodeNotFound(_))));
        assert!(ed.map().is_empty());
    }

    #[test]
    fn selection_operations_need_a_selection() {
        let mut ed = editor();
        assert!(matches!(
            ed.add_child_to_selection(IdeaForm::titled("x")),
            Err(EditorError::NoSelection)
        ));
        assert!(matches!(ed.delete_selected(), Err(EditorError::NoSelection)));
        assert!(matches!(
            ed.edit_selected(IdeaForm::titled("x")),
            Err(EditorError::NoSelection)
        ));
    }

    #[test]
    fn edit_keeps_position_and_links() {
        let mut ed = editor();
        let root = ed.create_root(IdeaForm::titled("Root")).unwrap();
        let child = ed.add_child(root, IdeaForm::titled("Leaf")).unwrap();
        let before = ed.map().find_node(child).unwrap().position;

        ed.select(Some(child)).unwrap();
        let mut form = IdeaForm::from_node(ed.map().find_node(child).unwrap());
        form.title = "Renamed".into();
        form.keywords = "a, b".into();
        let node = ed.edit_selected(form).unwrap();
        assert_eq!(node.title, "Renamed");
        assert_eq!(node.keywords.to_vec(), vec!["a", "b"]);
        assert_eq!(node.position, before);
        assert_eq!(ed.map().connection_count(), 1);
    }

    #[test]
    fn delete_clears_selection_and_links() {
        let mut ed = editor();
        let root = ed.create_root(IdeaForm::titled("Root")).unwrap();
        let child = ed.add_child(root, IdeaForm::titled("Leaf")).unwrap();
        ed.select(Some(root)).unwrap();
        ed.delete_selected().unwrap();
        assert_eq!(ed.selection(), None);
        assert!(ed.map().contains(child));
        assert!(ed.map().all_connections().is_empty());
    }

    #[test]
    fn deleting_dragged_node_ends_the_drag() {
        let mut ed = editor();
        let root = ed.create_root(IdeaForm::titled("Root")).unwrap();
        let other = ed.create_root(IdeaForm::titled("Other")).unwrap();
        let other_pos = ed.map().find_node(other).unwrap().position;

        // Root occupies (90, -30) to (210, 30).
        ed.handle_input(&InputEvent::down(150.0, 0.0)).unwrap();
        assert_eq!(ed.selection(), Some(root));
        ed.delete_selected().unwrap();
        ed.events();

        assert_eq!(ed.handle_input(&InputEvent::moved(170.0, 20.0)).unwrap(), None);
        assert_eq!(ed.handle_input(&InputEvent::up(170.0, 20.0)).unwrap(), None);
        assert_eq!(ed.map().find_node(other).unwrap().position, other_pos);
        assert!(ed.events().is_empty());
    }

    #[test]
    fn update_node_keeps_record_verbatim() {
        let mut ed = editor();
        let id = ed.create_root(IdeaForm::titled("Trip")).unwrap();
        let mut data = ed.map().find_node(id).unwrap().to_data();
        data.keywords = vec!["Paris, France".to_string()].into();
        data.description = "line one\n".into();
        let node = ed.update_node(id, data).unwrap();
        assert_eq!(node.keywords.to_vec(), vec!["Paris, France"]);
        assert_eq!(node.description, "line one\n");
    }

    #[test]
    fn move_returns_incident_curves() {
        let mut ed = editor();
        let root = ed.create_root(IdeaForm::titled("Root")).unwrap();
        let child = ed.add_child(root, IdeaForm::titled("Leaf")).unwrap();
        ed.set_node_size(root, Size::new(100.0, 50.0)).unwrap();

        let curves = ed.move_node(root, Position::new(0.0, 0.0)).unwrap();
        assert_eq!(curves.len(), 1);
        let (connection, curve) = curves[0];
        assert_eq!(connection, Connection::new(root, child));
        assert_eq!(curve.p0, Point::new(50.0, 25.0));
    }

    #[test]
    fn pending_link_starts_degenerate() {
        let mut ed = editor();
        let a = ed.create_root(IdeaForm::titled("A")).unwrap();
        ed.begin_link(a).unwrap();
        let curve = ed.pending_curve().unwrap();
        assert_eq!(curve.p0, curve.p3);

        let curve = ed.update_link(Point::new(500.0, 0.0)).unwrap();
        assert_eq!(curve.p3, Point::new(500.0, 0.0));
    }

    #[test]
    fn dropping_on_self_or_empty_space_cancels() {
        let mut ed = editor();
        let a = ed.create_root(IdeaForm::titled("A")).unwrap();
        ed.begin_link(a).unwrap();
        assert_eq!(ed.finish_link(Some(a)).unwrap(), None);
        ed.begin_link(a).unwrap();
        assert_eq!(ed.finish_link(None).unwrap(), None);
        assert_eq!(ed.map().connection_count(), 0);
        assert!(matches!(ed.finish_link(None), Err(EditorError::NoPendingLink)));
    }

    #[test]
    fn delete_connection_reports_missing_pair() {
        let mut ed = editor();
        let a = ed.create_root(IdeaForm::titled("A")).unwrap();
        let b = ed.create_root(IdeaForm::titled("B")).unwrap();
        ed.link_nodes(a, b).unwrap();
        assert_eq!(ed.delete_connection(b, a).unwrap(), Connection::new(a, b));
        let err = ed.delete_connection(a, b).unwrap_err();
        assert_eq!(err.to_string(), MapError::ConnectionNotFound { from: a, to: b }.to_string());
    }

    #[test]
    fn escape_cancels_pending_link() {
        let mut ed = editor();
        let a = ed.create_root(IdeaForm::titled("A")).unwrap();
        ed.begin_link(a).unwrap();
        let action = ed
            .handle_input(&InputEvent::key("Escape", crate::input::Modifiers::NONE))
            .unwrap();
        assert_eq!(action, Some(EditorAction::CancelLink));
        assert_eq!(ed.pending_link(), None);
    }

    #[test]
    fn new_map_clears_everything() {
        let mut ed = editor();
        let a = ed.create_root(IdeaForm::titled("A")).unwrap();
        ed.select(Some(a)).unwrap();
        ed.events();
        ed.new_map();
        assert!(ed.map().is_empty());
        assert_eq!(ed.selection(), None);
        assert_eq!(ed.events(), vec![MapEvent::Cleared]);
    }

    #[test]
    fn import_replays_full_contents() {
        let mut ed = editor();
        ed.create_root(IdeaForm::titled("old")).unwrap();
        let report = ed
            .import_str(
                r#"{
                    "nodes": [
                        { "id": "imp_x", "title": "X", "position": { "x": 0, "y": 0 } },
                        { "id": "imp_y", "title": "Y", "position": { "x": 300, "y": 0 } }
                    ],
                    "connections": [{ "source": "imp_x", "target": "imp_y" }]
                }"#,
            )
            .unwrap();
        assert!(report.is_clean());
        let x = NodeId::intern("imp_x");
        let y = NodeId::intern("imp_y");
        assert_eq!(
            ed.events(),
            vec![
                MapEvent::Cleared,
                MapEvent::NodeAdded(x),
                MapEvent::NodeAdded(y),
                MapEvent::ConnectionAdded(Connection::new(x, y)),
            ]
        );
        assert!(ed.events().is_empty());
    }
}
