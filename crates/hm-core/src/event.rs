//! Change notifications emitted by the graph model.
//!
//! Every mutation on `MindMap` queues one event. The presentation layer
//! drains the queue after each user action and repaints what changed;
//! nodes never hold a reference back into the view.

use crate::id::NodeId;
use crate::model::{Connection, Position};

#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    NodeAdded(NodeId),
    /// Descriptive attributes (title, color, shape, ...) changed.
    NodeUpdated(NodeId),
    /// The node was dragged or placed. Incident connection curves are stale.
    NodeMoved { id: NodeId, position: Position },
    /// The node is gone, together with every connection listed here.
    NodeRemoved {
        id: NodeId,
        connections: Vec<Connection>,
    },
    ConnectionAdded(Connection),
    ConnectionRemoved(Connection),
    Cleared,
}
