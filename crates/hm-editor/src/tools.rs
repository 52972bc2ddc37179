//! Canvas tool: translates pointer input into `CanvasCommand`s that the
//! `Editor` applies.
//!
//! | Gesture            | Result                                  |
//! |--------------------|-----------------------------------------|
//! | press on node      | select it and start dragging            |
//! | press on empty     | clear the selection                     |
//! | Shift+press on node| start drawing a connection from it      |
//! | move               | drag the node or follow with the link   |
//! | release            | end the drag or drop the link           |

use crate::input::InputEvent;
use hm_core::id::NodeId;
use kurbo::Point;

/// A single change requested by the canvas tool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasCommand {
    Select(Option<NodeId>),
    MoveBy { id: NodeId, dx: f64, dy: f64 },
    BeginLink(NodeId),
    UpdateLink(Point),
    /// Drop the pending link on a node, or on empty space (`None`).
    FinishLink(Option<NodeId>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    Dragging { id: NodeId, last: Point },
    Linking,
}

#[derive(Debug, Clone)]
pub struct CanvasTool {
    gesture: Gesture,
}

impl Default for CanvasTool {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasTool {
    pub fn new() -> Self {
        Self {
            gesture: Gesture::Idle,
        }
    }

    pub fn is_linking(&self) -> bool {
        self.gesture == Gesture::Linking
    }

    pub fn dragged_node(&self) -> Option<NodeId> {
        match self.gesture {
            Gesture::Dragging { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Drop any gesture in progress.
    pub fn reset(&mut self) {
        self.gesture = Gesture::Idle;
    }

    /// Handle an input event. `hit_node` is the node under the pointer.
    pub fn handle(&mut self, event: &InputEvent, hit_node: Option<NodeId>) -> Vec<CanvasCommand> {
        match event {
            InputEvent::PointerDown { x, y, modifiers } => match hit_node {
                Some(id) if modifiers.shift => {
                    self.gesture = Gesture::Linking;
                    vec![CanvasCommand::BeginLink(id)]
                }
                Some(id) => {
                    self.gesture = Gesture::Dragging {
                        id,
                        last: Point::new(*x, *y),
                    };
                    vec![CanvasCommand::Select(Some(id))]
                }
                None => {
                    self.gesture = Gesture::Idle;
                    vec![CanvasCommand::Select(None)]
                }
            },
            InputEvent::PointerMove { x, y, .. } => {
                let pointer = Point::new(*x, *y);
                match &mut self.gesture {
                    Gesture::Linking => vec![CanvasCommand::UpdateLink(pointer)],
                    Gesture::Dragging { id, last } => {
                        let delta = pointer - *last;
                        *last = pointer;
                        if delta.hypot2() == 0.0 {
                            return vec![];
                        }
                        vec![CanvasCommand::MoveBy {
                            id: *id,
                            dx: delta.x,
                            dy: delta.y,
                        }]
                    }
                    Gesture::Idle => vec![],
                }
            }
            InputEvent::PointerUp { .. } => {
                let finished = std::mem::replace(&mut self.gesture, Gesture::Idle);
                match finished {
                    Gesture::Linking => vec![CanvasCommand::FinishLink(hit_node)],
                    _ => vec![],
                }
            }
            InputEvent::Key { .. } => vec![],
        }
    }
}
