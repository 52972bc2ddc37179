//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `EditorAction`s. Actions that
//! need a dialog or confirmation (new, open, save, edit, delete) are
//! returned to the host; the editor only acts on them once the host has
//! collected what it needs.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    // ── File ──
    NewMap,
    Open,
    Save,
    Quit,

    // ── Edit ──
    CreateRoot,
    /// Add a child to the selected node.
    AddChild,
    EditNode,
    DeleteNode,
    /// Abort a connection being drawn.
    CancelLink,

    // ── View ──
    ZoomIn,
    ZoomOut,
}

/// Resolves key events into editor actions.
///
/// On macOS `meta` is ⌘; elsewhere `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<EditorAction> {
        let cmd = ctrl || meta;

        // Ctrl+N adds a child; a new map needs Shift as well.
        if cmd && shift {
            return match key {
                "n" | "N" => Some(EditorAction::NewMap),
                "+" => Some(EditorAction::ZoomIn),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "o" | "O" => Some(EditorAction::Open),
                "s" | "S" => Some(EditorAction::Save),
                "q" | "Q" => Some(EditorAction::Quit),
                "r" | "R" => Some(EditorAction::CreateRoot),
                "n" | "N" => Some(EditorAction::AddChild),
                "e" | "E" => Some(EditorAction::EditNode),
                "=" | "+" => Some(EditorAction::ZoomIn),
                "-" => Some(EditorAction::ZoomOut),
                _ => None,
            };
        }

        if shift {
            return None;
        }

        match key {
            "Delete" | "Backspace" => Some(EditorAction::DeleteNode),
            "Escape" => Some(EditorAction::CancelLink),
            _ => None,
        }
    }
}
