pub mod dialog;
pub mod input;
pub mod session;
pub mod shortcuts;
pub mod tools;

pub use dialog::{IdeaForm, split_keywords};
pub use input::{InputEvent, Modifiers};
pub use session::{Editor, EditorConfig, EditorError, PendingLink};
pub use shortcuts::{EditorAction, ShortcutMap};
pub use tools::{CanvasCommand, CanvasTool};
