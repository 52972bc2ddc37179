pub mod codec;
pub mod error;
pub mod event;
pub mod geometry;
pub mod id;
pub mod layout;
pub mod lint;
pub mod model;

pub use codec::{Document, ImportReport, decode, encode, from_json_str, import_document, to_json_string};
pub use error::{ErrorKind, MapError};
pub use event::MapEvent;
pub use geometry::{CurveConfig, connection_curve, curve_between, node_center};
pub use id::NodeId;
pub use layout::{LayoutConfig, NodeSizes, place_child, place_root};
pub use lint::{LintDiagnostic, LintSeverity, lint_document};
pub use model::*;

// Re-export kurbo geometry types so downstream crates don't need a direct dependency
pub use kurbo::{CubicBez, Point, Size};
