pub mod hit;
pub mod svg;
pub mod theme;

pub use hit::{hit_test, hit_test_connection, hit_test_rect, node_contains};
pub use svg::render_svg;
pub use theme::{CanvasTheme, connection_color};
