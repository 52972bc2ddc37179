//! Canvas colors and stroke widths.

use hm_core::model::{Color, IdeaNode};
use serde::{Deserialize, Serialize};

/// Nodes lighter than this get a black connection stroke instead of their own color.
pub const PALE_LIGHTNESS: u8 = 240;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasTheme {
    pub background: Color,
    pub node_outline: Color,
    pub node_outline_width: f64,
    pub selected_outline: Color,
    pub selected_outline_width: f64,
    pub text: Color,
    pub font_size: f64,
    pub connection_width: f64,
    /// Margin around the content in exported images.
    pub padding: f64,
}

impl Default for CanvasTheme {
    fn default() -> Self {
        Self {
            background: Color::rgb(0xF0, 0xF0, 0xF0),
            node_outline: Color::BLACK,
            node_outline_width: 1.5,
            selected_outline: Color::rgb(0x21, 0x96, 0xF3),
            selected_outline_width: 2.0,
            text: Color::BLACK,
            font_size: 14.0,
            connection_width: 2.0,
            padding: 40.0,
        }
    }
}

/// Stroke color for a connection leaving `start`.
pub fn connection_color(start: &IdeaNode) -> Color {
    if start.color.lightness() > PALE_LIGHTNESS {
        Color::BLACK
    } else {
        start.color
    }
}
