use crate::hit::node_rect;
use crate::theme::{CanvasTheme, connection_color};
use hm_core::geometry::{CurveConfig, curve_between};
use hm_core::id::NodeId;
use hm_core::layout::NodeSizes;
use hm_core::model::{IdeaNode, MindMap, Shape};
use kurbo::{Rect, Size};

/// Export the whole map as a standalone SVG document.
///
/// Connections are drawn first so nodes sit on top of them. Nodes in
/// `selected` get the theme's selection outline.
pub fn render_svg(
    map: &MindMap,
    sizes: &NodeSizes,
    selected: &[NodeId],
    theme: &CanvasTheme,
    curve: &CurveConfig,
) -> String {
    let content = map
        .nodes()
        .map(|node| node_rect(node, sizes.size_of(node)))
        .reduce(|a, b| a.union(b))
        .unwrap_or(Rect::new(0.0, 0.0, 800.0, 600.0));
    let view = content.inflate(theme.padding, theme.padding);
    log::debug!(
        "exporting {} nodes in {}x{} viewBox",
        map.len(),
        view.width(),
        view.height()
    );

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"{} {} {} {}\">\n",
        view.width(),
        view.height(),
        view.x0,
        view.y0,
        view.width(),
        view.height()
    ));
    svg.push_str("<style>\n");
    svg.push_str("  text { font-family: system-ui, sans-serif; }\n");
    svg.push_str("</style>\n");
    svg.push_str(&format!(
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" />\n",
        view.x0,
        view.y0,
        view.width(),
        view.height(),
        theme.background.to_hex()
    ));

    for connection in map.all_connections() {
        let (Some(start), Some(bez)) = (
            map.find_node(connection.source),
            curve_between(map, sizes, &connection, curve),
        ) else {
            continue;
        };
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" />\n",
            hm_core::geometry::to_svg_path(&bez),
            connection_color(start).to_hex(),
            theme.connection_width
        ));
    }

    for node in map.nodes() {
        let is_selected = selected.contains(&node.id);
        render_node_svg(&mut svg, node, sizes.size_of(node), is_selected, theme);
    }

    svg.push_str("</svg>\n");
    svg
}

fn render_node_svg(
    out: &mut String,
    node: &IdeaNode,
    size: Size,
    selected: bool,
    theme: &CanvasTheme,
) {
    let rect = node_rect(node, size);
    let (stroke, stroke_width) = if selected {
        (theme.selected_outline, theme.selected_outline_width)
    } else {
        (theme.node_outline, theme.node_outline_width)
    };
    let paint = format!(
        "fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"",
        node.color.to_hex(),
        stroke.to_hex(),
        stroke_width
    );

    out.push_str(&format!("<g data-id=\"{}\">\n", escape_xml(node.id.as_str())));
    match node.shape {
        Shape::Oval => out.push_str(&format!(
            "  <ellipse cx=\"{}\" cy=\"{}\" rx=\"{}\" ry=\"{}\" {paint} />\n",
            rect.center().x,
            rect.center().y,
            rect.width() / 2.0,
            rect.height() / 2.0
        )),
        Shape::Rectangle => out.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" {paint} />\n",
            rect.x0,
            rect.y0,
            rect.width(),
            rect.height()
        )),
        Shape::Triangle => out.push_str(&format!(
            "  <polygon points=\"{},{} {},{} {},{}\" {paint} />\n",
            rect.center().x,
            rect.y0,
            rect.x1,
            rect.y1,
            rect.x0,
            rect.y1
        )),
    }

    let mut lines: Vec<String> = node.title.lines().map(escape_xml).collect();
    if !node.keywords.is_empty() {
        lines.push(format!("[{}]", escape_xml(&node.keywords.join(", "))));
    }
    let line_height = theme.font_size * 1.4;
    let first_y = rect.center().y - line_height * (lines.len() as f64 - 1.0) / 2.0;
    out.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" font-size=\"{}\" fill=\"{}\" text-anchor=\"middle\" dominant-baseline=\"middle\">",
        rect.center().x,
        first_y,
        theme.font_size,
        theme.text.to_hex()
    ));
    for (i, line) in lines.iter().enumerate() {
        let dy = if i == 0 { 0.0 } else { line_height };
        out.push_str(&format!(
            "<tspan x=\"{}\" dy=\"{}\">{line}</tspan>",
            rect.center().x,
            dy
        ));
    }
    out.push_str("</text>\n");
    out.push_str("</g>\n");
}

pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
