//! Subcommand implementations. Each one opens the map through an editor
//! session, applies one change, and writes the file back.

use crate::NodeFields;
use anyhow::{Context, Result, bail};
use hm_core::codec::from_json_str;
use hm_core::id::NodeId;
use hm_core::lint::{LintDiagnostic, LintSeverity, lint_document};
use hm_core::model::MindMap;
use hm_editor::{Editor, EditorConfig, IdeaForm, split_keywords};
use hm_render::render_svg;
use std::path::Path;

pub fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    let Some(path) = path else {
        return Ok(EditorConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn open(file: &Path, config: EditorConfig) -> Result<Editor> {
    let mut editor = Editor::new(config);
    let report = editor
        .open(file)
        .with_context(|| format!("opening {}", file.display()))?;
    for skipped in &report.skipped {
        log::warn!("{}: dropped on load: {skipped}", file.display());
    }
    Ok(editor)
}

fn save(editor: &mut Editor, file: &Path) -> Result<()> {
    editor
        .save(file)
        .with_context(|| format!("saving {}", file.display()))
}

fn apply_fields(mut form: IdeaForm, fields: NodeFields) -> IdeaForm {
    if let Some(title) = fields.title {
        form.title = title;
    }
    if let Some(description) = fields.description {
        form.description = description;
    }
    if let Some(keywords) = fields.keywords {
        form.keywords = keywords;
    }
    if let Some(color) = fields.color {
        form.color = color;
    }
    if let Some(shape) = fields.shape {
        form.shape = shape;
    }
    if let Some(image) = fields.image {
        form.image = Some(image);
    }
    form
}

pub fn new_map(file: &Path, force: bool) -> Result<()> {
    if file.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", file.display());
    }
    let mut editor = Editor::new(EditorConfig::default());
    save(&mut editor, file)?;
    println!("Created {}", file.display());
    Ok(())
}

pub fn info(file: &Path, config: EditorConfig) -> Result<()> {
    let editor = open(file, config)?;
    for line in summary_lines(editor.map()) {
        println!("{line}");
    }
    Ok(())
}

fn summary_lines(map: &MindMap) -> Vec<String> {
    let mut lines = vec![format!(
        "{} nodes, {} connections, {} roots",
        map.len(),
        map.connection_count(),
        map.root_count()
    )];
    for node in map.nodes() {
        lines.push(format!(
            "  {}  {} [{} {}] at ({}, {})",
            node.id,
            node.title,
            node.shape.as_str(),
            node.color.to_hex(),
            node.position.x,
            node.position.y
        ));
    }
    for connection in map.all_connections() {
        lines.push(format!("  {} -> {}", connection.source, connection.target));
    }
    lines
}

pub fn lint(file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let document = from_json_str(&text).with_context(|| format!("decoding {}", file.display()))?;
    let diagnostics = lint_document(&document);
    for line in lint_lines(&diagnostics) {
        println!("{line}");
    }
    let warnings = diagnostics
        .iter()
        .filter(|d| d.severity == LintSeverity::Warning)
        .count();
    if warnings > 0 {
        bail!("{warnings} warning(s) in {}", file.display());
    }
    Ok(())
}

fn lint_lines(diagnostics: &[LintDiagnostic]) -> Vec<String> {
    diagnostics
        .iter()
        .map(|d| {
            let severity = match d.severity {
                LintSeverity::Warning => "warning",
                LintSeverity::Info => "info",
            };
            match d.record {
                Some(record) => format!("{severity}[{}] #{record}: {}", d.rule, d.message),
                None => format!("{severity}[{}]: {}", d.rule, d.message),
            }
        })
        .collect()
}

pub fn add(
    file: &Path,
    parent: Option<&str>,
    fields: NodeFields,
    config: EditorConfig,
) -> Result<()> {
    let mut editor = open(file, config)?;
    let form = apply_fields(IdeaForm::default(), fields);
    let id = match parent {
        Some(parent) => editor.add_child(NodeId::intern(parent), form)?,
        None => editor.create_root(form)?,
    };
    save(&mut editor, file)?;
    println!("{id}");
    Ok(())
}

pub fn edit(file: &Path, id: &str, fields: NodeFields, config: EditorConfig) -> Result<()> {
    let mut editor = open(file, config)?;
    let id = NodeId::intern(id);
    let mut data = editor
        .map()
        .find_node(id)
        .with_context(|| format!("no node `{id}` in {}", file.display()))?
        .to_data();
    // Fields not given on the command line are written back untouched.
    if let Some(title) = fields.title {
        data.title = title;
    }
    if let Some(description) = fields.description {
        data.description = description;
    }
    if let Some(keywords) = fields.keywords {
        data.keywords = split_keywords(&keywords).into();
    }
    if let Some(color) = fields.color {
        data.color = color;
    }
    if let Some(shape) = fields.shape {
        data.shape = shape;
    }
    if let Some(image) = fields.image {
        data.image = Some(image).filter(|path| !path.trim().is_empty());
    }
    editor.update_node(id, data)?;
    save(&mut editor, file)
}

pub fn link(file: &Path, source: &str, target: &str, config: EditorConfig) -> Result<()> {
    let mut editor = open(file, config)?;
    editor.link_nodes(NodeId::intern(source), NodeId::intern(target))?;
    save(&mut editor, file)
}

pub fn unlink(file: &Path, source: &str, target: &str, config: EditorConfig) -> Result<()> {
    let mut editor = open(file, config)?;
    editor.delete_connection(NodeId::intern(source), NodeId::intern(target))?;
    save(&mut editor, file)
}

pub fn remove(file: &Path, id: &str, config: EditorConfig) -> Result<()> {
    let mut editor = open(file, config)?;
    let node = editor.delete_node(NodeId::intern(id))?;
    save(&mut editor, file)?;
    println!("Removed {} ({})", node.id, node.title);
    Ok(())
}

pub fn svg(file: &Path, output: Option<&Path>, config: EditorConfig) -> Result<()> {
    let editor = open(file, config)?;
    let config = editor.config();
    let svg = render_svg(
        editor.map(),
        editor.sizes(),
        &[],
        &config.theme,
        &config.curve,
    );
    match output {
        Some(path) => std::fs::write(path, svg)
            .with_context(|| format!("writing {}", path.display()))?,
        None => print!("{svg}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hm_core::model::{Color, Shape};
    use pretty_assertions::assert_eq;

    fn load(file: &Path) -> Editor {
        open(file, EditorConfig::default()).unwrap()
    }

    fn fields(title: &str) -> NodeFields {
        NodeFields {
            title: Some(title.to_string()),
            ..NodeFields::default()
        }
    }

    #[test]
    fn build_a_map_from_the_command_line() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("map.json");

        new_map(&file, false).unwrap();
        assert!(new_map(&file, false).is_err());

        add(&file, None, fields("Hephaestus"), EditorConfig::default()).unwrap();
        let root = load(&file).map().nodes().next().unwrap().id;
        add(
            &file,
            Some(root.as_str()),
            fields("Anvil"),
            EditorConfig::default(),
        )
        .unwrap();

        let editor = load(&file);
        let child = editor.map().nodes().nth(1).unwrap().id;
        let lines = summary_lines(editor.map());
        assert_eq!(lines[0], "2 nodes, 1 connections, 1 roots");
        assert_eq!(lines[3], format!("  {root} -> {child}"));

        unlink(&file, child.as_str(), root.as_str(), EditorConfig::default()).unwrap();
        assert_eq!(load(&file).map().connection_count(), 0);
        assert!(unlink(&file, child.as_str(), root.as_str(), EditorConfig::default()).is_err());

        remove(&file, root.as_str(), EditorConfig::default()).unwrap();
        assert_eq!(load(&file).map().len(), 1);
    }

    #[test]
    fn edit_overrides_only_given_fields() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("map.json");
        new_map(&file, false).unwrap();
        add(
            &file,
            None,
            NodeFields {
                title: Some("Bronze".into()),
                description: Some("copper and tin".into()),
                keywords: Some("alloy, metal".into()),
                ..NodeFields::default()
            },
            EditorConfig::default(),
        )
        .unwrap();
        let id = load(&file).map().nodes().next().unwrap().id;

        edit(
            &file,
            id.as_str(),
            NodeFields {
                color: Some(Color::rgb(0xC8, 0x75, 0x33)),
                shape: Some(Shape::Rectangle),
                ..NodeFields::default()
            },
            EditorConfig::default(),
        )
        .unwrap();

        let editor = load(&file);
        let node = editor.map().find_node(id).unwrap();
        assert_eq!(node.title, "Bronze");
        assert_eq!(node.description, "copper and tin");
        assert_eq!(node.keywords.to_vec(), vec!["alloy", "metal"]);
        assert_eq!(node.color, Color::rgb(0xC8, 0x75, 0x33));
        assert_eq!(node.shape, Shape::Rectangle);
    }

    #[test]
    fn edit_leaves_untouched_fields_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("map.json");
        std::fs::write(
            &file,
            r#"{
                "nodes": [{
                    "id": "trip",
                    "title": "Trip",
                    "description": "line one\n",
                    "keywords": ["Paris, France"],
                    "position": { "x": 0.0, "y": 0.0 }
                }],
                "connections": []
            }"#,
        )
        .unwrap();

        edit(
            &file,
            "trip",
            NodeFields {
                color: Some(Color::rgb(0x21, 0x96, 0xF3)),
                ..NodeFields::default()
            },
            EditorConfig::default(),
        )
        .unwrap();

        let editor = load(&file);
        let node = editor.map().find_node(NodeId::intern("trip")).unwrap();
        assert_eq!(node.keywords.to_vec(), vec!["Paris, France"]);
        assert_eq!(node.description, "line one\n");
        assert_eq!(node.color, Color::rgb(0x21, 0x96, 0xF3));
    }

    #[test]
    fn link_to_unknown_node_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("map.json");
        new_map(&file, false).unwrap();
        add(&file, None, fields("Lonely"), EditorConfig::default()).unwrap();
        let id = load(&file).map().nodes().next().unwrap().id;
        let err = link(&file, id.as_str(), "nowhere", EditorConfig::default()).unwrap_err();
        assert!(err.to_string().contains("nowhere"), "{err}");
    }

    #[test]
    fn svg_written_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("map.json");
        let out = dir.path().join("map.svg");
        new_map(&file, false).unwrap();
        add(&file, None, fields("Forge"), EditorConfig::default()).unwrap();
        svg(&file, Some(&out), EditorConfig::default()).unwrap();
        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.starts_with("<svg"));
        assert!(text.contains(">Forge</tspan>"));
    }

    #[test]
    fn lint_lines_show_rule_and_record() {
        let doc = from_json_str(r#"{ "nodes": [3], "connections": [] }"#).unwrap();
        let lines = lint_lines(&lint_document(&doc));
        assert_eq!(
            lines,
            vec!["warning[malformed-node] #0: Node record #0 is not an object and will be skipped."]
        );
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hm.json");
        std::fs::write(&path, r#"{ "hit_tolerance": 10.0, "layout": { "child_offset": 250.0 } }"#)
            .unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.hit_tolerance, 10.0);
        assert_eq!(config.layout.child_offset, 250.0);
        assert_eq!(config.layout.base_radius, 150.0);
        assert_eq!(config.curve, EditorConfig::default().curve);
        assert_eq!(load_config(None).unwrap(), EditorConfig::default());
    }
}
