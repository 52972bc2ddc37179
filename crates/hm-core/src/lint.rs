//! Lint diagnostics for mind map documents.
//!
//! Reports structural issues in a decoded document without modifying it.
//! Import is lenient and silently repairs most of these; lint is how a
//! user finds out what was repaired.

use crate::codec::Document;
use crate::id::NodeId;
use crate::model::{Color, Shape, id_from_value};
use serde_json::Value;
use std::collections::HashSet;

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Data will be dropped or replaced on import.
    Warning,
    /// Informational; the document loads as-is.
    Info,
}

/// A single lint diagnostic.
#[derive(Debug, Clone)]
pub struct LintDiagnostic {
    /// Index into the `nodes` or `connections` array, when the finding is about one record.
    pub record: Option<usize>,
    /// The node this diagnostic refers to, if known.
    pub node_id: Option<NodeId>,
    /// Human-readable message.
    pub message: String,
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "duplicate-id", "self-loop").
    pub rule: &'static str,
}

// ─── Public API ───────────────────────────────────────────────────────────

/// Run all lint rules over a decoded document and return diagnostics.
#[must_use]
pub fn lint_document(doc: &Document) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    let ids = lint_nodes(doc, &mut diags);
    lint_connections(doc, &ids, &mut diags);
    diags
}

// ─── Rules ────────────────────────────────────────────────────────────────

fn lint_nodes(doc: &Document, diags: &mut Vec<LintDiagnostic>) -> HashSet<NodeId> {
    let mut seen = HashSet::new();

    for (i, record) in doc.nodes.iter().enumerate() {
        let Some(obj) = record.as_object() else {
            diags.push(LintDiagnostic {
                record: Some(i),
                node_id: None,
                message: format!("Node record #{i} is not an object and will be skipped."),
                severity: LintSeverity::Warning,
                rule: "malformed-node",
            });
            continue;
        };

        let id = obj.get("id").and_then(id_from_value);
        let mut push = |rule: &'static str, severity: LintSeverity, message: String| {
            diags.push(LintDiagnostic {
                record: Some(i),
                node_id: id,
                message,
                severity,
                rule,
            });
        };

        match id {
            Some(id) if !seen.insert(id) => push(
                "duplicate-id",
                LintSeverity::Warning,
                format!("Node id `{id}` is used more than once; later records are skipped."),
            ),
            Some(_) => {}
            None => push(
                "missing-id",
                LintSeverity::Info,
                format!("Node record #{i} has no id; one will be generated."),
            ),
        }

        let title_blank = obj
            .get("title")
            .and_then(Value::as_str)
            .is_none_or(|t| t.trim().is_empty());
        if title_blank {
            push(
                "missing-title",
                LintSeverity::Info,
                format!("Node record #{i} has no title; it will show as \"Untitled\"."),
            );
        }

        if let Some(color) = obj.get("color").filter(|v| !v.is_null()) {
            let valid = color.as_str().and_then(Color::from_hex).is_some();
            if !valid {
                push(
                    "invalid-color",
                    LintSeverity::Warning,
                    format!("Color {color} is not `#RRGGBB`; white will be used."),
                );
            }
        }

        if let Some(shape) = obj.get("shape").filter(|v| !v.is_null()) {
            let valid = shape.as_str().and_then(Shape::parse).is_some();
            if !valid {
                push(
                    "unknown-shape",
                    LintSeverity::Warning,
                    format!("Shape {shape} is not oval, rectangle, or triangle; oval will be used."),
                );
            }
        }

        if !obj.get("position").is_some_and(Value::is_object) {
            push(
                "missing-position",
                LintSeverity::Info,
                format!("Node record #{i} has no position; it will be placed automatically."),
            );
        }
    }

    seen
}

fn lint_connections(doc: &Document, ids: &HashSet<NodeId>, diags: &mut Vec<LintDiagnostic>) {
    if doc.incomplete_connections > 0 {
        diags.push(LintDiagnostic {
            record: None,
            node_id: None,
            message: format!(
                "{} connection record(s) lack `source` or `target` and are ignored.",
                doc.incomplete_connections
            ),
            severity: LintSeverity::Info,
            rule: "incomplete-connection",
        });
    }

    let mut pairs: HashSet<(NodeId, NodeId)> = HashSet::new();
    for (i, c) in doc.connections.iter().enumerate() {
        for end in [c.source, c.target] {
            if !ids.contains(&end) {
                diags.push(LintDiagnostic {
                    record: Some(i),
                    node_id: Some(end),
                    message: format!(
                        "Connection {} → {} references missing node `{end}`.",
                        c.source, c.target
                    ),
                    severity: LintSeverity::Warning,
                    rule: "dangling-connection",
                });
            }
        }

        if c.is_self_loop() {
            diags.push(LintDiagnostic {
                record: Some(i),
                node_id: Some(c.source),
                message: format!("Connection links `{}` to itself.", c.source),
                severity: LintSeverity::Info,
                rule: "self-loop",
            });
        }

        // Unordered pair key.
        let key = if c.source.as_str() <= c.target.as_str() {
            (c.source, c.target)
        } else {
            (c.target, c.source)
        };
        if !pairs.insert(key) {
            diags.push(LintDiagnostic {
                record: Some(i),
                node_id: Some(c.source),
                message: format!(
                    "`{}` and `{}` are already connected; this connection is a duplicate.",
                    c.source, c.target
                ),
                severity: LintSeverity::Info,
                rule: "parallel-connection",
            });
        }
    }
}
