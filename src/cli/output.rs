//! Handles all user-facing output for the CLI.
//!
//! JSON rendering of templates and the plain-text `check` summary live here so
//! every command prints the same way.

use std::collections::BTreeMap;

use crate::ast::Template;
use crate::{err_msg, Normalized, TemplateError};

// ============================================================================
// CORE OUTPUT FUNCTIONS
// ============================================================================

/// Prints a template as JSON on stdout.
pub fn print_json(template: &Template, compact: bool) -> Result<(), TemplateError> {
    println!("{}", render_json(template, compact)?);
    Ok(())
}

/// Prints node counts by kind, then one line per dropped construct.
pub fn print_summary(normalized: &Normalized) {
    print!("{}", render_summary(normalized));
}

pub fn render_json(template: &Template, compact: bool) -> Result<String, TemplateError> {
    let rendered = if compact {
        serde_json::to_string(template)
    } else {
        serde_json::to_string_pretty(template)
    };
    rendered.map_err(|e| err_msg!(Serialize, "cannot encode template as JSON").with_cause(e))
}

pub fn render_summary(normalized: &Normalized) -> String {
    let mut out = String::new();
    for (kind, count) in count_kinds(&normalized.template) {
        out.push_str(&format!("{kind}: {count}\n"));
    }
    out.push_str(&format!("dropped: {}\n", normalized.dropped.len()));
    for dropped in &normalized.dropped {
        let start = dropped.loc.start;
        out.push_str(&format!(
            "  {}:{} {:?} ({:?})\n",
            start.line, start.column, dropped.kind, dropped.reason
        ));
    }
    out
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn count_kinds(template: &Template) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for (_, node) in template.descendants() {
        *counts.entry(node.type_name()).or_insert(0) += 1;
    }
    counts
}
