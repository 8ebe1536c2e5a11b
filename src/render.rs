//! S-expression rendering of syntax trees.
//!
//! Each node renders as its construct name followed by ` (`, then one
//! line per leaf value and child, indented four spaces per level, then
//! `)`. The output is meant for comparison in tests and for debugging;
//! it is not parsed back.

use crate::ast::Node;

const INDENT: &str = "    ";

/// Render a node and its subtree.
#[must_use]
pub fn render<'a>(node: impl Into<Node<'a>>) -> String {
    let mut out = String::new();
    render_node(&mut out, node.into(), 0);
    out
}

fn render_node(out: &mut String, node: Node<'_>, level: usize) {
    push_indent(out, level);
    out.push_str(node.name());

    let value = node.value();
    let children = node.children();
    if value.is_none() && children.is_empty() {
        return;
    }

    out.push_str(" (");
    if let Some(value) = value {
        out.push('\n');
        push_indent(out, level + 1);
        out.push_str(&value);
    }
    for child in children {
        out.push('\n');
        render_node(out, child, level + 1);
    }
    out.push(')');
}

fn push_indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}
