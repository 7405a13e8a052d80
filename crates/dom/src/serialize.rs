//! Tree → markup text.
//!
//! The output is parse-stable with respect to `markup::tokenize`: serializing
//! a tree and re-parsing it yields an equivalent tree for trees that came out
//! of the parser in the first place. Attribute order is preserved.

use crate::node::{NodeId, NodeKind};
use crate::tree::Dom;

/// Elements with no content model and no end tag.
pub fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn escape_text(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

pub fn to_markup(dom: &Dom, id: NodeId) -> String {
    let mut out = String::new();
    write_node(dom, id, &mut out);
    out
}

fn write_node(dom: &Dom, id: NodeId, out: &mut String) {
    match dom.kind(id) {
        NodeKind::Document { doctype } => {
            if let Some(dt) = doctype {
                out.push_str("<!");
                out.push_str(dt);
                out.push('>');
            }
            write_children(dom, id, out);
        }
        NodeKind::Fragment => write_children(dom, id, out),
        NodeKind::Element { name, attrs, .. } => {
            out.push('<');
            out.push_str(name);
            for attr in attrs {
                out.push(' ');
                out.push_str(&attr.name);
                out.push_str("=\"");
                escape_attr(&attr.value, out);
                out.push('"');
            }
            out.push('>');
            if is_void_element(&name.to_ascii_lowercase()) {
                return;
            }
            write_children(dom, id, out);
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        NodeKind::Text(text) => escape_text(text, out),
        NodeKind::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
    }
}

fn write_children(dom: &Dom, id: NodeId, out: &mut String) {
    for &child in dom.children(id) {
        write_node(dom, child, out);
    }
}
