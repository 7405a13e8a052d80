use crate::node::{NodeId, NodeKind};
use crate::tree::Dom;

const PREVIEW_CHARS: usize = 40;

fn push_preview(out: &mut String, s: &str) {
    let mut truncated = false;
    for (i, ch) in s.chars().enumerate() {
        if i == PREVIEW_CHARS {
            truncated = true;
            break;
        }
        out.push(if ch == '\n' { ' ' } else { ch });
    }
    if truncated {
        out.push('…');
    }
}

/// One indented line per node, capped at `cap` lines. Used by trace logging
/// and by test failure output.
pub fn outline(dom: &Dom, root: NodeId, cap: usize) -> Vec<String> {
    fn walk(dom: &Dom, id: NodeId, depth: usize, out: &mut Vec<String>, left: &mut usize) {
        if *left == 0 {
            return;
        }
        *left -= 1;
        let indent = "  ".repeat(depth);
        match dom.kind(id) {
            NodeKind::Document { doctype } => {
                match doctype {
                    Some(dt) => out.push(format!("{indent}<!DOCTYPE {dt}>")),
                    None => out.push(format!("{indent}#document")),
                }
            }
            NodeKind::Element { name, attrs, .. } => {
                let mut line = format!("{indent}<{name}");
                for attr in attrs {
                    line.push(' ');
                    line.push_str(&attr.name);
                    line.push_str("=\"");
                    push_preview(&mut line, &attr.value);
                    line.push('"');
                }
                line.push('>');
                out.push(line);
            }
            NodeKind::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    let mut line = format!("{indent}\"");
                    push_preview(&mut line, trimmed);
                    line.push('"');
                    out.push(line);
                }
            }
            NodeKind::Comment(text) => {
                let mut line = format!("{indent}<!-- ");
                push_preview(&mut line, text);
                line.push_str(" -->");
                out.push(line);
            }
            NodeKind::Fragment => out.push(format!("{indent}#fragment")),
        }
        for &child in dom.children(id) {
            walk(dom, child, depth + 1, out, left);
        }
    }

    let mut out = Vec::new();
    let mut left = cap;
    walk(dom, root, 0, &mut out, &mut left);
    out
}
