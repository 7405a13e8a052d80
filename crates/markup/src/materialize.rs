//! Markup string → in-memory tree.
//!
//! Contract:
//! - Input is trimmed first; whitespace-only input materializes nothing.
//! - The result is a fragment node; the intended root is its first child.
//! - Strategy selection happens once, at `Materializer` construction, from an
//!   ordered fallback list. No capability probing happens during parsing.
//! - All strategies produce equivalent trees for well-formed markup whose
//!   top-level elements are valid in flow content. Only `Template` preserves
//!   fragments rooted at table-structure elements (`<tr>`, `<td>`, …); the
//!   anchored strategies unwrap those the way a host body-context parser
//!   would.

use crate::tokenizer::{Token, tokenize};
use dom::{Dom, NodeId, NodeKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Inert template parsing: no containment rules, any fragment root.
    Template,
    /// Contextual parsing anchored at a document body.
    BodyContext,
    /// Throwaway wrapper element assignment; children are detached from the
    /// wrapper afterwards.
    WrapperElement,
}

impl Strategy {
    pub const DEFAULT_ORDER: [Strategy; 3] = [
        Strategy::Template,
        Strategy::BodyContext,
        Strategy::WrapperElement,
    ];
}

#[derive(Clone, Copy, Debug)]
enum Containment {
    Unrestricted,
    BodyAnchored,
}

/// Roots of a full-document materialization (see the engine's root-coercion
/// paths).
#[derive(Clone, Copy, Debug)]
pub struct DocumentParts {
    pub document: NodeId,
    pub html: NodeId,
    pub body: NodeId,
}

#[derive(Clone, Copy, Debug)]
pub struct Materializer {
    strategy: Strategy,
}

impl Materializer {
    /// Select the first available strategy from the default fallback order.
    pub fn new() -> Self {
        Materializer::with_fallback(&Strategy::DEFAULT_ORDER, |_| true)
            .expect("default strategy order is non-empty")
    }

    /// Select the first strategy in `order` for which `available` holds.
    /// Hosts with partial support inject their own probe here.
    pub fn with_fallback(
        order: &[Strategy],
        available: impl Fn(Strategy) -> bool,
    ) -> Option<Materializer> {
        let strategy = order.iter().copied().find(|&s| available(s))?;
        log::debug!(target: "markup.materialize", "selected strategy {strategy:?}");
        Some(Materializer { strategy })
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Materialize `markup` into a fragment node. `None` when the trimmed
    /// input produces no nodes; callers treat that as "no children".
    pub fn materialize(&self, dom: &mut Dom, markup: &str) -> Option<NodeId> {
        let markup = markup.trim();
        if markup.is_empty() {
            return None;
        }
        let tokens = tokenize(markup);
        let fragment = dom.create_fragment();
        match self.strategy {
            Strategy::Template => {
                build_into(dom, fragment, &tokens, Containment::Unrestricted);
            }
            Strategy::BodyContext => {
                build_into(dom, fragment, &tokens, Containment::BodyAnchored);
            }
            Strategy::WrapperElement => {
                let wrapper = dom.create_element("div");
                build_into(dom, wrapper, &tokens, Containment::BodyAnchored);
                dom.move_children(wrapper, fragment);
            }
        }
        if dom.children(fragment).is_empty() {
            return None;
        }
        log::trace!(
            target: "markup.materialize",
            "materialized {} top-level node(s)",
            dom.children(fragment).len()
        );
        Some(fragment)
    }

    /// Materialize `markup` as a full document, scaffolding the `html` and
    /// `body` elements when the markup does not carry them itself.
    pub fn materialize_document(&self, dom: &mut Dom, markup: &str) -> DocumentParts {
        let document = dom.create_document(None);
        build_into(dom, document, &tokenize(markup.trim()), Containment::Unrestricted);

        let html = match dom
            .children(document)
            .iter()
            .copied()
            .find(|&c| dom.has_name(c, "html"))
        {
            Some(html) => html,
            None => {
                let html = dom.create_element("html");
                dom.move_children(document, html);
                dom.append(document, html);
                html
            }
        };

        let body = match dom
            .children(html)
            .iter()
            .copied()
            .find(|&c| dom.has_name(c, "body"))
        {
            Some(body) => body,
            None => {
                let body = dom.create_element("body");
                let content: Vec<NodeId> = dom
                    .children(html)
                    .iter()
                    .copied()
                    .filter(|&c| !dom.has_name(c, "head"))
                    .collect();
                for child in content {
                    dom.append(body, child);
                }
                dom.append(html, body);
                body
            }
        };

        DocumentParts {
            document,
            html,
            body,
        }
    }
}

impl Default for Materializer {
    fn default() -> Self {
        Materializer::new()
    }
}

/// Ancestor names required for table-structure elements under anchored
/// containment. Elements missing their context are unwrapped in place.
fn required_ancestors(name: &str) -> Option<&'static [&'static str]> {
    match name {
        "tr" => Some(&["table", "thead", "tbody", "tfoot"]),
        "td" | "th" => Some(&["tr"]),
        "thead" | "tbody" | "tfoot" | "caption" | "colgroup" => Some(&["table"]),
        "col" => Some(&["colgroup", "table"]),
        _ => None,
    }
}

fn build_into(dom: &mut Dom, parent: NodeId, tokens: &[Token], containment: Containment) {
    // Open-element stack; `parent` itself is never popped.
    let mut open: Vec<NodeId> = Vec::new();

    let current = |open: &[NodeId]| open.last().copied().unwrap_or(parent);

    for token in tokens {
        match token {
            Token::Doctype(value) => {
                if matches!(dom.kind(parent), NodeKind::Document { .. }) {
                    dom.set_doctype(parent, value);
                }
            }
            Token::Comment(text) => {
                let node = dom.create_comment(text);
                dom.append(current(&open), node);
            }
            Token::Text(text) => {
                if !text.is_empty() {
                    let node = dom.create_text(text);
                    dom.append(current(&open), node);
                }
            }
            Token::StartTag {
                name,
                attrs,
                self_closing,
            } => {
                if matches!(containment, Containment::BodyAnchored)
                    && let Some(required) = required_ancestors(name)
                    && !open
                        .iter()
                        .any(|&el| required.iter().any(|r| dom.has_name(el, r)))
                {
                    // Unwrap: children keep flowing into the current parent.
                    log::trace!(
                        target: "markup.materialize",
                        "unwrapped <{name}> outside its required context"
                    );
                    continue;
                }
                let el = dom.create_element(name);
                for (attr_name, value) in attrs {
                    dom.set_attr(el, attr_name, value.as_deref().unwrap_or(""));
                }
                dom.append(current(&open), el);
                if !self_closing {
                    open.push(el);
                }
            }
            Token::EndTag(name) => {
                // Only pop when the name is actually open; end tags of
                // unwrapped or stray elements must not close their parents.
                if open.iter().any(|&el| dom.has_name(el, name)) {
                    while let Some(el) = open.pop() {
                        if dom.has_name(el, name) {
                            break;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::to_markup;

    fn materialized(strategy: Strategy, markup: &str) -> (Dom, Option<NodeId>) {
        let mut dom = Dom::new();
        let m = Materializer::with_fallback(&[strategy], |_| true).unwrap();
        let fragment = m.materialize(&mut dom, markup);
        (dom, fragment)
    }

    #[test]
    fn whitespace_only_input_materializes_nothing() {
        let (_, fragment) = materialized(Strategy::Template, "  \n\t ");
        assert!(fragment.is_none());
    }

    #[test]
    fn first_child_of_fragment_is_the_intended_root() {
        let (dom, fragment) = materialized(Strategy::Template, "<div id=\"a\"><p>x</p></div>");
        let fragment = fragment.unwrap();
        let root = dom.first_child(fragment).unwrap();
        assert_eq!(dom.name(root), Some("div"));
        assert_eq!(dom.attr(root, "id"), Some("a"));
    }

    #[test]
    fn strategies_agree_on_flow_content() {
        let markup = "<ul><li>a</li><li>b</li></ul><p>tail</p>";
        let mut rendered = Vec::new();
        for strategy in Strategy::DEFAULT_ORDER {
            let (dom, fragment) = materialized(strategy, markup);
            rendered.push(to_markup(&dom, fragment.unwrap()));
        }
        assert_eq!(rendered[0], rendered[1]);
        assert_eq!(rendered[1], rendered[2]);
    }

    #[test]
    fn template_strategy_preserves_table_row_fragments() {
        let (dom, fragment) = materialized(Strategy::Template, "<tr><td>cell</td></tr>");
        let fragment = fragment.unwrap();
        let row = dom.first_child(fragment).unwrap();
        assert_eq!(dom.name(row), Some("tr"));
        assert_eq!(dom.children(row).len(), 1);
    }

    #[test]
    fn anchored_strategies_unwrap_contextless_table_rows() {
        for strategy in [Strategy::BodyContext, Strategy::WrapperElement] {
            let (dom, fragment) = materialized(strategy, "<tr><td>cell</td></tr>");
            let fragment = fragment.unwrap();
            let first = dom.first_child(fragment).unwrap();
            assert_eq!(
                dom.value(first),
                Some("cell"),
                "expected row and cell to unwrap to their text under {strategy:?}"
            );
        }
    }

    #[test]
    fn table_parts_survive_inside_a_table() {
        let (dom, fragment) =
            materialized(Strategy::BodyContext, "<table><tr><td>x</td></tr></table>");
        let table = dom.first_child(fragment.unwrap()).unwrap();
        assert_eq!(dom.name(table), Some("table"));
        let row = dom.first_element_child(table).unwrap();
        assert_eq!(dom.name(row), Some("tr"));
    }

    #[test]
    fn stray_end_tags_do_not_close_ancestors() {
        let (dom, fragment) = materialized(Strategy::Template, "<div></span><p>x</p></div>");
        let div = dom.first_child(fragment.unwrap()).unwrap();
        assert_eq!(dom.children(div).len(), 1, "p must stay inside div");
    }

    #[test]
    fn document_materialization_scaffolds_html_and_body() {
        let mut dom = Dom::new();
        let parts = Materializer::new().materialize_document(&mut dom, "<p>hi</p>");
        assert_eq!(dom.name(parts.html), Some("html"));
        assert_eq!(dom.name(parts.body), Some("body"));
        let p = dom.first_element_child(parts.body).unwrap();
        assert_eq!(dom.name(p), Some("p"));
        assert_eq!(dom.parent(parts.html), Some(parts.document));
    }

    #[test]
    fn document_materialization_adopts_existing_scaffold() {
        let mut dom = Dom::new();
        let parts = Materializer::new()
            .materialize_document(&mut dom, "<html><head></head><body><p>x</p></body></html>");
        assert_eq!(dom.name(parts.body), Some("body"));
        assert_eq!(dom.children(parts.html).len(), 2);
    }
}
