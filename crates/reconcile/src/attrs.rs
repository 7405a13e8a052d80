//! Attribute convergence.
//!
//! Contract:
//! - After `sync`, the live element's attribute set equals the target's:
//!   same names, namespaces, and values.
//! - An attribute whose value already matches is never written, so mutation
//!   observers stay quiet and attribute-echoed live state is not clobbered.
//! - Namespaced attributes compare by (namespace, local name); attributes in
//!   the `xmlns` reservation are written under their full qualified name,
//!   since hosts reject unqualified writes in that namespace.
//! - Fragment- and document-typed nodes short-circuit: they carry no
//!   attributes.

use dom::{Attr, Dom, NodeId, NodeType, XMLNS_NAMESPACE};

pub fn sync(dom: &mut Dom, live: NodeId, target: NodeId) {
    if dom.node_type(live) != NodeType::Element || dom.node_type(target) != NodeType::Element {
        return;
    }

    // Additions and changes, target-first.
    let target_attrs: Vec<Attr> = dom.attrs(target).to_vec();
    for attr in &target_attrs {
        match attr.ns.as_deref() {
            Some(ns) => {
                let local = attr.local_name();
                if dom.attr_ns(live, ns, local) != Some(attr.value.as_str()) {
                    // The xmlns reservation only accepts fully qualified
                    // writes.
                    let write_name = if ns == XMLNS_NAMESPACE {
                        attr.name.as_str()
                    } else {
                        local
                    };
                    dom.set_attr_ns(live, ns, write_name, &attr.value);
                }
            }
            None => {
                if dom.attr(live, &attr.name) != Some(attr.value.as_str()) {
                    dom.set_attr(live, &attr.name, &attr.value);
                }
            }
        }
    }

    // Removals: anything on live that the target does not carry.
    let live_attrs: Vec<(Option<String>, String)> = dom
        .attrs(live)
        .iter()
        .map(|a| (a.ns.clone(), a.name.clone()))
        .collect();
    for (ns, name) in live_attrs {
        match ns.as_deref() {
            Some(ns) => {
                let local = match name.split_once(':') {
                    Some((_, local)) => local,
                    None => name.as_str(),
                };
                if !dom.has_attr_ns(target, ns, local) {
                    dom.remove_attr_ns(live, ns, local);
                }
            }
            None => {
                if !dom.has_attr(target, &name) {
                    dom.remove_attr(live, &name);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element_with(dom: &mut Dom, attrs: &[(&str, &str)]) -> NodeId {
        let el = dom.create_element("div");
        for (name, value) in attrs {
            dom.set_attr(el, name, value);
        }
        el
    }

    #[test]
    fn sync_adds_changes_and_removes() {
        let mut dom = Dom::new();
        let live = element_with(&mut dom, &[("a", "1"), ("b", "2"), ("stale", "x")]);
        let target = element_with(&mut dom, &[("a", "1"), ("b", "changed"), ("new", "y")]);
        sync(&mut dom, live, target);
        assert_eq!(dom.attr(live, "a"), Some("1"));
        assert_eq!(dom.attr(live, "b"), Some("changed"));
        assert_eq!(dom.attr(live, "new"), Some("y"));
        assert_eq!(dom.attr(live, "stale"), None);
    }

    #[test]
    fn equal_values_are_never_written() {
        let mut dom = Dom::new();
        let live = element_with(&mut dom, &[("a", "1"), ("b", "2")]);
        let target = element_with(&mut dom, &[("a", "1"), ("b", "2")]);
        let before = dom.mutations();
        sync(&mut dom, live, target);
        assert_eq!(
            dom.mutations(),
            before,
            "expected a converged attribute set to produce zero writes"
        );
    }

    #[test]
    fn namespaced_attributes_sync_by_local_name() {
        let ns = "http://www.w3.org/1999/xlink";
        let mut dom = Dom::new();
        let live = dom.create_element("use");
        dom.set_attr_ns(live, ns, "xlink:href", "#old");
        let target = dom.create_element("use");
        dom.set_attr_ns(target, ns, "xlink:href", "#new");
        sync(&mut dom, live, target);
        assert_eq!(dom.attr_ns(live, ns, "href"), Some("#new"));
    }

    #[test]
    fn xmlns_attributes_are_written_fully_qualified() {
        let mut dom = Dom::new();
        let live = dom.create_element("svg");
        let target = dom.create_element("svg");
        dom.set_attr_ns(
            target,
            XMLNS_NAMESPACE,
            "xmlns:xlink",
            "http://www.w3.org/1999/xlink",
        );
        sync(&mut dom, live, target);
        let attr = &dom.attrs(live)[0];
        assert_eq!(attr.name, "xmlns:xlink", "qualified name must be preserved");
        assert_eq!(attr.ns.as_deref(), Some(XMLNS_NAMESPACE));
    }

    #[test]
    fn plain_and_namespaced_attributes_do_not_collide() {
        let ns = "http://www.w3.org/1999/xlink";
        let mut dom = Dom::new();
        let live = dom.create_element("use");
        dom.set_attr(live, "href", "plain");
        let target = dom.create_element("use");
        dom.set_attr(target, "href", "plain");
        dom.set_attr_ns(target, ns, "xlink:href", "spaced");
        sync(&mut dom, live, target);
        assert_eq!(dom.attr(live, "href"), Some("plain"));
        assert_eq!(dom.attr_ns(live, ns, "href"), Some("spaced"));
    }

    #[test]
    fn fragments_are_a_no_op() {
        let mut dom = Dom::new();
        let live = dom.create_fragment();
        let target = dom.create_element("div");
        dom.set_attr(target, "a", "1");
        let before = dom.mutations();
        sync(&mut dom, live, target);
        assert_eq!(dom.mutations(), before);
    }
}
