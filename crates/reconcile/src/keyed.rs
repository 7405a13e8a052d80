//! Key → live-node index.
//!
//! Contract:
//! - Built exactly once per reconciliation call by a full pre-order scan of
//!   the live root's descendants (the root itself is never indexed).
//! - An entry for key K exists iff the live node for K has not yet been
//!   claimed into its matched position.
//! - Owned exclusively by one reconciliation pass; never shared.

use crate::hooks::Hooks;
use dom::{Dom, NodeId};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct KeyedIndex {
    map: HashMap<String, NodeId>,
}

impl KeyedIndex {
    /// Scan `root`'s subtree and index every keyed descendant. With duplicate
    /// keys the last node in document order wins; that is an artifact of the
    /// forward scan, not a contract (callers should keep keys unambiguous).
    pub fn build<H: Hooks>(dom: &Dom, root: NodeId, hooks: &H) -> Self {
        let mut index = KeyedIndex::default();
        index.extend_over(dom, root, hooks);
        log::trace!(target: "reconcile.keyed", "indexed {} keyed node(s)", index.map.len());
        index
    }

    /// Index the descendants of `root` on top of the existing entries. Used
    /// when a hook substitutes a live subtree drawn from elsewhere, whose
    /// keyed descendants would otherwise be invisible.
    pub fn extend_over<H: Hooks>(&mut self, dom: &Dom, root: NodeId, hooks: &H) {
        for node in dom.descendants(root) {
            if let Some(key) = hooks.identity_key(dom, node) {
                self.map.insert(key, node);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<NodeId> {
        self.map.get(key).copied()
    }

    /// Read-and-delete: the node is now placed and must not be found again.
    pub fn claim(&mut self, key: &str) -> Option<NodeId> {
        self.map.remove(key)
    }

    pub fn remove(&mut self, key: &str) {
        self.map.remove(key);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::DefaultHooks;

    #[test]
    fn build_indexes_descendants_but_not_root() {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        dom.set_attr(root, "id", "root");
        let a = dom.create_element("span");
        dom.set_attr(a, "id", "a");
        let nested = dom.create_element("b");
        dom.set_attr(nested, "id", "n");
        dom.append(root, a);
        dom.append(a, nested);
        let index = KeyedIndex::build(&dom, root, &DefaultHooks);
        assert_eq!(index.get("root"), None, "root itself is never indexed");
        assert_eq!(index.get("a"), Some(a));
        assert_eq!(index.get("n"), Some(nested));
    }

    #[test]
    fn duplicate_keys_resolve_to_last_in_document_order() {
        // Pinned behavior, not a contract; see the `build` doc comment.
        let mut dom = Dom::new();
        let root = dom.create_element("ul");
        let first = dom.create_element("li");
        dom.set_attr(first, "id", "dup");
        let second = dom.create_element("li");
        dom.set_attr(second, "id", "dup");
        dom.append(root, first);
        dom.append(root, second);
        let index = KeyedIndex::build(&dom, root, &DefaultHooks);
        assert_eq!(index.get("dup"), Some(second));
    }

    #[test]
    fn claim_removes_the_entry() {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        let a = dom.create_element("span");
        dom.set_attr(a, "id", "a");
        dom.append(root, a);
        let mut index = KeyedIndex::build(&dom, root, &DefaultHooks);
        assert_eq!(index.claim("a"), Some(a));
        assert_eq!(index.get("a"), None);
    }
}
