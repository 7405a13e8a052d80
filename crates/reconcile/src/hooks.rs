//! Caller extension points.
//!
//! Every hook has a no-op default, so `DefaultHooks` runs the engine with
//! plain semantics. Hooks that can redirect the engine return a [`Verdict`];
//! only an explicit `Abort` (or `false`, for the boolean hooks) stops work —
//! there is no falsy middle ground.

use dom::{Dom, NodeId};

/// Outcome of a redirecting hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Continue with the engine's own plan.
    Proceed,
    /// Skip the remaining steps for this node; siblings are unaffected.
    Abort,
    /// Continue, but operate on this node instead.
    Substitute(NodeId),
}

pub trait Hooks {
    /// Stable identity of a node, used for keyed matching. Blank keys count
    /// as absent.
    fn identity_key(&self, dom: &Dom, node: NodeId) -> Option<String> {
        default_identity_key(dom, node)
    }

    /// Runs before a target node is attached into the live tree. `Substitute`
    /// attaches the returned node instead.
    fn before_node_added(&mut self, _dom: &Dom, _candidate: NodeId) -> Verdict {
        Verdict::Proceed
    }

    fn after_node_added(&mut self, _dom: &Dom, _node: NodeId) {}

    /// Runs before a live element is updated in place. `Substitute` morphs the
    /// returned node instead (the keyed index is extended over its subtree).
    fn before_element_updated(&mut self, _dom: &Dom, _live: NodeId, _target: NodeId) -> Verdict {
        Verdict::Proceed
    }

    fn after_element_updated(&mut self, _dom: &Dom, _live: NodeId) {}

    /// Runs before a live node is detached. Returning `false` retains the
    /// node; its children are not walked for discard reporting.
    fn before_node_discarded(&mut self, _dom: &Dom, _node: NodeId) -> bool {
        true
    }

    fn after_node_discarded(&mut self, _dom: &Dom, _node: NodeId) {}

    /// Runs after attributes are synced, before the children walk. `false`
    /// leaves the children untouched (attributes are already applied).
    fn before_children_updated(&mut self, _dom: &Dom, _live: NodeId, _target: NodeId) -> bool {
        true
    }

    /// Decided once per element before its children walk: `true` suppresses
    /// matching against existing live children, so every target child is
    /// freshly inserted.
    fn skip_live_children(&mut self, _dom: &Dom, _live: NodeId, _target: NodeId) -> bool {
        false
    }

    /// Controls how a child is attached. The default is a plain append;
    /// virtualizing callers can divert attachment here.
    fn append_child(&mut self, dom: &mut Dom, parent: NodeId, child: NodeId) {
        dom.append(parent, child);
    }
}

/// The `id`-attribute extractor used when no override is installed.
pub fn default_identity_key(dom: &Dom, node: NodeId) -> Option<String> {
    dom.attr(node, "id")
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Runs the engine with default semantics everywhere.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultHooks;

impl Hooks for DefaultHooks {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_identity_key_ignores_blank_ids() {
        let mut dom = Dom::new();
        let el = dom.create_element("div");
        assert_eq!(default_identity_key(&dom, el), None);
        dom.set_attr(el, "id", "");
        assert_eq!(default_identity_key(&dom, el), None);
        dom.set_attr(el, "id", "a");
        assert_eq!(default_identity_key(&dom, el), Some("a".to_string()));
    }
}
