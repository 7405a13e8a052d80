//! The reconciliation walk.
//!
//! Contract:
//! - Children are compared in target-declared order; a live child is never
//!   matched against more than one target child.
//! - Keyed live nodes are never discarded while they might still match: when
//!   passed over they are deferred, and only discarded at the end of the pass
//!   if the keyed index still holds them.
//! - Relocation prefers the "next sibling is already the match" short-circuit
//!   over an eager move, so a single removal next to a keyed node does not
//!   churn the tree.
//! - Hook verdicts are honored at every decision point; an abort affects only
//!   the node at hand, never siblings or ancestors.
//! - One pass, synchronous, no rollback: a panicking hook propagates and may
//!   leave the live tree partially updated.

use crate::attrs;
use crate::classify::{compatible_elements, same_name};
use crate::controls::{self, ControlKind};
use crate::hooks::{DefaultHooks, Hooks, Verdict};
use crate::keyed::KeyedIndex;
use dom::{Dom, NodeId, NodeType};
use markup::Materializer;

/// Desired end state: an already-built node, or markup to materialize.
#[derive(Clone, Copy, Debug)]
pub enum Target<'a> {
    Node(NodeId),
    Markup(&'a str),
}

impl From<NodeId> for Target<'_> {
    fn from(node: NodeId) -> Self {
        Target::Node(node)
    }
}

impl<'a> From<&'a str> for Target<'a> {
    fn from(markup: &'a str) -> Self {
        Target::Markup(markup)
    }
}

pub struct ReconcileOptions<H: Hooks = DefaultHooks> {
    pub hooks: H,
    /// Leave the root's own attributes and identity untouched; only
    /// descendants are reconciled.
    pub children_only: bool,
    pub materializer: Materializer,
}

impl Default for ReconcileOptions<DefaultHooks> {
    fn default() -> Self {
        ReconcileOptions::with_hooks(DefaultHooks)
    }
}

impl<H: Hooks> ReconcileOptions<H> {
    pub fn with_hooks(hooks: H) -> Self {
        ReconcileOptions {
            hooks,
            children_only: false,
            materializer: Materializer::new(),
        }
    }
}

/// Reconcile `live` against `target`, mutating the live tree in place.
/// Returns the node that now occupies the root position (the original root,
/// or its replacement after a root swap).
pub fn reconcile<'a, H: Hooks>(
    dom: &mut Dom,
    live: NodeId,
    target: impl Into<Target<'a>>,
    options: &mut ReconcileOptions<H>,
) -> NodeId {
    let target = target.into();

    let target_node = match target {
        Target::Node(node) => Some(node),
        Target::Markup(text) => coerce_markup_root(dom, live, text, &options.materializer),
    };
    let Some(mut target_node) = target_node else {
        log::warn!(
            target: "reconcile.engine",
            "target markup materialized to nothing; live tree left untouched"
        );
        return live;
    };

    // Fragments are never matched directly against elements; descend to the
    // intended root. A fragment-typed live root (a render container) keeps
    // the fragment target so sibling roots survive.
    if dom.node_type(target_node) == NodeType::Fragment
        && dom.node_type(live) != NodeType::Fragment
    {
        match dom.first_element_child(target_node) {
            Some(el) => target_node = el,
            None => return live,
        }
    }

    // A live document is represented by its document element.
    let mut live = live;
    if dom.node_type(live) == NodeType::Document {
        match dom.first_element_child(live) {
            Some(el) => live = el,
            None => {
                let node = match options.hooks.before_node_added(dom, target_node) {
                    Verdict::Abort => return live,
                    Verdict::Substitute(node) => node,
                    Verdict::Proceed => target_node,
                };
                options.hooks.append_child(dom, live, node);
                options.hooks.after_node_added(dom, node);
                return live;
            }
        }
    }

    if log::log_enabled!(target: "reconcile.engine", log::Level::Trace) {
        log::trace!(
            target: "reconcile.engine",
            "reconcile start:\n{}",
            dom::outline::outline(dom, live, 64).join("\n")
        );
    }

    let index = KeyedIndex::build(dom, live, &options.hooks);
    let mut pass = Pass {
        dom,
        hooks: &mut options.hooks,
        index,
        deferred: Vec::new(),
    };
    pass.run(live, target_node, options.children_only)
}

fn coerce_markup_root(
    dom: &mut Dom,
    live: NodeId,
    text: &str,
    materializer: &Materializer,
) -> Option<NodeId> {
    if dom.node_type(live) == NodeType::Document || dom.has_name(live, "html") {
        Some(materializer.materialize_document(dom, text).html)
    } else if dom.has_name(live, "body") {
        Some(materializer.materialize_document(dom, text).body)
    } else {
        materializer.materialize(dom, text)
    }
}

struct Pass<'a, H: Hooks> {
    dom: &'a mut Dom,
    hooks: &'a mut H,
    index: KeyedIndex,
    /// Keys passed over during the walk; resolved at the end of the pass.
    deferred: Vec<String>,
}

impl<H: Hooks> Pass<'_, H> {
    fn run(&mut self, live: NodeId, target: NodeId, children_only: bool) -> NodeId {
        let mut morphed = live;
        let mut took_target = false;

        if !children_only {
            match (self.dom.node_type(live), self.dom.node_type(target)) {
                (NodeType::Element, NodeType::Element) => {
                    let live_name = self.dom.name(live).expect("element has a name");
                    let target_name = self.dom.name(target).expect("element has a name");
                    if !same_name(live_name, target_name) {
                        log::trace!(
                            target: "reconcile.engine",
                            "root swap: <{live_name}> -> <{target_name}>"
                        );
                        let name = target_name.to_string();
                        let ns = self.dom.element_ns(target).map(str::to_string);
                        self.hooks.after_node_discarded(&*self.dom, live);
                        let fresh = self.dom.create_element_ns(&name, ns.as_deref());
                        self.dom.move_children(live, fresh);
                        morphed = fresh;
                    }
                }
                (NodeType::Element, _) => {
                    morphed = target;
                    took_target = true;
                }
                (NodeType::Text, NodeType::Text) | (NodeType::Comment, NodeType::Comment) => {
                    let value = self
                        .dom
                        .value(target)
                        .expect("leaf node has a value")
                        .to_string();
                    self.dom.set_value(live, &value);
                    return live;
                }
                (NodeType::Text | NodeType::Comment, _) => {
                    morphed = target;
                    took_target = true;
                }
                _ => {}
            }
        }

        if took_target {
            // The live root was incompatible beyond a name swap; the target
            // replaces it wholesale.
            self.hooks.after_node_discarded(&*self.dom, live);
        } else {
            if morphed == target {
                // A substitution hook handed back the target itself; there is
                // nothing left to converge.
                return morphed;
            }
            self.morph_element(morphed, target, children_only);
            self.resolve_keyed_removals();
        }

        if !children_only && morphed != live && self.dom.parent(live).is_some() {
            self.dom.replace(live, morphed);
        }
        morphed
    }

    fn key_of(&self, node: NodeId) -> Option<String> {
        self.hooks.identity_key(&*self.dom, node)
    }

    fn morph_element(&mut self, live: NodeId, target: NodeId, children_only: bool) {
        let mut live = live;
        if let Some(key) = self.key_of(target) {
            // The target claims this key; the live node under it is placed.
            self.index.remove(&key);
        }

        if !children_only {
            match self.hooks.before_element_updated(&*self.dom, live, target) {
                Verdict::Abort => return,
                Verdict::Substitute(node) => {
                    live = node;
                    // The substituted subtree may carry keyed nodes the index
                    // has never seen.
                    self.index.extend_over(&*self.dom, live, &*self.hooks);
                }
                Verdict::Proceed => {}
            }
            attrs::sync(self.dom, live, target);
            self.hooks.after_element_updated(&*self.dom, live);
            if !self.hooks.before_children_updated(&*self.dom, live, target) {
                return;
            }
        }

        // A multiline text control keeps its single text child in sync
        // through the control handler, not the generic child walk.
        if ControlKind::of_node(self.dom, live) == Some(ControlKind::Textarea) {
            controls::sync(self.dom, ControlKind::Textarea, live, target);
        } else {
            self.morph_children(live, target);
        }
    }

    fn morph_children(&mut self, live_el: NodeId, target_el: NodeId) {
        let skip_live = self.hooks.skip_live_children(&*self.dom, live_el, target_el);
        let mut cur_to = self.dom.first_child(target_el);
        let mut cur_from = if skip_live {
            None
        } else {
            self.dom.first_child(live_el)
        };

        'outer: while let Some(to_child) = cur_to {
            // Captured before any adoption can detach it from the target.
            let to_next = self.dom.next_sibling(to_child);
            let to_key = self.key_of(to_child);

            while let Some(scan) = cur_from {
                let from_next = self.dom.next_sibling(scan);

                if to_child == scan {
                    // The same arena node sits on both sides (it was adopted
                    // into the live tree earlier); keep it.
                    cur_to = to_next;
                    cur_from = from_next;
                    continue 'outer;
                }

                let mut from_child = scan;
                let mut from_key = self.key_of(from_child);
                let mut compatible: Option<bool> = None;

                if self.dom.node_type(from_child) == self.dom.node_type(to_child) {
                    match self.dom.node_type(from_child) {
                        NodeType::Element => {
                            if let Some(to_key) = &to_key {
                                if from_key.as_deref() != Some(to_key.as_str()) {
                                    if let Some(matching) = self.index.get(to_key) {
                                        if from_next == Some(matching) {
                                            // The next sibling is already the
                                            // match; dropping the scan pointer
                                            // is cheaper than moving.
                                            compatible = Some(false);
                                        } else {
                                            log::trace!(
                                                target: "reconcile.engine",
                                                "relocating keyed node {to_key}"
                                            );
                                            self.dom.insert_before(live_el, matching, from_child);
                                            match from_key {
                                                Some(key) => self.deferred.push(key),
                                                None => self.remove_node(from_child, true),
                                            }
                                            from_child = matching;
                                            from_key = self.key_of(from_child);
                                        }
                                    } else {
                                        compatible = Some(false);
                                    }
                                }
                            } else if from_key.is_some() {
                                compatible = Some(false);
                            }

                            let is_match = compatible != Some(false)
                                && compatible_elements(self.dom, from_child, to_child);
                            compatible = Some(is_match);
                            if is_match {
                                self.morph_element(from_child, to_child, false);
                            }
                        }
                        NodeType::Text | NodeType::Comment => {
                            compatible = Some(true);
                            let value = self
                                .dom
                                .value(to_child)
                                .expect("leaf node has a value")
                                .to_string();
                            self.dom.set_value(from_child, &value);
                        }
                        _ => {}
                    }
                }

                if compatible == Some(true) {
                    cur_to = to_next;
                    cur_from = from_next;
                    continue 'outer;
                }

                // Incompatible scan pointer: defer keyed nodes (they may yet
                // match through the index), discard the rest, keep scanning.
                match from_key {
                    Some(key) => self.deferred.push(key),
                    None => self.remove_node(from_child, true),
                }
                cur_from = from_next;
            }

            // No live child matched. Pull the keyed twin from elsewhere in
            // the tree, or insert the target child as a new node.
            let relocated = to_key
                .as_ref()
                .and_then(|key| self.index.get(key))
                .filter(|&m| compatible_elements(self.dom, m, to_child));
            match relocated {
                Some(matching) => {
                    if !skip_live {
                        self.hooks.append_child(self.dom, live_el, matching);
                    }
                    self.morph_element(matching, to_child, false);
                }
                None => match self.hooks.before_node_added(&*self.dom, to_child) {
                    Verdict::Abort => {}
                    verdict => {
                        let node = match verdict {
                            Verdict::Substitute(node) => node,
                            _ => to_child,
                        };
                        self.hooks.append_child(self.dom, live_el, node);
                        self.handle_node_added(node);
                    }
                },
            }

            cur_to = to_next;
        }

        self.cleanup_remaining(cur_from);

        if let Some(kind) = ControlKind::of_node(self.dom, live_el) {
            controls::sync(self.dom, kind, live_el, target_el);
        }
    }

    /// A freshly attached subtree may still contain keyed descendants with a
    /// live twin; those are morphed in place of their target copies instead
    /// of being treated as brand new.
    fn handle_node_added(&mut self, node: NodeId) {
        self.hooks.after_node_added(&*self.dom, node);
        let children: Vec<NodeId> = self.dom.children(node).to_vec();
        for child in children {
            if let Some(key) = self.key_of(child)
                && let Some(unmatched) = self.index.get(&key)
                && compatible_elements(self.dom, child, unmatched)
            {
                self.dom.replace(child, unmatched);
                self.morph_element(unmatched, child, false);
                continue;
            }
            self.handle_node_added(child);
        }
    }

    /// Sweep live children left over after the target's children ran out.
    fn cleanup_remaining(&mut self, mut cur_from: Option<NodeId>) {
        while let Some(node) = cur_from {
            let next = self.dom.next_sibling(node);
            match self.key_of(node) {
                Some(key) => self.deferred.push(key),
                None => self.remove_node(node, true),
            }
            cur_from = next;
        }
    }

    fn remove_node(&mut self, node: NodeId, skip_keyed: bool) {
        if !self.hooks.before_node_discarded(&*self.dom, node) {
            return;
        }
        self.dom.detach(node);
        self.hooks.after_node_discarded(&*self.dom, node);
        self.walk_discarded(node, skip_keyed);
    }

    /// Report the descendants of a discarded node, deferring keyed ones: they
    /// may still be claimed through the index later in the pass.
    fn walk_discarded(&mut self, node: NodeId, skip_keyed: bool) {
        if self.dom.node_type(node) != NodeType::Element {
            return;
        }
        let children: Vec<NodeId> = self.dom.children(node).to_vec();
        for child in children {
            if skip_keyed && let Some(key) = self.key_of(child) {
                self.deferred.push(key);
                continue;
            }
            self.hooks.after_node_discarded(&*self.dom, child);
            if self.dom.first_child(child).is_some() {
                self.walk_discarded(child, skip_keyed);
            }
        }
    }

    /// Any deferred key still present in the index was never matched; its
    /// node is discarded from wherever it currently sits.
    fn resolve_keyed_removals(&mut self) {
        let deferred = std::mem::take(&mut self.deferred);
        for key in deferred {
            if let Some(node) = self.index.claim(&key) {
                self.remove_node(node, false);
            }
        }
    }
}
