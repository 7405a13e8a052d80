//! Arena-backed mutable tree.
//!
//! Contract:
//! - The arena owns every node of every tree built inside it; `NodeId` is the
//!   only handle and stays valid for the arena's lifetime.
//! - Detaching a node leaves its subtree intact and re-attachable; slots are
//!   never reclaimed mid-flight.
//! - Structural and attribute writes bump a mutation counter; reads and
//!   writes that would not change anything do not.
//! - A node has at most one parent; attach operations re-home the child
//!   first, so cycles cannot be formed through the public API.

use crate::node::{Attr, FormState, NodeId, NodeKind, NodeType};

#[derive(Debug)]
struct Slot {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Default)]
pub struct Dom {
    slots: Vec<Slot>,
    mutations: u64,
}

impl Dom {
    pub fn new() -> Self {
        Dom::default()
    }

    /// Count of structural/attribute/value writes performed so far. Tests use
    /// this to assert that converged trees are not touched again.
    pub fn mutations(&self) -> u64 {
        self.mutations
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(u32::try_from(self.slots.len()).expect("dom arena exhausted"));
        self.slots.push(Slot {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn slot(&self, id: NodeId) -> &Slot {
        &self.slots[id.0 as usize]
    }

    fn slot_mut(&mut self, id: NodeId) -> &mut Slot {
        &mut self.slots[id.0 as usize]
    }

    /* node construction */

    pub fn create_document(&mut self, doctype: Option<String>) -> NodeId {
        self.push(NodeKind::Document { doctype })
    }

    pub fn set_doctype(&mut self, id: NodeId, value: &str) {
        match &mut self.slots[id.0 as usize].kind {
            NodeKind::Document { doctype } => {
                *doctype = Some(value.to_string());
                self.mutations += 1;
            }
            other => unreachable!("doctype on non-document node {other:?}"),
        }
    }

    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(NodeKind::Element {
            name: name.to_string(),
            ns: None,
            attrs: Vec::new(),
            form: FormState::default(),
        })
    }

    pub fn create_element_ns(&mut self, name: &str, ns: Option<&str>) -> NodeId {
        self.push(NodeKind::Element {
            name: name.to_string(),
            ns: ns.map(str::to_string),
            attrs: Vec::new(),
            form: FormState::default(),
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Comment(text.to_string()))
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.push(NodeKind::Fragment)
    }

    /* inspection */

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.slot(id).kind
    }

    pub fn node_type(&self, id: NodeId) -> NodeType {
        self.slot(id).kind.node_type()
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.node_type(id) == NodeType::Element
    }

    /// Element name, or `None` for non-elements.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match &self.slot(id).kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Element namespace URI, or `None` for non-elements and null-namespace
    /// elements.
    pub fn element_ns(&self, id: NodeId) -> Option<&str> {
        match &self.slot(id).kind {
            NodeKind::Element { ns, .. } => ns.as_deref(),
            _ => None,
        }
    }

    pub fn has_name(&self, id: NodeId, name: &str) -> bool {
        self.name(id).is_some_and(|n| n.eq_ignore_ascii_case(name))
    }

    /// Raw value of a text or comment node.
    pub fn value(&self, id: NodeId) -> Option<&str> {
        match &self.slot(id).kind {
            NodeKind::Text(text) | NodeKind::Comment(text) => Some(text),
            _ => None,
        }
    }

    pub fn set_value(&mut self, id: NodeId, value: &str) {
        match &mut self.slots[id.0 as usize].kind {
            NodeKind::Text(text) | NodeKind::Comment(text) => {
                if text != value {
                    *text = value.to_string();
                    self.mutations += 1;
                }
            }
            other => unreachable!("set_value on non-leaf node {other:?}"),
        }
    }

    /* structure */

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.slot(id).children
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).children.first().copied()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.slot(id).parent?;
        let siblings = &self.slot(parent).children;
        let pos = siblings.iter().position(|&c| c == id)?;
        siblings.get(pos + 1).copied()
    }

    /// First child that is an element, skipping leading text/comments.
    pub fn first_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id)
            .children
            .iter()
            .copied()
            .find(|&c| self.is_element(c))
    }

    /// Whether `node` sits on `of`'s parent chain.
    fn is_ancestor(&self, node: NodeId, of: NodeId) -> bool {
        let mut cursor = self.slot(of).parent;
        while let Some(current) = cursor {
            if current == node {
                return true;
            }
            cursor = self.slot(current).parent;
        }
        false
    }

    /// Unlink `child` from its parent without counting a mutation; the move
    /// primitives below fold this into a single counted operation.
    fn unlink(&mut self, child: NodeId) {
        let Some(parent) = self.slot(child).parent else {
            return;
        };
        self.slot_mut(parent).children.retain(|&c| c != child);
        self.slot_mut(child).parent = None;
    }

    /// Detach `child` from its parent, if any. The subtree stays alive.
    pub fn detach(&mut self, child: NodeId) {
        if self.slot(child).parent.is_some() {
            self.unlink(child);
            self.mutations += 1;
        }
    }

    /// Append `child` as the last child of `parent`, detaching it from its
    /// previous parent first. Already being the last child is a no-op: a node
    /// is never touched more than necessary.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(parent != child, "node cannot adopt itself");
        debug_assert!(
            self.slot(parent).kind.is_container(),
            "append target cannot have children"
        );
        if self.slot(child).parent == Some(parent)
            && self.slot(parent).children.last() == Some(&child)
        {
            return;
        }
        debug_assert!(
            !self.is_ancestor(child, parent),
            "attaching a node under its own descendant would form a cycle"
        );
        self.unlink(child);
        self.slot_mut(parent).children.push(child);
        self.slot_mut(child).parent = Some(parent);
        self.mutations += 1;
    }

    /// Insert `child` into `parent` immediately before `reference`, which
    /// must be a current child of `parent`. Already sitting directly before
    /// `reference` is a no-op.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        debug_assert!(parent != child, "node cannot adopt itself");
        debug_assert!(
            !self.is_ancestor(child, parent),
            "attaching a node under its own descendant would form a cycle"
        );
        if self.slot(child).parent == Some(parent) {
            let children = &self.slot(parent).children;
            let at = children.iter().position(|&c| c == child);
            let ref_at = children.iter().position(|&c| c == reference);
            if let (Some(at), Some(ref_at)) = (at, ref_at)
                && at + 1 == ref_at
            {
                return;
            }
        }
        self.unlink(child);
        let pos = self
            .slot(parent)
            .children
            .iter()
            .position(|&c| c == reference)
            .expect("insert_before reference is not a child of parent");
        self.slot_mut(parent).children.insert(pos, child);
        self.slot_mut(child).parent = Some(parent);
        self.mutations += 1;
    }

    /// Replace `old` with `new` in `old`'s parent. No-op when `old` has no
    /// parent.
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        let Some(parent) = self.slot(old).parent else {
            return;
        };
        self.unlink(new);
        let pos = self
            .slot(parent)
            .children
            .iter()
            .position(|&c| c == old)
            .expect("replace target lost its parent link");
        self.slot_mut(parent).children[pos] = new;
        self.slot_mut(new).parent = Some(parent);
        self.slot_mut(old).parent = None;
        self.mutations += 1;
    }

    /// Move every child of `from` onto the end of `to`, preserving order.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        let children = std::mem::take(&mut self.slot_mut(from).children);
        for &child in &children {
            self.slot_mut(child).parent = Some(to);
        }
        self.slot_mut(to).children.extend(children.iter().copied());
        if !children.is_empty() {
            self.mutations += 1;
        }
    }

    /* attributes */

    pub fn attrs(&self, id: NodeId) -> &[Attr] {
        match &self.slot(id).kind {
            NodeKind::Element { attrs, .. } => attrs,
            _ => &[],
        }
    }

    fn attrs_mut(&mut self, id: NodeId) -> &mut Vec<Attr> {
        match &mut self.slots[id.0 as usize].kind {
            NodeKind::Element { attrs, .. } => attrs,
            other => unreachable!("attribute write on non-element {other:?}"),
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attrs(id)
            .iter()
            .find(|a| a.ns.is_none() && a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    /// Lookup by namespace URI and local name.
    pub fn attr_ns(&self, id: NodeId, ns: &str, local: &str) -> Option<&str> {
        self.attrs(id)
            .iter()
            .find(|a| a.ns.as_deref() == Some(ns) && a.local_name() == local)
            .map(|a| a.value.as_str())
    }

    pub fn has_attr_ns(&self, id: NodeId, ns: &str, local: &str) -> bool {
        self.attr_ns(id, ns, local).is_some()
    }

    /// Set a plain attribute. Writing an identical value is a no-op and does
    /// not count as a mutation.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let attrs = self.attrs_mut(id);
        if let Some(attr) = attrs.iter_mut().find(|a| a.ns.is_none() && a.name == name) {
            if attr.value != value {
                attr.value = value.to_string();
                self.mutations += 1;
            }
            return;
        }
        attrs.push(Attr {
            name: name.to_string(),
            ns: None,
            value: value.to_string(),
        });
        self.mutations += 1;
    }

    /// Set a namespaced attribute, matching an existing entry by namespace and
    /// local name. `name` may be a qualified name; the stored name is replaced
    /// by the written one, as a host `setAttributeNS` would.
    pub fn set_attr_ns(&mut self, id: NodeId, ns: &str, name: &str, value: &str) {
        let local = match name.split_once(':') {
            Some((_, local)) => local,
            None => name,
        };
        let attrs = self.attrs_mut(id);
        if let Some(attr) = attrs
            .iter_mut()
            .find(|a| a.ns.as_deref() == Some(ns) && a.local_name() == local)
        {
            if attr.value != value || attr.name != name {
                attr.name = name.to_string();
                attr.value = value.to_string();
                self.mutations += 1;
            }
            return;
        }
        attrs.push(Attr {
            name: name.to_string(),
            ns: Some(ns.to_string()),
            value: value.to_string(),
        });
        self.mutations += 1;
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        let attrs = self.attrs_mut(id);
        let before = attrs.len();
        attrs.retain(|a| !(a.ns.is_none() && a.name == name));
        if attrs.len() != before {
            self.mutations += 1;
        }
    }

    pub fn remove_attr_ns(&mut self, id: NodeId, ns: &str, local: &str) {
        let attrs = self.attrs_mut(id);
        let before = attrs.len();
        attrs.retain(|a| !(a.ns.as_deref() == Some(ns) && a.local_name() == local));
        if attrs.len() != before {
            self.mutations += 1;
        }
    }

    /* form-control state */

    pub fn form(&self, id: NodeId) -> &FormState {
        match &self.slot(id).kind {
            NodeKind::Element { form, .. } => form,
            other => unreachable!("form state on non-element {other:?}"),
        }
    }

    /// Raw form-state access. Prefer the change-gated setters below; direct
    /// writes through this handle are not counted as mutations.
    pub fn form_mut(&mut self, id: NodeId) -> &mut FormState {
        match &mut self.slots[id.0 as usize].kind {
            NodeKind::Element { form, .. } => form,
            other => unreachable!("form state on non-element {other:?}"),
        }
    }

    /// Install a `selected` property override if it changes the live value.
    pub fn set_selected(&mut self, id: NodeId, on: bool) {
        if self.selected(id) != on {
            self.form_mut(id).selected = Some(on);
            self.mutations += 1;
        }
    }

    pub fn set_checked(&mut self, id: NodeId, on: bool) {
        if self.checked(id) != on {
            self.form_mut(id).checked = Some(on);
            self.mutations += 1;
        }
    }

    pub fn set_disabled(&mut self, id: NodeId, on: bool) {
        if self.disabled(id) != on {
            self.form_mut(id).disabled = Some(on);
            self.mutations += 1;
        }
    }

    /// Overwrite the live `value` property override.
    pub fn set_control_value(&mut self, id: NodeId, value: &str) {
        if self.control_value(id) != value {
            self.form_mut(id).value = Some(value.to_string());
            self.mutations += 1;
        }
    }

    /// Drop any live `value` override, restoring attribute fallback.
    pub fn clear_control_value(&mut self, id: NodeId) {
        if self.form(id).value.is_some() {
            self.form_mut(id).value = None;
            self.mutations += 1;
        }
    }

    pub fn selected_index(&self, id: NodeId) -> i32 {
        self.form(id).selected_index
    }

    pub fn set_selected_index(&mut self, id: NodeId, index: i32) {
        if self.form(id).selected_index != index {
            self.form_mut(id).selected_index = index;
            self.mutations += 1;
        }
    }

    /// Live `checked` property: override if set, else attribute presence.
    pub fn checked(&self, id: NodeId) -> bool {
        self.form(id).checked.unwrap_or_else(|| self.has_attr(id, "checked"))
    }

    /// Live `selected` property: override if set, else attribute presence.
    pub fn selected(&self, id: NodeId) -> bool {
        self.form(id)
            .selected
            .unwrap_or_else(|| self.has_attr(id, "selected"))
    }

    /// Live `disabled` property: override if set, else attribute presence.
    pub fn disabled(&self, id: NodeId) -> bool {
        self.form(id)
            .disabled
            .unwrap_or_else(|| self.has_attr(id, "disabled"))
    }

    /// Live `value` property of a text-entry control: override if set, else
    /// the declarative fallback — concatenated text children for a multiline
    /// control, the `value` attribute otherwise.
    pub fn control_value(&self, id: NodeId) -> String {
        if let Some(value) = &self.form(id).value {
            return value.clone();
        }
        if self.has_name(id, "textarea") {
            return self
                .children(id)
                .iter()
                .filter_map(|&c| self.value(c))
                .collect();
        }
        self.attr(id, "value").unwrap_or("").to_string()
    }
}
