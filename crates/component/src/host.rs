//! Component host: lifecycle, state, and the render loop.
//!
//! Contract:
//! - Attribute snapshots go through [`coerce`]; components see typed values,
//!   never raw strings.
//! - `update_attr`/`update_state` predict the next maps, gate on
//!   `can_update`, run `updating`, apply, re-render, then run `updated`.
//!   A change that does not alter the observed value does nothing.
//! - Every render pass removes the `defer` attribute from the host,
//!   re-snapshots attributes, gates on `can_render`, updates the render root
//!   (reconcile or full replacement per `REPLACE_RENDER`), and rebuilds the
//!   event bindings after full teardown.
//! - Renders are serialized by construction: each trigger runs to completion
//!   synchronously before the next can be observed. Rapid triggers are not
//!   coalesced; each one is a full pass.

use crate::coerce::coerce;
use crate::events::{Binding, Event, EventKind, collect_bindings};
use dom::{Dom, NodeId};
use markup::Materializer;
use reconcile::{ReconcileOptions, reconcile};
use serde_json::Value;
use std::collections::BTreeMap;

pub type ValueMap = BTreeMap<String, Value>;

/// Read view of the component's coerced attributes and state during a
/// lifecycle call.
#[derive(Clone, Copy, Debug)]
pub struct View<'a> {
    pub attrs: &'a ValueMap,
    pub state: &'a ValueMap,
}

pub trait Component {
    /// Replace the render root's content wholesale instead of reconciling.
    const REPLACE_RENDER: bool = false;

    /// Produce the markup for the current attrs/state.
    fn render(&self, view: &View<'_>) -> String;

    /* lifecycle, all optional */

    fn created(&mut self, _view: &View<'_>) {}
    fn mounted(&mut self, _view: &View<'_>) {}
    fn unmounted(&mut self, _view: &View<'_>) {}
    fn updating(&mut self, _next_attrs: &ValueMap, _next_state: &ValueMap) {}
    fn updated(&mut self) {}

    fn can_render(&self, _view: &View<'_>) -> bool {
        true
    }

    fn can_update(&self, _next_attrs: &ValueMap, _next_state: &ValueMap) -> bool {
        true
    }

    /* declarative event handlers */

    /// Whether `handler` names a method on this component.
    fn handles(&self, _handler: &str) -> bool {
        false
    }

    /// Run a handler. An optional state patch is shallow-merged by the host,
    /// triggering a re-render.
    fn handle(&mut self, _handler: &str, _event: &Event) -> Option<ValueMap> {
        None
    }
}

pub struct Host<C: Component> {
    dom: Dom,
    host: NodeId,
    root: NodeId,
    component: C,
    attrs: ValueMap,
    state: ValueMap,
    bindings: Vec<Binding>,
    connected: bool,
    materializer: Materializer,
}

impl<C: Component> Host<C> {
    pub fn new(tag: &str, component: C) -> Self {
        Host::with_attrs(tag, component, &[])
    }

    /// Construct the host element with initial raw attributes, attach the
    /// isolated render root, snapshot attrs, and run `created`.
    pub fn with_attrs(tag: &str, component: C, attrs: &[(&str, &str)]) -> Self {
        let mut dom = Dom::new();
        let host = dom.create_element(tag);
        for (name, value) in attrs {
            dom.set_attr(host, name, value);
        }
        let root = dom.create_fragment();
        let mut this = Host {
            attrs: snapshot_attrs(&dom, host),
            dom,
            host,
            root,
            component,
            state: ValueMap::new(),
            bindings: Vec::new(),
            connected: false,
            materializer: Materializer::new(),
        };
        let view = View {
            attrs: &this.attrs,
            state: &this.state,
        };
        this.component.created(&view);
        this
    }

    /* accessors */

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn host(&self) -> NodeId {
        self.host
    }

    /// The isolated render root; its children are the component's output.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn attrs(&self) -> &ValueMap {
        &self.attrs
    }

    pub fn state(&self) -> &ValueMap {
        &self.state
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn component(&self) -> &C {
        &self.component
    }

    pub fn component_mut(&mut self) -> &mut C {
        &mut self.component
    }

    /* lifecycle entry points */

    /// Attach-to-tree: runs `mounted`, then the first render.
    pub fn connect(&mut self) {
        self.connected = true;
        let view = View {
            attrs: &self.attrs,
            state: &self.state,
        };
        self.component.mounted(&view);
        self.render_pass();
    }

    /// Detach: runs `unmounted` and tears down all recorded bindings.
    pub fn disconnect(&mut self) {
        self.connected = false;
        let view = View {
            attrs: &self.attrs,
            state: &self.state,
        };
        self.component.unmounted(&view);
        self.bindings.clear();
    }

    /// Observed attribute change. A write that does not change the raw value
    /// is ignored; otherwise the update is gated on `can_update`, wrapped in
    /// `updating`/`updated`, and re-renders.
    pub fn update_attr(&mut self, name: &str, value: &str) {
        if self.dom.attr(self.host, name) == Some(value) {
            return;
        }
        let mut next_attrs = snapshot_attrs(&self.dom, self.host);
        next_attrs.insert(name.to_string(), coerce(value));
        if !self.component.can_update(&next_attrs, &self.state) {
            return;
        }
        self.component.updating(&next_attrs, &self.state);
        self.dom.set_attr(self.host, name, value);
        self.attrs = next_attrs;
        self.render_pass();
        self.component.updated();
    }

    /// Kept for callers that reach for the host-element spelling.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        self.update_attr(name, value);
    }

    /// Explicit state replacement, shallow-merged over the current state.
    pub fn update_state(&mut self, values: ValueMap) {
        let mut next_state = self.state.clone();
        next_state.extend(values);
        if !self.component.can_update(&self.attrs, &next_state) {
            return;
        }
        self.component.updating(&self.attrs, &next_state);
        self.state = next_state;
        self.render_pass();
        self.component.updated();
    }

    /// Deliver an event to the handler bound at (`node`, `kind`), if any.
    pub fn dispatch(&mut self, kind: EventKind, node: NodeId) {
        let handler = self
            .bindings
            .iter()
            .find(|b| b.node == node && b.event == kind)
            .map(|b| b.handler.clone());
        if let Some(handler) = handler {
            let event = Event { kind, target: node };
            if let Some(patch) = self.component.handle(&handler, &event) {
                self.update_state(patch);
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    fn render_pass(&mut self) {
        // Rendering starts at attach; detached hosts stay inert.
        if !self.connected {
            return;
        }
        // The deferred-hide marker never survives the first paint.
        self.dom.remove_attr(self.host, "defer");
        self.attrs = snapshot_attrs(&self.dom, self.host);

        let view = View {
            attrs: &self.attrs,
            state: &self.state,
        };
        if !self.component.can_render(&view) {
            return;
        }
        let markup = self.component.render(&view);

        if C::REPLACE_RENDER {
            let children: Vec<NodeId> = self.dom.children(self.root).to_vec();
            for child in children {
                self.dom.detach(child);
            }
            if let Some(fragment) = self.materializer.materialize(&mut self.dom, &markup) {
                self.dom.move_children(fragment, self.root);
            }
        } else {
            let mut options = ReconcileOptions {
                children_only: true,
                materializer: self.materializer,
                ..ReconcileOptions::default()
            };
            reconcile(&mut self.dom, self.root, markup.as_str(), &mut options);
        }

        // Full teardown, then rebind from the fresh tree.
        self.bindings.clear();
        let component = &self.component;
        self.bindings = collect_bindings(&self.dom, self.root, |name| component.handles(name));
    }
}

fn snapshot_attrs(dom: &Dom, host: NodeId) -> ValueMap {
    dom.attrs(host)
        .iter()
        .map(|attr| (attr.name.clone(), coerce(&attr.value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct Greeter {
        log: Vec<&'static str>,
    }

    impl Component for Greeter {
        fn render(&self, view: &View<'_>) -> String {
            let name = view
                .state
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("world");
            format!("<p @click=\"shout\">hello {name}</p>")
        }

        fn created(&mut self, _view: &View<'_>) {
            self.log.push("created");
        }

        fn mounted(&mut self, _view: &View<'_>) {
            self.log.push("mounted");
        }

        fn unmounted(&mut self, _view: &View<'_>) {
            self.log.push("unmounted");
        }

        fn updating(&mut self, _next_attrs: &ValueMap, _next_state: &ValueMap) {
            self.log.push("updating");
        }

        fn updated(&mut self) {
            self.log.push("updated");
        }

        fn handles(&self, handler: &str) -> bool {
            handler == "shout"
        }

        fn handle(&mut self, _handler: &str, _event: &Event) -> Option<ValueMap> {
            self.log.push("shout");
            let mut patch = ValueMap::new();
            patch.insert("name".to_string(), json!("LOUD"));
            Some(patch)
        }
    }

    fn rendered_text<C: Component>(host: &Host<C>) -> String {
        dom::to_markup(host.dom(), host.root())
    }

    #[test]
    fn construction_snapshots_coerced_attrs_and_runs_created() {
        let host = Host::with_attrs(
            "x-greeter",
            Greeter::default(),
            &[("count", "3"), ("on", "")],
        );
        assert_eq!(host.attrs().get("count"), Some(&json!(3)));
        assert_eq!(host.attrs().get("on"), Some(&json!(true)));
        assert_eq!(host.component().log, vec!["created"]);
    }

    #[test]
    fn connect_mounts_then_renders() {
        let mut host = Host::new("x-greeter", Greeter::default());
        host.connect();
        assert_eq!(host.component().log, vec!["created", "mounted"]);
        assert_eq!(rendered_text(&host), "<p @click=\"shout\">hello world</p>");
        assert_eq!(host.bindings().len(), 1, "declarative handler was bound");
    }

    #[test]
    fn update_state_runs_the_full_lifecycle_and_rerenders() {
        let mut host = Host::new("x-greeter", Greeter::default());
        host.connect();
        let mut patch = ValueMap::new();
        patch.insert("name".to_string(), json!("there"));
        host.update_state(patch);
        assert!(rendered_text(&host).contains("hello there"));
        assert_eq!(
            host.component().log,
            vec!["created", "mounted", "updating", "updated"]
        );
    }

    #[test]
    fn update_attr_ignores_identical_values() {
        let mut host = Host::with_attrs("x-greeter", Greeter::default(), &[("a", "1")]);
        host.connect();
        let log_len = host.component().log.len();
        host.update_attr("a", "1");
        assert_eq!(host.component().log.len(), log_len, "no lifecycle ran");
    }

    #[test]
    fn dispatch_invokes_the_bound_handler_and_applies_the_patch() {
        let mut host = Host::new("x-greeter", Greeter::default());
        host.connect();
        let p = host.bindings()[0].node;
        host.dispatch(EventKind::Click, p);
        assert!(rendered_text(&host).contains("hello LOUD"));
        assert!(host.component().log.contains(&"shout"));
    }

    #[test]
    fn rerender_preserves_node_identity() {
        let mut host = Host::new("x-greeter", Greeter::default());
        host.connect();
        let p_before = host.bindings()[0].node;
        let mut patch = ValueMap::new();
        patch.insert("name".to_string(), json!("again"));
        host.update_state(patch);
        let p_after = host.bindings()[0].node;
        assert_eq!(p_before, p_after, "reconciliation keeps the element");
    }

    #[test]
    fn disconnect_unmounts_and_tears_down_bindings() {
        let mut host = Host::new("x-greeter", Greeter::default());
        host.connect();
        host.disconnect();
        assert!(host.bindings().is_empty());
        assert!(host.component().log.contains(&"unmounted"));
    }

    #[test]
    fn render_removes_the_defer_attribute() {
        let mut host = Host::with_attrs("x-greeter", Greeter::default(), &[("defer", "")]);
        host.connect();
        assert!(!host.dom().has_attr(host.host(), "defer"));
        assert!(!host.attrs().contains_key("defer"));
    }

    struct Replacer;

    impl Component for Replacer {
        const REPLACE_RENDER: bool = true;

        fn render(&self, view: &View<'_>) -> String {
            let n = view.state.get("n").and_then(Value::as_i64).unwrap_or(0);
            format!("<p>{n}</p>")
        }
    }

    #[test]
    fn replace_render_swaps_content_instead_of_reconciling() {
        let mut host = Host::new("x-counter", Replacer);
        host.connect();
        let before = host.dom().first_child(host.root()).unwrap();
        let mut patch = ValueMap::new();
        patch.insert("n".to_string(), json!(1));
        host.update_state(patch);
        let after = host.dom().first_child(host.root()).unwrap();
        assert_ne!(before, after, "full replacement rebuilds the tree");
        assert_eq!(rendered_text(&host), "<p>1</p>");
    }

    struct Gated;

    impl Component for Gated {
        fn render(&self, _view: &View<'_>) -> String {
            "<p>rendered</p>".to_string()
        }

        fn can_update(&self, _next_attrs: &ValueMap, next_state: &ValueMap) -> bool {
            !next_state.contains_key("forbidden")
        }
    }

    #[test]
    fn can_update_veto_blocks_state_and_render() {
        let mut host = Host::new("x-gated", Gated);
        host.connect();
        let mut patch = ValueMap::new();
        patch.insert("forbidden".to_string(), json!(1));
        host.update_state(patch);
        assert!(host.state().is_empty(), "vetoed state never lands");
    }
}
