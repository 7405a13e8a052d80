//! Declarative event binding.
//!
//! Elements opt in with `@<event>` attributes whose value names a handler on
//! the component. The bindings list is rebuilt after every render pass — full
//! teardown first, never incremental — so stale nodes can never keep a
//! handler alive.

use dom::{Dom, NodeId, NodeType};

/// The fixed set of bindable events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Click,
    MouseDown,
    MouseUp,
    KeyUp,
    KeyDown,
    Input,
    Change,
    Focus,
    Blur,
}

impl EventKind {
    pub const ALL: [EventKind; 9] = [
        EventKind::Click,
        EventKind::MouseDown,
        EventKind::MouseUp,
        EventKind::KeyUp,
        EventKind::KeyDown,
        EventKind::Input,
        EventKind::Change,
        EventKind::Focus,
        EventKind::Blur,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::MouseDown => "mousedown",
            EventKind::MouseUp => "mouseup",
            EventKind::KeyUp => "keyup",
            EventKind::KeyDown => "keydown",
            EventKind::Input => "input",
            EventKind::Change => "change",
            EventKind::Focus => "focus",
            EventKind::Blur => "blur",
        }
    }

    /// The attribute spelling that binds this event.
    pub fn attr(self) -> &'static str {
        match self {
            EventKind::Click => "@click",
            EventKind::MouseDown => "@mousedown",
            EventKind::MouseUp => "@mouseup",
            EventKind::KeyUp => "@keyup",
            EventKind::KeyDown => "@keydown",
            EventKind::Input => "@input",
            EventKind::Change => "@change",
            EventKind::Focus => "@focus",
            EventKind::Blur => "@blur",
        }
    }
}

/// A delivered event, handed to the component's handler.
#[derive(Clone, Copy, Debug)]
pub struct Event {
    pub kind: EventKind,
    pub target: NodeId,
}

/// One recorded (element, event, handler) triple.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub node: NodeId,
    pub event: EventKind,
    pub handler: String,
}

/// Scan every element under `root` for `@event` attributes whose value names
/// a handler accepted by `handles`. Attributes naming unknown handlers are
/// skipped silently, like a method lookup miss on the instance.
pub fn collect_bindings(
    dom: &Dom,
    root: NodeId,
    mut handles: impl FnMut(&str) -> bool,
) -> Vec<Binding> {
    let mut bindings = Vec::new();
    for node in dom.descendants(root) {
        if dom.node_type(node) != NodeType::Element {
            continue;
        }
        for event in EventKind::ALL {
            if let Some(handler) = dom.attr(node, event.attr())
                && !handler.is_empty()
                && handles(handler)
            {
                bindings.push(Binding {
                    node,
                    event,
                    handler: handler.to_string(),
                });
            }
        }
    }
    log::trace!(target: "component.events", "bound {} handler(s)", bindings.len());
    bindings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_only_known_handlers() {
        let mut dom = Dom::new();
        let root = dom.create_fragment();
        let button = dom.create_element("button");
        dom.set_attr(button, "@click", "on_click");
        dom.set_attr(button, "@focus", "missing");
        dom.append(root, button);
        let bindings = collect_bindings(&dom, root, |name| name == "on_click");
        assert_eq!(
            bindings,
            vec![Binding {
                node: button,
                event: EventKind::Click,
                handler: "on_click".to_string(),
            }]
        );
    }

    #[test]
    fn scans_nested_elements() {
        let mut dom = Dom::new();
        let root = dom.create_fragment();
        let outer = dom.create_element("div");
        let inner = dom.create_element("input");
        dom.set_attr(inner, "@input", "on_input");
        dom.append(root, outer);
        dom.append(outer, inner);
        let bindings = collect_bindings(&dom, root, |_| true);
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].node, inner);
        assert_eq!(bindings[0].event, EventKind::Input);
    }

    #[test]
    fn blank_handler_names_are_ignored() {
        let mut dom = Dom::new();
        let root = dom.create_fragment();
        let el = dom.create_element("a");
        dom.set_attr(el, "@click", "");
        dom.append(root, el);
        assert!(collect_bindings(&dom, root, |_| true).is_empty());
    }
}
