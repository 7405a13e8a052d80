//! Per-kind fixups for controls whose user-visible state is decoupled from
//! their declarative attributes.
//!
//! Handlers run only after the owning node's children are fully settled,
//! because selection decisions depend on the final child list. Dispatch is a
//! match over a closed set of element kinds; there is no open-ended handler
//! registry.

use dom::{Dom, NodeId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlKind {
    Option,
    Input,
    Textarea,
    Select,
}

impl ControlKind {
    /// Closed mapping from element name to control kind, ASCII
    /// case-insensitive.
    pub fn of(name: &str) -> Option<ControlKind> {
        if name.eq_ignore_ascii_case("option") {
            Some(ControlKind::Option)
        } else if name.eq_ignore_ascii_case("input") {
            Some(ControlKind::Input)
        } else if name.eq_ignore_ascii_case("textarea") {
            Some(ControlKind::Textarea)
        } else if name.eq_ignore_ascii_case("select") {
            Some(ControlKind::Select)
        } else {
            None
        }
    }

    pub fn of_node(dom: &Dom, id: NodeId) -> Option<ControlKind> {
        dom.name(id).and_then(ControlKind::of)
    }
}

pub fn sync(dom: &mut Dom, kind: ControlKind, live: NodeId, target: NodeId) {
    match kind {
        ControlKind::Option => sync_option(dom, live, target),
        ControlKind::Input => sync_input(dom, live, target),
        ControlKind::Textarea => sync_textarea(dom, live, target),
        ControlKind::Select => sync_select(dom, live, target),
    }
}

#[derive(Clone, Copy)]
enum BoolProp {
    Checked,
    Selected,
    Disabled,
}

impl BoolProp {
    fn attr(self) -> &'static str {
        match self {
            BoolProp::Checked => "checked",
            BoolProp::Selected => "selected",
            BoolProp::Disabled => "disabled",
        }
    }
}

/// Converge a boolean property/attribute pair: the property override follows
/// the target's live value, and the attribute mirrors the resulting state.
fn sync_boolean(dom: &mut Dom, live: NodeId, prop: BoolProp, live_value: bool, target_value: bool) {
    if live_value != target_value {
        match prop {
            BoolProp::Checked => dom.set_checked(live, target_value),
            BoolProp::Selected => dom.set_selected(live, target_value),
            BoolProp::Disabled => dom.set_disabled(live, target_value),
        }
        if target_value {
            dom.set_attr(live, prop.attr(), "");
        } else {
            dom.remove_attr(live, prop.attr());
        }
    }
}

fn sync_option(dom: &mut Dom, live: NodeId, target: NodeId) {
    if let Some(parent) = dom.parent(live) {
        // Look through one level of option grouping.
        let container = if dom.has_name(parent, "optgroup") {
            dom.parent(parent)
        } else {
            Some(parent)
        };
        if let Some(container) = container
            && dom.has_name(container, "select")
            && !dom.has_attr(container, "multiple")
        {
            // Downlevel hosts only reset the boolean property when the
            // attribute is toggled on and off again.
            if dom.has_attr(live, "selected") && !dom.selected(target) {
                dom.set_attr(live, "selected", "selected");
                dom.remove_attr(live, "selected");
            }
            dom.set_selected_index(container, -1);
        }
    }
    let live_selected = dom.selected(live);
    let target_selected = dom.selected(target);
    sync_boolean(dom, live, BoolProp::Selected, live_selected, target_selected);
}

fn sync_input(dom: &mut Dom, live: NodeId, target: NodeId) {
    let live_checked = dom.checked(live);
    let target_checked = dom.checked(target);
    sync_boolean(dom, live, BoolProp::Checked, live_checked, target_checked);
    let live_disabled = dom.disabled(live);
    let target_disabled = dom.disabled(target);
    sync_boolean(dom, live, BoolProp::Disabled, live_disabled, target_disabled);

    let target_value = dom.control_value(target);
    if dom.control_value(live) != target_value {
        dom.set_control_value(live, &target_value);
    }
    if !dom.has_attr(target, "value") {
        dom.clear_control_value(live);
        dom.remove_attr(live, "value");
    }
}

fn sync_textarea(dom: &mut Dom, live: NodeId, target: NodeId) {
    let new_value = dom.control_value(target);
    if dom.control_value(live) != new_value {
        dom.set_control_value(live, &new_value);
    }

    // Keep a single text child in step with the value, except when a host
    // mirrors placeholder text into the value node.
    if let &[child] = dom.children(live)
        && let Some(old_value) = dom.value(child)
    {
        if old_value == new_value {
            return;
        }
        if new_value.is_empty() && Some(old_value) == dom.attr(live, "placeholder") {
            return;
        }
        dom.set_value(child, &new_value);
    }
}

fn sync_select(dom: &mut Dom, live: NodeId, target: NodeId) {
    if dom.has_attr(target, "multiple") {
        return;
    }
    let mut selected_index = -1;
    let mut i = 0;
    'scan: for &child in dom.children(live) {
        if dom.has_name(child, "optgroup") {
            for &sub in dom.children(child) {
                if dom.has_name(sub, "option") {
                    if dom.has_attr(sub, "selected") {
                        selected_index = i;
                        break 'scan;
                    }
                    i += 1;
                }
            }
        } else if dom.has_name(child, "option") {
            if dom.has_attr(child, "selected") {
                selected_index = i;
                break;
            }
            i += 1;
        }
    }
    dom.set_selected_index(live, selected_index);
}
