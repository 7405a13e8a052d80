use dom::{Dom, NodeId, NodeType};

/// Element-name equality up to one-sided upper-casing: names match verbatim,
/// or one is the ASCII upper-cased form of the other. This covers live trees
/// built by case-insensitive hosts (which report upper-case names) matched
/// against parser output (lower-case) without equating arbitrary mixed-case
/// spellings. Namespaces are never inspected here.
pub fn same_name(a: &str, b: &str) -> bool {
    a == b || a.to_ascii_uppercase() == b || b.to_ascii_uppercase() == a
}

/// Whether two nodes are elements whose names match under [`same_name`].
pub fn compatible_elements(dom: &Dom, a: NodeId, b: NodeId) -> bool {
    dom.node_type(a) == NodeType::Element
        && dom.node_type(b) == NodeType::Element
        && same_name(
            dom.name(a).expect("element has a name"),
            dom.name(b).expect("element has a name"),
        )
}
