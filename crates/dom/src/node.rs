/// Identity of a node within its owning [`Dom`](crate::Dom) arena.
///
/// Ids are never reused for the lifetime of the arena, so two equal ids
/// always name the same logical node, even across detach/re-attach cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeType {
    Document,
    Element,
    Text,
    Comment,
    Fragment,
}

/// A single attribute. `ns` is the namespace URI for namespace-qualified
/// attributes; plain attributes leave it unset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub ns: Option<String>,
    pub value: String,
}

impl Attr {
    /// The name without its prefix. Namespaced attribute comparisons go
    /// through this; plain attributes compare by full name.
    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }
}

/// Live form-control state that is decoupled from declarative attributes.
///
/// `None` means "no override": readers fall back to the attribute, the same
/// way a freshly parsed control's property reflects its markup. Overrides are
/// installed by user interaction in a real host; here they are installed by
/// the control synchronizer and by tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormState {
    pub checked: Option<bool>,
    pub selected: Option<bool>,
    pub disabled: Option<bool>,
    pub value: Option<String>,
    /// Position of the active option in a select container; -1 means none.
    pub selected_index: i32,
}

impl Default for FormState {
    fn default() -> Self {
        FormState {
            checked: None,
            selected: None,
            disabled: None,
            value: None,
            selected_index: -1,
        }
    }
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    Document {
        doctype: Option<String>,
    },
    Element {
        name: String,
        ns: Option<String>,
        attrs: Vec<Attr>,
        form: FormState,
    },
    Text(String),
    Comment(String),
    Fragment,
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Document { .. } => NodeType::Document,
            NodeKind::Element { .. } => NodeType::Element,
            NodeKind::Text(_) => NodeType::Text,
            NodeKind::Comment(_) => NodeType::Comment,
            NodeKind::Fragment => NodeType::Fragment,
        }
    }

    /// Whether this kind may carry children.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            NodeKind::Document { .. } | NodeKind::Element { .. } | NodeKind::Fragment
        )
    }
}
