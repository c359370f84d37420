//! Mutable markup tree.
//!
//! A [`Document`] is an arena of nodes addressed by [`NodeId`]. Parsing is lenient
//! and lossless: text and attribute values are kept exactly as written, so an
//! untouched tree serializes back to its input. Detached nodes stay in the arena
//! but are unreachable from the root, which is all queries and serialization see.
//!
//! # Examples
//!
//! ```rust
//! use ng_expander::markup::Document;
//!
//! let mut doc = Document::parse(r#"<div ng-bind="title">old</div>"#);
//! let div = doc.elements_with_attr("ng-bind")[0];
//! doc.set_inner_html(div, "<b>new</b>");
//! doc.remove_attr(div, "ng-bind");
//! assert_eq!(doc.to_html(), "<div><b>new</b></div>");
//! ```

mod parser;
mod serializer;
pub mod tags;

use std::collections::HashSet;
use std::fmt;

/// Index of a node inside its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// One attribute, in source order. `value` is `None` for valueless attributes
/// such as `hidden`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: Option<String>,
}

/// Element name and attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name as written in the source
    pub name: String,
    pub attrs: Vec<Attribute>,
    /// Written as `<name/>`
    pub self_closing: bool,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            self_closing: false,
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    fn attr_index(&self, name: &str) -> Option<usize> {
        self.attrs.iter().position(|a| a.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// The root of a document, or a detached holder for a parsed fragment
    Document,
    /// `<!...>` or `<?...>`, stored without the angle brackets
    Doctype(String),
    /// Comment body without `<!--` and `-->`
    Comment(String),
    Text(String),
    Element(Element),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A parsed markup tree.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Parse `source` into a new tree. Never fails.
    pub fn parse(source: &str) -> Self {
        let mut doc = Self {
            nodes: vec![Node {
                data: NodeData::Document,
                parent: None,
                children: Vec::new(),
            }],
        };
        parser::parse_into(&mut doc, NodeId(0), source);
        doc
    }

    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.element(child).is_some())
            .collect()
    }

    pub fn first_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).iter().copied().find(|&child| self.element(child).is_some())
    }

    /// Strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), |&node| self.parent(node))
    }

    /// Whether any strict ancestor of `id` is in `claimed`.
    pub fn is_within(&self, id: NodeId, claimed: &HashSet<NodeId>) -> bool {
        self.ancestors(id).any(|ancestor| claimed.contains(&ancestor))
    }

    /// Elements reachable from the root that satisfy `predicate`, in document order.
    pub fn find_elements(&self, predicate: impl Fn(&Element) -> bool) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            if self.element(id).is_some_and(&predicate) {
                found.push(id);
            }
            stack.extend(self.children(id).iter().rev());
        }
        found
    }

    pub fn elements_by_tag(&self, name: &str) -> Vec<NodeId> {
        self.find_elements(|el| el.is(name))
    }

    pub fn elements_with_attr(&self, name: &str) -> Vec<NodeId> {
        self.find_elements(|el| el.attr_index(name).is_some())
    }

    /// Attribute value; `Some("")` for a valueless attribute.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        let el = self.element(id)?;
        let attr = &el.attrs[el.attr_index(name)?];
        Some(attr.value.as_deref().unwrap_or(""))
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(el) = self.element_mut(id) else {
            return;
        };
        match el.attr_index(name) {
            Some(index) => el.attrs[index].value = Some(value.to_string()),
            None => el.attrs.push(Attribute {
                name: name.to_string(),
                value: Some(value.to_string()),
            }),
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(el) = self.element_mut(id) {
            el.attrs.retain(|a| !a.name.eq_ignore_ascii_case(name));
        }
    }

    /// Serialize the whole tree.
    pub fn to_html(&self) -> String {
        self.inner_html(self.root())
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        serializer::write_node(self, id, None, &mut out);
        out
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            serializer::write_node(self, child, None, &mut out);
        }
        out
    }

    /// Serialize `id` as if its `attr` attribute were absent.
    pub fn outer_html_without_attr(&self, id: NodeId, attr: &str) -> String {
        let mut out = String::new();
        serializer::write_node(self, id, Some(attr), &mut out);
        out
    }

    /// Replace the children of `id` with the nodes parsed from `markup`.
    pub fn set_inner_html(&mut self, id: NodeId, markup: &str) {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
        parser::parse_into(self, id, markup);
    }

    /// Insert the nodes parsed from `markup` before the existing children of `id`.
    pub fn prepend_html(&mut self, id: NodeId, markup: &str) {
        let nodes = self.parse_detached(markup);
        self.splice(id, 0, 0, nodes);
    }

    /// Replace `id` with the nodes parsed from `markup`. No-op for a detached node.
    pub fn replace_with_html(&mut self, id: NodeId, markup: &str) {
        let nodes = self.parse_detached(markup);
        self.replace_with_nodes(id, nodes);
    }

    /// Replace `id` with a new `name` element carrying `attrs` and the nodes parsed
    /// from `inner_html`. Returns the new element.
    pub fn replace_with_element(
        &mut self,
        id: NodeId,
        name: &str,
        attrs: Vec<Attribute>,
        inner_html: &str,
    ) -> NodeId {
        let element = self.create(NodeData::Element(Element {
            name: name.to_string(),
            attrs,
            self_closing: false,
        }));
        parser::parse_into(self, element, inner_html);
        self.replace_with_nodes(id, vec![element]);
        element
    }

    fn replace_with_nodes(&mut self, id: NodeId, nodes: Vec<NodeId>) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let Some(index) = self.children(parent).iter().position(|&c| c == id) else {
            return;
        };
        self.nodes[id.0].parent = None;
        self.splice(parent, index, 1, nodes);
    }

    /// Parse `markup` under a fresh holder node and hand back the top-level nodes.
    fn parse_detached(&mut self, markup: &str) -> Vec<NodeId> {
        let holder = self.create(NodeData::Document);
        parser::parse_into(self, holder, markup);
        std::mem::take(&mut self.nodes[holder.0].children)
    }

    fn splice(&mut self, parent: NodeId, index: usize, remove: usize, nodes: Vec<NodeId>) {
        for &node in &nodes {
            self.nodes[node.0].parent = Some(parent);
        }
        self.nodes[parent.0].children.splice(index..index + remove, nodes);
    }

    pub(crate) fn create(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn append(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Append text to `parent`, merging with a trailing text child.
    pub(crate) fn append_text(&mut self, parent: NodeId, text: &str) {
        if let Some(&last) = self.nodes[parent.0].children.last() {
            if let NodeData::Text(existing) = &mut self.nodes[last.0].data {
                existing.push_str(text);
                return;
            }
        }
        let node = self.create(NodeData::Text(text.to_string()));
        self.append(parent, node);
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_html())
    }
}
