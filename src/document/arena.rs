use std::collections::BTreeMap;

use crate::interact::wiring::Activation;

/// Index of a node inside its owning [`RegionDocument`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Raw arena index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One attribute in document order. Names keep their prefix (`xlink:href`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified attribute name.
    pub name: String,
    /// Unescaped attribute value.
    pub value: String,
}

/// Element payload: qualified tag name plus ordered attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    /// Qualified tag name.
    pub name: String,
    /// Attributes in document order.
    pub attrs: Vec<Attribute>,
}

impl Element {
    /// Local part of the tag name (`svg:path` -> `path`).
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }
}

/// Node payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeData {
    /// An element.
    Element(Element),
    /// Character data (text or CDATA, stored unescaped).
    Text(String),
}

#[derive(Clone, Debug)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// A parsed (or built) SVG document with an `<svg>` root.
#[derive(Clone, Debug)]
pub struct RegionDocument {
    nodes: Vec<Node>,
    root: NodeId,
    pub(crate) activations: BTreeMap<NodeId, Activation>,
}

impl RegionDocument {
    /// Create a document holding an empty `<svg xmlns=...>` root.
    pub fn new_svg() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            activations: BTreeMap::new(),
        };
        let root = doc.create_element("svg");
        doc.set_attr(root, "xmlns", super::SVG_NS);
        doc.root = root;
        doc
    }

    pub(crate) fn with_root(name: &str) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            activations: BTreeMap::new(),
        };
        doc.root = doc.create_element(name);
        doc
    }

    /// The `<svg>` root element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Total number of nodes ever created, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Create a detached element.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(NodeData::Element(Element {
            name: name.to_string(),
            attrs: Vec::new(),
        }))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    /// Node payload.
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()].data
    }

    /// Element payload, or `None` for text nodes.
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.index()].data {
            NodeData::Element(e) => Some(e),
            NodeData::Text(_) => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.index()].data {
            NodeData::Element(e) => Some(e),
            NodeData::Text(_) => None,
        }
    }

    /// Local tag name, or `None` for text nodes.
    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(Element::local_name)
    }

    /// `true` when `id` is an element with local name `name`.
    pub fn is_element(&self, id: NodeId, name: &str) -> bool {
        self.local_name(id) == Some(name)
    }

    /// Attribute lookup by qualified name.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?
            .attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Attribute lookup that skips empty (or whitespace-only) values.
    pub fn non_empty_attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attr(id, name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Attributes in document order (empty for text nodes).
    pub fn attrs(&self, id: NodeId) -> &[Attribute] {
        self.element(id).map(|e| e.attrs.as_slice()).unwrap_or(&[])
    }

    /// Set (or replace in place) an attribute. No-op on text nodes.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        let Some(el) = self.element_mut(id) else {
            return;
        };
        let value = value.into();
        match el.attrs.iter_mut().find(|a| a.name == name) {
            Some(a) => a.value = value,
            None => el.attrs.push(Attribute {
                name: name.to_string(),
                value,
            }),
        }
    }

    /// Remove an attribute, returning its old value.
    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Option<String> {
        let el = self.element_mut(id)?;
        let pos = el.attrs.iter().position(|a| a.name == name)?;
        Some(el.attrs.remove(pos).value)
    }

    /// Parent node, `None` for the root and for detached nodes.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// Child nodes in order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// Element children in order.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |c| self.element(*c).is_some())
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |n| self.parent(*n))
    }

    /// Strict descendants in document (pre-)order.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    /// `true` when the node is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root || self.ancestors(id).any(|a| a == self.root)
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let NodeData::Text(t) = self.data(id) {
            out.push_str(t);
        }
        for d in self.descendants(id) {
            if let NodeData::Text(t) = self.data(d) {
                out.push_str(t);
            }
        }
        out
    }

    /// First attached element whose `id` attribute equals `value`.
    pub fn find_by_id(&self, value: &str) -> Option<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|n| self.attr(*n, "id") == Some(value))
    }

    /// First attached element carrying `name="value"`.
    pub fn find_by_attr(&self, name: &str, value: &str) -> Option<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|n| self.attr(*n, name) == Some(value))
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(parent != child && !self.ancestors(parent).any(|a| a == child));
        self.detach(child);
        self.nodes[parent.index()].children.push(child);
        self.nodes[child.index()].parent = Some(parent);
    }

    /// Insert `child` as the first child of `parent`, detaching it first.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(parent != child && !self.ancestors(parent).any(|a| a == child));
        self.detach(child);
        self.nodes[parent.index()].children.insert(0, child);
        self.nodes[child.index()].parent = Some(parent);
    }

    /// Insert `child` into `reference`'s parent, immediately before `reference`.
    ///
    /// Falls back to appending to the root when `reference` is detached.
    pub fn insert_before(&mut self, reference: NodeId, child: NodeId) {
        self.detach(child);
        let Some(parent) = self.parent(reference) else {
            let root = self.root;
            self.append_child(root, child);
            return;
        };
        let siblings = &mut self.nodes[parent.index()].children;
        let pos = siblings
            .iter()
            .position(|c| *c == reference)
            .unwrap_or(siblings.len());
        siblings.insert(pos, child);
        self.nodes[child.index()].parent = Some(parent);
    }

    /// Unlink a node from its parent. The node (and its subtree) stays in the arena.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes[id.index()].parent.take() else {
            return;
        };
        self.nodes[parent.index()].children.retain(|c| *c != id);
    }
}

/// Pre-order iterator over a subtree, see [`RegionDocument::descendants`].
pub struct Descendants<'a> {
    doc: &'a RegionDocument,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let next = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(next).iter().rev().copied());
        Some(next)
    }
}

pub(crate) fn local_part(name: &str) -> &str {
    name.rsplit_once(':').map(|(_, l)| l).unwrap_or(name)
}

#[cfg(test)]
#[path = "../../tests/unit/document/arena.rs"]
mod tests;
