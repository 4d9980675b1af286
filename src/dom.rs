//! Host document abstraction.
//!
//! A date picker never touches a concrete document. It renders through the
//! [`Document`] trait, which covers element lookup, creation and tree
//! mutation. [`MemoryDocument`] implements it as a plain node arena and is
//! what tests and the terminal front end mount pickers into.

use itertools::Itertools;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

pub trait Document {
    fn element_by_id(&self, id: &str) -> Option<NodeId>;
    fn create_element(&mut self, tag: &str) -> NodeId;
    fn set_text(&mut self, node: NodeId, text: &str);
    fn add_class(&mut self, node: NodeId, class: &str);
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);
    fn append_child(&mut self, parent: NodeId, child: NodeId);
    /// Detaches every child of `node`.
    fn clear_children(&mut self, node: NodeId);
}

#[derive(Debug, Clone, Default)]
pub struct Node {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    text: String,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Node {
    fn new(tag: &str) -> Self {
        Node {
            tag: tag.to_owned(),
            ..Default::default()
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// Arena backed document. Detached nodes stay allocated until the document
/// is dropped, so a `NodeId` is never reused for another element.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<Node>,
    revision: u64,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        MemoryDocument {
            nodes: vec![Node::new("body")],
            revision: 0,
        }
    }
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(&self) -> NodeId {
        NodeId(0)
    }

    /// Creates a `tag` element with the given `id` below `body`.
    pub fn append_element(&mut self, tag: &str, id: &str) -> NodeId {
        let node = self.create_element(tag);
        self.set_attribute(node, "id", id);
        self.append_child(self.body(), node);
        node
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::children).unwrap_or(&[])
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.node(id).map_or(false, |n| n.has_class(class))
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id).and_then(|n| n.attribute(name))
    }

    /// Text of `id` and all of its descendants, in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        std::iter::once(id)
            .chain(self.descendants(id))
            .filter_map(|n| self.node(n))
            .map(Node::text)
            .collect()
    }

    /// All nodes below `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();

        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev());
        }

        out
    }

    pub fn elements_by_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&n| self.has_class(n, class))
            .collect()
    }

    pub fn elements_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&n| self.node(n).map_or(false, |node| node.tag == tag))
            .collect()
    }

    /// Incremented on every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn to_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(id, &mut out);
        out
    }

    fn write_markup(&self, id: NodeId, out: &mut String) {
        let node = match self.node(id) {
            Some(node) => node,
            None => return,
        };

        out.push('<');
        out.push_str(&node.tag);
        if !node.classes.is_empty() {
            out.push_str(&format!(" class=\"{}\"", node.classes.iter().join(" ")));
        }
        for (name, value) in &node.attributes {
            out.push_str(&format!(" {}=\"{}\"", name, escape(value)));
        }
        out.push('>');
        out.push_str(&escape(&node.text));
        for &child in &node.children {
            self.write_markup(child, out);
        }
        out.push_str(&format!("</{}>", node.tag));
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.revision += 1;
        self.nodes.get_mut(id.0)
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.body() {
                return true;
            }
            current = self.node(node).and_then(Node::parent);
        }
        false
    }
}

impl Document for MemoryDocument {
    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.body())
            .into_iter()
            .find(|&n| self.attribute(n, "id") == Some(id))
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.revision += 1;
        self.nodes.push(Node::new(tag));
        NodeId(self.nodes.len() - 1)
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(node) = self.node_mut(node) {
            node.text = text.to_owned();
        }
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(node) = self.node_mut(node) {
            if !node.has_class(class) {
                node.classes.push(class.to_owned());
            }
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(node) = self.node_mut(node) {
            node.attributes.insert(name.to_owned(), value.to_owned());
        }
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.node(parent).is_none() || self.node(child).is_none() {
            log::warn!("Refusing to append {:?} to {:?}", child, parent);
            return;
        }
        // no cycles: `parent` must not live below `child`
        if self.descendants(child).contains(&parent) {
            log::warn!("Refusing to append {:?} below its own descendant", child);
            return;
        }

        if let Some(old_parent) = self.nodes[child.0].parent {
            self.nodes[old_parent.0].children.retain(|&c| c != child);
        }
        self.revision += 1;
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn clear_children(&mut self, node: NodeId) {
        let children = match self.node_mut(node) {
            Some(node) => std::mem::take(&mut node.children),
            None => return,
        };
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
