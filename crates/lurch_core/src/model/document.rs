//! Document tree: the node store that Atom and Shell views wrap.
//!
//! # Responsibility
//! - Own every node of one document (arena-allocated, stable `NodeId`s).
//! - Carry an explicit `NodeKind` tag per node so Atom/Shell identity is
//!   read from node data instead of guessed from attributes.
//! - Provide document-order and ancestry queries used by scoping.
//!
//! # Invariants
//! - The root node always exists and is never detached.
//! - A node has at most one parent; the parent lists it exactly once.
//! - Removed nodes keep their id and data but are no longer attached.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable node handle within one `DocumentTree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Explicit node-kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Document root.
    Root,
    /// Plain structural element.
    Element,
    /// Atom marker node.
    Atom,
    /// Shell marker node (an Atom specialisation).
    Shell,
    /// Escaped text leaf.
    Text,
    /// Verbatim HTML leaf.
    RawHtml,
}

impl NodeKind {
    /// True for nodes that can be wrapped as an `Atom` view.
    pub fn is_atom_like(self) -> bool {
        matches!(self, Self::Atom | Self::Shell)
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    tag: String,
    attributes: BTreeMap<String, String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    removed: bool,
    revision: u32,
}

impl Node {
    fn new(kind: NodeKind, tag: &str) -> Self {
        Self {
            kind,
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
            removed: false,
            revision: 0,
        }
    }
}

/// Tree mutation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    NodeNotFound(NodeId),
    /// The root cannot be moved or removed.
    RootImmovable,
    /// Inserting would make a node its own ancestor.
    CycleDetected { node: NodeId, parent: NodeId },
    /// Leaf nodes (text, raw HTML) cannot have children.
    LeafParent(NodeId),
}

impl Display for TreeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "node not found: {id}"),
            Self::RootImmovable => write!(f, "document root cannot be moved or removed"),
            Self::CycleDetected { node, parent } => {
                write!(f, "inserting {node} under {parent} would create a cycle")
            }
            Self::LeafParent(id) => write!(f, "leaf node cannot have children: {id}"),
        }
    }
}

impl Error for TreeError {}

pub type TreeResult<T> = Result<T, TreeError>;

/// Arena-backed document tree.
#[derive(Debug, Clone)]
pub struct DocumentTree {
    nodes: Vec<Node>,
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Root, "body")],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn node(&self, id: NodeId) -> TreeResult<&Node> {
        self.nodes.get(id.0).ok_or(TreeError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> TreeResult<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(TreeError::NodeNotFound(id))
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Creates a detached element node.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::new(NodeKind::Element, tag))
    }

    /// Creates a detached node with an explicit kind tag.
    pub fn create_node(&mut self, kind: NodeKind, tag: &str) -> NodeId {
        self.push(Node::new(kind, tag))
    }

    /// Creates a detached text leaf.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        let mut node = Node::new(NodeKind::Text, "#text");
        node.text = text.to_string();
        self.push(node)
    }

    /// Creates a detached verbatim HTML leaf.
    pub fn create_raw_html(&mut self, html: &str) -> NodeId {
        let mut node = Node::new(NodeKind::RawHtml, "#html");
        node.text = html.to_string();
        self.push(node)
    }

    pub fn contains_id(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes.get(id.0).map(|node| node.kind)
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id.0).map(|node| node.tag.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn attribute(&self, id: NodeId, key: &str) -> Option<&str> {
        self.nodes
            .get(id.0)
            .and_then(|node| node.attributes.get(key))
            .map(String::as_str)
    }

    pub fn attribute_keys(&self, id: NodeId) -> Vec<String> {
        self.nodes
            .get(id.0)
            .map(|node| node.attributes.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn set_attribute(&mut self, id: NodeId, key: &str, value: &str) -> TreeResult<()> {
        self.node_mut(id)?
            .attributes
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, key: &str) -> TreeResult<bool> {
        Ok(self.node_mut(id)?.attributes.remove(key).is_some())
    }

    /// Leaf text (text and raw HTML nodes); empty for other kinds.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id.0).map(|node| node.text.as_str())
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) -> TreeResult<()> {
        let node = self.node_mut(id)?;
        node.text = text.to_string();
        Ok(())
    }

    /// Content revision counter, bumped by `touch`.
    pub fn revision(&self, id: NodeId) -> u32 {
        self.nodes.get(id.0).map_or(0, |node| node.revision)
    }

    /// Records one content mutation on `id`.
    pub fn touch(&mut self, id: NodeId) -> TreeResult<()> {
        let node = self.node_mut(id)?;
        node.revision = node.revision.saturating_add(1);
        Ok(())
    }

    /// True once `remove` was called on `id` or one of its ancestors.
    pub fn is_removed(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            match self.nodes.get(current.0) {
                Some(node) if node.removed => return true,
                Some(node) => cursor = node.parent,
                None => return false,
            }
        }
        false
    }

    /// True when `id` is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.ancestors_inclusive(id).last().copied() == Some(self.root())
    }

    /// Appends `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        let index = self.node(parent)?.children.len();
        self.insert_child(parent, index, child)
    }

    /// Inserts `child` at `index` under `parent`, detaching it first.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> TreeResult<()> {
        if child == self.root() {
            return Err(TreeError::RootImmovable);
        }
        let parent_kind = self.node(parent)?.kind;
        self.node(child)?;
        if matches!(parent_kind, NodeKind::Text | NodeKind::RawHtml) {
            return Err(TreeError::LeafParent(parent));
        }
        if self.ancestors_inclusive(parent).contains(&child) {
            return Err(TreeError::CycleDetected {
                node: child,
                parent,
            });
        }

        self.detach(child)?;
        let siblings = &mut self.node_mut(parent)?.children;
        let index = index.min(siblings.len());
        siblings.insert(index, child);
        let node = self.node_mut(child)?;
        node.parent = Some(parent);
        node.removed = false;
        Ok(())
    }

    /// Detaches `id` from the tree and marks it removed.
    pub fn remove(&mut self, id: NodeId) -> TreeResult<()> {
        if id == self.root() {
            return Err(TreeError::RootImmovable);
        }
        self.detach(id)?;
        self.node_mut(id)?.removed = true;
        Ok(())
    }

    /// Removes every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) -> TreeResult<()> {
        let children = self.node(id)?.children.clone();
        for child in children {
            self.remove(child)?;
        }
        Ok(())
    }

    fn detach(&mut self, id: NodeId) -> TreeResult<()> {
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent {
            self.node_mut(parent)?.children.retain(|child| *child != id);
        }
        self.node_mut(id)?.parent = None;
        Ok(())
    }

    /// `id` followed by each ancestor up to the topmost one.
    pub fn ancestors_inclusive(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut cursor = if self.contains_id(id) { Some(id) } else { None };
        while let Some(current) = cursor {
            chain.push(current);
            cursor = self.parent(current);
        }
        chain
    }

    /// True when `ancestor` strictly contains `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor != node && self.ancestors_inclusive(node).contains(&ancestor)
    }

    /// Pre-order traversal of the subtree rooted at `id`.
    pub fn descendants_inclusive(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        if !self.contains_id(id) {
            return order;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            order.push(current);
            for child in self.children(current).iter().rev() {
                stack.push(*child);
            }
        }
        order
    }

    /// Attached nodes in document order.
    pub fn document_order(&self) -> Vec<NodeId> {
        self.descendants_inclusive(self.root())
    }

    /// Attached nodes satisfying `predicate`, in document order.
    pub fn find_all(&self, predicate: impl Fn(NodeKind) -> bool) -> Vec<NodeId> {
        self.document_order()
            .into_iter()
            .filter(|id| self.kind(*id).is_some_and(&predicate))
            .collect()
    }

    /// Concatenated text of all text/raw leaves under `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants_inclusive(id)
            .into_iter()
            .filter(|node| matches!(self.kind(*node), Some(NodeKind::Text | NodeKind::RawHtml)))
            .filter_map(|node| self.text(node))
            .collect()
    }

    /// Serialises the children of `id` as HTML.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(id) {
            self.write_html(*child, &mut out);
        }
        out
    }

    /// Serialises `id` and its subtree as HTML.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(id.0) else {
            return;
        };
        match node.kind {
            NodeKind::Text => out.push_str(&escape_html(&node.text)),
            NodeKind::RawHtml => out.push_str(&node.text),
            NodeKind::Root | NodeKind::Element | NodeKind::Atom | NodeKind::Shell => {
                out.push('<');
                out.push_str(&node.tag);
                for (key, value) in &node.attributes {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&escape_html(value));
                    out.push('"');
                }
                out.push('>');
                for child in &node.children {
                    self.write_html(*child, out);
                }
                out.push_str("</");
                out.push_str(&node.tag);
                out.push('>');
            }
        }
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}
