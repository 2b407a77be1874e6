//! Atom view over document tree nodes.
//!
//! # Responsibility
//! - Wrap one atom-kind node as a typed, disposable view.
//! - Manage positional child slots (`metadata`, `prefix`, `body`, `suffix`).
//! - Expose the flat JSON metadata map and the block-only HTML metadata map.
//!
//! # Invariants
//! - Identity lives in the tree node; views are `Copy` and never cached.
//! - Child slots are created lazily and kept in `AtomSlot` order.
//! - `metadata` slot and HTML metadata exist only on block atoms.
//! - Lifecycle is `Created -> Populated -> Mutated* -> Removed`; the body
//!   slot holding content marks `Populated`.

use crate::model::document::{DocumentTree, NodeId, NodeKind, TreeError};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

const SLOT_ATTRIBUTE: &str = "data-atom-child";
const METADATA_ATTRIBUTE_PREFIX: &str = "data-metadata-";
const HTML_METADATA_KEY_ATTRIBUTE: &str = "data-html-metadata-key";
const BLOCK_TAG: &str = "div";
const INLINE_TAG: &str = "span";

/// JSON metadata key holding the atom's declared type.
pub const TYPE_METADATA_KEY: &str = "type";

/// Positional child slot. Declaration order is document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AtomSlot {
    /// Invisible; block atoms only.
    Metadata,
    Prefix,
    Body,
    Suffix,
}

impl AtomSlot {
    pub const ALL: [AtomSlot; 4] = [Self::Metadata, Self::Prefix, Self::Body, Self::Suffix];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Metadata => "metadata",
            Self::Prefix => "prefix",
            Self::Body => "body",
            Self::Suffix => "suffix",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "metadata" => Some(Self::Metadata),
            "prefix" => Some(Self::Prefix),
            "body" => Some(Self::Body),
            "suffix" => Some(Self::Suffix),
            _ => None,
        }
    }
}

/// Atom lifecycle state derived from the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomState {
    Created,
    Populated,
    Mutated,
    Removed,
}

/// Atom operation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomError {
    /// The node is not tagged as an atom.
    NotAnAtom(NodeId),
    /// The requested feature exists only on block atoms.
    BlockOnly { node: NodeId, feature: &'static str },
    /// A stored metadata value is not valid JSON.
    CorruptMetadata { key: String, message: String },
    Tree(TreeError),
}

impl Display for AtomError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnAtom(id) => write!(f, "node is not an atom: {id}"),
            Self::BlockOnly { node, feature } => {
                write!(f, "{feature} is only available on block atoms ({node})")
            }
            Self::CorruptMetadata { key, message } => {
                write!(f, "metadata `{key}` is not valid JSON: {message}")
            }
            Self::Tree(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AtomError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Tree(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TreeError> for AtomError {
    fn from(value: TreeError) -> Self {
        Self::Tree(value)
    }
}

pub type AtomResult<T> = Result<T, AtomError>;

/// Disposable typed view over an atom node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Atom {
    node: NodeId,
    block: bool,
}

/// Marker predicate: can `node` be wrapped as an `Atom`?
pub fn is_atom_node(tree: &DocumentTree, node: NodeId) -> bool {
    tree.kind(node).is_some_and(NodeKind::is_atom_like)
}

impl Atom {
    /// Factory: wraps `node` when its kind tag is Atom or Shell.
    pub fn from_node(tree: &DocumentTree, node: NodeId) -> Option<Self> {
        if !is_atom_node(tree, node) {
            return None;
        }
        let block = tree.tag(node) != Some(INLINE_TAG);
        Some(Self { node, block })
    }

    /// Creates a detached atom node of `atom_type`.
    pub fn create(tree: &mut DocumentTree, atom_type: &str, block: bool) -> AtomResult<Self> {
        Self::create_with_kind(tree, NodeKind::Atom, atom_type, block)
    }

    pub(crate) fn create_with_kind(
        tree: &mut DocumentTree,
        kind: NodeKind,
        atom_type: &str,
        block: bool,
    ) -> AtomResult<Self> {
        let tag = if block { BLOCK_TAG } else { INLINE_TAG };
        let node = tree.create_node(kind, tag);
        let atom = Self { node, block };
        tree.set_attribute(
            node,
            &metadata_attribute(TYPE_METADATA_KEY),
            &Value::String(atom_type.to_string()).to_string(),
        )?;
        Ok(atom)
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn is_block(&self) -> bool {
        self.block
    }

    pub fn is_inline(&self) -> bool {
        !self.block
    }

    pub fn is_shell(&self, tree: &DocumentTree) -> bool {
        tree.kind(self.node) == Some(NodeKind::Shell)
    }

    /// Declared `type` metadata, when it is a JSON string.
    pub fn atom_type(&self, tree: &DocumentTree) -> AtomResult<Option<String>> {
        Ok(self
            .metadata(tree, TYPE_METADATA_KEY)?
            .and_then(|value| value.as_str().map(str::to_string)))
    }

    /// Lifecycle state. Only content changes made after the body was
    /// first filled count as mutations; metadata writes never do.
    pub fn state(&self, tree: &DocumentTree) -> AtomState {
        if tree.is_removed(self.node) {
            return AtomState::Removed;
        }
        if !self.is_populated(tree) {
            return AtomState::Created;
        }
        match tree.revision(self.node) {
            0 => AtomState::Populated,
            _ => AtomState::Mutated,
        }
    }

    /// True once the body slot holds content.
    pub fn is_populated(&self, tree: &DocumentTree) -> bool {
        self.child(tree, AtomSlot::Body)
            .is_some_and(|body| !tree.children(body).is_empty())
    }

    /// Existing child slot node, without creating it.
    pub fn child(&self, tree: &DocumentTree, slot: AtomSlot) -> Option<NodeId> {
        tree.children(self.node)
            .iter()
            .copied()
            .find(|child| slot_of(tree, *child) == Some(slot))
    }

    /// Returns the slot node, creating it in slot order when requested.
    ///
    /// Idempotent: an existing slot is returned unchanged.
    pub fn get_child(
        &self,
        tree: &mut DocumentTree,
        slot: AtomSlot,
        create_if_needed: bool,
    ) -> AtomResult<Option<NodeId>> {
        if let Some(existing) = self.child(tree, slot) {
            return Ok(Some(existing));
        }
        if !create_if_needed {
            return Ok(None);
        }
        if slot == AtomSlot::Metadata && !self.block {
            return Err(AtomError::BlockOnly {
                node: self.node,
                feature: "metadata slot",
            });
        }

        let tag = if self.block { BLOCK_TAG } else { INLINE_TAG };
        let child = tree.create_element(tag);
        tree.set_attribute(child, SLOT_ATTRIBUTE, slot.as_str())?;
        if slot == AtomSlot::Metadata {
            tree.set_attribute(child, "style", "display: none;")?;
        }
        let index = tree
            .children(self.node)
            .iter()
            .position(|existing| slot_of(tree, *existing).is_some_and(|other| other > slot))
            .unwrap_or(tree.children(self.node).len());
        tree.insert_child(self.node, index, child)?;
        Ok(Some(child))
    }

    /// Existing slots in slot order.
    pub fn children(&self, tree: &DocumentTree) -> Vec<(AtomSlot, NodeId)> {
        AtomSlot::ALL
            .iter()
            .filter_map(|slot| self.child(tree, *slot).map(|node| (*slot, node)))
            .collect()
    }

    /// Replaces the contents of `slot` with verbatim HTML.
    pub fn fill_child(&self, tree: &mut DocumentTree, slot: AtomSlot, html: &str) -> AtomResult<NodeId> {
        let was_populated = self.is_populated(tree);
        let child = self.require_child(tree, slot)?;
        tree.clear_children(child)?;
        let content = tree.create_raw_html(html);
        tree.append_child(child, content)?;
        if was_populated {
            tree.touch(self.node)?;
        }
        Ok(child)
    }

    /// HTML of `slot`, when it exists.
    pub fn child_html(&self, tree: &DocumentTree, slot: AtomSlot) -> Option<String> {
        self.child(tree, slot).map(|child| tree.inner_html(child))
    }

    /// Reads one JSON metadata value. Missing keys read as `None`.
    pub fn metadata(&self, tree: &DocumentTree, key: &str) -> AtomResult<Option<Value>> {
        match tree.attribute(self.node, &metadata_attribute(key)) {
            None => Ok(None),
            Some(raw) => serde_json::from_str(raw)
                .map(Some)
                .map_err(|err| AtomError::CorruptMetadata {
                    key: key.to_string(),
                    message: err.to_string(),
                }),
        }
    }

    /// Overwrites one JSON metadata value.
    pub fn set_metadata(&self, tree: &mut DocumentTree, key: &str, value: Value) -> AtomResult<()> {
        tree.set_attribute(self.node, &metadata_attribute(key), &value.to_string())?;
        Ok(())
    }

    pub fn remove_metadata(&self, tree: &mut DocumentTree, key: &str) -> AtomResult<bool> {
        Ok(tree.remove_attribute(self.node, &metadata_attribute(key))?)
    }

    /// JSON metadata keys, sorted.
    pub fn metadata_keys(&self, tree: &DocumentTree) -> Vec<String> {
        tree.attribute_keys(self.node)
            .into_iter()
            .filter_map(|key| key.strip_prefix(METADATA_ATTRIBUTE_PREFIX).map(str::to_string))
            .collect()
    }

    /// Reads one HTML metadata entry.
    pub fn html_metadata(&self, tree: &DocumentTree, key: &str) -> Option<String> {
        let slot = self.child(tree, AtomSlot::Metadata)?;
        self.html_metadata_node(tree, slot, key)
            .map(|entry| tree.inner_html(entry))
    }

    /// Overwrites one HTML metadata entry. Block atoms only.
    pub fn set_html_metadata(&self, tree: &mut DocumentTree, key: &str, html: &str) -> AtomResult<()> {
        if !self.block {
            return Err(AtomError::BlockOnly {
                node: self.node,
                feature: "HTML metadata",
            });
        }
        let slot = self.require_child(tree, AtomSlot::Metadata)?;
        let entry = match self.html_metadata_node(tree, slot, key) {
            Some(entry) => {
                tree.clear_children(entry)?;
                entry
            }
            None => {
                let entry = tree.create_element(BLOCK_TAG);
                tree.set_attribute(entry, HTML_METADATA_KEY_ATTRIBUTE, key)?;
                tree.append_child(slot, entry)?;
                entry
            }
        };
        let content = tree.create_raw_html(html);
        tree.append_child(entry, content)?;
        Ok(())
    }

    pub fn remove_html_metadata(&self, tree: &mut DocumentTree, key: &str) -> AtomResult<bool> {
        let Some(slot) = self.child(tree, AtomSlot::Metadata) else {
            return Ok(false);
        };
        let Some(entry) = self.html_metadata_node(tree, slot, key) else {
            return Ok(false);
        };
        tree.remove(entry)?;
        Ok(true)
    }

    /// HTML metadata keys in insertion order.
    pub fn html_metadata_keys(&self, tree: &DocumentTree) -> Vec<String> {
        let Some(slot) = self.child(tree, AtomSlot::Metadata) else {
            return Vec::new();
        };
        tree.children(slot)
            .iter()
            .filter_map(|entry| tree.attribute(*entry, HTML_METADATA_KEY_ATTRIBUTE))
            .map(str::to_string)
            .collect()
    }

    /// Visible text of prefix, body and suffix.
    pub fn text(&self, tree: &DocumentTree) -> String {
        self.children(tree)
            .into_iter()
            .filter(|(slot, _)| *slot != AtomSlot::Metadata)
            .map(|(_, node)| tree.text_content(node))
            .collect()
    }

    /// Detaches the atom from its document.
    pub fn remove(&self, tree: &mut DocumentTree) -> AtomResult<()> {
        tree.remove(self.node)?;
        Ok(())
    }

    fn require_child(&self, tree: &mut DocumentTree, slot: AtomSlot) -> AtomResult<NodeId> {
        self.get_child(tree, slot, true)?
            .ok_or(AtomError::NotAnAtom(self.node))
    }

    fn html_metadata_node(&self, tree: &DocumentTree, slot: NodeId, key: &str) -> Option<NodeId> {
        tree.children(slot)
            .iter()
            .copied()
            .find(|entry| tree.attribute(*entry, HTML_METADATA_KEY_ATTRIBUTE) == Some(key))
    }
}

fn metadata_attribute(key: &str) -> String {
    format!("{METADATA_ATTRIBUTE_PREFIX}{key}")
}

fn slot_of(tree: &DocumentTree, node: NodeId) -> Option<AtomSlot> {
    tree.attribute(node, SLOT_ATTRIBUTE).and_then(AtomSlot::parse)
}

#[cfg(test)]
mod tests {
    use super::{Atom, AtomError, AtomSlot, AtomState};
    use crate::model::document::DocumentTree;
    use serde_json::json;

    fn attached_atom(tree: &mut DocumentTree, block: bool) -> Atom {
        let atom = Atom::create(tree, "expression", block).expect("create atom");
        let root = tree.root();
        tree.append_child(root, atom.node()).expect("attach atom");
        atom
    }

    #[test]
    fn slots_are_created_lazily_in_fixed_order() {
        let mut tree = DocumentTree::new();
        let atom = attached_atom(&mut tree, true);

        let suffix = atom
            .get_child(&mut tree, AtomSlot::Suffix, true)
            .expect("suffix")
            .expect("created");
        let body = atom
            .get_child(&mut tree, AtomSlot::Body, true)
            .expect("body")
            .expect("created");
        let metadata = atom
            .get_child(&mut tree, AtomSlot::Metadata, true)
            .expect("metadata")
            .expect("created");

        assert_eq!(tree.children(atom.node()), &[metadata, body, suffix]);
        let again = atom
            .get_child(&mut tree, AtomSlot::Body, true)
            .expect("body again");
        assert_eq!(again, Some(body));
        assert_eq!(atom.get_child(&mut tree, AtomSlot::Prefix, false), Ok(None));
    }

    #[test]
    fn inline_atoms_reject_block_only_features() {
        let mut tree = DocumentTree::new();
        let atom = attached_atom(&mut tree, false);

        let err = atom
            .get_child(&mut tree, AtomSlot::Metadata, true)
            .expect_err("inline metadata slot must fail");
        assert!(matches!(err, AtomError::BlockOnly { .. }));
        let err = atom
            .set_html_metadata(&mut tree, "notes", "<p>x</p>")
            .expect_err("inline html metadata must fail");
        assert!(matches!(err, AtomError::BlockOnly { .. }));
    }

    #[test]
    fn json_metadata_overwrites_and_reads_missing_as_none() {
        let mut tree = DocumentTree::new();
        let atom = attached_atom(&mut tree, false);

        assert_eq!(atom.metadata(&tree, "missing"), Ok(None));
        atom.set_metadata(&mut tree, "count", json!(1)).expect("set");
        atom.set_metadata(&mut tree, "count", json!(2)).expect("overwrite");
        assert_eq!(atom.metadata(&tree, "count"), Ok(Some(json!(2))));
        assert_eq!(atom.atom_type(&tree), Ok(Some("expression".to_string())));
        assert_eq!(atom.metadata_keys(&tree), vec!["count", "type"]);
    }

    #[test]
    fn html_metadata_lives_in_hidden_slot() {
        let mut tree = DocumentTree::new();
        let atom = attached_atom(&mut tree, true);

        atom.set_html_metadata(&mut tree, "notes", "<p>first</p>")
            .expect("set");
        atom.set_html_metadata(&mut tree, "notes", "<p>second</p>")
            .expect("overwrite");
        assert_eq!(
            atom.html_metadata(&tree, "notes").as_deref(),
            Some("<p>second</p>")
        );
        assert_eq!(atom.html_metadata_keys(&tree), vec!["notes"]);
        assert!(atom.child(&tree, AtomSlot::Metadata).is_some());

        assert_eq!(atom.remove_html_metadata(&mut tree, "notes"), Ok(true));
        assert_eq!(atom.html_metadata(&tree, "notes"), None);
    }

    #[test]
    fn lifecycle_moves_from_created_to_removed() {
        let mut tree = DocumentTree::new();
        let atom = attached_atom(&mut tree, false);
        assert_eq!(atom.state(&tree), AtomState::Created);

        atom.fill_child(&mut tree, AtomSlot::Body, "x + 1")
            .expect("fill body");
        assert_eq!(atom.state(&tree), AtomState::Populated);
        assert_eq!(atom.text(&tree), "x + 1");

        atom.fill_child(&mut tree, AtomSlot::Body, "x + 2")
            .expect("refill body");
        assert_eq!(atom.state(&tree), AtomState::Mutated);

        atom.remove(&mut tree).expect("remove");
        assert_eq!(atom.state(&tree), AtomState::Removed);
    }

    #[test]
    fn metadata_writes_do_not_advance_lifecycle() {
        let mut tree = DocumentTree::new();
        let atom = attached_atom(&mut tree, true);

        atom.set_metadata(&mut tree, "count", json!(1)).expect("set");
        atom.set_metadata(&mut tree, "count", json!(2)).expect("overwrite");
        atom.set_html_metadata(&mut tree, "notes", "<p>n</p>")
            .expect("html metadata");
        assert_eq!(atom.state(&tree), AtomState::Created);

        atom.fill_child(&mut tree, AtomSlot::Prefix, "Let")
            .expect("fill prefix");
        assert_eq!(atom.state(&tree), AtomState::Created);

        atom.fill_child(&mut tree, AtomSlot::Body, "x")
            .expect("fill body");
        atom.set_metadata(&mut tree, "count", json!(3)).expect("set");
        assert_eq!(atom.state(&tree), AtomState::Populated);
    }

    #[test]
    fn from_node_rejects_plain_elements() {
        let mut tree = DocumentTree::new();
        let element = tree.create_element("p");
        assert!(Atom::from_node(&tree, element).is_none());
    }
}
