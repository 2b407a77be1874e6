//! Shell view: nestable structural containers built on atoms.
//!
//! # Responsibility
//! - Create and type shells (title, given/claim marking, given children).
//! - Compute lexical-scope accessibility between atoms.
//! - Convert shell structure into logic concepts for validation.
//!
//! # Invariants
//! - A node earlier in document order is accessible to a later one iff its
//!   nearest enclosing shell (or the document itself) also encloses the later
//!   node. Contents of a shell closed before the target are never accessible.
//! - Shell contents live in the shell's `body` slot.

use crate::model::atom::{Atom, AtomError, AtomSlot};
use crate::model::document::{DocumentTree, NodeId, NodeKind};
use crate::model::logic::{Environment, Expression, LcAttribute, LogicConcept};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// JSON metadata key an atom uses to carry its expression text.
pub const LC_METADATA_KEY: &str = "lc";

/// Kind of structural container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShellType {
    /// Untitled grouping.
    Environment,
    Premise,
    Rule,
    Axiom,
    Theorem,
    Proof,
    Subproof,
    /// Restates an earlier rule as a hint to validation.
    Recall,
}

impl ShellType {
    pub const ALL: [ShellType; 8] = [
        Self::Environment,
        Self::Premise,
        Self::Rule,
        Self::Axiom,
        Self::Theorem,
        Self::Proof,
        Self::Subproof,
        Self::Recall,
    ];

    /// Stable `type` metadata value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Environment => "environment",
            Self::Premise => "premise",
            Self::Rule => "rule",
            Self::Axiom => "axiom",
            Self::Theorem => "theorem",
            Self::Proof => "proof",
            Self::Subproof => "subproof",
            Self::Recall => "recall",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|ty| ty.as_str() == value.trim())
    }

    /// Visible title, if the type has one.
    pub fn title(self) -> Option<&'static str> {
        match self {
            Self::Environment | Self::Subproof => None,
            Self::Premise => Some("Premise"),
            Self::Rule => Some("Rule"),
            Self::Axiom => Some("Axiom"),
            Self::Theorem => Some("Theorem"),
            Self::Proof => Some("Proof"),
            Self::Recall => Some("Recall"),
        }
    }

    /// Attributes placed on the shell's own environment.
    pub fn shell_attributes(self) -> &'static [LcAttribute] {
        match self {
            Self::Environment | Self::Proof | Self::Subproof => &[],
            Self::Premise => &[LcAttribute::Given],
            Self::Rule | Self::Axiom => &[LcAttribute::Given, LcAttribute::Rule],
            Self::Theorem => &[LcAttribute::Theorem],
            Self::Recall => &[LcAttribute::Given, LcAttribute::Hint],
        }
    }

    /// Whether the shell's children become givens.
    pub fn children_given(self) -> bool {
        matches!(self, Self::Rule | Self::Axiom)
    }
}

/// Shell operation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellError {
    NotAShell(NodeId),
    UnknownType { node: NodeId, value: String },
    MissingType(NodeId),
    Atom(AtomError),
}

impl Display for ShellError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAShell(id) => write!(f, "node is not a shell: {id}"),
            Self::UnknownType { node, value } => {
                write!(f, "unknown shell type `{value}` on {node}")
            }
            Self::MissingType(id) => write!(f, "shell has no type: {id}"),
            Self::Atom(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ShellError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Atom(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AtomError> for ShellError {
    fn from(value: AtomError) -> Self {
        Self::Atom(value)
    }
}

impl From<crate::model::document::TreeError> for ShellError {
    fn from(value: crate::model::document::TreeError) -> Self {
        Self::Atom(AtomError::Tree(value))
    }
}

pub type ShellResult<T> = Result<T, ShellError>;

/// Where an accessible node lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessibleNode {
    /// Node of the header (dependency) document.
    Header(NodeId),
    /// Node of the main document.
    Document(NodeId),
}

/// Marker predicate: can `node` be wrapped as a `Shell`?
pub fn is_shell_node(tree: &DocumentTree, node: NodeId) -> bool {
    tree.kind(node) == Some(NodeKind::Shell)
}

/// Disposable typed view over a shell node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shell {
    atom: Atom,
}

impl Shell {
    /// Factory: wraps `node` when its kind tag is Shell.
    pub fn from_node(tree: &DocumentTree, node: NodeId) -> Option<Self> {
        if !is_shell_node(tree, node) {
            return None;
        }
        Atom::from_node(tree, node).map(|atom| Self { atom })
    }

    /// Creates a detached shell with its title and an empty body.
    pub fn create(tree: &mut DocumentTree, shell_type: ShellType) -> ShellResult<Self> {
        let atom = Atom::create_with_kind(tree, NodeKind::Shell, shell_type.as_str(), true)?;
        let shell = Self { atom };
        shell.render_title(tree, shell_type)?;
        atom.get_child(tree, AtomSlot::Body, true)?;
        Ok(shell)
    }

    pub fn atom(&self) -> Atom {
        self.atom
    }

    pub fn node(&self) -> NodeId {
        self.atom.node()
    }

    pub fn shell_type(&self, tree: &DocumentTree) -> ShellResult<ShellType> {
        let value = self
            .atom
            .atom_type(tree)?
            .ok_or(ShellError::MissingType(self.node()))?;
        ShellType::parse(&value).ok_or(ShellError::UnknownType {
            node: self.node(),
            value,
        })
    }

    /// Retypes the shell and refreshes its title.
    pub fn set_shell_type(&self, tree: &mut DocumentTree, shell_type: ShellType) -> ShellResult<()> {
        self.atom.set_metadata(
            tree,
            crate::model::atom::TYPE_METADATA_KEY,
            serde_json::Value::String(shell_type.as_str().to_string()),
        )?;
        self.render_title(tree, shell_type)
    }

    pub fn title(&self, tree: &DocumentTree) -> ShellResult<Option<&'static str>> {
        Ok(self.shell_type(tree)?.title())
    }

    /// Body slot holding the shell's contents.
    pub fn body(&self, tree: &mut DocumentTree) -> ShellResult<NodeId> {
        self.atom
            .get_child(tree, AtomSlot::Body, true)?
            .ok_or(ShellError::NotAShell(self.node()))
    }

    /// Appends `node` at the end of the shell body.
    pub fn append(&self, tree: &mut DocumentTree, node: NodeId) -> ShellResult<()> {
        let body = self.body(tree)?;
        tree.append_child(body, node)?;
        Ok(())
    }

    /// Atoms and shells directly inside this shell, in document order.
    pub fn child_atoms(&self, tree: &DocumentTree) -> Vec<Atom> {
        direct_atoms_under(tree, Some(self.node()))
    }

    /// Nearest shell strictly enclosing `node`.
    pub fn enclosing(tree: &DocumentTree, node: NodeId) -> Option<Self> {
        let mut cursor = tree.parent(node);
        while let Some(current) = cursor {
            if let Some(shell) = Self::from_node(tree, current) {
                return Some(shell);
            }
            cursor = tree.parent(current);
        }
        None
    }

    /// Whether `earlier` is in lexical scope at `target`.
    ///
    /// Walks `target`'s enclosing-shell chain looking for the scope that
    /// encloses `earlier`; the document root scope encloses everything.
    pub fn is_accessible(tree: &DocumentTree, earlier: NodeId, target: NodeId) -> bool {
        if earlier == target || !precedes(tree, earlier, target) {
            return false;
        }
        in_scope_of(tree, earlier, target)
    }

    /// Everything accessible to `target`: top-level header nodes first, then
    /// main-document atoms strictly before `target` that are in scope.
    pub fn accessibles(
        tree: &DocumentTree,
        target: NodeId,
        header: Option<&DocumentTree>,
    ) -> Vec<AccessibleNode> {
        let mut result = Vec::new();
        if let Some(header) = header {
            result.extend(
                header
                    .find_all(NodeKind::is_atom_like)
                    .into_iter()
                    .filter(|node| Self::enclosing(header, *node).is_none())
                    .map(AccessibleNode::Header),
            );
        }
        result.extend(
            tree.find_all(NodeKind::is_atom_like)
                .into_iter()
                .filter(|node| precedes(tree, *node, target) && in_scope_of(tree, *node, target))
                .map(AccessibleNode::Document),
        );
        result
    }

    /// Applies type-driven marking to the environment built for this shell.
    pub fn finalize(&self, tree: &DocumentTree, lc: &mut LogicConcept) -> ShellResult<()> {
        let shell_type = self.shell_type(tree)?;
        for attribute in shell_type.shell_attributes() {
            lc.make_into_a(*attribute);
        }
        if shell_type.children_given() {
            for child in lc.children_mut() {
                child.make_into_a(LcAttribute::Given);
            }
        }
        Ok(())
    }

    /// Converts this shell (recursively) into one finalized environment.
    pub fn to_lc(&self, tree: &DocumentTree) -> ShellResult<LogicConcept> {
        let mut env = Environment::new();
        for child in self.child_atoms(tree) {
            if let Some(lc) = atom_to_lc(tree, child)? {
                env.push_child(lc);
            }
        }
        let mut lc = LogicConcept::Environment(env);
        self.finalize(tree, &mut lc)?;
        Ok(lc)
    }

    fn render_title(&self, tree: &mut DocumentTree, shell_type: ShellType) -> ShellResult<()> {
        match shell_type.title() {
            Some(title) => {
                self.atom.fill_child(tree, AtomSlot::Prefix, title)?;
            }
            None => {
                if let Some(prefix) = self.atom.child(tree, AtomSlot::Prefix) {
                    tree.remove(prefix)?;
                }
            }
        }
        Ok(())
    }
}

/// Converts the top level of a document into logic concepts.
pub fn document_to_lcs(tree: &DocumentTree) -> ShellResult<Vec<LogicConcept>> {
    let mut result = Vec::new();
    for atom in direct_atoms_under(tree, None) {
        if let Some(lc) = atom_to_lc(tree, atom)? {
            result.push(lc);
        }
    }
    Ok(result)
}

fn atom_to_lc(tree: &DocumentTree, atom: Atom) -> ShellResult<Option<LogicConcept>> {
    if let Some(shell) = Shell::from_node(tree, atom.node()) {
        return shell.to_lc(tree).map(Some);
    }
    let text = atom
        .metadata(tree, LC_METADATA_KEY)?
        .and_then(|value| value.as_str().map(str::to_string));
    Ok(text.map(|text| LogicConcept::Expression(Expression::new(text))))
}

fn direct_atoms_under(tree: &DocumentTree, container: Option<NodeId>) -> Vec<Atom> {
    let start = container.unwrap_or_else(|| tree.root());
    tree.descendants_inclusive(start)
        .into_iter()
        .filter(|node| *node != start)
        .filter(|node| nearest_atom_ancestor(tree, *node) == container)
        .filter_map(|node| Atom::from_node(tree, node))
        .collect()
}

fn nearest_atom_ancestor(tree: &DocumentTree, node: NodeId) -> Option<NodeId> {
    let mut cursor = tree.parent(node);
    while let Some(current) = cursor {
        if tree.kind(current).is_some_and(NodeKind::is_atom_like) {
            return Some(current);
        }
        cursor = tree.parent(current);
    }
    None
}

/// True when the scope enclosing `earlier` also encloses `target`.
fn in_scope_of(tree: &DocumentTree, earlier: NodeId, target: NodeId) -> bool {
    let Some(scope) = Shell::enclosing(tree, earlier) else {
        return true;
    };
    let mut cursor = Shell::enclosing(tree, target);
    while let Some(shell) = cursor {
        if shell == scope {
            return true;
        }
        cursor = Shell::enclosing(tree, shell.node());
    }
    false
}

/// Strict document-order comparison (ancestors precede descendants).
fn precedes(tree: &DocumentTree, a: NodeId, b: NodeId) -> bool {
    let mut chain_a = tree.ancestors_inclusive(a);
    let mut chain_b = tree.ancestors_inclusive(b);
    chain_a.reverse();
    chain_b.reverse();
    if chain_a.first() != chain_b.first() {
        return false;
    }

    let shared = chain_a
        .iter()
        .zip(chain_b.iter())
        .take_while(|(x, y)| x == y)
        .count();
    match (chain_a.get(shared), chain_b.get(shared)) {
        (None, Some(_)) => true,
        (Some(next_a), Some(next_b)) => {
            let siblings = tree.children(chain_a[shared - 1]);
            let index_a = siblings.iter().position(|id| id == next_a);
            let index_b = siblings.iter().position(|id| id == next_b);
            index_a < index_b
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{precedes, AccessibleNode, Shell, ShellType};
    use crate::model::atom::{Atom, AtomSlot, AtomState};
    use crate::model::document::DocumentTree;

    #[test]
    fn precedes_orders_siblings_and_ancestors() {
        let mut tree = DocumentTree::new();
        let a = tree.create_element("p");
        let b = tree.create_element("p");
        let c = tree.create_element("p");
        let root = tree.root();
        tree.append_child(root, a).expect("append a");
        tree.append_child(root, b).expect("append b");
        tree.append_child(b, c).expect("append c");

        assert!(precedes(&tree, a, b));
        assert!(precedes(&tree, a, c));
        assert!(precedes(&tree, b, c));
        assert!(!precedes(&tree, c, b));
        assert!(!precedes(&tree, b, a));
    }

    #[test]
    fn shell_types_round_trip_through_metadata() {
        let mut tree = DocumentTree::new();
        let shell = Shell::create(&mut tree, ShellType::Theorem).expect("create");
        assert_eq!(shell.shell_type(&tree), Ok(ShellType::Theorem));
        assert_eq!(shell.title(&tree), Ok(Some("Theorem")));

        shell
            .set_shell_type(&mut tree, ShellType::Subproof)
            .expect("retype");
        assert_eq!(shell.title(&tree), Ok(None));
        assert!(shell.atom().child(&tree, AtomSlot::Prefix).is_none());
    }

    #[test]
    fn accessibles_stop_before_targets_inside_atoms() {
        let mut tree = DocumentTree::new();
        let root = tree.root();
        let a = Atom::create(&mut tree, "expression", true).expect("a");
        let b = Atom::create(&mut tree, "expression", true).expect("b");
        let c = Atom::create(&mut tree, "expression", true).expect("c");
        for atom in [a, b, c] {
            tree.append_child(root, atom.node()).expect("attach");
        }
        let body = b
            .fill_child(&mut tree, AtomSlot::Body, "y")
            .expect("fill body");

        assert_eq!(
            Shell::accessibles(&tree, body, None),
            vec![
                AccessibleNode::Document(a.node()),
                AccessibleNode::Document(b.node())
            ]
        );

        let detached = tree.create_element("p");
        assert!(Shell::accessibles(&tree, detached, None).is_empty());
    }

    #[test]
    fn fresh_titled_shell_is_still_created() {
        let mut tree = DocumentTree::new();
        let shell = Shell::create(&mut tree, ShellType::Theorem).expect("create");
        assert_eq!(shell.atom().state(&tree), AtomState::Created);

        let inner = Atom::create(&mut tree, "expression", false).expect("atom");
        shell.append(&mut tree, inner.node()).expect("append");
        assert_eq!(shell.atom().state(&tree), AtomState::Populated);
    }

    #[test]
    fn plain_atoms_are_not_shells() {
        let mut tree = DocumentTree::new();
        let atom = Atom::create(&mut tree, "expression", false).expect("atom");
        assert!(Shell::from_node(&tree, atom.node()).is_none());
        assert!(Atom::from_node(&tree, atom.node()).is_some());
    }
}
