//! Routes editor clicks to per-type atom handlers.
//!
//! # Invariants
//! - A click resolves to the nearest enclosing atom or shell node.
//! - Unregistered shell types fall back to the default shell handler.
//! - Unregistered atom types are logged and ignored.

use crate::model::atom::Atom;
use crate::model::document::{DocumentTree, NodeId, NodeKind};
use log::{debug, info};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Handler invoked with the clicked atom.
pub type ClickHandler = Arc<dyn Fn(&mut DocumentTree, Atom) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A type-specific handler ran.
    Dispatched { node: NodeId, atom_type: String },
    /// An unregistered shell went to the default shell handler.
    ShellDefault { node: NodeId },
    /// An atom of an unregistered type; nothing ran.
    Unhandled { node: NodeId, atom_type: Option<String> },
    /// The click was outside every atom.
    NoAtom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickRouterError {
    InvalidType(String),
    DuplicateType(String),
}

impl Display for ClickRouterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidType(value) => write!(f, "atom type is invalid: `{value}`"),
            Self::DuplicateType(value) => write!(f, "atom type already has a handler: {value}"),
        }
    }
}

impl Error for ClickRouterError {}

pub struct ClickRouter {
    handlers: BTreeMap<String, ClickHandler>,
    shell_default: ClickHandler,
}

impl ClickRouter {
    /// Router whose unregistered shells go to `shell_default`.
    pub fn new<F>(shell_default: F) -> Self
    where
        F: Fn(&mut DocumentTree, Atom) + Send + Sync + 'static,
    {
        Self {
            handlers: BTreeMap::new(),
            shell_default: Arc::new(shell_default),
        }
    }

    pub fn register<F>(&mut self, atom_type: &str, handler: F) -> Result<(), ClickRouterError>
    where
        F: Fn(&mut DocumentTree, Atom) + Send + Sync + 'static,
    {
        let atom_type = atom_type.trim().to_string();
        if atom_type.is_empty() {
            return Err(ClickRouterError::InvalidType(atom_type));
        }
        if self.handlers.contains_key(atom_type.as_str()) {
            return Err(ClickRouterError::DuplicateType(atom_type));
        }
        self.handlers.insert(atom_type, Arc::new(handler));
        Ok(())
    }

    /// Registered types, sorted.
    pub fn types(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    pub fn route(&self, tree: &mut DocumentTree, clicked: NodeId) -> ClickOutcome {
        let view: &DocumentTree = tree;
        let Some(atom) = view
            .ancestors_inclusive(clicked)
            .into_iter()
            .find_map(|node| Atom::from_node(view, node))
        else {
            return ClickOutcome::NoAtom;
        };

        let node = atom.node();
        let atom_type = atom.atom_type(tree).ok().flatten();
        if let Some(handler) = atom_type
            .as_deref()
            .and_then(|value| self.handlers.get(value))
            .cloned()
        {
            let atom_type = atom_type.unwrap_or_default();
            debug!(
                "event=click_route module=click status=dispatched node={} type={}",
                node, atom_type
            );
            handler(tree, atom);
            return ClickOutcome::Dispatched { node, atom_type };
        }

        if tree.kind(node) == Some(NodeKind::Shell) {
            debug!(
                "event=click_route module=click status=shell_default node={}",
                node
            );
            (self.shell_default)(tree, atom);
            return ClickOutcome::ShellDefault { node };
        }

        info!(
            "event=click_route module=click status=unhandled node={} type={}",
            node,
            atom_type.as_deref().unwrap_or("none")
        );
        ClickOutcome::Unhandled { node, atom_type }
    }
}
