//! Name-keyed registry of backend factories.
//!
//! # Invariants
//! - Names are trimmed, non-empty and unique.
//! - The registry is immutable once built; registration order is tab order.

use crate::fs::backend::{FileSystem, FileSystemContext};
use crate::fs::capability::FileOperation;
use log::warn;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Builds one fresh backend instance for an operation.
pub type FileSystemFactory = Arc<dyn Fn(&FileSystemContext) -> Box<dyn FileSystem> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    InvalidName(String),
    DuplicateName(String),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(value) => write!(f, "file system name is invalid: `{value}`"),
            Self::DuplicateName(value) => {
                write!(f, "file system name already registered: {value}")
            }
        }
    }
}

impl Error for RegistryError {}

/// Collects factories before the registry is frozen.
#[derive(Default)]
pub struct FileSystemRegistryBuilder {
    order: Vec<String>,
    factories: BTreeMap<String, FileSystemFactory>,
}

impl FileSystemRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: &str, factory: F) -> Result<(), RegistryError>
    where
        F: Fn(&FileSystemContext) -> Box<dyn FileSystem> + Send + Sync + 'static,
    {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(RegistryError::InvalidName(name));
        }
        if self.factories.contains_key(name.as_str()) {
            return Err(RegistryError::DuplicateName(name));
        }

        self.order.push(name.clone());
        self.factories.insert(name, Arc::new(factory));
        Ok(())
    }

    pub fn build(self) -> FileSystemRegistry {
        FileSystemRegistry {
            order: self.order,
            factories: self.factories,
        }
    }
}

/// Immutable set of registered backends.
pub struct FileSystemRegistry {
    order: Vec<String>,
    factories: BTreeMap<String, FileSystemFactory>,
}

impl FileSystemRegistry {
    pub fn builder() -> FileSystemRegistryBuilder {
        FileSystemRegistryBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Names in registration order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name.trim())
    }

    /// Fresh backend instance for `name`.
    pub fn instantiate(&self, name: &str, context: &FileSystemContext) -> Option<Box<dyn FileSystem>> {
        let name = name.trim();
        let backend = (self.factories.get(name)?)(context);
        if backend.name() != name {
            warn!(
                "event=registry_instantiate module=fs status=mismatch registered={} reported={}",
                name,
                backend.name()
            );
        }
        Some(backend)
    }

    /// Fresh instances of every backend implementing `operation`, in order.
    pub fn supporting(
        &self,
        operation: FileOperation,
        context: &FileSystemContext,
    ) -> Vec<Box<dyn FileSystem>> {
        self.order
            .iter()
            .filter_map(|name| self.instantiate(name, context))
            .filter(|backend| backend.implements(operation))
            .collect()
    }
}
