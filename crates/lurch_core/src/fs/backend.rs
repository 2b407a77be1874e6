//! The `FileSystem` contract every storage backend implements.
//!
//! # Responsibility
//! - Define the async `read/write/delete/has/list` surface.
//! - Declare implemented operations through explicit `Capabilities`.
//! - Supply the dialog panels a backend contributes to file dialogs.
//!
//! # Invariants
//! - Operations outside `capabilities()` fail with `Unimplemented`.
//! - Successful `read`/`write` results are stamped with the backend name.
//! - A successful `write` marks the document as saved.

use crate::dialog::panel::FilePanel;
use crate::editor::Editor;
use crate::fs::capability::{parse_file_operation, Capabilities, FileOperation};
use crate::fs::error::{FileSystemError, FileSystemResult};
use crate::model::file_object::FileObject;
use crate::repo::kv_store::KeyValueStore;
use crate::service::document_session::DocumentSession;
use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

/// Shared services handed to every backend instance.
#[derive(Clone)]
pub struct FileSystemContext {
    pub editor: Arc<dyn Editor>,
    pub storage: Arc<dyn KeyValueStore>,
    pub session: Arc<DocumentSession>,
}

impl FileSystemContext {
    /// Builds a context whose session shares `editor` and `storage`.
    pub fn new(editor: Arc<dyn Editor>, storage: Arc<dyn KeyValueStore>) -> Self {
        let session = Arc::new(DocumentSession::new(
            Arc::clone(&editor),
            Arc::clone(&storage),
        ));
        Self {
            editor,
            storage,
            session,
        }
    }
}

/// Storage backend. Instances are short-lived and built per operation.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Human-readable unique name, also used as the dialog tab title.
    fn name(&self) -> &str;

    fn capabilities(&self) -> Capabilities;

    fn implements(&self, operation: FileOperation) -> bool {
        self.capabilities().contains(operation)
    }

    /// Name-based `implements`. Unknown names are never implemented.
    fn implements_named(&self, operation: &str) -> bool {
        parse_file_operation(operation).is_ok_and(|operation| self.implements(operation))
    }

    /// Returns `file` with contents populated.
    async fn read(&self, _file: &FileObject) -> FileSystemResult<FileObject> {
        Err(unimplemented(self.name(), FileOperation::Read))
    }

    /// Persists `file` and returns it stamped with this backend's name.
    async fn write(&self, _file: &FileObject) -> FileSystemResult<FileObject> {
        Err(unimplemented(self.name(), FileOperation::Write))
    }

    async fn delete(&self, _file: &FileObject) -> FileSystemResult<()> {
        Err(unimplemented(self.name(), FileOperation::Delete))
    }

    async fn has(&self, _file: &FileObject) -> FileSystemResult<bool> {
        Err(unimplemented(self.name(), FileOperation::Has))
    }

    /// Entries under `folder`, or under the root when `None`.
    async fn list(&self, _folder: Option<&FileObject>) -> FileSystemResult<Vec<FileObject>> {
        Err(unimplemented(self.name(), FileOperation::List))
    }

    /// Panel used to pick an existing file.
    fn chooser_panel(self: Box<Self>) -> Box<dyn FilePanel>;

    /// Panel used to pick a save destination.
    fn saver_panel(self: Box<Self>) -> Box<dyn FilePanel>;
}

pub(crate) fn unimplemented(file_system: &str, operation: FileOperation) -> FileSystemError {
    FileSystemError::Unimplemented {
        file_system: file_system.to_string(),
        operation,
    }
}

/// Rejects malformed objects and objects that name a different backend.
/// Unowned objects pass.
pub fn ensure_owner(file_system: &str, file: &FileObject) -> FileSystemResult<()> {
    if let Err(err) = file.validate() {
        debug!(
            "event=fs_validate module=fs status=rejected file_system={} error={}",
            file_system, err
        );
        return Err(FileSystemError::MissingIdentifier);
    }
    match file.file_system_name() {
        Some(actual) if actual != file_system => Err(FileSystemError::WrongFileSystem {
            expected: file_system.to_string(),
            actual: actual.to_string(),
        }),
        _ => Ok(()),
    }
}

/// `has` variant of `ensure_owner`: every rejection is an `InvalidQuery`.
pub fn ensure_queryable(file_system: &str, file: &FileObject) -> FileSystemResult<()> {
    if let Err(err) = file.validate() {
        return Err(FileSystemError::InvalidQuery(err.to_string()));
    }
    match file.file_system_name() {
        Some(owner) if owner != file_system => Err(FileSystemError::InvalidQuery(format!(
            "file belongs to `{owner}`"
        ))),
        _ => Ok(()),
    }
}

/// Rejects non-empty paths on backends without folders.
pub fn ensure_flat(file_system: &str, file: &FileObject) -> FileSystemResult<()> {
    if file.has_subfolder_path() {
        return Err(FileSystemError::SubfoldersUnsupported {
            file_system: file_system.to_string(),
        });
    }
    Ok(())
}
