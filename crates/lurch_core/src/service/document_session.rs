//! Auto-save slot and last saved location of the open document.
//!
//! # Responsibility
//! - Own the `lurch-autosave` and `lurch-last-save` storage records.
//! - Apply the "document saved" side effect after successful writes.
//!
//! # Invariants
//! - The last saved location never stores contents.
//! - A successful save clears the auto-save slot and the dirty flag.

use crate::editor::Editor;
use crate::model::file_object::FileObject;
use crate::repo::kv_store::{KeyValueStore, StorageError, StorageResult};
use log::{debug, info};
use std::sync::Arc;

pub const AUTOSAVE_KEY: &str = "lurch-autosave";
pub const LAST_SAVE_KEY: &str = "lurch-last-save";

pub struct DocumentSession {
    editor: Arc<dyn Editor>,
    storage: Arc<dyn KeyValueStore>,
}

impl DocumentSession {
    pub fn new(editor: Arc<dyn Editor>, storage: Arc<dyn KeyValueStore>) -> Self {
        Self { editor, storage }
    }

    /// Stores `contents` in the auto-save slot, replacing earlier drafts.
    pub fn autosave(&self, contents: &str) -> StorageResult<()> {
        debug!(
            "event=autosave module=session status=ok chars={}",
            contents.chars().count()
        );
        self.storage.set(AUTOSAVE_KEY, contents)
    }

    pub fn autosaved(&self) -> StorageResult<Option<String>> {
        self.storage.get(AUTOSAVE_KEY)
    }

    pub fn clear_autosave(&self) -> StorageResult<()> {
        self.storage.remove(AUTOSAVE_KEY).map(|_| ())
    }

    /// Records `file` as the current location without clearing drafts.
    pub fn set_last_saved(&self, file: &FileObject) -> StorageResult<()> {
        let record = serde_json::to_string(&file.identity())
            .map_err(|err| StorageError::InvalidData(err.to_string()))?;
        self.storage.set(LAST_SAVE_KEY, &record)
    }

    /// Side effect of every successful write.
    pub fn document_saved(&self, file: &FileObject) -> StorageResult<()> {
        self.clear_autosave()?;
        self.set_last_saved(file)?;
        self.editor.set_dirty(false);
        info!(
            "event=document_saved module=session status=ok file_system={}",
            file.file_system_name().unwrap_or("none")
        );
        Ok(())
    }

    pub fn last_saved(&self) -> StorageResult<Option<FileObject>> {
        let Some(raw) = self.storage.get(LAST_SAVE_KEY)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| StorageError::InvalidData(format!("{LAST_SAVE_KEY}: {err}")))
    }
}
