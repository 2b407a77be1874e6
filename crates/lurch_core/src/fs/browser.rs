//! Flat backend over the shared key-value storage.
//!
//! # Invariants
//! - Each document is stored under `lurch-file-<filename>`.
//! - Paths are not supported; any non-empty path is rejected.

use crate::dialog::folder_browser::FolderBrowser;
use crate::dialog::panel::FilePanel;
use crate::fs::backend::{
    ensure_flat, ensure_owner, ensure_queryable, FileSystem, FileSystemContext,
};
use crate::fs::capability::{Capabilities, FileOperation};
use crate::fs::error::{FileSystemError, FileSystemResult};
use crate::model::file_object::FileObject;
use async_trait::async_trait;
use log::{error, info, warn};

pub const FILE_KEY_PREFIX: &str = "lurch-file-";

pub struct BrowserFileSystem {
    context: FileSystemContext,
}

impl BrowserFileSystem {
    pub const NAME: &'static str = "Browser storage";

    pub fn new(context: FileSystemContext) -> Self {
        Self { context }
    }

    fn storage_key(filename: &str) -> String {
        format!("{FILE_KEY_PREFIX}{filename}")
    }

    fn check(&self, file: &FileObject) -> FileSystemResult<()> {
        ensure_owner(Self::NAME, file)?;
        ensure_flat(Self::NAME, file)
    }

    fn filename(file: &FileObject) -> FileSystemResult<String> {
        file.non_empty_filename()
            .map(str::to_string)
            .ok_or(FileSystemError::MissingIdentifier)
    }
}

#[async_trait]
impl FileSystem for BrowserFileSystem {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::of(&FileOperation::ALL)
    }

    async fn read(&self, file: &FileObject) -> FileSystemResult<FileObject> {
        self.check(file)?;
        let filename = Self::filename(file)?;
        let contents = self
            .context
            .storage
            .get(&Self::storage_key(&filename))?
            .ok_or_else(|| FileSystemError::NotFound(filename.clone()))?;
        info!(
            "event=fs_read module=fs status=ok file_system={} chars={}",
            Self::NAME,
            contents.chars().count()
        );
        Ok(FileObject::in_file_system(Self::NAME, filename).with_contents(contents))
    }

    async fn write(&self, file: &FileObject) -> FileSystemResult<FileObject> {
        self.check(file)?;
        let contents = file.contents().ok_or(FileSystemError::MissingContent)?;
        let filename = Self::filename(file)?;
        if let Err(err) = self
            .context
            .storage
            .set(&Self::storage_key(&filename), contents)
        {
            error!(
                "event=fs_write module=fs status=error file_system={} error={}",
                Self::NAME,
                err
            );
            return Err(FileSystemError::WriteError(err.to_string()));
        }

        let saved = FileObject::in_file_system(Self::NAME, filename).with_contents(contents);
        if let Err(err) = self.context.session.document_saved(&saved) {
            warn!(
                "event=fs_write module=fs status=saved_side_effect_failed file_system={} error={}",
                Self::NAME,
                err
            );
        }
        info!(
            "event=fs_write module=fs status=ok file_system={} chars={}",
            Self::NAME,
            contents.chars().count()
        );
        Ok(saved)
    }

    async fn delete(&self, file: &FileObject) -> FileSystemResult<()> {
        self.check(file)?;
        let filename = Self::filename(file)?;
        if !self.context.storage.remove(&Self::storage_key(&filename))? {
            return Err(FileSystemError::NotFound(filename));
        }
        info!("event=fs_delete module=fs status=ok file_system={}", Self::NAME);
        Ok(())
    }

    async fn has(&self, file: &FileObject) -> FileSystemResult<bool> {
        ensure_queryable(Self::NAME, file)?;
        ensure_flat(Self::NAME, file)?;
        let filename = file
            .non_empty_filename()
            .ok_or_else(|| FileSystemError::InvalidQuery("filename is required".to_string()))?;
        Ok(self
            .context
            .storage
            .get(&Self::storage_key(filename))?
            .is_some())
    }

    async fn list(&self, folder: Option<&FileObject>) -> FileSystemResult<Vec<FileObject>> {
        if let Some(folder) = folder {
            self.check(folder)?;
        }
        let entries = self
            .context
            .storage
            .keys()?
            .into_iter()
            .filter_map(|key| key.strip_prefix(FILE_KEY_PREFIX).map(str::to_string))
            .filter(|name| !name.is_empty())
            .map(|name| FileObject::in_file_system(Self::NAME, name))
            .collect();
        Ok(entries)
    }

    fn chooser_panel(self: Box<Self>) -> Box<dyn FilePanel> {
        Box::new(FolderBrowser::chooser(self))
    }

    fn saver_panel(self: Box<Self>) -> Box<dyn FilePanel> {
        Box::new(FolderBrowser::saver(self))
    }
}

#[cfg(test)]
mod tests {
    use super::{BrowserFileSystem, FILE_KEY_PREFIX};
    use crate::editor::HeadlessEditor;
    use crate::fs::backend::{FileSystem, FileSystemContext};
    use crate::fs::error::FileSystemError;
    use crate::model::file_object::FileObject;
    use crate::repo::kv_store::{KeyValueStore, MemoryKeyValueStore};
    use std::sync::Arc;

    fn backend() -> (BrowserFileSystem, Arc<MemoryKeyValueStore>) {
        let storage = Arc::new(MemoryKeyValueStore::new());
        let context = FileSystemContext::new(Arc::new(HeadlessEditor::new()), storage.clone());
        (BrowserFileSystem::new(context), storage)
    }

    #[tokio::test]
    async fn write_then_read_round_trips_and_stamps_owner() {
        let (fs, storage) = backend();
        let written = fs
            .write(&FileObject::named("test").with_contents("hello"))
            .await
            .expect("write");
        assert_eq!(written.file_system_name(), Some(BrowserFileSystem::NAME));
        assert_eq!(
            storage.get(&format!("{FILE_KEY_PREFIX}test")).expect("get"),
            Some("hello".to_string())
        );

        let read = fs.read(&FileObject::named("test")).await.expect("read");
        assert_eq!(read.contents(), Some("hello"));
        assert_eq!(read.file_system_name(), Some(BrowserFileSystem::NAME));
    }

    #[tokio::test]
    async fn write_requires_contents_then_identifier() {
        let (fs, _) = backend();
        let missing_content = fs.write(&FileObject::named("x")).await.expect_err("no contents");
        assert!(matches!(missing_content, FileSystemError::MissingContent));
        let missing_name = fs
            .write(&FileObject::unsaved("body"))
            .await
            .expect_err("no filename");
        assert!(matches!(missing_name, FileSystemError::MissingIdentifier));
    }

    #[tokio::test]
    async fn list_ignores_unrelated_keys() {
        let (fs, storage) = backend();
        storage.set("lurch-autosave", "draft").expect("set");
        storage.set("lurch-file-a", "1").expect("set");
        storage.set("lurch-file-b", "2").expect("set");

        let names: Vec<String> = fs
            .list(None)
            .await
            .expect("list")
            .iter()
            .map(FileObject::display_name)
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn has_rejects_foreign_objects_as_invalid_query() {
        let (fs, _) = backend();
        let err = fs
            .has(&FileObject::in_file_system("Web", "x"))
            .await
            .expect_err("foreign has fails");
        assert!(matches!(err, FileSystemError::InvalidQuery(_)));
    }

    #[test]
    fn implements_operations_by_name() {
        let (fs, _) = backend();
        for name in ["read", "write", "delete", "has", " list "] {
            assert!(fs.implements_named(name), "{name}");
        }
        assert!(!fs.implements_named("Read"));
        assert!(!fs.implements_named("rename"));
        assert!(!fs.implements_named(""));
    }
}
