//! Write-only backend that hands documents to the user's computer.
//!
//! The backend cannot observe what the user does with a download, so a
//! write succeeds as soon as the `Downloader` accepts the content.

use crate::dialog::folder_browser::FolderBrowser;
use crate::dialog::panel::FilePanel;
use crate::fs::backend::{ensure_flat, ensure_owner, FileSystem, FileSystemContext};
use crate::fs::capability::{Capabilities, FileOperation};
use crate::fs::error::{FileSystemError, FileSystemResult};
use crate::model::file_object::FileObject;
use async_trait::async_trait;
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Delivers a named document to the user.
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, filename: &str, contents: &str) -> std::io::Result<()>;
}

/// Downloader that drops files into a fixed directory.
#[derive(Debug, Clone)]
pub struct DirectoryDownloader {
    dir: PathBuf,
}

impl DirectoryDownloader {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl Downloader for DirectoryDownloader {
    async fn download(&self, filename: &str, contents: &str) -> std::io::Result<()> {
        let name = Path::new(filename).file_name().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a plain filename: {filename}"),
            )
        })?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(name), contents).await
    }
}

pub struct OfflineFileSystem {
    context: FileSystemContext,
    downloader: Arc<dyn Downloader>,
}

impl OfflineFileSystem {
    pub const NAME: &'static str = "Your computer";

    pub fn new(context: FileSystemContext, downloader: Arc<dyn Downloader>) -> Self {
        Self {
            context,
            downloader,
        }
    }
}

#[async_trait]
impl FileSystem for OfflineFileSystem {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::of(&[FileOperation::Write])
    }

    async fn write(&self, file: &FileObject) -> FileSystemResult<FileObject> {
        ensure_owner(Self::NAME, file)?;
        ensure_flat(Self::NAME, file)?;
        let contents = file.contents().ok_or(FileSystemError::MissingContent)?;
        let filename = file
            .non_empty_filename()
            .ok_or(FileSystemError::MissingIdentifier)?;

        if let Err(err) = self.downloader.download(filename, contents).await {
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

    fn chooser_panel(self: Box<Self>) -> Box<dyn FilePanel> {
        Box::new(FolderBrowser::chooser(self))
    }

    fn saver_panel(self: Box<Self>) -> Box<dyn FilePanel> {
        Box::new(FolderBrowser::saver(self))
    }
}
