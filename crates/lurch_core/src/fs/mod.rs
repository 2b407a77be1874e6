//! Pluggable file-system abstraction.
//!
//! # Responsibility
//! - Define the backend contract, its capability flags and error taxonomy.
//! - Provide the browser-storage, offline-download and web backends.
//! - Register backends by name for dialog-driven workflows.
//!
//! # See also
//! - `service::file_workflow` for open/save/delete orchestration.

pub mod backend;
pub mod browser;
pub mod capability;
pub mod error;
pub mod offline;
pub mod registry;
pub mod web;

use crate::config::CoreConfig;
use crate::fs::backend::FileSystem;
use crate::fs::browser::BrowserFileSystem;
use crate::fs::offline::{DirectoryDownloader, Downloader, OfflineFileSystem};
use crate::fs::registry::{FileSystemRegistry, RegistryError};
use crate::fs::web::{ReqwestFetcher, UrlFetcher, WebFileSystem};
use std::path::PathBuf;
use std::sync::Arc;

/// Registry with the three built-in backends, in tab order.
pub fn standard_registry(
    downloader: Arc<dyn Downloader>,
    fetcher: Arc<dyn UrlFetcher>,
) -> Result<FileSystemRegistry, RegistryError> {
    let mut builder = FileSystemRegistry::builder();
    builder.register(BrowserFileSystem::NAME, |ctx| {
        Box::new(BrowserFileSystem::new(ctx.clone())) as Box<dyn FileSystem>
    })?;
    builder.register(OfflineFileSystem::NAME, move |ctx| {
        Box::new(OfflineFileSystem::new(ctx.clone(), Arc::clone(&downloader)))
    })?;
    builder.register(WebFileSystem::NAME, move |ctx| {
        Box::new(WebFileSystem::new(ctx.clone(), Arc::clone(&fetcher)))
    })?;
    Ok(builder.build())
}

/// Standard registry wired from `config`: downloads land in `downloads_dir`
/// (the working directory when unset) and pages are fetched over HTTP.
pub fn configured_registry(config: &CoreConfig) -> Result<FileSystemRegistry, RegistryError> {
    let downloads = config
        .downloads_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    standard_registry(
        Arc::new(DirectoryDownloader::new(downloads)),
        Arc::new(ReqwestFetcher::new()),
    )
}
