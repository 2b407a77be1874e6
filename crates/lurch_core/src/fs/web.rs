//! Read-only backend over web URLs.
//!
//! # Responsibility
//! - Fetch documents by URL.
//! - Browse bookmarked URLs and the hyperlinks of fetched pages.
//! - Maintain the bookmark list in shared storage.
//!
//! # Invariants
//! - Folder entries are URLs ending in `/`; file entries carry their URL as
//!   `uid` and the containing page as `path`.
//! - Bookmarks are stored as a JSON array under `lurch-bookmarks`.

use crate::dialog::folder_browser::FolderBrowser;
use crate::dialog::panel::FilePanel;
use crate::fs::backend::{ensure_owner, FileSystem, FileSystemContext};
use crate::fs::capability::{Capabilities, FileOperation};
use crate::fs::error::{FileSystemError, FileSystemResult};
use crate::model::file_object::FileObject;
use crate::repo::kv_store::StorageError;
use async_trait::async_trait;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub const BOOKMARKS_KEY: &str = "lurch-bookmarks";

static HREF_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<a\s[^>]*?href\s*=\s*["']([^"']+)["']"#).expect("valid href regex")
});

/// Transport failure of one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The server answered with a non-success status.
    Status(u16),
    Transport(String),
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status(code) => write!(f, "server answered with status {code}"),
            Self::Transport(message) => write!(f, "{message}"),
        }
    }
}

impl Error for FetchError {}

/// Fetches the body of a URL as text.
#[async_trait]
pub trait UrlFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// `reqwest`-backed fetcher with the client's default timeouts.
#[derive(Debug, Clone, Default)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UrlFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        response
            .text()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))
    }
}

pub struct WebFileSystem {
    context: FileSystemContext,
    fetcher: Arc<dyn UrlFetcher>,
}

impl WebFileSystem {
    pub const NAME: &'static str = "Web";

    pub fn new(context: FileSystemContext, fetcher: Arc<dyn UrlFetcher>) -> Self {
        Self { context, fetcher }
    }

    /// Bookmarked URLs in insertion order.
    pub fn bookmarks(&self) -> FileSystemResult<Vec<String>> {
        let Some(raw) = self.context.storage.get(BOOKMARKS_KEY)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|err| {
            FileSystemError::Storage(StorageError::InvalidData(format!("{BOOKMARKS_KEY}: {err}")))
        })
    }

    /// Adds `url` unless already present. Returns whether it was added.
    pub fn add_bookmark(&self, url: &str) -> FileSystemResult<bool> {
        let url = parse_url(url)?;
        let mut bookmarks = self.bookmarks()?;
        if bookmarks.iter().any(|existing| existing == url.as_str()) {
            return Ok(false);
        }
        bookmarks.push(url.to_string());
        self.store_bookmarks(&bookmarks)?;
        Ok(true)
    }

    /// Removes `url`. Returns whether it was present.
    pub fn remove_bookmark(&self, url: &str) -> FileSystemResult<bool> {
        let target = Url::parse(url.trim())
            .map(|url| url.to_string())
            .unwrap_or_else(|_| url.trim().to_string());
        let mut bookmarks = self.bookmarks()?;
        let before = bookmarks.len();
        bookmarks.retain(|existing| *existing != target);
        if bookmarks.len() == before {
            return Ok(false);
        }
        self.store_bookmarks(&bookmarks)?;
        Ok(true)
    }

    fn store_bookmarks(&self, bookmarks: &[String]) -> FileSystemResult<()> {
        let raw = serde_json::to_string(bookmarks)
            .map_err(|err| FileSystemError::Storage(StorageError::InvalidData(err.to_string())))?;
        self.context.storage.set(BOOKMARKS_KEY, &raw)?;
        Ok(())
    }

    fn file_url(file: &FileObject) -> FileSystemResult<Url> {
        if let Some(uid) = file.uid() {
            return parse_url(uid);
        }
        let filename = file
            .non_empty_filename()
            .ok_or(FileSystemError::MissingIdentifier)?;
        if let Ok(url) = Url::parse(filename) {
            return Ok(url);
        }
        let base = file.path().ok_or(FileSystemError::MissingIdentifier)?;
        parse_url(base)?
            .join(filename)
            .map_err(|_| FileSystemError::MissingIdentifier)
    }

    fn bookmark_entries(&self) -> FileSystemResult<Vec<FileObject>> {
        Ok(self
            .bookmarks()?
            .into_iter()
            .map(|url| FileObject::folder(Some(Self::NAME.to_string()), url))
            .collect())
    }

    fn link_entries(&self, page: &Url, html: &str) -> Vec<FileObject> {
        let mut seen = Vec::<String>::new();
        let mut entries = Vec::new();
        for capture in HREF_PATTERN.captures_iter(html) {
            let Some(href) = capture.get(1).map(|found| found.as_str().trim()) else {
                continue;
            };
            let Ok(mut target) = page.join(href) else {
                continue;
            };
            target.set_fragment(None);
            if !matches!(target.scheme(), "http" | "https") || target == *page {
                continue;
            }
            let key = target.to_string();
            if seen.contains(&key) {
                continue;
            }
            seen.push(key.clone());

            if key.ends_with('/') {
                entries.push(FileObject::folder(Some(Self::NAME.to_string()), key));
            } else {
                entries.push(
                    FileObject::in_file_system(Self::NAME, last_segment(&target))
                        .with_uid(key)
                        .with_path(Some(page.to_string())),
                );
            }
        }
        entries
    }
}

#[async_trait]
impl FileSystem for WebFileSystem {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::of(&[FileOperation::Read, FileOperation::List])
    }

    async fn read(&self, file: &FileObject) -> FileSystemResult<FileObject> {
        ensure_owner(Self::NAME, file)?;
        let url = Self::file_url(file)?;
        let contents = match self.fetcher.fetch(url.as_str()).await {
            Ok(contents) => contents,
            Err(FetchError::Status(404)) => return Err(FileSystemError::NotFound(url.to_string())),
            Err(err) => {
                warn!(
                    "event=fs_read module=fs status=error file_system={} error={}",
                    Self::NAME,
                    err
                );
                return Err(FileSystemError::NetworkError(err.to_string()));
            }
        };
        info!(
            "event=fs_read module=fs status=ok file_system={} chars={}",
            Self::NAME,
            contents.chars().count()
        );
        Ok(FileObject::in_file_system(Self::NAME, last_segment(&url))
            .with_uid(url.to_string())
            .with_contents(contents))
    }

    async fn list(&self, folder: Option<&FileObject>) -> FileSystemResult<Vec<FileObject>> {
        if let Some(folder) = folder {
            ensure_owner(Self::NAME, folder)?;
        }
        let Some(path) = folder
            .and_then(FileObject::path)
            .map(str::trim)
            .filter(|path| !path.is_empty())
        else {
            return self.bookmark_entries();
        };

        let page = Url::parse(path).map_err(|_| FileSystemError::PathNotFound(path.to_string()))?;
        let html = match self.fetcher.fetch(page.as_str()).await {
            Ok(html) => html,
            Err(FetchError::Status(404)) => {
                return Err(FileSystemError::PathNotFound(page.to_string()))
            }
            Err(err) => return Err(FileSystemError::NetworkError(err.to_string())),
        };
        Ok(self.link_entries(&page, &html))
    }

    fn chooser_panel(self: Box<Self>) -> Box<dyn FilePanel> {
        Box::new(FolderBrowser::chooser(self).with_location_input())
    }

    fn saver_panel(self: Box<Self>) -> Box<dyn FilePanel> {
        Box::new(FolderBrowser::saver(self).with_location_input())
    }
}

fn parse_url(value: &str) -> FileSystemResult<Url> {
    Url::parse(value.trim())
        .map_err(|err| FileSystemError::InvalidQuery(format!("not a URL `{}`: {err}", value.trim())))
}

fn last_segment(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|segment| !segment.is_empty()).last())
        .map(str::to_string)
        .unwrap_or_else(|| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::{FetchError, UrlFetcher, WebFileSystem};
    use crate::editor::HeadlessEditor;
    use crate::fs::backend::{FileSystem, FileSystemContext};
    use crate::fs::error::FileSystemError;
    use crate::model::file_object::FileObject;
    use crate::repo::kv_store::MemoryKeyValueStore;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;

    struct PageFetcher(HashMap<String, String>);

    #[async_trait]
    impl UrlFetcher for PageFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.0.get(url).cloned().ok_or(FetchError::Status(404))
        }
    }

    fn web(pages: &[(&str, &str)]) -> WebFileSystem {
        let context = FileSystemContext::new(
            Arc::new(HeadlessEditor::new()),
            Arc::new(MemoryKeyValueStore::new()),
        );
        let pages = pages
            .iter()
            .map(|(url, body)| (url.to_string(), body.to_string()))
            .collect();
        WebFileSystem::new(context, Arc::new(PageFetcher(pages)))
    }

    #[tokio::test]
    async fn lists_page_links_as_files_and_folders() {
        let fs = web(&[(
            "https://example.org/docs/",
            r#"<a href="intro.lurch">Intro</a> <a href='sub/'>Sub</a> <a href="mailto:x@y">m</a>"#,
        )]);
        let folder = FileObject::folder(Some("Web".to_string()), "https://example.org/docs/");
        let entries = fs.list(Some(&folder)).await.expect("list");

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].filename(), Some("intro.lurch"));
        assert_eq!(entries[0].uid(), Some("https://example.org/docs/intro.lurch"));
        assert!(entries[1].is_folder());
        assert_eq!(entries[1].path(), Some("https://example.org/docs/sub/"));
    }

    #[tokio::test]
    async fn links_with_fragments_are_listed_once_without_fragment() {
        let fs = web(&[(
            "https://example.org/docs/",
            r##"<a href="a.lurch">A</a> <a href="b.lurch#top">B</a> <a href="b.lurch">B</a> <a href="#toc">T</a>"##,
        )]);
        let folder = FileObject::folder(Some("Web".to_string()), "https://example.org/docs/");
        let entries = fs.list(Some(&folder)).await.expect("list");

        let uids: Vec<_> = entries.iter().filter_map(FileObject::uid).collect();
        assert_eq!(
            uids,
            vec![
                "https://example.org/docs/a.lurch",
                "https://example.org/docs/b.lurch"
            ]
        );
    }

    #[tokio::test]
    async fn read_maps_missing_pages_to_not_found() {
        let fs = web(&[("https://example.org/a.lurch", "<p>a</p>")]);
        let read = fs
            .read(&FileObject::named("https://example.org/a.lurch"))
            .await
            .expect("read");
        assert_eq!(read.contents(), Some("<p>a</p>"));

        let err = fs
            .read(&FileObject::named("https://example.org/missing"))
            .await
            .expect_err("missing");
        assert!(matches!(err, FileSystemError::NotFound(_)));
    }

    #[test]
    fn bookmarks_are_deduplicated_and_removable() {
        let fs = web(&[]);
        assert!(fs.add_bookmark("https://example.org/").expect("add"));
        assert!(!fs.add_bookmark("https://example.org/").expect("re-add"));
        assert!(fs.add_bookmark("not a url").is_err());
        assert_eq!(fs.bookmarks().expect("bookmarks").len(), 1);

        assert!(fs.remove_bookmark("https://example.org/").expect("remove"));
        assert!(!fs.remove_bookmark("https://example.org/").expect("remove again"));
    }
}
