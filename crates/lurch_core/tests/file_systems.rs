mod common;

use common::{session, StaticFetcher};
use lurch_core::service::document_session::{AUTOSAVE_KEY, LAST_SAVE_KEY};
use lurch_core::{
    BrowserFileSystem, DirectoryDownloader, Editor, FileObject, FileSystem, FileSystemContext,
    FileSystemError, HeadlessEditor, KeyValueStore, MemoryKeyValueStore, OfflineFileSystem,
    StorageError, StorageResult, WebFileSystem,
};
use std::sync::Arc;

#[tokio::test]
async fn browser_storage_scenario() {
    let session = session();
    let fs = BrowserFileSystem::new(session.context.clone());

    fs.write(&FileObject::named("test").with_contents("hello"))
        .await
        .expect("write should succeed");
    assert!(fs.has(&FileObject::named("test")).await.expect("has"));

    let read = fs.read(&FileObject::named("test")).await.expect("read");
    assert_eq!(read.contents(), Some("hello"));

    fs.delete(&FileObject::named("test")).await.expect("delete");
    assert!(!fs.has(&FileObject::named("test")).await.expect("has"));

    let err = fs
        .delete(&FileObject::named("test"))
        .await
        .expect_err("second delete should fail");
    assert!(matches!(err, FileSystemError::NotFound(_)));
}

#[tokio::test]
async fn write_clears_autosave_and_records_last_location() {
    let session = session();
    session.context.session.autosave("<p>draft</p>").expect("autosave");
    session.editor.set_dirty(true);
    let fs = BrowserFileSystem::new(session.context.clone());

    fs.write(&FileObject::named("notes").with_contents("<p>final</p>"))
        .await
        .expect("write");

    assert_eq!(session.storage.get(AUTOSAVE_KEY).expect("get"), None);
    assert!(!session.editor.is_dirty());
    let raw = session
        .storage
        .get(LAST_SAVE_KEY)
        .expect("get")
        .expect("last save recorded");
    let last: FileObject = serde_json::from_str(&raw).expect("valid JSON");
    assert_eq!(
        last,
        FileObject::in_file_system(BrowserFileSystem::NAME, "notes")
    );
}

#[tokio::test]
async fn every_supported_operation_rejects_foreign_objects() {
    let session = session();
    let downloads = tempfile::tempdir().expect("tempdir");
    let backends: Vec<Box<dyn FileSystem>> = vec![
        Box::new(BrowserFileSystem::new(session.context.clone())),
        Box::new(OfflineFileSystem::new(
            session.context.clone(),
            Arc::new(DirectoryDownloader::new(downloads.path())),
        )),
        Box::new(WebFileSystem::new(
            session.context.clone(),
            Arc::new(StaticFetcher::default()),
        )),
    ];

    for backend in &backends {
        let foreign = FileObject::in_file_system("Somewhere else", "doc").with_contents("body");
        let results = [
            backend.read(&foreign).await.err(),
            backend.write(&foreign).await.err(),
            backend.delete(&foreign).await.err(),
        ];
        for (operation, result) in ["read", "write", "delete"].iter().zip(results) {
            let implemented = backend
                .capabilities()
                .operations()
                .iter()
                .any(|op| op.as_str() == *operation);
            let err = result.expect("foreign object must fail");
            if implemented {
                assert!(
                    matches!(err, FileSystemError::WrongFileSystem { .. }),
                    "{} {operation}: {err}",
                    backend.name()
                );
            } else {
                assert_eq!(err.code(), "unimplemented");
            }
        }
    }
}

#[tokio::test]
async fn flat_backends_reject_subfolders() {
    let session = session();
    let downloads = tempfile::tempdir().expect("tempdir");
    let browser = BrowserFileSystem::new(session.context.clone());
    let offline = OfflineFileSystem::new(
        session.context.clone(),
        Arc::new(DirectoryDownloader::new(downloads.path())),
    );
    let nested = FileObject::named("doc")
        .with_path(Some("chapter".to_string()))
        .with_contents("body");
    let folder = FileObject::folder(None, "chapter");

    let errors = vec![
        browser.read(&nested).await.expect_err("read"),
        browser.write(&nested).await.expect_err("write"),
        browser.delete(&nested).await.expect_err("delete"),
        browser.has(&nested).await.expect_err("has"),
        browser.list(Some(&folder)).await.expect_err("list"),
        offline.write(&nested).await.expect_err("offline write"),
    ];
    for err in errors {
        assert!(
            matches!(err, FileSystemError::SubfoldersUnsupported { .. }),
            "unexpected error: {err}"
        );
    }
    assert!(std::fs::read_dir(downloads.path())
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(true));
}

#[tokio::test]
async fn web_list_shows_bookmarks_as_folders() {
    let session = session();
    let fs = WebFileSystem::new(session.context.clone(), Arc::new(StaticFetcher::default()));
    assert!(fs.list(None).await.expect("empty list").is_empty());

    fs.add_bookmark("https://example.org/lurch/")
        .expect("bookmark");
    let entries = fs.list(None).await.expect("list");
    assert_eq!(
        entries,
        vec![FileObject::folder(
            Some(WebFileSystem::NAME.to_string()),
            "https://example.org/lurch/"
        )]
    );
}

#[tokio::test]
async fn web_list_of_missing_page_is_path_not_found() {
    let session = session();
    let fetcher = StaticFetcher::default().with_page("https://example.org/", "<p>home</p>");
    let fs = WebFileSystem::new(session.context.clone(), Arc::new(fetcher));

    let home = FileObject::folder(Some("Web".to_string()), "https://example.org/");
    assert!(fs.list(Some(&home)).await.expect("home lists").is_empty());

    let missing = FileObject::folder(Some("Web".to_string()), "https://example.org/gone/");
    let err = fs.list(Some(&missing)).await.expect_err("missing page");
    assert!(matches!(err, FileSystemError::PathNotFound(_)));

    let err = fs
        .write(&FileObject::named("x").with_contents("y"))
        .await
        .expect_err("web is read-only");
    assert_eq!(err.code(), "unimplemented");
}

#[tokio::test]
async fn web_list_rejects_foreign_folders() {
    let session = session();
    let fs = WebFileSystem::new(session.context.clone(), Arc::new(StaticFetcher::default()));
    let foreign = FileObject::folder(
        Some(BrowserFileSystem::NAME.to_string()),
        "https://example.org/",
    );
    let err = fs.list(Some(&foreign)).await.expect_err("foreign folder");
    assert!(matches!(err, FileSystemError::WrongFileSystem { .. }));
}

#[tokio::test]
async fn uid_without_file_system_is_rejected_by_every_backend() {
    let session = session();
    let downloads = tempfile::tempdir().expect("tempdir");
    let orphan = FileObject::named("doc")
        .with_uid("https://example.org/doc")
        .with_contents("body");

    let browser = BrowserFileSystem::new(session.context.clone());
    for err in [
        browser.read(&orphan).await.expect_err("read"),
        browser.write(&orphan).await.expect_err("write"),
        browser.delete(&orphan).await.expect_err("delete"),
    ] {
        assert!(matches!(err, FileSystemError::MissingIdentifier), "{err}");
    }
    let err = browser.has(&orphan).await.expect_err("has");
    assert!(matches!(err, FileSystemError::InvalidQuery(_)));
    assert_eq!(session.storage.keys().expect("keys"), Vec::<String>::new());

    let offline = OfflineFileSystem::new(
        session.context.clone(),
        Arc::new(DirectoryDownloader::new(downloads.path())),
    );
    let err = offline.write(&orphan).await.expect_err("offline write");
    assert!(matches!(err, FileSystemError::MissingIdentifier));

    let fetcher = StaticFetcher::default().with_page("https://example.org/doc", "<p>doc</p>");
    let web = WebFileSystem::new(session.context.clone(), Arc::new(fetcher));
    let err = web.read(&orphan).await.expect_err("web read");
    assert!(matches!(err, FileSystemError::MissingIdentifier));
}

/// Store that refuses to record the last save location.
struct LastSaveRefusingStore(MemoryKeyValueStore);

impl KeyValueStore for LastSaveRefusingStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.0.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if key == LAST_SAVE_KEY {
            return Err(StorageError::InvalidData("read-only record".to_string()));
        }
        self.0.set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<bool> {
        self.0.remove(key)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        self.0.keys()
    }
}

#[tokio::test]
async fn persisted_write_succeeds_when_session_bookkeeping_fails() {
    let storage = Arc::new(LastSaveRefusingStore(MemoryKeyValueStore::new()));
    let context = FileSystemContext::new(Arc::new(HeadlessEditor::new()), storage.clone());
    let fs = BrowserFileSystem::new(context);

    let saved = fs
        .write(&FileObject::named("kept").with_contents("<p>kept</p>"))
        .await
        .expect("content was stored");
    assert_eq!(saved.file_system_name(), Some(BrowserFileSystem::NAME));
    assert_eq!(
        storage.get("lurch-file-kept").expect("get").as_deref(),
        Some("<p>kept</p>")
    );
    assert_eq!(storage.get(LAST_SAVE_KEY).expect("get"), None);
}
