//! Core of the Lurch document editor.
//! File-system abstraction with dialog-driven workflows, plus the
//! atom/shell content model and its conversion to logic concepts.

pub mod config;
pub mod db;
pub mod dialog;
pub mod editor;
pub mod fs;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use dialog::file_dialog::{DialogError, FileDialog};
pub use dialog::host::{DialogEvent, DialogHost};
pub use dialog::items::{DialogItem, DialogTab, DialogView, ListEntry};
pub use dialog::panel::{FilePanel, PanelMode, PanelResponse};
pub use editor::{Editor, HeadlessEditor, Notification, NotificationKind};
pub use fs::backend::{FileSystem, FileSystemContext};
pub use fs::browser::BrowserFileSystem;
pub use fs::capability::{Capabilities, FileOperation};
pub use fs::error::{FileSystemError, FileSystemResult};
pub use fs::offline::{DirectoryDownloader, Downloader, OfflineFileSystem};
pub use fs::registry::{FileSystemRegistry, FileSystemRegistryBuilder, RegistryError};
pub use fs::{configured_registry, standard_registry};
pub use fs::web::{FetchError, ReqwestFetcher, UrlFetcher, WebFileSystem};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::atom::{Atom, AtomError, AtomSlot, AtomState};
pub use model::document::{DocumentTree, NodeId, NodeKind, TreeError};
pub use model::file_object::{FileObject, FileRef, FolderRef};
pub use model::logic::{Environment, Expression, LcAttribute, LogicConcept};
pub use model::shell::{document_to_lcs, AccessibleNode, Shell, ShellError, ShellType};
pub use repo::kv_store::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError, StorageResult,
};
pub use service::click_router::{ClickOutcome, ClickRouter};
pub use service::document_session::DocumentSession;
pub use service::file_workflow::{FileWorkflows, WorkflowError, WorkflowOutcome};

/// Minimal health-check API for tooling.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
