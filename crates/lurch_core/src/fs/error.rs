//! Typed failures of file-system backends.

use crate::fs::capability::FileOperation;
use crate::repo::kv_store::StorageError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type FileSystemResult<T> = Result<T, FileSystemError>;

/// File operation failure. Callers match on variants, never on messages.
#[derive(Debug)]
pub enum FileSystemError {
    /// The object lacks the fields this backend uses to identify files.
    MissingIdentifier,
    NotFound(String),
    /// The object names another backend.
    WrongFileSystem { expected: String, actual: String },
    MissingContent,
    SubfoldersUnsupported { file_system: String },
    Unimplemented { file_system: String, operation: FileOperation },
    PathNotFound(String),
    InvalidQuery(String),
    /// No registered backend supports the requested operation.
    NoBackendsAvailable(FileOperation),
    WriteError(String),
    NetworkError(String),
    Storage(StorageError),
}

impl FileSystemError {
    /// Stable code used in diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingIdentifier => "missing_identifier",
            Self::NotFound(_) => "not_found",
            Self::WrongFileSystem { .. } => "wrong_file_system",
            Self::MissingContent => "missing_content",
            Self::SubfoldersUnsupported { .. } => "subfolders_unsupported",
            Self::Unimplemented { .. } => "unimplemented",
            Self::PathNotFound(_) => "path_not_found",
            Self::InvalidQuery(_) => "invalid_query",
            Self::NoBackendsAvailable(_) => "no_backends_available",
            Self::WriteError(_) => "write_error",
            Self::NetworkError(_) => "network_error",
            Self::Storage(_) => "storage",
        }
    }
}

impl Display for FileSystemError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingIdentifier => write!(f, "no filename or identifier given"),
            Self::NotFound(name) => write!(f, "no such file: {name}"),
            Self::WrongFileSystem { expected, actual } => {
                write!(f, "file belongs to `{actual}`, not `{expected}`")
            }
            Self::MissingContent => write!(f, "no content to save"),
            Self::SubfoldersUnsupported { file_system } => {
                write!(f, "{file_system} does not support subfolders")
            }
            Self::Unimplemented {
                file_system,
                operation,
            } => write!(f, "{file_system} does not implement {}", operation.as_str()),
            Self::PathNotFound(path) => write!(f, "no such folder: {path}"),
            Self::InvalidQuery(message) => write!(f, "invalid query: {message}"),
            Self::NoBackendsAvailable(operation) => {
                write!(f, "no file system supports {}", operation.as_str())
            }
            Self::WriteError(message) => write!(f, "could not save: {message}"),
            Self::NetworkError(message) => write!(f, "network error: {message}"),
            Self::Storage(err) => write!(f, "storage error: {err}"),
        }
    }
}

impl Error for FileSystemError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for FileSystemError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}
