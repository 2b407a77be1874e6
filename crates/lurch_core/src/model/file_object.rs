//! File object model passed between every file operation.
//!
//! # Responsibility
//! - Describe a file's identity, location and (optionally) its content.
//! - Distinguish files from folder entries by type instead of field presence.
//!
//! # Invariants
//! - `uid` is never present without `file_system_name`.
//! - Folders never carry `contents` (unrepresentable).
//! - Folder paths are non-empty.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// File record. Every field is optional; see module invariants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    /// Owning backend. `None` means unsaved, created locally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_system_name: Option<String>,
    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Backend-internal identifier.
    #[serde(rename = "UID", default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Containment path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Full textual payload. Absent in listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,
}

/// Folder entry, as produced by `list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_system_name: Option<String>,
    pub path: String,
}

/// Universal currency of file operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileObject {
    File(FileRef),
    Folder(FolderRef),
}

/// Validation failures for file objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileObjectValidationError {
    UidWithoutFileSystem,
    EmptyFolderPath,
}

impl Display for FileObjectValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UidWithoutFileSystem => {
                write!(f, "a file UID requires a file system name")
            }
            Self::EmptyFolderPath => write!(f, "folder path must not be empty"),
        }
    }
}

impl Error for FileObjectValidationError {}

impl FileObject {
    /// Unsaved document holding only contents.
    pub fn unsaved(contents: impl Into<String>) -> Self {
        Self::File(FileRef {
            contents: Some(contents.into()),
            ..FileRef::default()
        })
    }

    /// File addressed by name only, with no owning backend yet.
    pub fn named(filename: impl Into<String>) -> Self {
        Self::File(FileRef {
            filename: Some(filename.into()),
            ..FileRef::default()
        })
    }

    /// File owned by `file_system_name` and addressed by name.
    pub fn in_file_system(file_system_name: impl Into<String>, filename: impl Into<String>) -> Self {
        Self::File(FileRef {
            file_system_name: Some(file_system_name.into()),
            filename: Some(filename.into()),
            ..FileRef::default()
        })
    }

    /// Folder entry at `path`.
    pub fn folder(file_system_name: Option<String>, path: impl Into<String>) -> Self {
        Self::Folder(FolderRef {
            file_system_name,
            path: path.into(),
        })
    }

    /// Returns `self` with `contents` replaced. Folders are returned unchanged.
    pub fn with_contents(self, contents: impl Into<String>) -> Self {
        match self {
            Self::File(mut file) => {
                file.contents = Some(contents.into());
                Self::File(file)
            }
            folder @ Self::Folder(_) => folder,
        }
    }

    /// Returns `self` with `path` replaced.
    pub fn with_path(self, path: Option<String>) -> Self {
        match self {
            Self::File(mut file) => {
                file.path = path;
                Self::File(file)
            }
            Self::Folder(mut folder) => {
                if let Some(path) = path {
                    folder.path = path;
                }
                Self::Folder(folder)
            }
        }
    }

    /// Returns `self` with `uid` replaced. Folders are returned unchanged.
    pub fn with_uid(self, uid: impl Into<String>) -> Self {
        match self {
            Self::File(mut file) => {
                file.uid = Some(uid.into());
                Self::File(file)
            }
            folder @ Self::Folder(_) => folder,
        }
    }

    /// Returns `self` stamped as owned by `file_system_name`.
    pub fn stamped(self, file_system_name: &str) -> Self {
        match self {
            Self::File(mut file) => {
                file.file_system_name = Some(file_system_name.to_string());
                Self::File(file)
            }
            Self::Folder(mut folder) => {
                folder.file_system_name = Some(file_system_name.to_string());
                Self::Folder(folder)
            }
        }
    }

    /// Identifying fields only (contents dropped).
    pub fn identity(&self) -> Self {
        match self {
            Self::File(file) => Self::File(FileRef {
                contents: None,
                ..file.clone()
            }),
            Self::Folder(folder) => Self::Folder(folder.clone()),
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder(_))
    }

    pub fn file_system_name(&self) -> Option<&str> {
        match self {
            Self::File(file) => file.file_system_name.as_deref(),
            Self::Folder(folder) => folder.file_system_name.as_deref(),
        }
    }

    pub fn filename(&self) -> Option<&str> {
        match self {
            Self::File(file) => file.filename.as_deref(),
            Self::Folder(_) => None,
        }
    }

    pub fn uid(&self) -> Option<&str> {
        match self {
            Self::File(file) => file.uid.as_deref(),
            Self::Folder(_) => None,
        }
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            Self::File(file) => file.path.as_deref(),
            Self::Folder(folder) => Some(folder.path.as_str()),
        }
    }

    pub fn contents(&self) -> Option<&str> {
        match self {
            Self::File(file) => file.contents.as_deref(),
            Self::Folder(_) => None,
        }
    }

    /// Non-blank filename, trimmed.
    pub fn non_empty_filename(&self) -> Option<&str> {
        self.filename()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// True when the object points below the root of its backend.
    pub fn has_subfolder_path(&self) -> bool {
        self.path().is_some_and(|path| !path.trim().is_empty())
    }

    /// Checks structural invariants.
    pub fn validate(&self) -> Result<(), FileObjectValidationError> {
        match self {
            Self::File(file) => {
                if file.uid.is_some() && file.file_system_name.is_none() {
                    return Err(FileObjectValidationError::UidWithoutFileSystem);
                }
            }
            Self::Folder(folder) => {
                if folder.path.trim().is_empty() {
                    return Err(FileObjectValidationError::EmptyFolderPath);
                }
            }
        }
        Ok(())
    }

    /// Short human-readable label for notifications and logs.
    pub fn display_name(&self) -> String {
        match self {
            Self::File(file) => file
                .filename
                .clone()
                .or_else(|| file.uid.clone())
                .unwrap_or_else(|| "untitled".to_string()),
            Self::Folder(folder) => folder.path.clone(),
        }
    }
}
