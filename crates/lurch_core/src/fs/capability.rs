//! File operation names and per-backend capability flags.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// One operation of the file-system contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileOperation {
    Read,
    Write,
    Delete,
    Has,
    List,
}

/// Operation name for `read`.
pub const FILE_OPERATION_READ: &str = "read";
/// Operation name for `write`.
pub const FILE_OPERATION_WRITE: &str = "write";
/// Operation name for `delete`.
pub const FILE_OPERATION_DELETE: &str = "delete";
/// Operation name for `has`.
pub const FILE_OPERATION_HAS: &str = "has";
/// Operation name for `list`.
pub const FILE_OPERATION_LIST: &str = "list";

const SUPPORTED_FILE_OPERATION_STRINGS: &[&str] = &[
    FILE_OPERATION_READ,
    FILE_OPERATION_WRITE,
    FILE_OPERATION_DELETE,
    FILE_OPERATION_HAS,
    FILE_OPERATION_LIST,
];

impl FileOperation {
    pub const ALL: [FileOperation; 5] = [
        Self::Read,
        Self::Write,
        Self::Delete,
        Self::Has,
        Self::List,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => FILE_OPERATION_READ,
            Self::Write => FILE_OPERATION_WRITE,
            Self::Delete => FILE_OPERATION_DELETE,
            Self::Has => FILE_OPERATION_HAS,
            Self::List => FILE_OPERATION_LIST,
        }
    }

    fn bit(self) -> u8 {
        match self {
            Self::Read => 1,
            Self::Write => 1 << 1,
            Self::Delete => 1 << 2,
            Self::Has => 1 << 3,
            Self::List => 1 << 4,
        }
    }
}

impl Display for FileOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the accepted operation names.
pub fn supported_file_operation_strings() -> &'static [&'static str] {
    SUPPORTED_FILE_OPERATION_STRINGS
}

/// Parses an operation name. Matching is exact after trimming.
pub fn parse_file_operation(value: &str) -> Result<FileOperation, FileOperationError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(FileOperationError::EmptyOperation);
    }

    FileOperation::ALL
        .iter()
        .copied()
        .find(|operation| operation.as_str() == normalized)
        .ok_or_else(|| FileOperationError::UnsupportedOperation(normalized.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOperationError {
    EmptyOperation,
    UnsupportedOperation(String),
}

impl Display for FileOperationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyOperation => write!(f, "file operation must not be empty"),
            Self::UnsupportedOperation(value) => write!(f, "file operation is unsupported: {value}"),
        }
    }
}

impl Error for FileOperationError {}

/// Set of operations a backend implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Capabilities(u8);

impl Capabilities {
    pub const NONE: Capabilities = Capabilities(0);

    pub fn of(operations: &[FileOperation]) -> Self {
        operations
            .iter()
            .fold(Self::NONE, |caps, operation| caps.with(*operation))
    }

    pub fn with(self, operation: FileOperation) -> Self {
        Self(self.0 | operation.bit())
    }

    pub fn contains(self, operation: FileOperation) -> bool {
        self.0 & operation.bit() != 0
    }

    /// Contained operations in declaration order.
    pub fn operations(self) -> Vec<FileOperation> {
        FileOperation::ALL
            .iter()
            .copied()
            .filter(|operation| self.contains(*operation))
            .collect()
    }
}
