//! Open, save, save-as and delete workflows over registered backends.
//!
//! # Responsibility
//! - Offer one dialog tab per backend implementing the needed operation.
//! - Dispatch the submitted selection to the backend it names.
//! - Report each outcome to the editor exactly once.
//!
//! # Invariants
//! - Cancellation resolves to `WorkflowOutcome::Cancelled`, never an error.
//! - Every failure produces one error notification and one log line.
//! - Delete and overwrite require explicit confirmation.

use crate::config::CoreConfig;
use crate::dialog::file_dialog::{DialogError, FileDialog};
use crate::dialog::host::DialogHost;
use crate::dialog::panel::FilePanel;
use crate::editor::NotificationKind;
use crate::fs::backend::{FileSystem, FileSystemContext};
use crate::fs::capability::FileOperation;
use crate::fs::error::{FileSystemError, FileSystemResult};
use crate::fs::configured_registry;
use crate::fs::registry::{FileSystemRegistry, RegistryError};
use crate::model::file_object::FileObject;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const DEFAULT_NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// The operation finished; carries the affected file.
    Completed(FileObject),
    Cancelled,
}

#[derive(Debug)]
pub enum WorkflowError {
    FileSystem(FileSystemError),
    /// A backend panel broke the selection contract.
    ContractViolation(DialogError),
    /// The selection names a backend that is not registered.
    UnknownBackend(String),
}

impl Display for WorkflowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileSystem(err) => write!(f, "{err}"),
            Self::ContractViolation(err) => write!(f, "file system contract violated: {err}"),
            Self::UnknownBackend(name) => write!(f, "unknown file system: {name}"),
        }
    }
}

impl Error for WorkflowError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::FileSystem(err) => Some(err),
            Self::ContractViolation(err) => Some(err),
            Self::UnknownBackend(_) => None,
        }
    }
}

impl WorkflowError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::FileSystem(err) => err.code(),
            Self::ContractViolation(_) => "contract_violation",
            Self::UnknownBackend(_) => "unknown_backend",
        }
    }
}

pub type WorkflowResult = Result<WorkflowOutcome, WorkflowError>;

/// Dialog-driven file workflows for one editor session.
pub struct FileWorkflows {
    registry: Arc<FileSystemRegistry>,
    context: FileSystemContext,
    host: Arc<dyn DialogHost>,
    notification_timeout: Duration,
}

impl FileWorkflows {
    pub fn new(
        registry: Arc<FileSystemRegistry>,
        context: FileSystemContext,
        host: Arc<dyn DialogHost>,
    ) -> Self {
        Self {
            registry,
            context,
            host,
            notification_timeout: DEFAULT_NOTIFICATION_TIMEOUT,
        }
    }

    /// Workflows over the configured standard backends.
    pub fn from_config(
        config: &CoreConfig,
        context: FileSystemContext,
        host: Arc<dyn DialogHost>,
    ) -> Result<Self, RegistryError> {
        let registry = configured_registry(config)?;
        Ok(Self::new(Arc::new(registry), context, host)
            .with_notification_timeout(config.notification_timeout()))
    }

    pub fn with_notification_timeout(mut self, timeout: Duration) -> Self {
        self.notification_timeout = timeout;
        self
    }

    pub fn context(&self) -> &FileSystemContext {
        &self.context
    }

    /// Picks a file, loads it into the editor and records its location.
    pub async fn open(&self) -> WorkflowResult {
        let op_id = Uuid::new_v4();
        let Some(file) = self
            .choose(op_id, FileOperation::Read, "Open file", "Open")
            .await?
        else {
            return Ok(self.cancelled(op_id, "open"));
        };

        let backend = self.backend_for(op_id, "open", &file)?;
        let loaded = self.report(op_id, "open", backend.read(&file).await)?;
        self.context
            .editor
            .set_content(loaded.contents().unwrap_or_default());
        self.context.editor.set_dirty(false);
        if let Err(err) = self.context.session.set_last_saved(&loaded) {
            warn!(
                "event=workflow_open module=workflow status=degraded op_id={} error={}",
                op_id, err
            );
        }

        self.succeed(op_id, "open", &format!("Opened {}.", loaded.display_name()));
        Ok(WorkflowOutcome::Completed(loaded))
    }

    /// Saves to the last location when possible, otherwise asks for one.
    pub async fn save(&self) -> WorkflowResult {
        let op_id = Uuid::new_v4();
        let last = match self.context.session.last_saved() {
            Ok(last) => last,
            Err(err) => {
                warn!(
                    "event=workflow_save module=workflow status=degraded op_id={} error={}",
                    op_id, err
                );
                None
            }
        };

        if let Some(last) = last.filter(|file| !file.is_folder()) {
            let backend = last
                .file_system_name()
                .and_then(|name| self.registry.instantiate(name, &self.context))
                .filter(|backend| backend.implements(FileOperation::Write));
            if let Some(backend) = backend {
                return self.write_to(op_id, "save", backend.as_ref(), last).await;
            }
        }
        self.save_as().await
    }

    /// Asks for a destination, confirms overwrites, then writes.
    pub async fn save_as(&self) -> WorkflowResult {
        let op_id = Uuid::new_v4();
        let Some(target) = self
            .choose(op_id, FileOperation::Write, "Save as", "Save")
            .await?
        else {
            return Ok(self.cancelled(op_id, "save_as"));
        };

        let backend = self.backend_for(op_id, "save_as", &target)?;
        if backend.implements(FileOperation::Has) {
            let exists = self.report(op_id, "save_as", backend.has(&target).await)?;
            let message = format!("Replace the existing file {}?", target.display_name());
            if exists && !self.host.confirm("Overwrite file?", &message).await {
                return Ok(self.cancelled(op_id, "save_as"));
            }
        }
        self.write_to(op_id, "save_as", backend.as_ref(), target)
            .await
    }

    /// Picks a file, confirms, then deletes it.
    pub async fn delete(&self) -> WorkflowResult {
        let op_id = Uuid::new_v4();
        let Some(file) = self
            .choose(op_id, FileOperation::Delete, "Delete file", "Delete")
            .await?
        else {
            return Ok(self.cancelled(op_id, "delete"));
        };

        let message = format!("Permanently delete {}?", file.display_name());
        if !self.host.confirm("Delete file?", &message).await {
            return Ok(self.cancelled(op_id, "delete"));
        }
        let backend = self.backend_for(op_id, "delete", &file)?;
        self.report(op_id, "delete", backend.delete(&file).await)?;

        self.succeed(op_id, "delete", &format!("Deleted {}.", file.display_name()));
        Ok(WorkflowOutcome::Completed(file))
    }

    async fn write_to(
        &self,
        op_id: Uuid,
        action: &str,
        backend: &dyn FileSystem,
        target: FileObject,
    ) -> WorkflowResult {
        let document = target.with_contents(self.context.editor.get_content());
        let saved = self.report(op_id, action, backend.write(&document).await)?;
        self.succeed(op_id, action, &format!("Saved {}.", saved.display_name()));
        Ok(WorkflowOutcome::Completed(saved.identity()))
    }

    async fn choose(
        &self,
        op_id: Uuid,
        operation: FileOperation,
        title: &str,
        submit_label: &str,
    ) -> Result<Option<FileObject>, WorkflowError> {
        let backends = self.registry.supporting(operation, &self.context);
        if backends.is_empty() {
            return Err(self.failure(
                op_id,
                operation.as_str(),
                FileSystemError::NoBackendsAvailable(operation),
            ));
        }

        let panels: Vec<Box<dyn FilePanel>> = backends
            .into_iter()
            .map(|backend| match operation {
                FileOperation::Write => backend.saver_panel(),
                _ => backend.chooser_panel(),
            })
            .collect();
        info!(
            "event=workflow_dialog module=workflow status=start op_id={} operation={} tabs={}",
            op_id,
            operation.as_str(),
            panels.len()
        );

        let dialog = FileDialog::new(
            self.host.as_ref(),
            self.context.editor.as_ref(),
            title,
            submit_label,
            panels,
        )
        .with_notification_timeout(self.notification_timeout);
        dialog.run().await.map_err(|err| {
            self.fail(op_id, operation.as_str(), err.to_string(), "contract_violation");
            WorkflowError::ContractViolation(err)
        })
    }

    fn backend_for(
        &self,
        op_id: Uuid,
        action: &str,
        file: &FileObject,
    ) -> Result<Box<dyn FileSystem>, WorkflowError> {
        let name = file.file_system_name().unwrap_or_default();
        self.registry
            .instantiate(name, &self.context)
            .ok_or_else(|| {
                self.fail(op_id, action, format!("Unknown file system: {name}"), "unknown_backend");
                WorkflowError::UnknownBackend(name.to_string())
            })
    }

    fn report<T>(&self, op_id: Uuid, action: &str, result: FileSystemResult<T>) -> Result<T, WorkflowError> {
        result.map_err(|err| self.failure(op_id, action, err))
    }

    fn failure(&self, op_id: Uuid, action: &str, err: FileSystemError) -> WorkflowError {
        self.fail(op_id, action, err.to_string(), err.code());
        WorkflowError::FileSystem(err)
    }

    fn fail(&self, op_id: Uuid, action: &str, message: String, code: &str) {
        error!(
            "event=workflow_{} module=workflow status=error op_id={} code={}",
            action, op_id, code
        );
        self.context
            .editor
            .notify(NotificationKind::Error, &message, None);
    }

    fn succeed(&self, op_id: Uuid, action: &str, message: &str) {
        info!(
            "event=workflow_{} module=workflow status=ok op_id={}",
            action, op_id
        );
        self.context.editor.notify(
            NotificationKind::Success,
            message,
            Some(self.notification_timeout),
        );
    }

    fn cancelled(&self, op_id: Uuid, action: &str) -> WorkflowOutcome {
        info!(
            "event=workflow_{} module=workflow status=cancelled op_id={}",
            action, op_id
        );
        WorkflowOutcome::Cancelled
    }
}
