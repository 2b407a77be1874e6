//! Per-backend dialog panels and their typed responses.

use crate::dialog::host::DialogEvent;
use crate::dialog::items::DialogItem;
use crate::model::file_object::FileObject;
use async_trait::async_trait;

/// Panel answer to one event; the dialog applies it to its selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelResponse {
    Nothing,
    /// Replaces the pending selection (`None` clears it).
    Select(Option<FileObject>),
    /// The panel moved to another location; the view must be re-rendered.
    Navigate(Option<FileObject>),
    /// Submits, replacing the selection first when a file is given.
    Submit(Option<FileObject>),
}

/// Whether a panel picks an existing file or a save destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelMode {
    Open,
    Save,
}

/// Tab content contributed by one backend.
#[async_trait]
pub trait FilePanel: Send {
    /// Name of the backend that produced this panel.
    fn file_system_name(&self) -> &str;

    /// Prepares initial content (first listing) when the tab is shown.
    async fn load(&mut self);

    fn items(&self) -> Vec<DialogItem>;

    async fn handle(&mut self, event: &DialogEvent) -> PanelResponse;
}
