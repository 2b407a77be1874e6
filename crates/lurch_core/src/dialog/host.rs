//! Boundary to the dialog-rendering engine.

use crate::dialog::items::DialogView;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// User interaction reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogEvent {
    /// A tab was activated, by name.
    SwitchTab(String),
    Click { item: String, index: usize },
    DoubleClick { item: String, index: usize },
    Input { item: String, value: String },
    Button(String),
    Submit,
    Cancel,
}

/// Renders dialogs and reports events over a channel.
///
/// A closed channel is treated as cancellation.
#[async_trait]
pub trait DialogHost: Send + Sync {
    fn open(&self, view: DialogView) -> mpsc::Receiver<DialogEvent>;
    fn refresh(&self, view: DialogView);
    fn close(&self);
    /// Yes/no prompt.
    async fn confirm(&self, title: &str, message: &str) -> bool;
}
