//! Editor boundary consumed by file workflows.
//!
//! # Responsibility
//! - Define the `Editor` trait (content, dirty flag, notifications).
//! - Provide `HeadlessEditor`, an in-memory editor for tools and tests.

use log::info;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Severity of a transient user notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Info,
    Warning,
    Error,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// One notification as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub timeout: Option<Duration>,
}

/// Rich-text editor surface used by the core.
pub trait Editor: Send + Sync {
    fn get_content(&self) -> String;
    fn set_content(&self, html: &str);
    fn is_dirty(&self) -> bool;
    fn set_dirty(&self, dirty: bool);
    /// Shows a transient notification; `None` keeps it until dismissed.
    fn notify(&self, kind: NotificationKind, message: &str, timeout: Option<Duration>);
}

#[derive(Debug, Default)]
struct HeadlessState {
    content: String,
    dirty: bool,
    notifications: Vec<Notification>,
}

/// Editor without a UI: holds content in memory and records notifications.
#[derive(Debug, Default)]
pub struct HeadlessEditor {
    state: Mutex<HeadlessState>,
}

impl HeadlessEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(content: impl Into<String>) -> Self {
        let editor = Self::default();
        editor.lock().content = content.into();
        editor
    }

    /// Notifications shown so far, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.clone()
    }

    pub fn take_notifications(&self) -> Vec<Notification> {
        std::mem::take(&mut self.lock().notifications)
    }

    fn lock(&self) -> MutexGuard<'_, HeadlessState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Editor for HeadlessEditor {
    fn get_content(&self) -> String {
        self.lock().content.clone()
    }

    fn set_content(&self, html: &str) {
        self.lock().content = html.to_string();
    }

    fn is_dirty(&self) -> bool {
        self.lock().dirty
    }

    fn set_dirty(&self, dirty: bool) {
        self.lock().dirty = dirty;
    }

    fn notify(&self, kind: NotificationKind, message: &str, timeout: Option<Duration>) {
        info!(
            "event=editor_notify module=editor status=ok kind={} chars={}",
            kind.as_str(),
            message.chars().count()
        );
        self.lock().notifications.push(Notification {
            kind,
            message: message.to_string(),
            timeout,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::{Editor, HeadlessEditor, NotificationKind};

    #[test]
    fn headless_editor_records_state_and_notifications() {
        let editor = HeadlessEditor::with_content("<p>draft</p>");
        editor.set_dirty(true);
        editor.notify(NotificationKind::Info, "hello", None);

        assert_eq!(editor.get_content(), "<p>draft</p>");
        assert!(editor.is_dirty());
        let shown = editor.take_notifications();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].kind, NotificationKind::Info);
        assert!(editor.notifications().is_empty());
    }
}
