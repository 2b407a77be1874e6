//! Tabbed file dialog driving one panel per backend.
//!
//! # Responsibility
//! - Route host events to the active panel.
//! - Keep the pending selection from typed panel responses.
//! - Resolve to the submitted file, or `None` on cancel.
//!
//! # Invariants
//! - Submitting without a selection warns and keeps the dialog open.
//! - A submitted selection must name the active panel's backend.

use crate::dialog::host::{DialogEvent, DialogHost};
use crate::dialog::items::{DialogTab, DialogView};
use crate::dialog::panel::{FilePanel, PanelResponse};
use crate::editor::{Editor, NotificationKind};
use crate::model::file_object::FileObject;
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

const NO_SELECTION_MESSAGE: &str = "No file selected.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogError {
    /// A panel produced a selection that does not name its own backend.
    ContractViolation {
        panel: String,
        selection: Option<String>,
    },
}

impl Display for DialogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContractViolation { panel, selection } => write!(
                f,
                "panel `{panel}` selected a file owned by `{}`",
                selection.as_deref().unwrap_or("no file system")
            ),
        }
    }
}

impl Error for DialogError {}

pub type DialogResult<T> = Result<T, DialogError>;

pub struct FileDialog<'a> {
    host: &'a dyn DialogHost,
    editor: &'a dyn Editor,
    title: String,
    submit_label: String,
    panels: Vec<Box<dyn FilePanel>>,
    loaded: Vec<bool>,
    active: usize,
    selection: Option<FileObject>,
    notification_timeout: Option<Duration>,
}

impl<'a> FileDialog<'a> {
    pub fn new(
        host: &'a dyn DialogHost,
        editor: &'a dyn Editor,
        title: &str,
        submit_label: &str,
        panels: Vec<Box<dyn FilePanel>>,
    ) -> Self {
        let loaded = vec![false; panels.len()];
        Self {
            host,
            editor,
            title: title.to_string(),
            submit_label: submit_label.to_string(),
            panels,
            loaded,
            active: 0,
            selection: None,
            notification_timeout: None,
        }
    }

    pub fn with_notification_timeout(mut self, timeout: Duration) -> Self {
        self.notification_timeout = Some(timeout);
        self
    }

    /// Shows the dialog and waits for a submitted file.
    pub async fn run(mut self) -> DialogResult<Option<FileObject>> {
        self.ensure_loaded().await;
        let mut events = self.host.open(self.view());

        while let Some(event) = events.recv().await {
            debug!("event=dialog_event module=dialog status=ok kind={}", event_kind(&event));
            let response = match &event {
                DialogEvent::Cancel => break,
                DialogEvent::Submit => PanelResponse::Submit(None),
                DialogEvent::SwitchTab(name) => {
                    self.switch_tab(name).await;
                    continue;
                }
                other => match self.panels.get_mut(self.active) {
                    Some(panel) => panel.handle(other).await,
                    None => PanelResponse::Nothing,
                },
            };

            match response {
                PanelResponse::Nothing => {}
                PanelResponse::Select(selection) => {
                    self.selection = selection;
                    self.host.refresh(self.view());
                }
                PanelResponse::Navigate(selection) => {
                    self.selection = selection;
                    self.host.refresh(self.view());
                }
                PanelResponse::Submit(selection) => {
                    if selection.is_some() {
                        self.selection = selection;
                    }
                    if let Some(file) = self.submit()? {
                        self.host.close();
                        return Ok(Some(file));
                    }
                }
            }
        }

        info!(
            "event=dialog_cancel module=dialog status=ok title={}",
            self.title
        );
        self.host.close();
        Ok(None)
    }

    fn submit(&mut self) -> DialogResult<Option<FileObject>> {
        let Some(selection) = self.selection.clone() else {
            self.editor.notify(
                NotificationKind::Warning,
                NO_SELECTION_MESSAGE,
                self.notification_timeout,
            );
            return Ok(None);
        };

        let panel = self
            .panels
            .get(self.active)
            .map(|panel| panel.file_system_name().to_string())
            .unwrap_or_default();
        if selection.file_system_name() != Some(panel.as_str()) {
            error!(
                "event=dialog_submit module=dialog status=error code=contract_violation panel={} selection={}",
                panel,
                selection.file_system_name().unwrap_or("none")
            );
            self.host.close();
            return Err(DialogError::ContractViolation {
                panel,
                selection: selection.file_system_name().map(str::to_string),
            });
        }
        Ok(Some(selection))
    }

    async fn switch_tab(&mut self, name: &str) {
        let Some(index) = self
            .panels
            .iter()
            .position(|panel| panel.file_system_name() == name)
        else {
            return;
        };
        if index != self.active {
            self.active = index;
            self.selection = None;
            self.ensure_loaded().await;
        }
        self.host.refresh(self.view());
    }

    async fn ensure_loaded(&mut self) {
        let index = self.active;
        if let (Some(panel), Some(loaded)) = (self.panels.get_mut(index), self.loaded.get_mut(index)) {
            if !*loaded {
                panel.load().await;
                *loaded = true;
            }
        }
    }

    fn view(&self) -> DialogView {
        DialogView {
            title: self.title.clone(),
            tabs: self
                .panels
                .iter()
                .map(|panel| DialogTab {
                    name: panel.file_system_name().to_string(),
                    items: panel.items(),
                })
                .collect(),
            active_tab: self.active,
            submit_label: self.submit_label.clone(),
            selection: self.selection.as_ref().map(FileObject::display_name),
        }
    }
}

fn event_kind(event: &DialogEvent) -> &'static str {
    match event {
        DialogEvent::SwitchTab(_) => "switch_tab",
        DialogEvent::Click { .. } => "click",
        DialogEvent::DoubleClick { .. } => "double_click",
        DialogEvent::Input { .. } => "input",
        DialogEvent::Button(_) => "button",
        DialogEvent::Submit => "submit",
        DialogEvent::Cancel => "cancel",
    }
}
