//! Folder-browsing panel shared by every backend.
//!
//! # Responsibility
//! - List the current folder through the backend's `list`.
//! - Translate list clicks into navigation and selection responses.
//! - Collect a filename in save mode.
//!
//! # Invariants
//! - Clicking a folder or the "up" row navigates; double-clicking a file
//!   submits it; clicking a file selects it.
//! - Selections are always stamped with the owning backend's name.

use crate::dialog::host::DialogEvent;
use crate::dialog::items::{DialogItem, ListEntry};
use crate::dialog::panel::{FilePanel, PanelMode, PanelResponse};
use crate::editor::NotificationKind;
use crate::fs::backend::FileSystem;
use crate::fs::capability::FileOperation;
use crate::model::file_object::FileObject;
use async_trait::async_trait;
use log::{debug, warn};

pub const FILE_LIST_ID: &str = "files";
pub const FILENAME_INPUT_ID: &str = "filename";
pub const LOCATION_INPUT_ID: &str = "location";
pub const GO_BUTTON_ID: &str = "go";

const UP_LABEL: &str = "..";

#[derive(Debug, Clone)]
enum Row {
    Up,
    Entry(FileObject),
}

/// Generic chooser/saver panel over a backend.
pub struct FolderBrowser {
    backend: Box<dyn FileSystem>,
    mode: PanelMode,
    /// Folders entered so far; the last one is the current location.
    trail: Vec<FileObject>,
    rows: Vec<Row>,
    selected_row: Option<usize>,
    filename: String,
    location_input: Option<String>,
    error: Option<String>,
}

impl FolderBrowser {
    pub fn new(backend: Box<dyn FileSystem>, mode: PanelMode) -> Self {
        Self {
            backend,
            mode,
            trail: Vec::new(),
            rows: Vec::new(),
            selected_row: None,
            filename: String::new(),
            location_input: None,
            error: None,
        }
    }

    pub fn chooser(backend: Box<dyn FileSystem>) -> Self {
        Self::new(backend, PanelMode::Open)
    }

    pub fn saver(backend: Box<dyn FileSystem>) -> Self {
        Self::new(backend, PanelMode::Save)
    }

    /// Adds a free-form location field with a "Go" button.
    pub fn with_location_input(mut self) -> Self {
        self.location_input = Some(String::new());
        self
    }

    /// Current folder, `None` at the root.
    pub fn location(&self) -> Option<&FileObject> {
        self.trail.last()
    }

    fn can_list(&self) -> bool {
        self.backend.implements(FileOperation::List)
    }

    async fn refresh_listing(&mut self) {
        self.rows.clear();
        self.selected_row = None;
        self.error = None;
        if !self.can_list() {
            return;
        }

        if !self.trail.is_empty() {
            self.rows.push(Row::Up);
        }
        let listed = self.backend.list(self.trail.last()).await;
        match listed {
            Ok(entries) => self.rows.extend(entries.into_iter().map(Row::Entry)),
            Err(err) => {
                warn!(
                    "event=panel_list module=dialog status=error file_system={} code={}",
                    self.backend.name(),
                    err.code()
                );
                self.error = Some(err.to_string());
            }
        }
    }

    async fn navigate(&mut self, target: Option<FileObject>) -> PanelResponse {
        match target {
            Some(folder) => self.trail.push(folder),
            None => {
                self.trail.pop();
            }
        }
        debug!(
            "event=panel_navigate module=dialog status=ok file_system={} depth={}",
            self.backend.name(),
            self.trail.len()
        );
        self.refresh_listing().await;
        PanelResponse::Navigate(self.save_target())
    }

    /// Save destination from the filename field and current location.
    fn save_target(&self) -> Option<FileObject> {
        if self.mode != PanelMode::Save {
            return None;
        }
        let filename = self.filename.trim();
        if filename.is_empty() {
            return None;
        }
        let path = self
            .location()
            .and_then(FileObject::path)
            .map(str::to_string);
        Some(FileObject::in_file_system(self.backend.name(), filename).with_path(path))
    }

    fn stamp(&self, file: &FileObject) -> FileObject {
        file.clone().stamped(self.backend.name())
    }

    async fn click(&mut self, index: usize, double: bool) -> PanelResponse {
        let Some(row) = self.rows.get(index).cloned() else {
            return PanelResponse::Nothing;
        };
        match row {
            Row::Up => self.navigate(None).await,
            Row::Entry(folder @ FileObject::Folder(_)) => {
                let folder = self.stamp(&folder);
                self.navigate(Some(folder)).await
            }
            Row::Entry(file) => {
                self.selected_row = Some(index);
                if self.mode == PanelMode::Save {
                    if let Some(name) = file.filename() {
                        self.filename = name.to_string();
                    }
                }
                let file = self.stamp(&file);
                if double {
                    PanelResponse::Submit(Some(file))
                } else {
                    PanelResponse::Select(Some(file))
                }
            }
        }
    }

    fn list_entries(&self) -> Vec<ListEntry> {
        self.rows
            .iter()
            .enumerate()
            .map(|(index, row)| match row {
                Row::Up => ListEntry {
                    label: UP_LABEL.to_string(),
                    is_folder: true,
                    selected: false,
                },
                Row::Entry(entry) => ListEntry {
                    label: entry.display_name(),
                    is_folder: entry.is_folder(),
                    selected: self.selected_row == Some(index),
                },
            })
            .collect()
    }
}

#[async_trait]
impl FilePanel for FolderBrowser {
    fn file_system_name(&self) -> &str {
        self.backend.name()
    }

    async fn load(&mut self) {
        self.refresh_listing().await;
    }

    fn items(&self) -> Vec<DialogItem> {
        let mut items = Vec::new();
        if let Some(location) = &self.location_input {
            items.push(DialogItem::text_input(LOCATION_INPUT_ID, "Location", location));
            items.push(DialogItem::button(GO_BUTTON_ID, "Go"));
        }
        if let Some(error) = &self.error {
            items.push(DialogItem::alert(NotificationKind::Error, error.clone()));
        }
        if self.can_list() {
            items.push(DialogItem::List {
                id: FILE_LIST_ID.to_string(),
                entries: self.list_entries(),
            });
        } else if self.mode == PanelMode::Open {
            items.push(DialogItem::alert(
                NotificationKind::Info,
                format!("{} cannot browse files.", self.backend.name()),
            ));
        }
        if self.mode == PanelMode::Save {
            items.push(DialogItem::text_input(
                FILENAME_INPUT_ID,
                "Filename",
                &self.filename,
            ));
        }
        items
    }

    async fn handle(&mut self, event: &DialogEvent) -> PanelResponse {
        match event {
            DialogEvent::Click { item, index } if item == FILE_LIST_ID => {
                self.click(*index, false).await
            }
            DialogEvent::DoubleClick { item, index } if item == FILE_LIST_ID => {
                self.click(*index, true).await
            }
            DialogEvent::Input { item, value } if item == FILENAME_INPUT_ID => {
                self.filename = value.clone();
                self.selected_row = None;
                PanelResponse::Select(self.save_target())
            }
            DialogEvent::Input { item, value } if item == LOCATION_INPUT_ID => {
                if let Some(location) = self.location_input.as_mut() {
                    *location = value.clone();
                }
                PanelResponse::Nothing
            }
            DialogEvent::Button(id) if id == GO_BUTTON_ID => {
                let target = self
                    .location_input
                    .as_deref()
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .map(|value| {
                        FileObject::folder(Some(self.backend.name().to_string()), value)
                    });
                match target {
                    Some(folder) => self.navigate(Some(folder)).await,
                    None => PanelResponse::Nothing,
                }
            }
            _ => PanelResponse::Nothing,
        }
    }
}
