//! Declarative dialog content rendered by a `DialogHost`.

use crate::editor::NotificationKind;

/// One row of a selectable list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub label: String,
    pub is_folder: bool,
    pub selected: bool,
}

/// One renderable dialog element. `id` values name event sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogItem {
    TextInput {
        id: String,
        label: String,
        value: String,
    },
    TextArea {
        id: String,
        label: String,
        value: String,
    },
    SelectBox {
        id: String,
        label: String,
        options: Vec<String>,
        selected: Option<usize>,
    },
    Button {
        id: String,
        label: String,
    },
    Alert {
        kind: NotificationKind,
        message: String,
    },
    List {
        id: String,
        entries: Vec<ListEntry>,
    },
    Html(String),
}

impl DialogItem {
    pub fn text_input(id: &str, label: &str, value: &str) -> Self {
        Self::TextInput {
            id: id.to_string(),
            label: label.to_string(),
            value: value.to_string(),
        }
    }

    pub fn button(id: &str, label: &str) -> Self {
        Self::Button {
            id: id.to_string(),
            label: label.to_string(),
        }
    }

    pub fn alert(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self::Alert {
            kind,
            message: message.into(),
        }
    }

    /// Event source id, for items that emit events.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::TextInput { id, .. }
            | Self::TextArea { id, .. }
            | Self::SelectBox { id, .. }
            | Self::Button { id, .. }
            | Self::List { id, .. } => Some(id),
            Self::Alert { .. } | Self::Html(_) => None,
        }
    }
}

/// One tab; file dialogs use one tab per backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogTab {
    pub name: String,
    pub items: Vec<DialogItem>,
}

/// Full dialog state handed to the host on open and refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogView {
    pub title: String,
    pub tabs: Vec<DialogTab>,
    pub active_tab: usize,
    pub submit_label: String,
    /// Label of the pending selection, shown next to the submit button.
    pub selection: Option<String>,
}

impl DialogView {
    pub fn active(&self) -> Option<&DialogTab> {
        self.tabs.get(self.active_tab)
    }

    /// Finds an item by id on the active tab.
    pub fn find(&self, id: &str) -> Option<&DialogItem> {
        self.active()?
            .items
            .iter()
            .find(|item| item.id() == Some(id))
    }
}
