//! Shared doubles for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use lurch_core::{
    DialogEvent, DialogHost, DialogView, FetchError, FileSystemContext, HeadlessEditor,
    MemoryKeyValueStore, UrlFetcher,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Dialog host that replays a fixed event script and records what it showed.
#[derive(Default)]
pub struct ScriptedDialogHost {
    events: Mutex<VecDeque<DialogEvent>>,
    confirmations: Mutex<VecDeque<bool>>,
    pub opened: Mutex<Vec<DialogView>>,
    pub refreshed: Mutex<Vec<DialogView>>,
    pub confirm_prompts: Mutex<Vec<String>>,
    pub closed: Mutex<usize>,
}

impl ScriptedDialogHost {
    pub fn new(events: Vec<DialogEvent>) -> Self {
        Self {
            events: Mutex::new(events.into()),
            ..Self::default()
        }
    }

    pub fn answering(self, confirmations: Vec<bool>) -> Self {
        *self.confirmations.lock().unwrap() = confirmations.into();
        self
    }

    pub fn open_count(&self) -> usize {
        self.opened.lock().unwrap().len()
    }

    pub fn last_view(&self) -> Option<DialogView> {
        let refreshed = self.refreshed.lock().unwrap();
        refreshed
            .last()
            .cloned()
            .or_else(|| self.opened.lock().unwrap().last().cloned())
    }
}

#[async_trait]
impl DialogHost for ScriptedDialogHost {
    fn open(&self, view: DialogView) -> mpsc::Receiver<DialogEvent> {
        self.opened.lock().unwrap().push(view);
        let events: Vec<DialogEvent> = self.events.lock().unwrap().drain(..).collect();
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            tx.try_send(event).unwrap();
        }
        rx
    }

    fn refresh(&self, view: DialogView) {
        self.refreshed.lock().unwrap().push(view);
    }

    fn close(&self) {
        *self.closed.lock().unwrap() += 1;
    }

    async fn confirm(&self, _title: &str, message: &str) -> bool {
        self.confirm_prompts.lock().unwrap().push(message.to_string());
        self.confirmations.lock().unwrap().pop_front().unwrap_or(false)
    }
}

/// Fetcher serving fixed pages; unknown URLs answer 404.
#[derive(Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
}

impl StaticFetcher {
    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }
}

#[async_trait]
impl UrlFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.pages.get(url).cloned().ok_or(FetchError::Status(404))
    }
}

pub struct Session {
    pub editor: Arc<HeadlessEditor>,
    pub storage: Arc<MemoryKeyValueStore>,
    pub context: FileSystemContext,
}

pub fn session() -> Session {
    let editor = Arc::new(HeadlessEditor::new());
    let storage = Arc::new(MemoryKeyValueStore::new());
    let context = FileSystemContext::new(editor.clone(), storage.clone());
    Session {
        editor,
        storage,
        context,
    }
}
