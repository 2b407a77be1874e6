//! File dialogs: declarative view, host boundary, panels and run loop.

pub mod file_dialog;
pub mod folder_browser;
pub mod host;
pub mod items;
pub mod panel;
