//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate backends and dialogs into open/save/delete workflows.
//! - Own the document session records shared by backends.
//! - Route editor clicks to atom handlers.

pub mod click_router;
pub mod document_session;
pub mod file_workflow;
