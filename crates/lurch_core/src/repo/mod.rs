//! Persistence layer abstractions and implementations.
//!
//! # Responsibility
//! - Define the key-value storage contract shared by backends and sessions.
//! - Isolate SQLite details from file-system and workflow code.
//!
//! # Invariants
//! - Storage is global to a session and unsynchronized: last writer wins.
//! - Key enumeration is deterministic (ascending key order).

pub mod kv_store;
