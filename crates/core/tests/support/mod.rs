//! Shared test helpers for `launder-core` integration tests.
//!
//! In-memory implementations of the core ports so service tests can focus on
//! behaviour instead of storage.

#![allow(dead_code)]

pub mod stores;

pub use stores::{InMemoryAnchorStore, InMemoryEventStore, StaticTokenGuard};
