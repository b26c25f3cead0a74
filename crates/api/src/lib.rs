//! # Event Laundry Daemon
//!
//! Application layer - dependency wiring and the `launderd` entry point.
//!
//! This crate contains:
//! - Application context (dependency injection)
//! - Daemon lifecycle: schedule, optional first pass, shutdown
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod context;

pub use context::AppContext;
