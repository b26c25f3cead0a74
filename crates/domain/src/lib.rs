//! # Event Laundry Domain
//!
//! Business domain types for the event laundry.
//!
//! This crate contains:
//! - Event projections and laundering results
//! - Per-event laundry settings and settings form submissions
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants (meta keys, task names, form field names)
//!
//! ## Architecture
//! - No dependencies on other workspace crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
