//! Per-event laundry settings panel

pub mod ports;
pub mod selector;
pub mod service;

pub use service::SettingsService;
