//! Expired-event laundering

pub mod catalog;
pub mod launderer;
pub mod ports;
pub mod schedule;
pub mod service;
pub mod timezone;

pub use service::LaundryService;
