//! Infrastructure error handling

mod conversions;

pub use conversions::{map_join_error, InfraError};
