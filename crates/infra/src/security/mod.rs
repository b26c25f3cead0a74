//! Request token issuing and verification

pub mod request_token;

pub use request_token::Blake3RequestTokenGuard;
