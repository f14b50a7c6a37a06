//! Credential models: redacted secrets plus the access and refresh tokens minted from them.

pub mod token;

pub use token::{access::*, refresh::*, secret::*};
