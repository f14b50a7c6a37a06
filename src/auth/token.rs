//! Token newtypes sharing a single redacting secret wrapper.

pub mod access;
pub mod refresh;
pub mod secret;
