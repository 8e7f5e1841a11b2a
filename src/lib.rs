//! Field operations inventory client
//!
//! Library side of the `fieldops` binary: the request cache, the API client and
//! services, and the command layer, exposed for integration tests.

pub mod api;
pub mod app;
pub mod cache;
pub mod cli;
pub mod render;
pub mod services;
pub mod session;
pub mod shell;
