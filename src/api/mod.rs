//! HTTP layer for the inventory backend
//!
//! Services build on [`ApiClient`]; every failure surfaces as an [`ApiError`].

mod client;
mod error;

pub use client::{ApiClient, DEFAULT_API_URL};
pub use error::ApiError;
