//! REST Messaging API
//!
//! Async client for user lookup, inbox, history and the HTTP send path.

mod client;
mod error;

pub use client::RestClient;
pub use error::{ApiError, BODY_SNIPPET_CHARS};
