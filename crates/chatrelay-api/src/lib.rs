//! HTTP application layer for chatrelay.
//!
//! Exposed as a library so integration tests can build the router and
//! drive it in-process.

pub mod cli;
pub mod http;
pub mod state;
