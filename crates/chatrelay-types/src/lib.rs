//! Shared wire and configuration types for chatrelay.
//!
//! This crate contains the inbound/outbound wire types for the chat
//! gateway, the environment-driven settings, and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, thiserror, secrecy.

pub mod chat;
pub mod config;
pub mod error;
