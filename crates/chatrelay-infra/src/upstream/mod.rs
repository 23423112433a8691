//! Upstream HTTP adapter for the hosted LLM provider.

pub mod client;

pub use client::FoundationClient;
