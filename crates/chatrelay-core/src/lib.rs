//! Dispatch policy, response normalization, and port definitions for chatrelay.
//!
//! This crate holds the pieces with real design content: the defensive
//! payload extractors, the streaming delta accumulator, and the
//! mode-selection/fallback state machine. The "ports" ([`upstream::UpstreamClient`],
//! [`history::HistoryRepository`]) are implemented by `chatrelay-infra`;
//! this crate never performs I/O itself.

pub mod dispatch;
pub mod extract;
pub mod history;
pub mod ratelimit;
pub mod session;
pub mod stream;
pub mod upstream;
