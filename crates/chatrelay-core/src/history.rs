//! HistoryRepository trait definition.
//!
//! Append-only transcript store keyed by chat id, read back in
//! chronological order to reconstruct history when an inbound request
//! omits it. Implementations live in `chatrelay-infra`
//! (e.g., `SqliteHistoryRepository`). Uses native async fn in traits
//! (RPITIT, Rust 2024 edition).

use serde_json::Value;

use chatrelay_types::chat::{ChatRole, ChatTurn};
use chatrelay_types::error::RepositoryError;

/// Repository trait for chat transcript persistence.
pub trait HistoryRepository: Send + Sync {
    /// Create the chat row if it does not exist yet; bump its
    /// updated-at timestamp otherwise.
    fn ensure_chat(
        &self,
        chat_id: &str,
        user_id: Option<i64>,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Append one turn to a chat's transcript.
    fn append_turn(
        &self,
        chat_id: &str,
        user_id: Option<i64>,
        role: ChatRole,
        content: &str,
        profile_snapshot: Option<&Value>,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// The most recent `limit` turns of a chat, oldest first.
    fn recent_turns(
        &self,
        chat_id: &str,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<ChatTurn>, RepositoryError>> + Send;
}
