//! SQLite history repository implementation.
//!
//! Implements `HistoryRepository` from `chatrelay-core` using sqlx with
//! the split read/write pool: raw queries, private Row structs, writes on
//! the writer pool, reads on the reader pool.

use sqlx::Row;

use chatrelay_core::history::HistoryRepository;
use chatrelay_types::chat::{ChatRole, ChatTurn};
use chatrelay_types::error::RepositoryError;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `HistoryRepository`.
pub struct SqliteHistoryRepository {
    pool: DatabasePool,
}

impl SqliteHistoryRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain turns.
struct TurnRow {
    role: String,
    content: String,
}

impl TurnRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            role: row.try_get("role")?,
            content: row.try_get("content")?,
        })
    }

    fn into_turn(self) -> Result<ChatTurn, RepositoryError> {
        let role: ChatRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        Ok(ChatTurn {
            role,
            content: self.content,
        })
    }
}

impl HistoryRepository for SqliteHistoryRepository {
    async fn ensure_chat(
        &self,
        chat_id: &str,
        user_id: Option<i64>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO ai_chats (chat_id, user_id) VALUES (?, ?)
             ON CONFLICT(chat_id) DO UPDATE SET updated_at = datetime('now')",
        )
        .bind(chat_id)
        .bind(user_id)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(())
    }

    async fn append_turn(
        &self,
        chat_id: &str,
        user_id: Option<i64>,
        role: ChatRole,
        content: &str,
        profile_snapshot: Option<&serde_json::Value>,
    ) -> Result<(), RepositoryError> {
        let snapshot = profile_snapshot.map(serde_json::Value::to_string);
        sqlx::query(
            "INSERT INTO ai_messages (chat_id, user_id, role, content, profile_snapshot)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(chat_id)
        .bind(user_id)
        .bind(role.to_string())
        .bind(content)
        .bind(snapshot)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(())
    }

    async fn recent_turns(
        &self,
        chat_id: &str,
        limit: u32,
    ) -> Result<Vec<ChatTurn>, RepositoryError> {
        // Newest `limit` rows, re-sorted back into chronological order.
        let rows = sqlx::query(
            "SELECT role, content FROM (
                 SELECT id, role, content FROM ai_messages
                 WHERE chat_id = ? ORDER BY id DESC LIMIT ?
             ) ORDER BY id ASC",
        )
        .bind(chat_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                TurnRow::from_row(row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?
                    .into_turn()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> (tempfile::TempDir, SqliteHistoryRepository) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let pool = DatabasePool::new(&url).await.unwrap();
        (dir, SqliteHistoryRepository::new(pool))
    }

    #[tokio::test]
    async fn test_append_and_read_back_chronological() {
        let (_dir, repo) = repo().await;
        repo.ensure_chat("c1", Some(42)).await.unwrap();
        repo.append_turn("c1", Some(42), ChatRole::User, "hi", None)
            .await
            .unwrap();
        repo.append_turn("c1", None, ChatRole::Assistant, "hello back", None)
            .await
            .unwrap();

        let turns = repo.recent_turns("c1", 50).await.unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, ChatRole::User);
        assert_eq!(turns[0].content, "hi");
        assert_eq!(turns[1].role, ChatRole::Assistant);
        assert_eq!(turns[1].content, "hello back");
    }

    #[tokio::test]
    async fn test_limit_keeps_most_recent_turns() {
        let (_dir, repo) = repo().await;
        repo.ensure_chat("c1", None).await.unwrap();
        for i in 0..5 {
            repo.append_turn("c1", None, ChatRole::User, &format!("m{i}"), None)
                .await
                .unwrap();
        }

        let turns = repo.recent_turns("c1", 2).await.unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].content, "m3");
        assert_eq!(turns[1].content, "m4");
    }

    #[tokio::test]
    async fn test_ensure_chat_is_idempotent() {
        let (_dir, repo) = repo().await;
        repo.ensure_chat("c1", Some(1)).await.unwrap();
        repo.ensure_chat("c1", Some(1)).await.unwrap();
        assert!(repo.recent_turns("c1", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_chats_are_isolated() {
        let (_dir, repo) = repo().await;
        repo.ensure_chat("a", None).await.unwrap();
        repo.ensure_chat("b", None).await.unwrap();
        repo.append_turn("a", None, ChatRole::User, "only in a", None)
            .await
            .unwrap();

        assert_eq!(repo.recent_turns("a", 10).await.unwrap().len(), 1);
        assert!(repo.recent_turns("b", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_profile_snapshot_stored() {
        let (_dir, repo) = repo().await;
        repo.ensure_chat("c1", None).await.unwrap();
        let profile = serde_json::json!({"name": "Ada"});
        repo.append_turn("c1", Some(7), ChatRole::User, "hi", Some(&profile))
            .await
            .unwrap();

        let stored: (Option<String>,) =
            sqlx::query_as("SELECT profile_snapshot FROM ai_messages WHERE chat_id = 'c1'")
                .fetch_one(&repo.pool.reader)
                .await
                .unwrap();
        assert!(stored.0.unwrap().contains("Ada"));
    }

    #[tokio::test]
    async fn test_append_without_chat_row_violates_fk() {
        let (_dir, repo) = repo().await;
        let result = repo
            .append_turn("missing", None, ChatRole::User, "hi", None)
            .await;
        assert!(matches!(result, Err(RepositoryError::Query(_))));
    }
}
