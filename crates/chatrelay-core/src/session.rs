//! Continuation-token store for stateful agent conversations.
//!
//! Maps a chat id to the opaque response id the agent backend returned
//! last, so the next turn can chain onto it. Purely in-process: tokens do
//! not survive a restart, and stale conversations are never evicted (the
//! retention policy is unspecified upstream, so growth is accepted and
//! flagged rather than guessed at).
//!
//! The store is an explicit handle injected into the dispatcher, never an
//! ambient global -- tests get isolation from a fresh instance.

use std::sync::Arc;

use dashmap::DashMap;

/// Shared chat-id -> provider-response-id mapping.
///
/// Clones share the underlying map. Entries for different chat ids are
/// independent; same-chat concurrent writers are last-write-wins, which
/// is fine because mutation only follows a completed upstream call.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continuation token for a conversation, if one is stored.
    pub fn get(&self, chat_id: &str) -> Option<String> {
        self.sessions.get(chat_id).map(|entry| entry.clone())
    }

    /// Store (or overwrite) the continuation token for a conversation.
    pub fn set(&self, chat_id: &str, response_id: &str) {
        self.sessions
            .insert(chat_id.to_string(), response_id.to_string());
    }

    /// Drop the continuation token, forcing the next call to run fresh.
    pub fn evict(&self, chat_id: &str) {
        self.sessions.remove(chat_id);
    }

    /// Number of tracked conversations.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_evict() {
        let store = SessionStore::new();
        assert_eq!(store.get("c1"), None);

        store.set("c1", "resp-1");
        assert_eq!(store.get("c1").as_deref(), Some("resp-1"));

        store.set("c1", "resp-2");
        assert_eq!(store.get("c1").as_deref(), Some("resp-2"));

        store.evict("c1");
        assert_eq!(store.get("c1"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_conversations_are_independent() {
        let store = SessionStore::new();
        store.set("a", "ra");
        store.set("b", "rb");
        store.evict("a");
        assert_eq!(store.get("a"), None);
        assert_eq!(store.get("b").as_deref(), Some("rb"));
    }

    #[test]
    fn test_clones_share_state() {
        let store = SessionStore::new();
        let handle = store.clone();
        handle.set("c1", "resp-1");
        assert_eq!(store.get("c1").as_deref(), Some("resp-1"));
    }
}
