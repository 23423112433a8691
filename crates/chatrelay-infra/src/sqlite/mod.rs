//! SQLite persistence for chat transcripts.

pub mod history;
pub mod pool;

pub use history::SqliteHistoryRepository;
pub use pool::DatabasePool;
