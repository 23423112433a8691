//! Infrastructure implementations for chatrelay.
//!
//! Concrete adapters behind the ports defined in `chatrelay-core`:
//! the reqwest-backed upstream client and the SQLite transcript store.

pub mod sqlite;
pub mod upstream;
