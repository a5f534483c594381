//! Durable key/value storage for session data.
//!
//! # Responsibility
//! - Persist the auth token, serialized user and theme preference.
//! - Offer a SQLite-backed store and an in-memory one for tests/ephemeral runs.
//!
//! # Invariants
//! - Values are opaque strings; callers own their format.
//! - `set` overwrites; `remove` of a missing key is not an error.

use crate::db::{open_db, open_db_in_memory, DbError};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub const KEY_TOKEN: &str = "token";
pub const KEY_USER: &str = "user";
pub const KEY_THEME: &str = "theme";

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "session storage failed: {err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// String key/value persistence.
pub trait SessionStorage {
    /// Value stored under `key`, if any.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    /// Stores `value`, replacing any previous one.
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;
    /// Deletes `key`; absent keys are fine.
    fn remove(&mut self, key: &str) -> StorageResult<()>;
}

impl<S: SessionStorage + ?Sized> SessionStorage for Box<S> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

/// Map-backed storage that lives as long as the value.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStorage {
    entries: BTreeMap<String, String>,
}

impl MemorySessionStorage {
    /// Empty storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// SQLite-backed storage over the `session_kv` table.
pub struct SqliteSessionStorage {
    conn: Connection,
}

impl SqliteSessionStorage {
    /// Opens (and migrates) the session database file.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    /// Migrated storage that disappears with the value.
    pub fn open_in_memory() -> StorageResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }
}

impl SessionStorage for SqliteSessionStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM session_kv WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO session_kv (key, value)
             VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM session_kv WHERE key = ?1;", [key])?;
        Ok(())
    }
}
