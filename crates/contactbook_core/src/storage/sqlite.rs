//! SQLite-backed key-value storage over the `kv_store` table.

use super::kv::{KeyValueStorage, StorageResult};
use crate::db::migrations::latest_version;
use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};

/// Key-value storage bound to a migrated SQLite connection.
pub struct SqliteKeyValueStorage<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKeyValueStorage<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    ///
    /// # Errors
    /// - `DbError::UnsupportedSchemaVersion` when the connection schema is not
    ///   the one this binary migrates to.
    pub fn try_new(conn: &'conn Connection) -> StorageResult<Self> {
        let version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        let latest = latest_version();
        if version != latest {
            return Err(DbError::UnsupportedSchemaVersion {
                db_version: version,
                latest_supported: latest,
            }
            .into());
        }
        Ok(Self { conn })
    }
}

impl KeyValueStorage for SqliteKeyValueStorage<'_> {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, CAST(strftime('%s', 'now') AS INTEGER) * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1;", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteKeyValueStorage;
    use crate::db::open_db_in_memory;
    use crate::storage::KeyValueStorage;
    use rusqlite::Connection;

    #[test]
    fn set_item_overwrites_previous_value() {
        let conn = open_db_in_memory().unwrap();
        let storage = SqliteKeyValueStorage::try_new(&conn).unwrap();

        storage.set_item("contacts", "[]").unwrap();
        storage.set_item("contacts", "[1]").unwrap();

        assert_eq!(storage.get_item("contacts").unwrap().as_deref(), Some("[1]"));
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM kv_store;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn remove_item_makes_key_absent() {
        let conn = open_db_in_memory().unwrap();
        let storage = SqliteKeyValueStorage::try_new(&conn).unwrap();

        storage.set_item("groups", "[]").unwrap();
        storage.remove_item("groups").unwrap();
        storage.remove_item("groups").unwrap();

        assert_eq!(storage.get_item("groups").unwrap(), None);
    }

    #[test]
    fn try_new_rejects_unmigrated_connection() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(SqliteKeyValueStorage::try_new(&conn).is_err());
    }
}
