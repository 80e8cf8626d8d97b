//! Key-value application state operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};

impl Database {
    /// Read the value stored under `key`.
    pub fn get_state(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT value FROM app_state WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// Insert or replace the value stored under `key`.
    pub fn put_state(&self, key: &str, value: &str) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO app_state (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove `key`. Returns whether a row was deleted.
    pub fn delete_state(&self, key: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM app_state WHERE key = ?", [key])?;
        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_state("absent").unwrap(), None);
    }

    #[test]
    fn test_put_and_overwrite() {
        let db = Database::open_in_memory().unwrap();
        db.put_state("history", "[1]").unwrap();
        db.put_state("history", "[2]").unwrap();
        assert_eq!(db.get_state("history").unwrap().as_deref(), Some("[2]"));

        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM app_state", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_delete() {
        let db = Database::open_in_memory().unwrap();
        db.put_state("history", "[]").unwrap();
        assert!(db.delete_state("history").unwrap());
        assert!(!db.delete_state("history").unwrap());
        assert_eq!(db.get_state("history").unwrap(), None);
    }
}
