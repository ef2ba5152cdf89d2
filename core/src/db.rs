use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use rusqlite::{Connection, params};

use crate::models::{IngredientItem, PANTRY_KEY, PROFILE_KEY, UserProfile, validate_item};
use crate::service::PantryStore;

/// Local key-value store holding JSON documents.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS kv_store (
                    key TEXT PRIMARY KEY NOT NULL,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
                );

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    // --- Raw key-value access ---

    pub fn set_value(&self, key: &str, value: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )?;
        Ok(())
    }

    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM kv_store WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    pub fn delete_value(&self, key: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(rows > 0)
    }

    /// When `key` was last written, if ever.
    pub fn get_updated_at(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT updated_at FROM kv_store WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    // --- Profile ---

    /// The stored profile, or the default one if none was saved yet.
    pub fn load_profile(&self) -> Result<UserProfile> {
        match self.get_value(PROFILE_KEY)? {
            Some(json) => serde_json::from_str(&json).context("Failed to parse stored profile"),
            None => Ok(UserProfile::default()),
        }
    }

    pub fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        let json = serde_json::to_string(profile)?;
        self.set_value(PROFILE_KEY, &json)
    }
}

impl PantryStore for Database {
    fn load(&self) -> Result<Vec<IngredientItem>> {
        match self.get_value(PANTRY_KEY)? {
            Some(json) => serde_json::from_str(&json).context("Failed to parse stored pantry"),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, items: &[IngredientItem]) -> Result<()> {
        let mut ids = HashSet::new();
        for item in items {
            validate_item(item)?;
            if !ids.insert(item.id.as_str()) {
                bail!("Duplicate ingredient id: {}", item.id);
            }
        }
        let json = serde_json::to_string(items).context("Failed to serialize pantry")?;
        self.set_value(PANTRY_KEY, &json)
    }
}
