//! SQLite backend (embedded, no server required)
//!
//! Mirrors the content database schema with JSON documents stored as TEXT.
//! Used for local development and tests; `in_memory()` gives a fresh schema.

use crate::error::{Error, Result};
use crate::queries::{retain_languages, DROPDOWN_COMPONENT_TYPES};
use async_trait::async_trait;
use dropdeck_core::{
    ContentRow, DropdownConfigRecord, DropdownConfigWriter, DropdownSource, JsonbRow,
};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Store over an SQLite database
#[derive(Clone)]
pub struct SqliteDropdownStore {
    pool: SqlitePool,
}

impl SqliteDropdownStore {
    /// Create a store with the given connection pool
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) a database and run migrations
    pub async fn connect(url: &str, max_connections: u32, acquire_timeout: Duration) -> Result<Self> {
        let in_memory = url.contains(":memory:");
        if !in_memory {
            ensure_parent_dir(url)?;
        }
        let url = if in_memory || url.contains("mode=") {
            url.to_string()
        } else {
            format!("{url}?mode=rwc")
        };

        // Every connection to :memory: is a separate database
        let max_connections = if in_memory { 1 } else { max_connections };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(&url)
            .await?;

        let store = Self { pool };
        store.run_migrations().await?;

        info!(url = %url, "SQLite dropdown store initialized");
        Ok(store)
    }

    /// Create a new in-memory store (for testing)
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.run_migrations().await?;

        debug!("In-memory SQLite dropdown store initialized");
        Ok(store)
    }

    /// Underlying pool
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS dropdown_configs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                dropdown_key TEXT NOT NULL UNIQUE,
                dropdown_data TEXT NOT NULL DEFAULT '{}',
                screen_location TEXT,
                field_name TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS content_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content_key TEXT NOT NULL,
                component_type TEXT NOT NULL,
                screen_location TEXT,
                is_active INTEGER NOT NULL DEFAULT 1
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS content_translations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content_item_id INTEGER NOT NULL,
                language_code TEXT NOT NULL,
                content_value TEXT,
                status TEXT NOT NULL DEFAULT 'draft',
                FOREIGN KEY (content_item_id) REFERENCES content_items(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_dropdown_configs_screen
            ON dropdown_configs(screen_location)
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_content_items_screen
            ON content_items(screen_location)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a content item; returns its id
    pub async fn insert_content_item(
        &self,
        screen_location: &str,
        content_key: &str,
        component_type: &str,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO content_items (content_key, component_type, screen_location)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(content_key)
        .bind(component_type)
        .bind(screen_location)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Insert a translation of a content item
    pub async fn insert_translation(
        &self,
        content_item_id: i64,
        language_code: &str,
        content_value: &str,
        status: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO content_translations (content_item_id, language_code, content_value, status)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(content_item_id)
        .bind(language_code)
        .bind(content_value)
        .bind(status)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert a content item with approved translations in one go
    pub async fn insert_approved_content(
        &self,
        screen_location: &str,
        content_key: &str,
        component_type: &str,
        translations: &[(&str, &str)],
    ) -> Result<i64> {
        let id = self
            .insert_content_item(screen_location, content_key, component_type)
            .await?;
        for (language, value) in translations {
            self.insert_translation(id, language, value, "approved").await?;
        }
        Ok(id)
    }

    /// Mark a content item inactive
    pub async fn deactivate_content_item(&self, content_item_id: i64) -> Result<()> {
        sqlx::query("UPDATE content_items SET is_active = 0 WHERE id = ?")
            .bind(content_item_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Insert (or replace) a dropdown document
    pub async fn put_dropdown_config(
        &self,
        record: &DropdownConfigRecord,
        is_active: bool,
    ) -> Result<bool> {
        let exists: Option<i64> =
            sqlx::query_scalar("SELECT id FROM dropdown_configs WHERE dropdown_key = ?")
                .bind(&record.dropdown_key)
                .fetch_optional(&self.pool)
                .await?;

        let data = serde_json::to_string(&record.dropdown_data)
            .map_err(|e| Error::Serialization(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO dropdown_configs
                (dropdown_key, dropdown_data, screen_location, field_name, is_active)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(dropdown_key) DO UPDATE SET
                dropdown_data = excluded.dropdown_data,
                screen_location = excluded.screen_location,
                field_name = excluded.field_name,
                is_active = excluded.is_active,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(&record.dropdown_key)
        .bind(data)
        .bind(&record.screen_location)
        .bind(&record.field_name)
        .bind(is_active)
        .execute(&self.pool)
        .await?;

        Ok(exists.is_none())
    }

    /// Overwrite the raw document text of a dropdown (for malformed-data tests)
    pub async fn set_raw_dropdown_data(&self, dropdown_key: &str, raw: &str) -> Result<()> {
        sqlx::query("UPDATE dropdown_configs SET dropdown_data = ? WHERE dropdown_key = ?")
            .bind(raw)
            .bind(dropdown_key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn select_dropdown_configs(&self, screen_location: &str) -> Result<Vec<JsonbRow>> {
        let rows = sqlx::query(
            r#"
            SELECT dropdown_key, field_name, dropdown_data
            FROM dropdown_configs
            WHERE screen_location = ?
                AND is_active = 1
            ORDER BY dropdown_key
            "#,
        )
        .bind(screen_location)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_jsonb).collect()
    }

    async fn select_content_rows(
        &self,
        screen_location: &str,
        languages: &[String],
    ) -> Result<Vec<ContentRow>> {
        let sql = format!(
            r#"
            SELECT ci.content_key, ci.component_type, ct.language_code, ct.content_value
            FROM content_items ci
            JOIN content_translations ct ON ci.id = ct.content_item_id
            WHERE ci.screen_location = ?
                AND ct.status = 'approved'
                AND ci.is_active = 1
                AND ci.component_type IN ({DROPDOWN_COMPONENT_TYPES})
                AND ct.content_value IS NOT NULL
            ORDER BY ci.content_key, ct.language_code
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(screen_location)
            .fetch_all(&self.pool)
            .await?;

        let mut rows = rows
            .into_iter()
            .map(row_to_content)
            .collect::<Result<Vec<_>>>()?;
        retain_languages(&mut rows, languages);
        Ok(rows)
    }
}

/// Create the directory holding a file database
fn ensure_parent_dir(url: &str) -> Result<()> {
    let path = url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path = Path::new(path.split('?').next().unwrap_or_default());
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            Error::Database(format!("cannot create {}: {e}", parent.display()))
        })?;
    }
    Ok(())
}

/// Convert a SQLite row to a JSONB row; unparseable documents become `null`
fn row_to_jsonb(row: SqliteRow) -> Result<JsonbRow> {
    let dropdown_key: String = row.try_get("dropdown_key")?;
    let raw: String = row.try_get("dropdown_data")?;
    let dropdown_data = serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(dropdown_key = %dropdown_key, error = %e, "Invalid JSON in dropdown_data");
        serde_json::Value::Null
    });

    Ok(JsonbRow {
        field_name: row.try_get("field_name")?,
        dropdown_key,
        dropdown_data,
    })
}

/// Convert a SQLite row to a content row
fn row_to_content(row: SqliteRow) -> Result<ContentRow> {
    Ok(ContentRow {
        content_key: row.try_get("content_key")?,
        component_type: row.try_get("component_type")?,
        language_code: row.try_get("language_code")?,
        content_value: row.try_get("content_value")?,
    })
}

#[async_trait]
impl DropdownSource for SqliteDropdownStore {
    async fn fetch_dropdown_configs(
        &self,
        screen_location: &str,
    ) -> dropdeck_core::Result<Vec<JsonbRow>> {
        Ok(self.select_dropdown_configs(screen_location).await?)
    }

    async fn fetch_content_rows(
        &self,
        screen_location: &str,
        languages: &[String],
    ) -> dropdeck_core::Result<Vec<ContentRow>> {
        Ok(self.select_content_rows(screen_location, languages).await?)
    }

    async fn ping(&self) -> dropdeck_core::Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(Error::from)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}

#[async_trait]
impl DropdownConfigWriter for SqliteDropdownStore {
    async fn list_content_screens(&self) -> dropdeck_core::Result<Vec<String>> {
        let sql = format!(
            r#"
            SELECT DISTINCT screen_location
            FROM content_items
            WHERE component_type IN ({DROPDOWN_COMPONENT_TYPES})
                AND is_active = 1
                AND screen_location IS NOT NULL
            ORDER BY screen_location
            "#
        );
        let screens: Vec<String> = sqlx::query_scalar(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::from)?;
        Ok(screens)
    }

    async fn upsert_dropdown_config(
        &self,
        record: &DropdownConfigRecord,
    ) -> dropdeck_core::Result<bool> {
        Ok(self.put_dropdown_config(record, true).await?)
    }
}
