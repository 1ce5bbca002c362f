//! PostgreSQL backend (production content database)

use crate::error::{Error, Result};
use crate::queries::DROPDOWN_COMPONENT_TYPES;
use async_trait::async_trait;
use dropdeck_core::{
    ContentRow, DropdownConfigRecord, DropdownConfigWriter, DropdownSource, JsonbRow,
};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Store over the Postgres content database
#[derive(Clone)]
pub struct PgDropdownStore {
    pool: PgPool,
}

impl PgDropdownStore {
    /// Create a store with the given connection pool
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect lazily; the first query opens the connection
    pub fn connect_lazy(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_lazy(url)?;
        info!("PostgreSQL dropdown store configured");
        Ok(Self { pool })
    }

    /// Underlying pool
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create `dropdown_configs` if it does not exist (migration target)
    pub async fn ensure_dropdown_configs_table(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS dropdown_configs (
                id SERIAL PRIMARY KEY,
                dropdown_key VARCHAR(255) NOT NULL UNIQUE,
                dropdown_data JSONB NOT NULL,
                screen_location VARCHAR(255),
                field_name VARCHAR(255),
                is_active BOOLEAN DEFAULT true,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
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

        debug!("dropdown_configs table ready");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn select_dropdown_configs(&self, screen_location: &str) -> Result<Vec<JsonbRow>> {
        let rows = sqlx::query(
            r#"
            SELECT dropdown_key, field_name, dropdown_data
            FROM dropdown_configs
            WHERE screen_location = $1
                AND is_active = true
            ORDER BY dropdown_key
            "#,
        )
        .bind(screen_location)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_jsonb).collect()
    }

    #[instrument(skip(self))]
    async fn select_content_rows(
        &self,
        screen_location: &str,
        languages: &[String],
    ) -> Result<Vec<ContentRow>> {
        let sql = content_rows_sql();

        let rows = sqlx::query(&sql)
            .bind(screen_location)
            .bind(languages)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(row_to_content).collect()
    }
}

/// Content rows of one screen in the requested languages (`$2` empty = all)
pub(crate) fn content_rows_sql() -> String {
    format!(
        r#"
        SELECT ci.content_key, ci.component_type, ct.language_code, ct.content_value
        FROM content_items ci
        JOIN content_translations ct ON ci.id = ct.content_item_id
        WHERE ci.screen_location = $1
            AND (cardinality($2::text[]) = 0 OR ct.language_code = ANY($2))
            AND ct.status = 'approved'
            AND ci.is_active = true
            AND ci.component_type IN ({DROPDOWN_COMPONENT_TYPES})
            AND ct.content_value IS NOT NULL
        ORDER BY ci.content_key, ct.language_code
        "#
    )
}

/// Convert a Postgres row to a JSONB row
fn row_to_jsonb(row: PgRow) -> Result<JsonbRow> {
    let dropdown_data: serde_json::Value = row
        .try_get("dropdown_data")
        .map_err(|e| Error::Serialization(format!("invalid dropdown_data: {e}")))?;
    Ok(JsonbRow {
        dropdown_key: row.try_get("dropdown_key")?,
        field_name: row.try_get("field_name")?,
        dropdown_data,
    })
}

/// Convert a Postgres row to a content row
fn row_to_content(row: PgRow) -> Result<ContentRow> {
    Ok(ContentRow {
        content_key: row.try_get("content_key")?,
        component_type: row.try_get("component_type")?,
        language_code: row.try_get("language_code")?,
        content_value: row.try_get("content_value")?,
    })
}

#[async_trait]
impl DropdownSource for PgDropdownStore {
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
        "postgres"
    }
}

#[async_trait]
impl DropdownConfigWriter for PgDropdownStore {
    async fn list_content_screens(&self) -> dropdeck_core::Result<Vec<String>> {
        let sql = format!(
            r#"
            SELECT DISTINCT screen_location
            FROM content_items
            WHERE component_type IN ({DROPDOWN_COMPONENT_TYPES})
                AND is_active = true
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
        let inserted: bool = sqlx::query_scalar(
            r#"
            INSERT INTO dropdown_configs (dropdown_key, dropdown_data, screen_location, field_name)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (dropdown_key)
            DO UPDATE SET
                dropdown_data = EXCLUDED.dropdown_data,
                screen_location = EXCLUDED.screen_location,
                field_name = EXCLUDED.field_name,
                updated_at = CURRENT_TIMESTAMP
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(&record.dropdown_key)
        .bind(&record.dropdown_data)
        .bind(&record.screen_location)
        .bind(&record.field_name)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::from)?;
        Ok(inserted)
    }
}
