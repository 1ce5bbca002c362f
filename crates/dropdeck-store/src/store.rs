//! Backend selection by database URL

use crate::error::{Error, Result};
use crate::postgres::PgDropdownStore;
use crate::sqlite::SqliteDropdownStore;
use async_trait::async_trait;
use dropdeck_core::{
    ContentRow, DropdownConfigRecord, DropdownConfigWriter, DropdownSource, JsonbRow,
};
use std::time::Duration;

/// Connection pool settings
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Pool size
    pub max_connections: u32,
    /// How long to wait for a pooled connection
    pub acquire_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Either backend behind one type
#[derive(Clone)]
pub enum DropdownStore {
    /// PostgreSQL content database
    Postgres(PgDropdownStore),
    /// Embedded SQLite database
    Sqlite(SqliteDropdownStore),
}

impl DropdownStore {
    /// Pick the backend from the URL scheme.
    ///
    /// `postgres://` and `postgresql://` connect lazily; `sqlite:` opens the
    /// file (or memory database) and creates the schema.
    pub async fn connect(url: &str, options: &StoreOptions) -> Result<Self> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            let store = PgDropdownStore::connect_lazy(
                url,
                options.max_connections,
                options.acquire_timeout,
            )?;
            Ok(Self::Postgres(store))
        } else if url.starts_with("sqlite:") {
            let store =
                SqliteDropdownStore::connect(url, options.max_connections, options.acquire_timeout)
                    .await?;
            Ok(Self::Sqlite(store))
        } else {
            let scheme = url.split(':').next().unwrap_or_default();
            Err(Error::InvalidUrl(format!(
                "unsupported scheme '{scheme}', expected postgres:// or sqlite:"
            )))
        }
    }

    /// Make sure `dropdown_configs` exists before a migration writes to it
    pub async fn ensure_migration_target(&self) -> Result<()> {
        match self {
            Self::Postgres(store) => store.ensure_dropdown_configs_table().await,
            // Created with the rest of the schema on connect
            Self::Sqlite(_) => Ok(()),
        }
    }

    /// Backend name
    #[must_use]
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Postgres(store) => store.name(),
            Self::Sqlite(store) => store.name(),
        }
    }
}

impl From<SqliteDropdownStore> for DropdownStore {
    fn from(store: SqliteDropdownStore) -> Self {
        Self::Sqlite(store)
    }
}

impl From<PgDropdownStore> for DropdownStore {
    fn from(store: PgDropdownStore) -> Self {
        Self::Postgres(store)
    }
}

#[async_trait]
impl DropdownSource for DropdownStore {
    async fn fetch_dropdown_configs(
        &self,
        screen_location: &str,
    ) -> dropdeck_core::Result<Vec<JsonbRow>> {
        match self {
            Self::Postgres(store) => store.fetch_dropdown_configs(screen_location).await,
            Self::Sqlite(store) => store.fetch_dropdown_configs(screen_location).await,
        }
    }

    async fn fetch_content_rows(
        &self,
        screen_location: &str,
        languages: &[String],
    ) -> dropdeck_core::Result<Vec<ContentRow>> {
        match self {
            Self::Postgres(store) => store.fetch_content_rows(screen_location, languages).await,
            Self::Sqlite(store) => store.fetch_content_rows(screen_location, languages).await,
        }
    }

    async fn ping(&self) -> dropdeck_core::Result<()> {
        match self {
            Self::Postgres(store) => store.ping().await,
            Self::Sqlite(store) => store.ping().await,
        }
    }

    fn name(&self) -> &'static str {
        self.backend()
    }
}

#[async_trait]
impl DropdownConfigWriter for DropdownStore {
    async fn list_content_screens(&self) -> dropdeck_core::Result<Vec<String>> {
        match self {
            Self::Postgres(store) => store.list_content_screens().await,
            Self::Sqlite(store) => store.list_content_screens().await,
        }
    }

    async fn upsert_dropdown_config(
        &self,
        record: &DropdownConfigRecord,
    ) -> dropdeck_core::Result<bool> {
        match self {
            Self::Postgres(store) => store.upsert_dropdown_config(record).await,
            Self::Sqlite(store) => store.upsert_dropdown_config(record).await,
        }
    }
}
