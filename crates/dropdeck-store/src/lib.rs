//! Dropdeck Store - SQL backends
//!
//! This crate reads (and, for migrations, writes) dropdown configuration:
//! - Postgres: the production content database (JSONB documents)
//! - SQLite: embedded store for local development and tests
//! - DropdownStore: URL-selected wrapper over both

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
mod postgres;
mod queries;
mod sqlite;
mod store;


pub use error::{Error, Result};
pub use postgres::PgDropdownStore;
pub use sqlite::SqliteDropdownStore;
pub use store::{DropdownStore, StoreOptions};
