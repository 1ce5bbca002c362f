//! Dropdeck Core - Dropdown Resolution Engine
//!
//! This crate turns stored dropdown configuration into per-screen,
//! per-language bundles:
//! - Bundle: the normalized response shape shared by every source
//! - Source: storage traits and raw row types
//! - Adapter: JSONB and normalized extraction paths
//! - Alias: backward-compatible key duplication after normalization
//! - Cache: TTL cache keyed by representation, screen and language
//! - Resolver: read-through resolution with query timeouts
//! - Migration: normalized rows to JSONB documents

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod adapter;
pub mod alias;
pub mod bundle;
pub mod cache;
pub mod config;
pub mod error;
pub mod keys;
pub mod migration;
pub mod resolver;
pub mod source;

pub use adapter::{ActiveAdapter, JsonbAdapter, NormalizedAdapter, SourceAdapter};
pub use alias::{AliasRule, AliasTable};
pub use bundle::{DropdownBundle, DropdownEntry, DropdownOption};
pub use cache::{BundleCache, CacheKey, CacheStats};
pub use config::{
    parse_flag, FlagOrigin, ResolverConfig, RuntimeEnvironment, SourceRepresentation,
    SourceSelection,
};
pub use error::{Error, Result};
pub use migration::{build_dropdown_configs, DropdownMigrator, MigrationReport};
pub use resolver::{DropdownResolver, Resolution};
pub use source::{
    ComponentKind, ContentRow, DropdownConfigRecord, DropdownConfigWriter, DropdownSource,
    JsonbRow,
};
