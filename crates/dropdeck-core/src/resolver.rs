//! Dropdown resolver
//!
//! Read-through front for the active adapter: normalize the request, consult
//! the cache, and on a miss load from the store (bounded by the query timeout),
//! apply aliases, freeze, and cache the bundle.
//!
//! Concurrent misses for the same key are not coalesced; both callers query
//! the store and write equivalent entries.

use crate::adapter::ActiveAdapter;
use crate::alias::AliasTable;
use crate::bundle::DropdownBundle;
use crate::cache::{BundleCache, CacheKey};
use crate::config::{ResolverConfig, SourceRepresentation};
use crate::error::{Error, Result};
use crate::source::DropdownSource;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument};

/// Result of one `resolve` call
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The resolved bundle (shared, read-only)
    pub bundle: Arc<DropdownBundle>,
    /// Whether it came from the cache
    pub cache_hit: bool,
}

/// Resolves `(screen, language)` into dropdown bundles
pub struct DropdownResolver {
    adapter: ActiveAdapter,
    cache: Arc<BundleCache>,
    aliases: AliasTable,
    config: ResolverConfig,
}

impl DropdownResolver {
    /// Create a resolver over `source` using the representation in `config`
    #[must_use]
    pub fn new(source: Arc<dyn DropdownSource>, config: ResolverConfig) -> Self {
        let cache = Arc::new(BundleCache::new(config.cache_ttl));
        Self::with_cache(source, config, cache)
    }

    /// Create a resolver sharing an existing cache
    #[must_use]
    pub fn with_cache(
        source: Arc<dyn DropdownSource>,
        config: ResolverConfig,
        cache: Arc<BundleCache>,
    ) -> Self {
        let adapter = ActiveAdapter::new(config.representation, source, &config.default_language);
        let aliases = AliasTable::new(config.aliases.clone());
        info!(
            representation = %config.representation,
            aliases = aliases.len(),
            "Dropdown resolver initialized"
        );
        Self {
            adapter,
            cache,
            aliases,
            config,
        }
    }

    /// Active representation
    #[must_use]
    pub fn representation(&self) -> SourceRepresentation {
        self.adapter.representation()
    }

    /// Resolver settings
    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Shared cache
    #[must_use]
    pub fn cache(&self) -> &Arc<BundleCache> {
        &self.cache
    }

    /// Trim and lowercase a language code; blank means the default language
    #[must_use]
    pub fn normalize_language(&self, language_code: &str) -> String {
        let language = language_code.trim().to_lowercase();
        if language.is_empty() {
            self.config.default_language.clone()
        } else {
            language
        }
    }

    /// Resolve the bundle for `screen_location` in `language_code`.
    ///
    /// Screens without configuration resolve to an empty bundle. Store
    /// failures and timeouts surface as [`Error::SourceUnavailable`] and
    /// leave the cache untouched.
    #[instrument(skip(self), fields(representation = %self.representation()))]
    pub async fn resolve(&self, screen_location: &str, language_code: &str) -> Result<Resolution> {
        let screen = screen_location.trim();
        if screen.is_empty() {
            return Err(Error::InvalidScreen(screen_location.to_string()));
        }
        let language = self.normalize_language(language_code);
        if !self.config.is_supported(&language) {
            debug!(
                language = %language,
                fallback = %self.config.default_language,
                "Unsupported language, texts will fall back"
            );
        }

        let key = CacheKey::new(self.representation(), screen, &language);
        if let Some(bundle) = self.cache.get(&key) {
            debug!(cache_key = %key, "Cache hit");
            return Ok(Resolution {
                bundle,
                cache_hit: true,
            });
        }

        info!(cache_key = %key, "Cache miss, querying {}", self.representation().source_table());
        let started = Instant::now();
        let mut bundle = self.load(screen, &language).await.inspect_err(|e| {
            error!(cache_key = %key, error = %e, "Dropdown resolution failed");
        })?;

        let aliased = self.aliases.apply(&mut bundle);
        let bundle = Arc::new(bundle);
        self.cache.insert(key.clone(), Arc::clone(&bundle));

        debug!(
            cache_key = %key,
            dropdowns = bundle.dropdowns.len(),
            rows = bundle.total_rows,
            aliases = aliased,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Cached dropdown bundle"
        );

        Ok(Resolution {
            bundle,
            cache_hit: false,
        })
    }

    async fn load(&self, screen: &str, language: &str) -> Result<DropdownBundle> {
        let timeout: Duration = self.config.query_timeout;
        match tokio::time::timeout(timeout, self.adapter.load(screen, language)).await {
            Ok(result) => result,
            Err(_) => Err(Error::SourceUnavailable(format!(
                "{} query for {screen} timed out after {}ms",
                self.representation(),
                timeout.as_millis()
            ))),
        }
    }

    /// Drop cached bundles of one screen (optionally one language)
    pub fn invalidate(&self, screen_location: &str, language_code: Option<&str>) -> usize {
        let language = language_code.map(|l| self.normalize_language(l));
        let removed = self.cache.invalidate(screen_location.trim(), language.as_deref());
        info!(screen = screen_location, removed, "Invalidated cached dropdowns");
        removed
    }
}
