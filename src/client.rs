use crate::cache::DiskCache;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::fetcher::Fetcher;
use crate::pages::{self, ContentUnit};
use crate::results::RenderedPage;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

/// Builder for configuring a [`Client`]
pub struct ClientBuilder {
    config: ClientConfig,
    cache: Option<Arc<DiskCache>>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Create a builder with default configuration
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            cache: None,
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a JSON file
    pub fn with_config_file(self, path: impl AsRef<Path>) -> Result<Self> {
        let config = ClientConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Load configuration from a JSON string
    pub fn with_config_str(self, json: &str) -> Result<Self> {
        let config = ClientConfig::from_json(json)?;
        Ok(self.with_config(config))
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Enable or disable store-level caching
    pub fn with_use_cache(mut self, use_cache: bool) -> Self {
        self.config.use_cache = use_cache;
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.cache_dir = dir.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Share an existing cache instead of creating one from `cache_dir`
    pub fn with_cache(mut self, cache: Arc<DiskCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build the client. The cache is created here, once, and handed to the fetcher.
    pub fn build(self) -> Result<Client> {
        self.config.validate()?;
        let base_url = Url::parse(&self.config.base_url)
            .map_err(|e| Error::Config(format!("invalid base_url: {}", e)))?;

        let cache = if self.config.use_cache {
            Some(
                self.cache
                    .unwrap_or_else(|| Arc::new(DiskCache::new(&self.config.cache_dir))),
            )
        } else {
            None
        };

        match &cache {
            Some(cache) => ::log::debug!("Caching responses in {}", cache.root().display()),
            None => ::log::debug!("Response caching disabled"),
        }

        let fetcher = Fetcher::new(&self.config, cache)?;
        Ok(Client { fetcher, base_url })
    }
}

/// Fetches story parts and renders them into [`RenderedPage`]s
pub struct Client {
    fetcher: Fetcher,
    base_url: Url,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Resolve a content unit's text location to an absolute URL
    pub fn resolve_location(&self, text_url: Option<&str>) -> Result<Url> {
        let location = text_url.map(str::trim).unwrap_or_default();
        if location.is_empty() {
            return Err(Error::InvalidLocation {
                location: location.to_string(),
                reason: "content unit has no text URL".to_string(),
            });
        }

        self.base_url
            .join(location)
            .map_err(|e| Error::InvalidLocation {
                location: location.to_string(),
                reason: e.to_string(),
            })
    }

    /// Fetch the text of `unit` and render it
    pub async fn render_part(&self, unit: &ContentUnit) -> Result<RenderedPage> {
        let url = self.resolve_location(unit.text_url.as_deref())?;
        ::log::info!("Rendering '{}' from {}", unit.title, url);

        let html = self.fetcher.fetch_raw(&url, true).await?;
        Ok(pages::render_document(&unit.title, &html, &url))
    }

    pub async fn fetch_raw(&self, url: &Url, allow_cache: bool) -> Result<String> {
        self.fetcher.fetch_raw(url, allow_cache).await
    }

    pub async fn fetch_json(&self, url: &Url) -> Result<Map<String, Value>> {
        self.fetcher.fetch_json(url).await
    }

    /// Clear the response cache. Returns `false` if caching is disabled.
    pub fn clear_cache(&self) -> bool {
        self.fetcher.clear_cache()
    }
}
