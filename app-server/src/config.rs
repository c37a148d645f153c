//! Server configuration.
//!
//! Loaded from an optional TOML file; every field has a default so an empty
//! file (or no file) yields a working local setup.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use semcat_categories::{CategoriesConfig, CategoryService, build_store};
use semcat_embeddings::{EmbeddingProvider, HashedProvider, OpenAIProvider};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Top-level configuration for the server and CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind: String,

    /// Store, dimension and search defaults.
    pub categories: CategoriesConfig,

    /// Embedding provider settings.
    pub embedding: EmbeddingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            categories: CategoriesConfig::default(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load the configuration file at `path`, or the defaults if `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Construct the embedding provider this configuration names.
    pub fn build_provider(&self) -> Result<Arc<dyn EmbeddingProvider>> {
        let dimension = self.categories.dimension;
        let provider: Arc<dyn EmbeddingProvider> = match self.embedding.provider {
            ProviderKind::OpenAI => {
                let client = reqwest::Client::builder()
                    .timeout(Duration::from_secs(self.embedding.timeout_secs))
                    .build()
                    .context("failed to build embeddings HTTP client")?;

                let mut provider = OpenAIProvider::new().with_client(client);
                if let Some(model) = &self.embedding.model {
                    provider = provider.with_model(model);
                }
                if let Some(base_url) = &self.embedding.base_url {
                    provider = provider.with_base_url(base_url);
                }
                if let Some(api_key) = &self.embedding.api_key {
                    provider = provider.with_api_key(api_key);
                }
                if provider.dimension() != dimension {
                    provider = provider.with_dimensions(dimension);
                }
                if !provider.is_available() {
                    warn!("OPENAI_API_KEY is not set; embedding requests will fail");
                }
                Arc::new(provider)
            }
            ProviderKind::Hashed => Arc::new(HashedProvider::new(dimension)),
        };

        info!(
            "Using {} embeddings (model {}, {} dimensions)",
            provider.name(),
            provider.model(),
            provider.dimension()
        );
        Ok(provider)
    }

    /// Construct the category service: store, provider and search defaults.
    pub fn build_service(&self) -> Result<CategoryService> {
        let store = build_store(&self.categories.storage).context("failed to set up store")?;
        let provider = self.build_provider()?;
        Ok(CategoryService::new(store, provider)
            .with_dimension(self.categories.dimension)
            .with_search_defaults(self.categories.search))
    }
}

/// Which embedding provider to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// OpenAI-compatible embeddings API.
    #[serde(rename = "openai")]
    OpenAI,
    /// Offline feature hashing.
    Hashed,
}

/// Configuration for the embedding provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Which provider to use.
    pub provider: ProviderKind,

    /// Model to use for embeddings.
    pub model: Option<String>,

    /// API base URL override.
    pub base_url: Option<String>,

    /// API key; falls back to `OPENAI_API_KEY`.
    pub api_key: Option<String>,

    /// Request timeout.
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAI,
            model: None,
            base_url: None,
            api_key: None,
            timeout_secs: 30,
        }
    }
}
