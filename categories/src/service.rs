//! Category registration, removal, listing and search.

use std::sync::Arc;

use tracing::{debug, info};

use semcat_embeddings::{EmbeddingError, EmbeddingProvider};

use crate::engine::{SearchOptions, SimilarityEngine};
use crate::error::{CategoryError, Result};
use crate::model::{Category, ListedCategory, SearchResult};
use crate::store::CategoryStore;

/// Orchestrates the store, the embedding provider and the similarity engine.
///
/// Every call reads the store document fresh; mutations write it back whole.
/// Nothing is cached between calls, and a failure before the write leaves the
/// persisted document untouched.
#[derive(Clone)]
pub struct CategoryService {
    store: Arc<dyn CategoryStore>,
    provider: Arc<dyn EmbeddingProvider>,
    engine: SimilarityEngine,
    dimension: usize,
    defaults: SearchOptions,
}

impl CategoryService {
    /// Create a service over `store`, embedding with `provider`.
    ///
    /// The embedding dimension is taken from the provider.
    pub fn new(store: Arc<dyn CategoryStore>, provider: Arc<dyn EmbeddingProvider>) -> Self {
        let dimension = provider.dimension();
        Self {
            store,
            provider,
            engine: SimilarityEngine::new(),
            dimension,
            defaults: SearchOptions::default(),
        }
    }

    /// Require every new embedding to have `dimension` entries.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Search options used by [`CategoryService::search_default`].
    pub fn with_search_defaults(mut self, defaults: SearchOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// The configured search defaults.
    pub fn search_defaults(&self) -> SearchOptions {
        self.defaults
    }

    /// Register a new category.
    pub async fn register(&self, name: &str) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CategoryError::Validation("name required".to_string()));
        }

        let mut store = self.store.read().await?;
        if let Some(existing) = store.find_by_name(name) {
            debug!("Rejected duplicate of category {}", existing.id);
            return Err(CategoryError::DuplicateName(name.to_string()));
        }

        let embedding = self.provider.embed(name).await?;
        if embedding.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            }
            .into());
        }

        let category = Category::new(name, embedding);
        store.categories.push(category.clone());
        self.store.write(&store).await?;

        info!(
            "Registered category {} ({} total)",
            category.id,
            store.len()
        );
        Ok(category)
    }

    /// Remove the category with `id`.
    ///
    /// Removing an id that does not exist succeeds; the store is rewritten
    /// either way.
    pub async fn remove(&self, id: &str) -> Result<()> {
        let mut store = self.store.read().await?;
        let removed = store.remove(id);
        self.store.write(&store).await?;

        if removed == 0 {
            debug!("Remove of unknown category {id} was a no-op");
        } else {
            info!("Removed category {id} ({} left)", store.len());
        }
        Ok(())
    }

    /// Rank categories by similarity to `query`.
    pub async fn search(&self, query: &str, options: SearchOptions) -> Result<Vec<SearchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CategoryError::Validation("query required".to_string()));
        }
        if options.top_k == 0 {
            return Err(CategoryError::Validation(
                "topK must be at least 1".to_string(),
            ));
        }
        if !options.threshold.is_finite() {
            return Err(CategoryError::Validation(
                "threshold must be a finite number".to_string(),
            ));
        }

        let store = self.store.read().await?;
        if store.is_empty() {
            debug!("Search over empty store, skipping embedding");
            return Ok(Vec::new());
        }

        let embedding = self.provider.embed(query).await?;
        let results = self
            .engine
            .search(&embedding, &store.categories, &options)?;

        info!(
            "Search matched {} of {} categories",
            results.len(),
            store.len()
        );
        Ok(results)
    }

    /// Search with the configured defaults.
    pub async fn search_default(&self, query: &str) -> Result<Vec<SearchResult>> {
        self.search(query, self.defaults).await
    }

    /// All categories in stored order, without embeddings.
    pub async fn list(&self) -> Result<Vec<ListedCategory>> {
        let store = self.store.read().await?;
        Ok(store.categories.iter().map(ListedCategory::from).collect())
    }
}
