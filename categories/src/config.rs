//! Configuration for the category store and search defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use semcat_embeddings::DEFAULT_DIMENSION;

use crate::engine::SearchOptions;

/// Default object key of the store document.
pub const DEFAULT_STORE_KEY: &str = "categories.json";

/// Configuration for the category service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoriesConfig {
    /// Length every category embedding must have.
    pub dimension: usize,

    /// Search defaults used when a request leaves them out.
    pub search: SearchOptions,

    /// Where the store document lives.
    pub storage: StorageConfig,
}

impl CategoriesConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
            search: SearchOptions::default(),
            storage: StorageConfig::default(),
        }
    }

    /// Set the embedding dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Set the search defaults.
    pub fn with_search(mut self, search: SearchOptions) -> Self {
        self.search = search;
        self
    }

    /// Set the storage backend.
    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }
}

impl Default for CategoriesConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Which backend persists the store document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Remote blob-style object store reached over HTTP.
    Blob {
        /// Base URL of the bucket or container.
        base_url: String,

        /// Object key of the document.
        #[serde(default = "default_key")]
        key: String,

        /// Bearer token sent with every request.
        #[serde(default)]
        token: Option<String>,

        /// Request timeout.
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },

    /// A single JSON file on local disk.
    File { path: PathBuf },

    /// Process memory; lost on exit.
    Memory,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::File {
            path: PathBuf::from(DEFAULT_STORE_KEY),
        }
    }
}

fn default_key() -> String {
    DEFAULT_STORE_KEY.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
