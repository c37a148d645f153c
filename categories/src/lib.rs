//! # Semantic Categories
//!
//! This crate stores short text labels ("categories") together with their
//! embeddings and ranks them by similarity to free-text queries.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      CategoryService                            │
//! │        register · remove · list · search                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────┐   │
//! │  │ CategoryStore│  │ EmbeddingProvider│  │ SimilarityEngine │   │
//! │  │ blob/file/mem│  │  (injected)      │  │  score → rank    │   │
//! │  └──────────────┘  └──────────────────┘  └──────────────────┘   │
//! │         │                                                       │
//! │         ▼                                                       │
//! │  { "version": 1, "categories": [ … ] }   (one document)         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use semcat_categories::{CategoryService, MemoryStore, SearchOptions};
//! use semcat_embeddings::OpenAIProvider;
//!
//! let service = CategoryService::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(OpenAIProvider::new()),
//! );
//!
//! service.register("Electronics").await?;
//! let results = service.search("gadgets", SearchOptions::default()).await?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod service;
pub mod store;

pub use config::{CategoriesConfig, StorageConfig};
pub use engine::{SearchOptions, SimilarityEngine};
pub use error::{CategoryError, Result, StorageError};
pub use model::{Category, CategoryRow, ListedCategory, SearchResult, Store, normalize_name};
pub use service::CategoryService;
pub use store::{BlobStore, CategoryStore, FileStore, MemoryStore, build_store};
