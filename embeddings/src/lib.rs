//! # Embeddings
//!
//! Text embedding generation and vector similarity for the semantic
//! category store.
//!
//! ## Features
//!
//! - **Embedding Generation**: Convert text to dense vectors using an
//!   OpenAI-compatible embeddings API
//! - **Offline Provider**: Deterministic feature-hashed vectors for
//!   development and tests
//! - **Similarity**: Dot product over unit vectors (equal to cosine
//!   similarity)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Embeddings System                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  EmbeddingProvider ──► Embedding ──► dot_product               │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  OpenAIProvider / HashedProvider                                │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod provider;
pub mod similarity;

pub use error::{EmbeddingError, Result};
pub use provider::{EmbeddingProvider, HashedProvider, OpenAIProvider};
pub use similarity::{dot_product, normalize};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;

/// Dimension of embeddings (varies by model).
pub const DEFAULT_DIMENSION: usize = 1536; // OpenAI text-embedding-3-small

/// Default embedding model.
pub const DEFAULT_MODEL: &str = "text-embedding-3-small";
