//! Category records, the persisted store document, and view rows.

use serde::{Deserialize, Serialize};

use semcat_embeddings::Embedding;

use crate::error::StorageError;

/// The only store document version this build reads and writes.
pub const STORE_VERSION: u32 = 1;

/// Normalize a category name for duplicate detection.
///
/// Surrounding whitespace is ignored and letters are case-folded, so
/// `" Electronics "` and `"electronics"` collide.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A registered category and its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Opaque unique identifier.
    pub id: String,

    /// Display name, trimmed at registration.
    pub name: String,

    /// Embedding of `name`.
    pub embedding: Embedding,
}

impl Category {
    /// Create a category with a fresh id.
    pub fn new(name: impl Into<String>, embedding: Embedding) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            embedding,
        }
    }

    /// Whether this category's name collides with `name` after normalization.
    pub fn matches_name(&self, name: &str) -> bool {
        normalize_name(&self.name) == normalize_name(name)
    }
}

/// The whole persisted collection: one document per deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    /// Fixed version tag.
    pub version: u32,

    /// Categories in insertion order.
    pub categories: Vec<Category>,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            version: STORE_VERSION,
            categories: Vec::new(),
        }
    }
}

impl Store {
    /// Parse a store document, rejecting unknown versions.
    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        let store: Self = serde_json::from_str(json)?;
        if store.version != STORE_VERSION {
            return Err(StorageError::UnsupportedVersion(store.version));
        }
        Ok(store)
    }

    /// Serialize the store document.
    pub fn to_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Find a category whose normalized name equals `name`'s.
    pub fn find_by_name(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.matches_name(name))
    }

    /// Remove every category with the given id, returning how many went.
    pub fn remove(&mut self, id: &str) -> usize {
        let before = self.categories.len();
        self.categories.retain(|c| c.id != id);
        before - self.categories.len()
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether the store holds no categories.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// A category as shown in the plain listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedCategory {
    pub id: String,
    pub name: String,
}

impl From<&Category> for ListedCategory {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.clone(),
            name: category.name.clone(),
        }
    }
}

/// A ranked search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub name: String,

    /// Dot product with the query, practically in `[0, 1]`.
    pub score: f32,

    /// 1-based position in the returned list.
    pub rank: usize,
}

/// One row of either view.
///
/// The listing and the search views share `id` and `name` but differ in
/// everything else, so they are kept as distinct variants.
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryRow {
    Listed(ListedCategory),
    Ranked(SearchResult),
}

impl CategoryRow {
    pub fn id(&self) -> &str {
        match self {
            Self::Listed(c) => &c.id,
            Self::Ranked(r) => &r.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Listed(c) => &c.name,
            Self::Ranked(r) => &r.name,
        }
    }

    /// Similarity score, only present on search rows.
    pub fn score(&self) -> Option<f32> {
        match self {
            Self::Listed(_) => None,
            Self::Ranked(r) => Some(r.score),
        }
    }
}

impl From<ListedCategory> for CategoryRow {
    fn from(category: ListedCategory) -> Self {
        Self::Listed(category)
    }
}

impl From<SearchResult> for CategoryRow {
    fn from(result: SearchResult) -> Self {
        Self::Ranked(result)
    }
}
