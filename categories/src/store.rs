//! Persistence of the store document.
//!
//! The whole category collection lives in one JSON document. Every backend
//! reads it whole and overwrites it whole; there is no version check on
//! write, so the last completed write wins.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::error::StorageError;
use crate::model::Store;

/// Result type alias for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Loads and persists the store document.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Read the document, or the empty version-1 store if none exists.
    async fn read(&self) -> StorageResult<Store>;

    /// Overwrite the document with `store`.
    async fn write(&self, store: &Store) -> StorageResult<()>;
}

/// Build the backend named by the configuration.
pub fn build_store(config: &StorageConfig) -> StorageResult<Arc<dyn CategoryStore>> {
    let store: Arc<dyn CategoryStore> = match config {
        StorageConfig::Blob {
            base_url,
            key,
            token,
            timeout_secs,
        } => {
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(*timeout_secs))
                .build()?;
            let mut blob = BlobStore::new(base_url, key).with_client(client);
            if let Some(token) = token {
                blob = blob.with_token(token);
            }
            info!("Using object store at {}", blob.url());
            Arc::new(blob)
        }
        StorageConfig::File { path } => {
            info!("Using store file {}", path.display());
            Arc::new(FileStore::new(path))
        }
        StorageConfig::Memory => {
            info!("Using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };
    Ok(store)
}

/// Store document kept as a single object in a blob-style object store.
///
/// `GET {base_url}/{key}` reads it and `PUT {base_url}/{key}` replaces it.
pub struct BlobStore {
    /// Full URL of the document.
    url: String,

    /// Bearer token, if the store requires one.
    token: Option<String>,

    /// HTTP client.
    client: reqwest::Client,
}

impl BlobStore {
    /// Create a store for the object `key` under `base_url`.
    pub fn new(base_url: &str, key: &str) -> Self {
        Self {
            url: format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                key.trim_start_matches('/')
            ),
            token: None,
            client: reqwest::Client::new(),
        }
    }

    /// Send a bearer token with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Use a preconfigured HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// URL of the document.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn status_error(&self, status: reqwest::StatusCode) -> StorageError {
        StorageError::Status {
            status: status.as_u16(),
            url: self.url.clone(),
        }
    }
}

#[async_trait]
impl CategoryStore for BlobStore {
    async fn read(&self) -> StorageResult<Store> {
        let response = self
            .authorize(self.client.get(&self.url))
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!("No store document at {}, starting empty", self.url);
            return Ok(Store::default());
        }
        if !status.is_success() {
            return Err(self.status_error(status));
        }

        let body = response.text().await?;
        let store = Store::from_json(&body)?;
        debug!("Read {} categories from {}", store.len(), self.url);
        Ok(store)
    }

    async fn write(&self, store: &Store) -> StorageResult<()> {
        let body = store.to_json()?;
        let response = self
            .authorize(self.client.put(&self.url))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.status_error(status));
        }

        debug!("Wrote {} categories to {}", store.len(), self.url);
        Ok(())
    }
}

/// Store document kept as one file on local disk.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store backed by the file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the document.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CategoryStore for FileStore {
    async fn read(&self) -> StorageResult<Store> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No store file at {}, starting empty", self.path.display());
                return Ok(Store::default());
            }
            Err(e) => {
                return Err(StorageError::ReadFile(format!(
                    "{}: {e}",
                    self.path.display()
                )));
            }
        };

        Store::from_json(&content)
    }

    async fn write(&self, store: &Store) -> StorageResult<()> {
        let content = store.to_json()?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::WriteFile(format!("{}: {e}", parent.display())))?;
        }

        // Write atomically through a temp file private to this write
        let temp_path = self
            .path
            .with_extension(format!("json.{}.tmp", Uuid::new_v4().simple()));
        fs::write(&temp_path, &content)
            .await
            .map_err(|e| StorageError::WriteFile(format!("{}: {e}", temp_path.display())))?;

        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StorageError::WriteFile(format!(
                "{}: {e}",
                self.path.display()
            )));
        }

        debug!(
            "Saved {} categories to {}",
            store.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Store document held in process memory.
///
/// The document is kept serialized so reads and writes go through the same
/// encoding as the durable backends.
#[derive(Default)]
pub struct MemoryStore {
    document: RwLock<Option<String>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `document` verbatim.
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: RwLock::new(Some(document.into())),
        }
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn read(&self) -> StorageResult<Store> {
        match self.document.read().await.as_deref() {
            Some(document) => Store::from_json(document),
            None => Ok(Store::default()),
        }
    }

    async fn write(&self, store: &Store) -> StorageResult<()> {
        let document = store.to_json()?;
        *self.document.write().await = Some(document);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_store() -> Store {
        let mut store = Store::default();
        store
            .categories
            .push(Category::new("Electronics", vec![0.6, 0.8]));
        store.categories.push(Category::new("Books", vec![1.0, 0.0]));
        store
    }

    #[tokio::test]
    async fn test_file_store_missing_file_reads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("categories.json"));

        assert_eq!(store.read().await.unwrap(), Store::default());
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/dir/categories.json");
        let expected = sample_store();

        FileStore::new(&path).write(&expected).await.unwrap();

        // A fresh handle sees the same document.
        let actual = FileStore::new(&path).read().await.unwrap();
        assert_eq!(actual, expected);

        // Only the document remains; no temp files are left behind.
        let entries: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("categories.json")]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_file_store_concurrent_writers_last_write_wins() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(FileStore::new(temp_dir.path().join("categories.json")));

        for round in 0..20 {
            let mut handles = Vec::new();
            for writer in 0..8 {
                let store = Arc::clone(&store);
                handles.push(tokio::spawn(async move {
                    let mut doc = Store::default();
                    doc.categories.push(Category {
                        id: format!("{round}-{writer}"),
                        name: format!("Writer {writer}"),
                        embedding: vec![1.0, 0.0],
                    });
                    store.write(&doc).await
                }));
            }
            for handle in handles {
                handle.await.unwrap().unwrap();
            }

            let doc = store.read().await.unwrap();
            assert_eq!(doc.len(), 1);
            assert!(doc.categories[0].id.starts_with(&format!("{round}-")));
        }

        let leftovers = std::fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[tokio::test]
    async fn test_file_store_overwrites_wholesale() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("categories.json"));

        store.write(&sample_store()).await.unwrap();
        store.write(&Store::default()).await.unwrap();

        assert!(store.read().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_store_malformed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("categories.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = FileStore::new(&path).read().await.unwrap_err();
        assert!(matches!(err, StorageError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.read().await.unwrap(), Store::default());

        let expected = sample_store();
        store.write(&expected).await.unwrap();
        assert_eq!(store.read().await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_build_store_memory() {
        let store = build_store(&StorageConfig::Memory).unwrap();
        store.write(&sample_store()).await.unwrap();
        assert_eq!(store.read().await.unwrap().len(), 2);
    }

    #[test]
    fn test_blob_url_joining() {
        let store = BlobStore::new("https://bucket.example.com/", "/categories.json");
        assert_eq!(store.url(), "https://bucket.example.com/categories.json");
    }
}
