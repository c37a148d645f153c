//! Embedding providers.
//!
//! Supports an OpenAI-compatible embeddings API and an offline
//! feature-hashing provider.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{EmbeddingError, Result};
use crate::similarity::normalize;
use crate::{DEFAULT_DIMENSION, DEFAULT_MODEL, Embedding};

/// Trait for embedding providers.
///
/// Implementations return unit-length vectors so that callers can treat the
/// dot product as cosine similarity.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Get the model this provider embeds with.
    fn model(&self) -> &str;

    /// Get the length of the vectors this provider returns.
    fn dimension(&self) -> usize;

    /// Generate an embedding for the given text.
    ///
    /// The text is trimmed first; blank input fails with
    /// [`EmbeddingError::EmptyInput`].
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Generate embeddings for multiple texts.
    ///
    /// Blank entries are dropped, so the result lines up with the non-blank
    /// inputs in their original order. Fails if nothing is left to embed.
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let inputs = prepare_inputs(texts)?;
        let mut results = Vec::with_capacity(inputs.len());
        for input in inputs {
            results.push(self.embed(input).await?);
        }
        Ok(results)
    }

    /// Check if the provider is available (API key set, etc.).
    fn is_available(&self) -> bool;
}

/// Trim every input and drop the blank ones.
pub fn prepare_inputs(texts: &[String]) -> Result<Vec<&str>> {
    let inputs: Vec<&str> = texts
        .iter()
        .map(String::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    if inputs.is_empty() {
        return Err(EmbeddingError::EmptyInput);
    }
    Ok(inputs)
}

/// OpenAI embedding provider.
pub struct OpenAIProvider {
    /// API key.
    api_key: Option<String>,

    /// API base URL.
    base_url: String,

    /// HTTP client.
    client: reqwest::Client,

    /// Model to embed with.
    model: String,

    /// Requested output dimensions, if overriding the model default.
    dimensions: Option<usize>,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider, reading the key from `OPENAI_API_KEY`.
    pub fn new() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            base_url: "https://api.openai.com/v1".to_string(),
            client: reqwest::Client::new(),
            model: DEFAULT_MODEL.to_string(),
            dimensions: None,
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Drop any key picked up from the environment.
    pub fn without_api_key(mut self) -> Self {
        self.api_key = None;
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Request a specific output dimension.
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    /// Use a preconfigured HTTP client (timeouts, proxies).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    async fn request(&self, input: serde_json::Value, expected: usize) -> Result<Vec<Embedding>> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            EmbeddingError::ProviderNotConfigured("OPENAI_API_KEY is not set".to_string())
        })?;

        let mut body = serde_json::json!({
            "input": input,
            "model": self.model
        });

        if let Some(dims) = self.dimensions {
            body["dimensions"] = serde_json::json!(dims);
        }

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            warn!("Embedding provider rate limited, retry after {retry_after}s");
            return Err(EmbeddingError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ApiRequest(format!(
                "API error ({status}): {error_text}"
            )));
        }

        let text = response.text().await?;
        let mut result: OpenAIEmbeddingResponse = serde_json::from_str(&text)?;

        if result.data.len() != expected {
            return Err(EmbeddingError::InvalidResponse(format!(
                "expected {expected} embeddings, got {}",
                result.data.len()
            )));
        }

        result.data.sort_by_key(|d| d.index);
        if let Some(usage) = result.usage {
            debug!("Embedding request used {} tokens", usage.total_tokens);
        }

        Ok(result.data.into_iter().map(|d| d.embedding).collect())
    }
}

impl Default for OpenAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        if let Some(dims) = self.dimensions {
            return dims;
        }
        match self.model.as_str() {
            "text-embedding-3-large" => 3072,
            _ => DEFAULT_DIMENSION,
        }
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        let input = text.trim();
        if input.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        debug!("Generating embedding with model: {}", self.model);

        let embedding = self
            .request(serde_json::json!(input), 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                EmbeddingError::InvalidResponse("No embedding in response".to_string())
            })?;

        debug!("Generated embedding with {} dimensions", embedding.len());
        Ok(embedding)
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let inputs = prepare_inputs(texts)?;

        debug!(
            "Generating batch embeddings for {} texts with model: {}",
            inputs.len(),
            self.model
        );

        let count = inputs.len();
        let embeddings = self.request(serde_json::json!(inputs), count).await?;

        info!("Generated {} batch embeddings", embeddings.len());
        Ok(embeddings)
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

/// OpenAI API response format.
#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingResponse {
    data: Vec<OpenAIEmbeddingData>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    total_tokens: u64,
}

/// Offline provider that embeds text by feature hashing.
///
/// Words and character trigrams of the lowercased text are hashed with
/// SeaHash (stable across builds and platforms) into a signed bucket vector
/// which is then normalized. Strings that share words
/// or spelling land close together; there is no semantic model behind it.
pub struct HashedProvider {
    dimension: usize,
}

impl HashedProvider {
    /// Create a hashed provider producing vectors of `dimension` entries.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn features(text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let mut features = Vec::new();
        for word in lowered.split_whitespace() {
            features.push(format!("w:{word}"));
            let padded: Vec<char> = format!(" {word} ").chars().collect();
            for gram in padded.windows(3) {
                features.push(format!("g:{}", gram.iter().collect::<String>()));
            }
        }
        features
    }
}

impl Default for HashedProvider {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

#[async_trait]
impl EmbeddingProvider for HashedProvider {
    fn name(&self) -> &str {
        "hashed"
    }

    fn model(&self) -> &str {
        "feature-hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        let input = text.trim();
        if input.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let mut embedding = vec![0.0f32; self.dimension];
        for feature in Self::features(input) {
            let hash = seahash::hash(feature.as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            embedding[bucket] += sign;
        }
        normalize(&mut embedding);

        Ok(embedding)
    }

    fn is_available(&self) -> bool {
        true
    }
}
