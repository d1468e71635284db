//! Embedding providers
//!
//! The assembler only needs "text in, vector out". The HTTP provider talks to
//! the text-to-vector service; the hash provider gives deterministic vectors
//! for tests and offline runs. Neither retries: a failed call fails the query.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use async_trait::async_trait;
use clausematch_core::{Error, Result, Vector};
use serde_json::{json, Value};
use tracing::debug;

/// Default request timeout for the embedding service, in seconds
pub const DEFAULT_EMBEDDING_TIMEOUT_SECS: u64 = 30;

/// Dimension of vectors produced by [`HashEmbeddingProvider::default`]
pub const DEFAULT_HASH_DIM: usize = 128;

/// Turns a piece of text into an embedding vector
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vector>;

    /// Short name for logs
    fn name(&self) -> &str;
}

/// Connection settings for [`HttpEmbeddingProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingConfig {
    pub url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl EmbeddingConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8101/text2vector/".to_string(),
            timeout: Duration::from_secs(DEFAULT_EMBEDDING_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Client for a text-to-vector HTTP service.
///
/// Sends `POST {"text": ...}` and accepts either a bare JSON array or an
/// object carrying the array under `result`.
#[derive(Debug, Clone)]
pub struct HttpEmbeddingProvider {
    client: reqwest::Client,
    config: EmbeddingConfig,
}

impl HttpEmbeddingProvider {
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(Error::InvalidConfig("embedding url is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vector> {
        let response = self
            .client
            .post(&self.config.url)
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::EmbeddingUnavailable(format!(
                        "request timed out after {:?}",
                        self.config.timeout
                    ))
                } else {
                    Error::EmbeddingUnavailable(format!("HTTP request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::EmbeddingUnavailable(format!(
                "HTTP error {}: {}",
                status, body
            )));
        }

        let value = response
            .json::<Value>()
            .await
            .map_err(|e| Error::EmbeddingUnavailable(format!("invalid JSON response: {}", e)))?;

        let vector = parse_embedding(value)?;
        debug!("Embedded {} chars into {} dims", text.chars().count(), vector.dim());
        Ok(vector)
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Pull the embedding out of a service response.
///
/// Accepts `[..]`, `[[..]]` (first row) and `{"result": ...}` wrapping either.
pub fn parse_embedding(value: Value) -> Result<Vector> {
    let value = match value {
        Value::Object(mut map) => map
            .remove("result")
            .ok_or_else(|| Error::EmbeddingUnavailable("response has no `result` field".to_string()))?,
        other => other,
    };

    let items = match value {
        Value::Array(items) => items,
        _ => {
            return Err(Error::EmbeddingUnavailable(
                "response is not an array of numbers".to_string(),
            ))
        }
    };

    let nested = matches!(items.first(), Some(Value::Array(_)));
    let items = if nested {
        match items.into_iter().next() {
            Some(Value::Array(row)) => row,
            _ => Vec::new(),
        }
    } else {
        items
    };

    let data = items
        .iter()
        .map(|v| v.as_f64().map(|x| x as f32))
        .collect::<Option<Vec<f32>>>()
        .ok_or_else(|| {
            Error::EmbeddingUnavailable("response contains a non-numeric value".to_string())
        })?;

    if data.is_empty() {
        return Err(Error::EmbeddingUnavailable("empty embedding vector".to_string()));
    }

    Ok(Vector::new(data))
}

/// Deterministic embeddings from character n-gram hashes.
///
/// Similar texts share n-grams and so get nearby vectors, which is enough to
/// exercise ranking without a model.
#[derive(Debug, Clone)]
pub struct HashEmbeddingProvider {
    dim: usize,
}

impl HashEmbeddingProvider {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Synchronous core of [`EmbeddingProvider::embed`]
    pub fn hash_text(&self, text: &str) -> Vector {
        let mut data = vec![0.0f32; self.dim];
        let normalized = text.to_lowercase();
        let chars: Vec<char> = normalized.chars().filter(|c| !c.is_whitespace()).collect();

        // Bigrams suit CJK text, where words are not space separated
        for gram in chars.windows(2) {
            data[self.slot(gram)] += 1.0;
        }
        for c in &chars {
            data[self.slot(c)] += 0.5;
        }
        for word in normalized.split_whitespace() {
            data[self.slot(word)] += 2.0;
        }

        let magnitude = data.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for v in &mut data {
                *v /= magnitude;
            }
        }

        Vector::new(data)
    }

    fn slot<T: Hash + ?Sized>(&self, item: &T) -> usize {
        let mut hasher = DefaultHasher::new();
        item.hash(&mut hasher);
        (hasher.finish() as usize) % self.dim
    }
}

impl Default for HashEmbeddingProvider {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIM)
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vector> {
        Ok(self.hash_text(text))
    }

    fn name(&self) -> &str {
        "hash"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// One-shot HTTP server answering every connection with `response`
    async fn serve(response: String, delay: Duration) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                tokio::time::sleep(delay).await;
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });

        format!("http://{}/text2vector/", addr)
    }

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    }

    #[test]
    fn test_parse_embedding_shapes() {
        assert_eq!(parse_embedding(json!([0.5, 1.0])).unwrap().as_slice(), &[0.5, 1.0]);
        assert_eq!(parse_embedding(json!({"result": [1, 2]})).unwrap().as_slice(), &[1.0, 2.0]);
        assert_eq!(parse_embedding(json!([[0.25, 0.75]])).unwrap().dim(), 2);
        assert_eq!(parse_embedding(json!({"result": [[3.0]]})).unwrap().as_slice(), &[3.0]);
    }

    #[test]
    fn test_parse_embedding_rejects_bad_shapes() {
        for value in [
            json!([]),
            json!({"result": []}),
            json!({"data": [1.0]}),
            json!("vector"),
            json!([1.0, "x"]),
            json!(null),
        ] {
            let err = parse_embedding(value).unwrap_err();
            assert_eq!(err.kind(), "embedding_unavailable");
        }
    }

    #[test]
    fn test_hash_provider_is_deterministic() {
        let provider = HashEmbeddingProvider::new(64);
        let a = provider.hash_text("乙方向甲方出售办公家具");
        let b = provider.hash_text("乙方向甲方出售办公家具");
        let c = provider.hash_text("房屋租赁，租期三年");

        assert_eq!(a, b);
        assert_eq!(a.dim(), 64);
        assert!((a.norm() - 1.0).abs() < 1e-5);
        let same = a.cosine_similarity(&b).unwrap();
        let other = a.cosine_similarity(&c).unwrap();
        assert!(same > other);
    }

    #[test]
    fn test_hash_provider_empty_text() {
        let provider = HashEmbeddingProvider::default();
        let v = provider.hash_text("");
        assert_eq!(v.dim(), DEFAULT_HASH_DIM);
        assert_eq!(v.norm(), 0.0);
    }

    #[test]
    fn test_empty_url_is_invalid_config() {
        let err = HttpEmbeddingProvider::new(EmbeddingConfig::new("  ")).unwrap_err();
        assert_eq!(err.kind(), "invalid_config");
    }

    #[tokio::test]
    async fn test_http_provider_success() {
        let url = serve(http_response("200 OK", r#"{"result": [0.1, 0.2, 0.3]}"#), Duration::ZERO).await;
        let provider = HttpEmbeddingProvider::new(EmbeddingConfig::new(url)).unwrap();

        let v = provider.embed("合同标的").await.unwrap();
        assert_eq!(v.dim(), 3);
    }

    #[tokio::test]
    async fn test_http_provider_non_success_status() {
        let url = serve(http_response("500 Internal Server Error", r#"{"detail": "boom"}"#), Duration::ZERO).await;
        let provider = HttpEmbeddingProvider::new(EmbeddingConfig::new(url)).unwrap();

        let err = provider.embed("x").await.unwrap_err();
        assert_eq!(err.kind(), "embedding_unavailable");
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_http_provider_timeout() {
        let url = serve(http_response("200 OK", "[1.0]"), Duration::from_secs(5)).await;
        let config = EmbeddingConfig::new(url).with_timeout(Duration::from_millis(200));
        let provider = HttpEmbeddingProvider::new(config).unwrap();

        let err = provider.embed("x").await.unwrap_err();
        assert_eq!(err.kind(), "embedding_unavailable");
    }

    #[tokio::test]
    async fn test_http_provider_connection_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider = HttpEmbeddingProvider::new(EmbeddingConfig::new(format!("http://{}/", addr))).unwrap();
        let err = provider.embed("x").await.unwrap_err();
        assert_eq!(err.kind(), "embedding_unavailable");
    }
}
