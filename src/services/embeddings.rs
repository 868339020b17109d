use crate::error::{ApiError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Embedding model the collection was built with. Queries must use the same
/// model or the vector space will not line up.
pub const EMBEDDING_MODEL: &str = "models/gemini-embedding-exp-03-07";

/// Client for the Gemini `embedContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiEmbeddings {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    content: Content<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

impl GeminiEmbeddings {
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            api_key
                .parse()
                .map_err(|_| ApiError::Startup("GOOGLE_API_KEY is not a valid header value".into()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Startup(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: EMBEDDING_MODEL.to_string(),
        })
    }

    /// Embed a single piece of text into the collection's vector space.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbedRequest {
            model: &self.model,
            content: Content {
                parts: vec![Part { text }],
            },
        };

        let response = self
            .client
            .post(format!("{}/v1beta/{}:embedContent", self.base_url, self.model))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Retrieval(format!(
                "embedding request failed ({}): {}",
                status, body
            )));
        }

        let embedding = response.json::<EmbedResponse>().await?.embedding.values;
        debug!("Embedded query text into {} dimensions", embedding.len());
        Ok(embedding)
    }
}
