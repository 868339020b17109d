use crate::error::{ApiError, Result};
use crate::services::embeddings::GeminiEmbeddings;
use crate::services::search::{SearchHit, SimilaritySearch};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// Client for a Chroma server collection over its HTTP API.
#[derive(Debug, Clone)]
pub struct ChromaClient {
    client: Client,
    base_url: String,
    collection_name: String,
    collection_id: String,
}

#[derive(Debug, Deserialize)]
struct CollectionInfo {
    id: String,
}

#[derive(Debug, Serialize)]
struct CreateCollectionRequest<'a> {
    name: &'a str,
    get_or_create: bool,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query_embeddings: Vec<&'a [f32]>,
    n_results: usize,
    include: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    ids: Vec<Vec<String>>,
    #[serde(default)]
    documents: Vec<Vec<Option<String>>>,
    #[serde(default)]
    distances: Vec<Vec<f32>>,
}

#[derive(Debug, Serialize)]
struct AddRequest<'a> {
    ids: &'a [String],
    embeddings: &'a [Vec<f32>],
    documents: &'a [String],
}

impl ChromaClient {
    /// Connect to an existing collection. An absent collection is a startup
    /// failure: serving without the index would fail every request.
    pub async fn connect(base_url: &str, collection: &str, timeout: Duration) -> Result<Self> {
        let client = Self::build(base_url, collection, timeout)?;

        let response = client
            .client
            .get(format!(
                "{}/api/v1/collections/{}",
                client.base_url, client.collection_name
            ))
            .send()
            .await
            .map_err(|e| ApiError::Startup(format!("cannot reach Chroma at {}: {}", base_url, e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::Startup(format!(
                "Chroma collection '{}' not found; run the index_books script first",
                client.collection_name
            )));
        }
        if !response.status().is_success() {
            return Err(ApiError::Startup(format!(
                "Chroma returned {} while resolving collection '{}'",
                response.status(),
                client.collection_name
            )));
        }

        let info: CollectionInfo = response
            .json()
            .await
            .map_err(|e| ApiError::Startup(format!("unexpected Chroma response: {}", e)))?;

        let connected = ChromaClient {
            collection_id: info.id,
            ..client
        };

        match connected.count().await {
            Ok(0) => warn!(
                "Chroma collection '{}' exists but is empty",
                connected.collection_name
            ),
            Ok(count) => info!(
                "Connected to Chroma collection '{}' ({} documents)",
                connected.collection_name, count
            ),
            Err(e) => warn!("Could not count Chroma collection documents: {}", e),
        }

        Ok(connected)
    }

    /// Connect to a collection, creating it when absent. Used by the
    /// indexing script, not by the serving path.
    pub async fn get_or_create(base_url: &str, collection: &str, timeout: Duration) -> Result<Self> {
        let client = Self::build(base_url, collection, timeout)?;

        let response = client
            .client
            .post(format!("{}/api/v1/collections", client.base_url))
            .json(&CreateCollectionRequest {
                name: collection,
                get_or_create: true,
            })
            .send()
            .await
            .map_err(|e| ApiError::Startup(format!("cannot reach Chroma at {}: {}", base_url, e)))?;

        if !response.status().is_success() {
            return Err(ApiError::Startup(format!(
                "Chroma returned {} while creating collection '{}'",
                response.status(),
                collection
            )));
        }

        let info: CollectionInfo = response
            .json()
            .await
            .map_err(|e| ApiError::Startup(format!("unexpected Chroma response: {}", e)))?;

        Ok(ChromaClient {
            collection_id: info.id,
            ..client
        })
    }

    fn build(base_url: &str, collection: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Startup(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            collection_name: collection.to_string(),
            collection_id: String::new(),
        })
    }

    pub async fn count(&self) -> Result<usize> {
        let response = self
            .client
            .get(format!(
                "{}/api/v1/collections/{}/count",
                self.base_url, self.collection_id
            ))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::Retrieval(format!(
                "Chroma count failed: {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    /// Nearest-neighbor query by embedding, best match first.
    pub async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        let request = QueryRequest {
            query_embeddings: vec![embedding],
            n_results: k,
            include: vec!["documents", "distances"],
        };

        let response = self
            .client
            .post(format!(
                "{}/api/v1/collections/{}/query",
                self.base_url, self.collection_id
            ))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Retrieval(format!(
                "Chroma query failed ({}): {}",
                status, body
            )));
        }

        let mut parsed: QueryResponse = response.json().await?;

        // One query embedding in, so exactly one result group out.
        let ids = parsed.ids.pop().unwrap_or_default();
        let documents = parsed.documents.pop().unwrap_or_default();
        let distances = parsed.distances.pop().unwrap_or_default();

        let hits = ids
            .into_iter()
            .enumerate()
            .map(|(i, id)| SearchHit {
                id: Some(id),
                text: documents.get(i).cloned().flatten().unwrap_or_default(),
                score: distances.get(i).copied().unwrap_or(f32::MAX),
            })
            .collect();

        Ok(hits)
    }

    /// Upsert a batch of documents with precomputed embeddings.
    pub async fn add(
        &self,
        ids: &[String],
        embeddings: &[Vec<f32>],
        documents: &[String],
    ) -> Result<()> {
        let request = AddRequest {
            ids,
            embeddings,
            documents,
        };

        let response = self
            .client
            .post(format!(
                "{}/api/v1/collections/{}/add",
                self.base_url, self.collection_id
            ))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Retrieval(format!(
                "Chroma add failed ({}): {}",
                status, body
            )));
        }

        Ok(())
    }
}

/// The production `SimilaritySearch`: embed the query with Gemini, then
/// nearest-neighbor search the Chroma collection.
pub struct ChromaSearch {
    embeddings: GeminiEmbeddings,
    chroma: ChromaClient,
}

impl ChromaSearch {
    pub fn new(embeddings: GeminiEmbeddings, chroma: ChromaClient) -> Self {
        Self { embeddings, chroma }
    }
}

#[async_trait]
impl SimilaritySearch for ChromaSearch {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        let embedding = self.embeddings.embed(query).await?;
        self.chroma.query(&embedding, k).await
    }
}
