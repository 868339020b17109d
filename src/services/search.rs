use crate::error::Result;
use async_trait::async_trait;

/// One nearest-neighbor match from the index, best match first.
///
/// `id` is the sidecar identifier the index stored alongside the document;
/// older collections only carry the identifier inside the document text, so
/// it is optional and the pipeline falls back to parsing `text`.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub id: Option<String>,
    pub text: String,
    pub score: f32,
}

/// Seam between the recommendation pipeline and the vector index.
///
/// The pipeline only ever sees ranked hits; which embedding model and which
/// index produced them is an implementation detail behind this trait, which
/// also keeps the pipeline testable without a running index.
#[async_trait]
pub trait SimilaritySearch: Send + Sync {
    /// Return the `k` stored documents most similar to `query`, best first.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>>;
}
