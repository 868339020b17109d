pub mod chroma;
pub mod embeddings;
pub mod isbn;
pub mod recommendation;
pub mod search;

// Re-export public types
pub use chroma::{ChromaClient, ChromaSearch};
pub use embeddings::GeminiEmbeddings;
pub use recommendation::RecommendationService;
pub use search::{SearchHit, SimilaritySearch};
