use serde::{Deserialize, Serialize};
use tracing::warn;

// Re-export types from book.rs
pub use book::{Book, BookSummary};

mod book;

/// Sentinel for "no category filter" / "no tone sort".
pub const ALL: &str = "All";

/// Request structure for book recommendations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRequest {
    /// Free-text description of the book the caller is looking for
    pub query: String,
    /// Exact category label to keep, or "All" for no filter
    #[serde(default = "default_all")]
    pub category: String,
    /// Emotional tone to sort by, or "All" for no re-sort
    #[serde(default = "default_all")]
    pub tone: String,
}

/// Response structure for book recommendations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<BookSummary>,
}

/// Response structure for the filters endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiltersResponse {
    pub categories: Vec<String>,
    pub tones: Vec<String>,
}

fn default_all() -> String {
    ALL.to_string()
}

/// Emotional tone used to re-rank results. Each variant maps to exactly one
/// emotion score column of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Happy,
    Surprising,
    Angry,
    Suspenseful,
    Sad,
}

impl Tone {
    pub const LABELS: [&'static str; 5] =
        ["Happy", "Surprising", "Angry", "Suspenseful", "Sad"];

    /// Parse a request-level tone filter. "All" means no sort; an
    /// unrecognized value is downgraded to no sort with a warning, never an
    /// error.
    pub fn from_filter(value: &str) -> Option<Tone> {
        match value {
            "Happy" => Some(Tone::Happy),
            "Surprising" => Some(Tone::Surprising),
            "Angry" => Some(Tone::Angry),
            "Suspenseful" => Some(Tone::Suspenseful),
            "Sad" => Some(Tone::Sad),
            ALL => None,
            other => {
                warn!("Unrecognized tone '{}', skipping tone sort", other);
                None
            }
        }
    }

    /// The emotion score this tone sorts by.
    pub fn score(&self, book: &Book) -> Option<f64> {
        match self {
            Tone::Happy => book.joy,
            Tone::Surprising => book.surprise,
            Tone::Angry => book.anger,
            Tone::Suspenseful => book.fear,
            Tone::Sad => book.sadness,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_parses_every_label() {
        for label in Tone::LABELS {
            assert!(Tone::from_filter(label).is_some(), "label {}", label);
        }
    }

    #[test]
    fn all_and_unknown_tones_mean_no_sort() {
        assert_eq!(Tone::from_filter("All"), None);
        assert_eq!(Tone::from_filter("Melancholy"), None);
    }

    #[test]
    fn request_filters_default_to_all() {
        let request: RecommendationRequest =
            serde_json::from_str(r#"{"query": "space opera"}"#).unwrap();
        assert_eq!(request.category, "All");
        assert_eq!(request.tone, "All");
    }
}
