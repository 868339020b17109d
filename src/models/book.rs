use serde::{Deserialize, Serialize};

/// One catalog row, immutable after load.
///
/// Authors are kept semicolon-joined exactly as the source CSV stores them.
/// Category and the five emotion scores are nullable in the source data and
/// stay optional here; filters treat a missing category as an empty string
/// and sort missing scores last.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub isbn13: String,
    pub title: String,
    pub authors: String,
    pub description: String,
    pub thumbnail: Option<String>,
    #[serde(rename = "simpler_categories")]
    pub category: Option<String>,
    pub joy: Option<f64>,
    pub surprise: Option<f64>,
    pub anger: Option<f64>,
    pub fear: Option<f64>,
    pub sadness: Option<f64>,
    /// Derived at load time, never read from the CSV.
    #[serde(skip_deserializing, default)]
    pub large_thumbnail: String,
}

/// The subset of book fields exposed over the HTTP surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookSummary {
    pub isbn13: String,
    pub title: String,
    pub authors: String,
    pub description: String,
    pub large_thumbnail: String,
    pub category: Option<String>,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        BookSummary {
            isbn13: book.isbn13.clone(),
            title: book.title.clone(),
            authors: book.authors.clone(),
            description: book.description.clone(),
            large_thumbnail: book.large_thumbnail.clone(),
            category: book.category.clone(),
        }
    }
}
