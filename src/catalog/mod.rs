use crate::error::{ApiError, Result};
use crate::models::Book;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Placeholder shown when the source row carries no thumbnail URL.
pub const DEFAULT_COVER: &str = "cover-not-found.jpg";

/// Query-string suffix that asks the image host for a larger rendition.
const LARGE_COVER_SUFFIX: &str = "&fife=w800";

/// Columns the catalog CSV must declare. Checked once, at load; a missing
/// column is a startup failure, never a per-request warning.
const REQUIRED_COLUMNS: [&str; 11] = [
    "isbn13",
    "title",
    "authors",
    "description",
    "thumbnail",
    "simpler_categories",
    "joy",
    "surprise",
    "anger",
    "fear",
    "sadness",
];

/// Immutable snapshot of the book metadata table, keyed by ISBN.
///
/// Built once during startup and shared by reference with the pipeline; no
/// ambient global state and no mutation after construction.
#[derive(Debug)]
pub struct Catalog {
    entries: HashMap<String, Book>,
    categories: Vec<String>,
}

impl Catalog {
    /// Load the catalog from a CSV file.
    ///
    /// Fails if the file is unreadable, a required column is missing from
    /// the header, or any identifier is absent or duplicated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ApiError::Startup(format!("cannot open catalog {}: {}", path.display(), e))
        })?;

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers = reader.headers()?.clone();
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .filter(|col| !headers.iter().any(|h| h == **col))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(ApiError::Startup(format!(
                "catalog {} is missing required columns: {}",
                path.display(),
                missing.join(", ")
            )));
        }

        let mut books = Vec::new();
        for record in reader.deserialize() {
            let book: Book = record?;
            books.push(book);
        }

        let catalog = Self::from_books(books)?;
        info!(
            "Loaded {} catalog entries ({} categories) from {}",
            catalog.len(),
            catalog.categories().len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Build a catalog from already-parsed rows, enforcing the identifier
    /// invariant and precomputing the large cover URL for each entry.
    pub fn from_books(books: Vec<Book>) -> Result<Self> {
        let mut entries = HashMap::with_capacity(books.len());
        let mut categories = Vec::new();

        for mut book in books {
            if book.isbn13.is_empty() {
                return Err(ApiError::Startup(format!(
                    "catalog entry '{}' has no identifier",
                    book.title
                )));
            }

            book.large_thumbnail = match &book.thumbnail {
                Some(url) => format!("{}{}", url, LARGE_COVER_SUFFIX),
                None => DEFAULT_COVER.to_string(),
            };

            if let Some(category) = &book.category {
                if !categories.contains(category) {
                    categories.push(category.clone());
                }
            }

            if let Some(previous) = entries.insert(book.isbn13.clone(), book) {
                return Err(ApiError::Startup(format!(
                    "duplicate catalog identifier {}",
                    previous.isbn13
                )));
            }
        }

        categories.sort();
        Ok(Catalog { entries, categories })
    }

    pub fn get(&self, isbn13: &str) -> Option<&Book> {
        self.entries.get(isbn13)
    }

    /// Join an ordered identifier sequence against the catalog, preserving
    /// the input order and dropping identifiers with no match. Callers keep
    /// similarity rank order deterministic by passing ids in rank order.
    pub fn lookup_many<'a, I>(&self, isbns: I) -> Vec<&Book>
    where
        I: IntoIterator<Item = &'a str>,
    {
        isbns
            .into_iter()
            .filter_map(|isbn| self.entries.get(isbn))
            .collect()
    }

    /// Iterate over all entries, in no particular order.
    pub fn books(&self) -> impl Iterator<Item = &Book> {
        self.entries.values()
    }

    /// Sorted unique category labels found at load time.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Whether the source data carried any category labels at all. When it
    /// did not, the category filter is a no-op.
    pub fn has_categories(&self) -> bool {
        !self.categories.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str =
        "isbn13,title,authors,description,thumbnail,simpler_categories,joy,surprise,anger,fear,sadness";

    fn write_csv(rows: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        file
    }

    #[test]
    fn loads_rows_and_derives_large_thumbnail() {
        let file = write_csv(&[
            "9780000000001,First,A. Author,desc,http://img/1,Fiction,0.1,0.2,0.3,0.4,0.5",
            "9780000000002,Second,B. Author,desc,,Nonfiction,,,,,",
        ]);
        let catalog = Catalog::load(file.path()).unwrap();

        assert_eq!(catalog.len(), 2);
        let first = catalog.get("9780000000001").unwrap();
        assert_eq!(first.large_thumbnail, "http://img/1&fife=w800");
        assert_eq!(first.joy, Some(0.1));

        let second = catalog.get("9780000000002").unwrap();
        assert_eq!(second.large_thumbnail, DEFAULT_COVER);
        assert_eq!(second.joy, None);
    }

    #[test]
    fn missing_required_column_fails_load() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "isbn13,title,authors,description,thumbnail").unwrap();
        writeln!(file, "9780000000001,First,A. Author,desc,").unwrap();

        let err = Catalog::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("missing required columns"));
        assert!(err.to_string().contains("joy"));
    }

    #[test]
    fn duplicate_identifier_fails_load() {
        let file = write_csv(&[
            "9780000000001,First,A. Author,desc,,Fiction,,,,,",
            "9780000000001,Again,B. Author,desc,,Fiction,,,,,",
        ]);
        let err = Catalog::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("duplicate catalog identifier"));
    }

    #[test]
    fn missing_file_fails_load() {
        let err = Catalog::load("definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, ApiError::Startup(_)));
    }

    #[test]
    fn header_only_file_loads_as_empty() {
        let file = write_csv(&[]);
        let catalog = Catalog::load(file.path()).unwrap();
        assert!(catalog.is_empty());
        assert!(!catalog.has_categories());
    }

    #[test]
    fn categories_are_sorted_and_unique() {
        let file = write_csv(&[
            "9780000000001,First,A,desc,,Nonfiction,,,,,",
            "9780000000002,Second,B,desc,,Fiction,,,,,",
            "9780000000003,Third,C,desc,,Fiction,,,,,",
            "9780000000004,Fourth,D,desc,,,,,,,",
        ]);
        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.categories(), ["Fiction", "Nonfiction"]);
    }

    #[test]
    fn lookup_many_preserves_input_order_and_skips_misses() {
        let file = write_csv(&[
            "9780000000001,First,A,desc,,Fiction,,,,,",
            "9780000000002,Second,B,desc,,Fiction,,,,,",
        ]);
        let catalog = Catalog::load(file.path()).unwrap();

        let found = catalog.lookup_many(["9780000000002", "9999999999999", "9780000000001"]);
        let titles: Vec<&str> = found.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, ["Second", "First"]);
    }
}
