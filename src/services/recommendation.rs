use crate::catalog::Catalog;
use crate::error::Result;
use crate::models::{Book, Tone, ALL};
use crate::services::isbn;
use crate::services::search::SimilaritySearch;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The retrieval pipeline: similarity search, identifier recovery, catalog
/// join, category filter, tone sort, truncation. Each call is an independent
/// request/response cycle over the immutable catalog plus one external
/// search call; there is no shared mutable state and no retry.
pub struct RecommendationService {
    catalog: Arc<Catalog>,
    search: Arc<dyn SimilaritySearch>,
    initial_top_k: usize,
    final_top_k: usize,
}

impl RecommendationService {
    pub fn new(
        catalog: Arc<Catalog>,
        search: Arc<dyn SimilaritySearch>,
        initial_top_k: usize,
        final_top_k: usize,
    ) -> Self {
        Self {
            catalog,
            search,
            initial_top_k,
            final_top_k,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub async fn recommend(&self, query: &str, category: &str, tone: &str) -> Result<Vec<Book>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        info!(
            "Retrieving recommendations for query '{}', category '{}', tone '{}'",
            query, category, tone
        );

        let hits = self.search.search(query, self.initial_top_k).await?;
        if hits.is_empty() {
            info!("No results from similarity search");
            return Ok(Vec::new());
        }

        // Recover one identifier per hit, in rank order, deduplicated. The
        // sidecar id wins when the index stored one; otherwise fall back to
        // parsing the document text. Unparseable candidates are dropped.
        let mut seen = HashSet::new();
        let mut isbns: Vec<String> = Vec::new();
        for hit in &hits {
            let candidate = hit
                .id
                .as_deref()
                .filter(|id| isbn::is_valid(id))
                .or_else(|| isbn::extract(&hit.text));
            match candidate {
                Some(code) => {
                    if seen.insert(code.to_string()) {
                        isbns.push(code.to_string());
                    }
                }
                None => debug!("Dropping hit with unparseable identifier: {:.50}", hit.text),
            }
        }

        if isbns.is_empty() {
            warn!("No valid identifiers recovered from {} search hits", hits.len());
            return Ok(Vec::new());
        }

        // Join in rank order; identifiers the index knows but the catalog
        // does not are dropped (the collection may reference stale rows).
        let mut books: Vec<Book> = self
            .catalog
            .lookup_many(isbns.iter().map(String::as_str))
            .into_iter()
            .cloned()
            .collect();
        debug!("{} of {} identifiers matched the catalog", books.len(), isbns.len());

        if category != ALL {
            if self.catalog.has_categories() {
                let before = books.len();
                books.retain(|book| book.category.as_deref().unwrap_or("") == category);
                debug!(
                    "Category filter '{}': {} -> {} results",
                    category,
                    before,
                    books.len()
                );
            } else {
                warn!(
                    "Category filter '{}' requested but the catalog carries no categories",
                    category
                );
            }
        }

        if let Some(tone) = Tone::from_filter(tone) {
            // Stable sort keeps the rank-order tie-break among equal scores.
            books.sort_by(|a, b| compare_scores_desc(tone.score(a), tone.score(b)));
            debug!("Sorted results by tone {:?}", tone);
        }

        books.truncate(self.final_top_k);
        info!("Returning {} recommendations for query '{}'", books.len(), query);
        Ok(books)
    }
}

/// Descending by score, entries without a score last.
fn compare_scores_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
