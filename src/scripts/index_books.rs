use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::Result;
use crate::models::Book;
use crate::services::{ChromaClient, GeminiEmbeddings};
use tracing::{error, info, warn};

const BATCH_SIZE: usize = 25;

/// Document stored per book: the identifier as the first token, then the
/// description. The serving pipeline recovers the identifier from this
/// prefix (and from the sidecar id this script sets).
fn searchable_text(book: &Book) -> String {
    format!("{} {}", book.isbn13, book.description)
}

/// Embed the whole catalog and upsert it into the Chroma collection,
/// creating the collection when it does not exist yet.
pub async fn index_books(config: &Config) -> Result<()> {
    info!("🚀 Starting book indexing process...");
    info!("📁 Catalog file: {}", config.books_csv_path);

    let catalog = Catalog::load(&config.books_csv_path)?;
    if catalog.is_empty() {
        warn!("⚠️  Catalog has no entries, nothing to index");
        return Ok(());
    }

    info!("🤖 Initializing Gemini embeddings client...");
    let embeddings = GeminiEmbeddings::new(&config.google_api_key, config.search_timeout)?;

    info!("📊 Connecting to Chroma at {}...", config.chroma_url);
    let chroma = ChromaClient::get_or_create(
        &config.chroma_url,
        &config.chroma_collection,
        config.search_timeout,
    )
    .await?;

    let books: Vec<&Book> = catalog.books().collect();
    let total_batches = books.len().div_ceil(BATCH_SIZE);
    let mut successful_batches = 0;
    let mut failed_batches = 0;

    info!(
        "🔄 Indexing {} books in {} batches of {}",
        books.len(),
        total_batches,
        BATCH_SIZE
    );

    for (batch_index, batch) in books.chunks(BATCH_SIZE).enumerate() {
        let batch_num = batch_index + 1;

        let ids: Vec<String> = batch.iter().map(|b| b.isbn13.clone()).collect();
        let documents: Vec<String> = batch.iter().map(|b| searchable_text(b)).collect();

        let mut vectors = Vec::with_capacity(documents.len());
        let mut batch_failed = false;
        for document in &documents {
            match embeddings.embed(document).await {
                Ok(vector) => vectors.push(vector),
                Err(e) => {
                    error!("❌ Failed to embed document in batch {}: {}", batch_num, e);
                    batch_failed = true;
                    break;
                }
            }
        }
        if batch_failed {
            failed_batches += 1;
            continue;
        }

        match chroma.add(&ids, &vectors, &documents).await {
            Ok(()) => {
                info!(
                    "✅ Indexed batch {} of {} ({} books)",
                    batch_num,
                    total_batches,
                    ids.len()
                );
                successful_batches += 1;
            }
            Err(e) => {
                error!("❌ Failed to index batch {}: {}", batch_num, e);
                failed_batches += 1;
            }
        }
    }

    info!("🎉 Indexing complete!");
    info!("   📚 Total books: {}", books.len());
    info!("   ✅ Successful batches: {}", successful_batches);
    info!("   ❌ Failed batches: {}", failed_batches);

    if failed_batches > 0 {
        warn!("⚠️  Some batches failed to index. Consider re-running for complete indexing.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn empty_catalog_indexes_nothing_without_touching_the_index() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "isbn13,title,authors,description,thumbnail,simpler_categories,joy,surprise,anger,fear,sadness"
        )
        .unwrap();

        // The unroutable Chroma URL would fail the run if it were contacted.
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            google_api_key: "test-key".to_string(),
            chroma_url: "http://127.0.0.1:1".to_string(),
            chroma_collection: "books".to_string(),
            books_csv_path: file.path().to_string_lossy().into_owned(),
            initial_top_k: 50,
            final_top_k: 12,
            search_timeout: Duration::from_secs(1),
        };

        index_books(&config).await.unwrap();
    }

    #[test]
    fn searchable_text_starts_with_identifier() {
        let book = Book {
            isbn13: "9780000000001".to_string(),
            title: "T".to_string(),
            authors: "A".to_string(),
            description: "a quiet mystery".to_string(),
            thumbnail: None,
            category: None,
            joy: None,
            surprise: None,
            anger: None,
            fear: None,
            sadness: None,
            large_thumbnail: String::new(),
        };

        let text = searchable_text(&book);
        assert_eq!(text, "9780000000001 a quiet mystery");
        assert_eq!(crate::services::isbn::extract(&text), Some("9780000000001"));
    }
}
