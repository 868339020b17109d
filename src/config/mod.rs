use crate::error::{ApiError, Result};
use std::env;
use std::time::Duration;

const DEFAULT_CSV_PATH: &str = "books_with_emotions.csv";
const DEFAULT_CHROMA_URL: &str = "http://localhost:8000";
const DEFAULT_COLLECTION: &str = "books";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub google_api_key: String,
    pub chroma_url: String,
    pub chroma_collection: String,
    pub books_csv_path: String,
    pub initial_top_k: usize,
    pub final_top_k: usize,
    pub search_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8080)?,
            google_api_key: required_var("GOOGLE_API_KEY")?,
            chroma_url: env::var("CHROMA_URL").unwrap_or_else(|_| DEFAULT_CHROMA_URL.to_string()),
            chroma_collection: env::var("CHROMA_COLLECTION")
                .unwrap_or_else(|_| DEFAULT_COLLECTION.to_string()),
            books_csv_path: env::var("BOOKS_CSV_PATH")
                .unwrap_or_else(|_| DEFAULT_CSV_PATH.to_string()),
            initial_top_k: parse_var("INITIAL_TOP_K", 50)?,
            final_top_k: parse_var("FINAL_TOP_K", 12)?,
            search_timeout: Duration::from_secs(parse_var("SEARCH_TIMEOUT_SECS", 30)?),
        };

        if config.final_top_k > config.initial_top_k {
            return Err(ApiError::Startup(format!(
                "FINAL_TOP_K ({}) cannot exceed INITIAL_TOP_K ({})",
                config.final_top_k, config.initial_top_k
            )));
        }

        Ok(config)
    }
}

fn required_var(name: &str) -> Result<String> {
    env::var(name).map_err(|_| ApiError::Startup(format!("{} must be set", name)))
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ApiError::Startup(format!("{} has an invalid value: {}", name, value))),
        Err(_) => Ok(default),
    }
}
