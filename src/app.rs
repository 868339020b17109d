use crate::{
    catalog::Catalog,
    config::Config,
    error::{ApiError, Result},
    routes::api_routes,
    services::{ChromaClient, ChromaSearch, GeminiEmbeddings, RecommendationService},
};
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use log::info;
use std::net::TcpListener;
use std::sync::Arc;

pub struct Application {
    port: u16,
    host: String,
    config: Config,
}

impl Application {
    /// Create a new application instance
    pub fn new(config: &Config) -> Self {
        Self {
            port: config.port,
            host: config.host.clone(),
            config: config.clone(),
        }
    }

    /// Build and run the server
    pub async fn run(&self) -> Result<()> {
        // Always bind to 0.0.0.0 for Docker/Render compatibility
        let bind_address = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&bind_address)?;
        info!("Starting server at http://{}:{}", self.host, self.port);

        self.run_with_listener(listener).await
    }

    /// Run the server with a specific TCP listener
    /// This is useful for testing where we want to use a random port
    pub async fn run_with_listener(&self, listener: TcpListener) -> Result<()> {
        // Catalog first: everything else is pointless without it, and a
        // malformed catalog must stop the process before it serves.
        let catalog = Arc::new(Catalog::load(&self.config.books_csv_path)?);

        let embeddings =
            GeminiEmbeddings::new(&self.config.google_api_key, self.config.search_timeout)
                .context("Failed to initialize Gemini embeddings client")?;

        // An absent collection is a startup failure, not a per-request one.
        let chroma = ChromaClient::connect(
            &self.config.chroma_url,
            &self.config.chroma_collection,
            self.config.search_timeout,
        )
        .await
        .context("Failed to initialize Chroma client")?;

        let search = Arc::new(ChromaSearch::new(embeddings, chroma));
        let recommendation_service = web::Data::new(RecommendationService::new(
            catalog,
            search,
            self.config.initial_top_k,
            self.config.final_top_k,
        ));

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header();

            // Malformed request bodies get the same structured error shape
            // as everything else, never actix's plain-text default.
            let json_config = web::JsonConfig::default()
                .error_handler(|err, _req| ApiError::InvalidInput(err.to_string()).into());

            App::new()
                .wrap(cors)
                .wrap(Logger::default())
                .app_data(json_config)
                .app_data(recommendation_service.clone())
                .service(api_routes())
        })
        .listen(listener)?
        .run()
        .await?;

        Ok(())
    }
}
