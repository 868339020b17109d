use crate::{
    error::ApiError,
    models::{BookSummary, RecommendationRequest, RecommendationResponse},
    services::RecommendationService,
};
use actix_web::{
    web::{self, Json},
    HttpResponse,
};

pub fn recommendations_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/recommendations").route(web::post().to(get_recommendations)));
}

/// Get book recommendations for a free-text query plus optional category and
/// tone filters. An empty query legitimately matches nothing and returns an
/// empty list; only a failing retrieval backend produces an error response.
pub async fn get_recommendations(
    request: Json<RecommendationRequest>,
    recommendation_service: web::Data<RecommendationService>,
) -> Result<HttpResponse, ApiError> {
    let books = recommendation_service
        .recommend(&request.query, &request.category, &request.tone)
        .await?;

    let recommendations: Vec<BookSummary> = books.iter().map(BookSummary::from).collect();
    Ok(HttpResponse::Ok().json(RecommendationResponse { recommendations }))
}
