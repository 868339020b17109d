use crate::{
    models::{FiltersResponse, Tone, ALL},
    services::RecommendationService,
};
use actix_web::{get, web, HttpResponse};

/// Enumerations the UI needs to populate its category and tone dropdowns.
#[get("/filters")]
pub async fn get_filters(
    recommendation_service: web::Data<RecommendationService>,
) -> HttpResponse {
    let mut categories = vec![ALL.to_string()];
    categories.extend(recommendation_service.catalog().categories().iter().cloned());

    let mut tones = vec![ALL.to_string()];
    tones.extend(Tone::LABELS.iter().map(|label| label.to_string()));

    HttpResponse::Ok().json(FiltersResponse { categories, tones })
}
