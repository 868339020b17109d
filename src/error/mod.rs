use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Startup error: {0}")]
    Startup(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Retrieval(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorBody {
            error: self.to_string(),
            status: status.as_u16(),
        })
    }
}

impl From<csv::Error> for ApiError {
    fn from(err: csv::Error) -> Self {
        ApiError::Startup(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Retrieval(format!("request timed out: {}", err))
        } else {
            ApiError::Retrieval(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn contextualized_startup_failures_convert_back() {
        // Startup wiring adds anyhow context before `?` converts the error
        // back into an ApiError; the context must survive the round trip.
        let result: std::result::Result<(), ApiError> =
            Err(ApiError::Startup("collection missing".into()));
        let err: ApiError = result
            .context("Failed to initialize Chroma client")
            .unwrap_err()
            .into();

        assert!(matches!(err, ApiError::Internal(_)));
        assert!(err.to_string().contains("Failed to initialize Chroma client"));
    }

    #[test]
    fn retrieval_errors_map_to_bad_gateway() {
        let err = ApiError::Retrieval("index unavailable".into());
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            ApiError::InvalidInput("bad body".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
