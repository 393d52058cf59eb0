//! Global error handling module for the Media Scraper API
//!
//! This module provides a unified error type that handles all application errors
//! and converts them to appropriate HTTP responses with consistent JSON structure.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ApiError;
use crate::scraper::ScraperError;

/// Application-wide error type that unifies all error sources
#[derive(Debug, Error)]
pub enum AppError {
    /// Scraping-related errors (network, HTTP, extraction, query bounds)
    #[error("Scraping error: {0}")]
    Scraping(#[from] ScraperError),

    /// Validation errors (bad request)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found errors
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request - handler and pagination validation
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Scraping(ScraperError::InvalidQuery(_)) => StatusCode::BAD_REQUEST,

            // 404 Not Found - the addressed show or episode does not exist
            AppError::NotFound(_) => StatusCode::NOT_FOUND,

            AppError::Scraping(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this error should be reported to the operator
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),

            AppError::Scraping(scraper_err) => match scraper_err {
                ScraperError::NetworkError(msg) => format!("Failed to connect to server: {}", msg),
                ScraperError::HttpError(status) => {
                    format!("Server returned error status: {}", status)
                }
                ScraperError::ResponseError(msg) => format!("Failed to read response: {}", msg),
                ScraperError::UpstreamError(msg) => format!("Upstream service error: {}", msg),
                ScraperError::ExtractionMiss { field, .. } => {
                    format!("Failed to extract {} from the source page", field)
                }
                ScraperError::InvalidSelector(_) => "Extraction rules are invalid".to_string(),
                ScraperError::InvalidQuery(query_err) => query_err.to_string(),
            },
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_response = ApiError::new(self.user_message());

        HttpResponse::build(status).json(error_response)
    }
}
