//! Media Scraper API Library
//!
//! This library fetches pages from anime, manga, social and file-sharing
//! sources, extracts typed records from them and exposes the results through
//! REST API endpoints.

pub mod config;
pub mod constants;
pub mod email;
pub mod error;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod routes;
pub mod scraper;
