//! Manga result records

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MangaSummary {
    pub id: String,
    /// English title
    pub title: String,
    /// Passed through untouched from the API
    #[schema(value_type = Object)]
    pub alt_titles: serde_json::Value,
    /// English description
    pub description: String,
    pub status: String,
    /// Publication year, 0 when unknown
    pub release_date: i32,
    pub content_rating: String,
    pub last_volume: String,
    pub last_chapter: String,
    /// Cover image URL, empty when the manga has no cover
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MangaSearchResults {
    pub current_page: i32,
    pub results: Vec<MangaSummary>,
}
