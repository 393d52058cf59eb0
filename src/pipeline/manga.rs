//! Manga pipeline: JSON search plus per-result cover resolution
//!
//! A search page of `limit` records triggers up to `limit` cover lookups.
//! These run with bounded concurrency and are collected back in result
//! order; the first failed lookup fails the whole search.

use futures_util::stream::{self, StreamExt, TryStreamExt};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::constants::{endpoints, COVER_FETCH_CONCURRENCY, MANGA_MAX_LIMIT, MANGA_MAX_OFFSET};
use crate::models::{MangaSearchResults, MangaSummary};
use crate::scraper::{Fetcher, ScraperError};

const COVER_ART: &str = "cover_art";
const LANGUAGE: &str = "en";

/// Pagination parameters rejected before any request is made
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueryError {
    #[error("page number must be greater than 0")]
    InvalidPage,

    #[error("limit must be less than or equal to 100")]
    LimitTooLarge,

    #[error("not enough results")]
    PaginationExhausted,
}

/// Check `page`/`limit` and return the offset they address
pub fn validate_query(page: i32, limit: i32) -> Result<i64, QueryError> {
    if page <= 0 {
        return Err(QueryError::InvalidPage);
    }
    if limit > MANGA_MAX_LIMIT {
        return Err(QueryError::LimitTooLarge);
    }

    let offset = i64::from(limit) * (i64::from(page) - 1);
    if offset >= MANGA_MAX_OFFSET {
        return Err(QueryError::PaginationExhausted);
    }

    Ok(offset)
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    result: String,
    #[serde(default)]
    data: Vec<MangaRecord>,
}

#[derive(Debug, Deserialize)]
struct MangaRecord {
    id: String,
    attributes: MangaAttributes,
    #[serde(default)]
    relationships: Vec<Relationship>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct MangaAttributes {
    title: Value,
    alt_titles: Value,
    description: Value,
    status: Option<String>,
    year: Option<i32>,
    content_rating: Option<String>,
    last_volume: Option<String>,
    last_chapter: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Relationship {
    #[serde(rename = "type")]
    kind: String,
    id: String,
}

#[derive(Debug, Deserialize)]
struct CoverEnvelope {
    data: CoverData,
}

#[derive(Debug, Deserialize)]
struct CoverData {
    attributes: CoverAttributes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoverAttributes {
    file_name: String,
}

impl MangaRecord {
    fn cover_id(&self) -> Option<&str> {
        self.relationships
            .iter()
            .find(|rel| rel.kind == COVER_ART)
            .map(|rel| rel.id.as_str())
    }
}

/// English entry of a localized string map, empty when absent
fn localized(value: &Value) -> String {
    value
        .get(LANGUAGE)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Queries the manga API
#[derive(Debug, Clone)]
pub struct MangaPipeline {
    fetcher: Fetcher,
    sources: SourceConfig,
}

impl MangaPipeline {
    pub fn new(fetcher: Fetcher, sources: SourceConfig) -> Self {
        Self { fetcher, sources }
    }

    /// Search manga by title, ordered by relevance
    pub async fn search(
        &self,
        query: &str,
        page: i32,
        limit: i32,
    ) -> Result<MangaSearchResults, ScraperError> {
        let offset = validate_query(page, limit)?;
        let url = endpoints::manga_search(&self.sources.manga_api_url, query, limit, offset);
        info!(query, page, limit, "Searching manga");

        let envelope: SearchEnvelope = self.fetcher.fetch_json(&url).await?;
        if envelope.result != "ok" {
            return Err(ScraperError::UpstreamError(format!(
                "manga search returned result {:?}",
                envelope.result
            )));
        }

        let images: Vec<String> = stream::iter(envelope.data.iter())
            .map(|record| self.cover_image(record))
            .buffered(COVER_FETCH_CONCURRENCY)
            .try_collect()
            .await?;

        let results: Vec<MangaSummary> = envelope
            .data
            .into_iter()
            .zip(images)
            .map(|(record, image)| summarize(record, image))
            .collect();

        debug!(count = results.len(), "Resolved manga covers");
        Ok(MangaSearchResults {
            current_page: page,
            results,
        })
    }

    /// Cover image URL of one record, empty when it has no cover
    async fn cover_image(&self, record: &MangaRecord) -> Result<String, ScraperError> {
        let Some(cover_id) = record.cover_id() else {
            return Ok(String::new());
        };

        let url = endpoints::manga_cover(&self.sources.manga_api_url, cover_id);
        let cover: CoverEnvelope = self.fetcher.fetch_json(&url).await?;

        Ok(endpoints::manga_cover_image(
            &self.sources.manga_site_url,
            &record.id,
            &cover.data.attributes.file_name,
        ))
    }
}

fn summarize(record: MangaRecord, image: String) -> MangaSummary {
    let attributes = record.attributes;

    MangaSummary {
        id: record.id,
        title: localized(&attributes.title),
        alt_titles: attributes.alt_titles,
        description: localized(&attributes.description),
        status: attributes.status.unwrap_or_default(),
        release_date: attributes.year.unwrap_or_default(),
        content_rating: attributes.content_rating.unwrap_or_default(),
        last_volume: attributes.last_volume.unwrap_or_default(),
        last_chapter: attributes.last_chapter.unwrap_or_default(),
        image,
    }
}
