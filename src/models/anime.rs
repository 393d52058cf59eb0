//! Anime result records

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Subtitle vs. dubbed-audio classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubOrDub {
    Sub,
    Dub,
}

impl SubOrDub {
    /// `(dub)` anywhere in the title, case-insensitive, means dubbed
    pub fn from_title(title: &str) -> Self {
        if title.to_lowercase().contains("(dub)") {
            SubOrDub::Dub
        } else {
            SubOrDub::Sub
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaFormat {
    Anime,
    Movie,
}

impl MediaFormat {
    /// Classify the detail page's type label ("Winter 2004 Anime", "Movie", ...)
    pub fn from_label(label: &str) -> Self {
        if label.to_uppercase().split_whitespace().any(|w| w == "MOVIE") {
            MediaFormat::Movie
        } else {
            MediaFormat::Anime
        }
    }
}

/// Airing status; unrecognised source strings map to `Unknown`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaStatus {
    Ongoing,
    Completed,
    NotYetAired,
    Unknown,
}

impl MediaStatus {
    pub fn from_source(status: &str) -> Self {
        match status.trim() {
            "Ongoing" => MediaStatus::Ongoing,
            "Completed" => MediaStatus::Completed,
            "Upcoming" | "Not yet aired" => MediaStatus::NotYetAired,
            _ => MediaStatus::Unknown,
        }
    }
}

/// One page of search results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub current_page: u32,
    /// True iff the pagination bar has a page after the selected one
    pub has_next_page: bool,
    pub results: Vec<AnimeSummary>,
}

/// A listing entry from the search page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnimeSummary {
    /// Third segment of the detail path (`/category/{id}`)
    pub id: String,
    pub title: String,
    /// Absolute detail page URL
    pub url: String,
    pub image: String,
    pub release_date: String,
    pub sub_or_dub: SubOrDub,
}

/// Full show information, including its episode list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnimeDetail {
    pub id: String,
    pub title: String,
    pub url: String,
    pub image: String,
    pub release_date: String,
    pub description: String,
    pub sub_or_dub: SubOrDub,
    #[serde(rename = "type")]
    pub media_format: MediaFormat,
    pub status: MediaStatus,
    pub other_name: String,
    pub genres: Vec<String>,
    pub total_episodes: usize,
    /// Ascending by episode number
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub id: String,
    /// Fractional for specials, e.g. 12.5
    pub number: f64,
    pub url: String,
}

/// A streaming server offered on an episode page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeServer {
    pub name: String,
    /// Always scheme-qualified
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_or_dub() {
        assert_eq!(SubOrDub::from_title("Naruto (Dub)"), SubOrDub::Dub);
        assert_eq!(SubOrDub::from_title("naruto (DUB)"), SubOrDub::Dub);
        assert_eq!(SubOrDub::from_title("Naruto"), SubOrDub::Sub);
        assert_eq!(SubOrDub::from_title("Dubbed Naruto"), SubOrDub::Sub);
    }

    #[test]
    fn test_media_status_mapping() {
        assert_eq!(MediaStatus::from_source("Ongoing"), MediaStatus::Ongoing);
        assert_eq!(MediaStatus::from_source(" Completed "), MediaStatus::Completed);
        assert_eq!(MediaStatus::from_source("Upcoming"), MediaStatus::NotYetAired);
        assert_eq!(MediaStatus::from_source("Hiatus"), MediaStatus::Unknown);
        assert_eq!(MediaStatus::from_source(""), MediaStatus::Unknown);
    }

    #[test]
    fn test_media_format_from_label() {
        assert_eq!(MediaFormat::from_label("Fall 2002 Anime"), MediaFormat::Anime);
        assert_eq!(MediaFormat::from_label("Movie"), MediaFormat::Movie);
        assert_eq!(MediaFormat::from_label(""), MediaFormat::Anime);
    }

    #[test]
    fn test_enum_serialization() {
        assert_eq!(serde_json::to_string(&MediaStatus::NotYetAired).unwrap(), "\"NOT_YET_AIRED\"");
        assert_eq!(serde_json::to_string(&SubOrDub::Dub).unwrap(), "\"DUB\"");
        assert_eq!(serde_json::to_string(&MediaFormat::Movie).unwrap(), "\"MOVIE\"");
    }

    #[test]
    fn test_anime_detail_serialization() {
        let detail = AnimeDetail {
            id: "naruto".to_string(),
            title: "Naruto".to_string(),
            url: "https://anitaku.pe/category/naruto".to_string(),
            image: String::new(),
            release_date: "2002".to_string(),
            description: String::new(),
            sub_or_dub: SubOrDub::Sub,
            media_format: MediaFormat::Anime,
            status: MediaStatus::Completed,
            other_name: String::new(),
            genres: vec!["Action".to_string()],
            total_episodes: 0,
            episodes: vec![],
        };

        let json = serde_json::to_string(&detail).unwrap();
        assert!(json.contains("\"subOrDub\":\"SUB\""));
        assert!(json.contains("\"type\":\"ANIME\""));
        assert!(json.contains("\"otherName\""));
        assert!(json.contains("\"totalEpisodes\":0"));
    }
}
