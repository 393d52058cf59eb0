//! Download-page result records

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// File metadata scraped from a MediaFire download page
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaFireFile {
    /// Direct download link
    pub url: String,
    pub filename: String,
    pub filetype: String,
    /// Extension without the dot, "bin" when the page shows none
    pub ext: String,
    pub uploaded: String,
    pub filesize: String,
}

/// Profile and media metadata of a short-video post
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SocialMediaPost {
    pub nickname: String,
    pub username: String,
    pub avatar: String,
    pub description: String,
    pub played: String,
    pub commented: String,
    pub saved: String,
    pub shared: String,
    pub song: String,
    /// Signed download links
    pub video: String,
    pub audio: String,
    pub thumbnail: String,
}
