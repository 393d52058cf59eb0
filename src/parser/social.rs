//! Download-page extraction
//!
//! The post page renders its counters and download links as runs of
//! identically shaped elements with no labels, so those fields are assigned
//! by position. Each position is bounds-checked and an absent slot leaves its
//! field empty instead of shifting the rest. Pages that render the counters
//! as bare sibling spans fall back to span position.

use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;

use super::{Field, Rule, Slots};
use crate::models::{MediaFireFile, SocialMediaPost};
use crate::scraper::ScraperError;

/// Counter slot positions
pub const PLAYED_SLOT: usize = 0;
pub const COMMENTED_SLOT: usize = 1;
pub const SAVED_SLOT: usize = 2;
pub const SHARED_SLOT: usize = 3;
pub const SONG_SLOT: usize = 4;

/// Download link positions; 1 and 3 are watermarked/duplicate variants
pub const VIDEO_LINK: usize = 0;
pub const AUDIO_LINK: usize = 2;
pub const THUMBNAIL_LINK: usize = 4;

static EXTENSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(\.(.*?)\)").unwrap());

/// Selectors for the social download result page
#[derive(Debug, Clone)]
pub struct PostRules {
    pub nickname: Rule,
    pub username: Rule,
    pub avatar: Rule,
    pub description: Rule,
    /// One element per counter, in display order
    pub counter_slot: &'static str,
    pub counter_value: Rule,
    /// Counter values as bare siblings, used when no slot wrappers exist
    pub counter_bare: Rule,
    pub download_link: Rule,
}

impl Default for PostRules {
    fn default() -> Self {
        Self {
            nickname: Rule::Text("div.flex h2"),
            username: Rule::Text("div.flex a.font-extrabold"),
            avatar: Rule::Attr("div.flex a > img", "src"),
            description: Rule::Text("div.flex p"),
            counter_slot: "div.flex div.flex > div",
            counter_value: Rule::Text("span"),
            counter_bare: Rule::Text("div.flex div.flex span"),
            download_link: Rule::Attr("#button-download-ready a", "href"),
        }
    }
}

/// Selectors for a MediaFire file page
#[derive(Debug, Clone)]
pub struct MediaFireRules {
    pub download: Rule,
    pub filename: Rule,
    /// First span is the type label, second carries "(.ext)"
    pub filetype: Rule,
    pub detail_slot: &'static str,
    pub detail_value: Rule,
}

impl Default for MediaFireRules {
    fn default() -> Self {
        Self {
            download: Rule::Attr("#downloadButton", "href"),
            filename: Rule::Text("div.dl-info > div.intro div.filename"),
            filetype: Rule::Text("div.dl-info > div.intro div.filetype > span"),
            detail_slot: "div.dl-info > ul.details > li",
            detail_value: Rule::Text("span"),
        }
    }
}

/// Parse the page returned by the download form
pub fn parse_post(html: &str, rules: &PostRules) -> Result<SocialMediaPost, ScraperError> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let slots = Slots::compile(rules.counter_slot, rules.counter_value)?;
    let bare = Field::compile(rules.counter_bare)?;
    let wrapped = slots.count(root) > 0;
    let counter = |index| {
        if wrapped {
            slots.value_at(root, index)
        } else {
            bare.nth(root, index)
        }
    };
    let links = Field::compile(rules.download_link)?;

    Ok(SocialMediaPost {
        nickname: Field::compile(rules.nickname)?.first(root),
        username: Field::compile(rules.username)?.first(root),
        avatar: Field::compile(rules.avatar)?.first(root),
        description: Field::compile(rules.description)?.first(root),
        played: counter(PLAYED_SLOT),
        commented: counter(COMMENTED_SLOT),
        saved: counter(SAVED_SLOT),
        shared: counter(SHARED_SLOT),
        song: counter(SONG_SLOT),
        video: links.nth(root, VIDEO_LINK).trim().to_string(),
        audio: links.nth(root, AUDIO_LINK).trim().to_string(),
        thumbnail: links.nth(root, THUMBNAIL_LINK).trim().to_string(),
    })
}

/// Parse a MediaFire file page
pub fn parse_mediafire(html: &str, rules: &MediaFireRules) -> Result<MediaFireFile, ScraperError> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let filetype = Field::compile(rules.filetype)?;
    let details = Slots::compile(rules.detail_slot, rules.detail_value)?;

    Ok(MediaFireFile {
        url: Field::compile(rules.download)?.first(root).trim().to_string(),
        filename: Field::compile(rules.filename)?.first(root),
        filetype: filetype.nth(root, 0),
        ext: file_extension(&filetype.nth(root, 1)),
        filesize: details.value_at(root, 0),
        uploaded: details.value_at(root, 1),
    })
}

/// Extension out of a "(.ext)" label, "bin" when there is none
pub fn file_extension(label: &str) -> String {
    EXTENSION
        .captures(label)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| "bin".to_string())
}
