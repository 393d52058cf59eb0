//! Social post and file-host downloaders

use tracing::info;

use crate::config::SourceConfig;
use crate::constants::SOCIAL_LANGUAGE_ID;
use crate::models::{MediaFireFile, SocialMediaPost};
use crate::parser::social::{parse_mediafire, parse_post, MediaFireRules, PostRules};
use crate::scraper::{FetchRequest, Fetcher, ScraperError};

#[derive(Debug, Clone)]
pub struct SocialPipeline {
    fetcher: Fetcher,
    sources: SourceConfig,
    post_rules: PostRules,
    mediafire_rules: MediaFireRules,
}

impl SocialPipeline {
    pub fn new(fetcher: Fetcher, sources: SourceConfig) -> Self {
        Self {
            fetcher,
            sources,
            post_rules: PostRules::default(),
            mediafire_rules: MediaFireRules::default(),
        }
    }

    /// Profile, counters and download links of a social video post.
    ///
    /// One form POST to the download service; the post page itself is never
    /// fetched.
    pub async fn extract_post(&self, source_url: &str) -> Result<SocialMediaPost, ScraperError> {
        info!(url = %source_url, "Extracting social post");

        let request = FetchRequest::post_form(
            self.sources.social_download_url.as_str(),
            vec![
                ("language_id".to_string(), SOCIAL_LANGUAGE_ID.to_string()),
                ("query".to_string(), source_url.to_string()),
            ],
        );
        let page = self.fetcher.fetch(&request).await?;

        parse_post(&page.body, &self.post_rules)
    }

    /// Direct link and metadata of a MediaFire file page
    pub async fn file_info(&self, url: &str) -> Result<MediaFireFile, ScraperError> {
        info!(%url, "Fetching MediaFire file info");

        let page = self.fetcher.fetch(&FetchRequest::get(url)).await?;
        parse_mediafire(&page.body, &self.mediafire_rules)
    }
}
