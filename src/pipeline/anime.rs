//! Anime pipeline: search, show detail with episode list, episode servers

use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::constants::endpoints;
use crate::models::{AnimeDetail, Episode, EpisodeServer, SearchResult};
use crate::parser::anime::{
    parse_detail_page, parse_episode_list, parse_search_page, parse_server_list, AnimeRules,
    DetailPage, EpisodeRange,
};
use crate::scraper::{FetchRequest, Fetcher, ScraperError};

/// Scrapes the anime source
#[derive(Debug, Clone)]
pub struct AnimePipeline {
    fetcher: Fetcher,
    sources: SourceConfig,
    rules: AnimeRules,
}

impl AnimePipeline {
    pub fn new(fetcher: Fetcher, sources: SourceConfig) -> Self {
        Self::with_rules(fetcher, sources, AnimeRules::default())
    }

    /// Use a custom rule set, e.g. after the source changed its layout
    pub fn with_rules(fetcher: Fetcher, sources: SourceConfig, rules: AnimeRules) -> Self {
        Self {
            fetcher,
            sources,
            rules,
        }
    }

    /// Search shows by keyword
    pub async fn search(&self, query: &str, page: u32) -> Result<SearchResult, ScraperError> {
        let url = endpoints::anime_search(&self.sources.anime_base_url, query, page);
        info!(query, page, "Searching anime");

        let page_doc = self.fetcher.fetch(&FetchRequest::get(url)).await?;
        let result = parse_search_page(
            &page_doc.body,
            &self.rules.search,
            &self.sources.anime_base_url,
            page,
        )?;

        debug!(
            results = result.results.len(),
            has_next_page = result.has_next_page,
            "Parsed anime search page"
        );
        Ok(result)
    }

    /// Show detail including its full episode list.
    ///
    /// `id` is either a slug or a full detail page URL. Both hops must
    /// succeed; an episode-list failure fails the whole call.
    pub async fn info(&self, id: &str) -> Result<AnimeDetail, ScraperError> {
        let url = detail_url(&self.sources.anime_base_url, id);
        info!(%url, "Fetching anime info");

        let page = self.fetcher.fetch(&FetchRequest::get(url)).await?;
        let DetailPage {
            mut detail,
            episode_range,
        } = parse_detail_page(&page.body, &self.rules.detail, &page.url)?;

        // The show exists; a missing episode list is the source's fault.
        let episodes = self
            .fetch_episode_range(&episode_range)
            .await
            .map_err(|e| match e {
                ScraperError::HttpError(404) => {
                    ScraperError::UpstreamError("episode list not found".to_string())
                }
                e => e,
            })?;
        detail.total_episodes = episodes.len();
        detail.episodes = episodes;

        Ok(detail)
    }

    /// Episodes of a show, ascending by number
    pub async fn fetch_episode_range(
        &self,
        range: &EpisodeRange,
    ) -> Result<Vec<Episode>, ScraperError> {
        let url = endpoints::episode_range(
            &self.sources.anime_ajax_url,
            &range.ep_start,
            &range.ep_end,
            &range.show_id,
            &range.alias,
        );
        debug!(show_id = %range.show_id, alias = %range.alias, "Fetching episode range");

        let page = self.fetcher.fetch(&FetchRequest::get(url)).await?;
        parse_episode_list(
            &page.body,
            &self.rules.episodes,
            &self.sources.anime_base_url,
        )
    }

    /// Streaming servers of one episode
    pub async fn downloads(&self, id: &str) -> Result<Vec<EpisodeServer>, ScraperError> {
        let url = episode_url(&self.sources.anime_base_url, id);
        info!(%url, "Fetching episode servers");

        let page = self.fetcher.fetch(&FetchRequest::get(url)).await?;
        let servers = parse_server_list(&page.body, &self.rules.servers, &page.url)?;

        debug!(servers = servers.len(), "Parsed episode servers");
        Ok(servers)
    }
}

fn is_absolute(id: &str) -> bool {
    id.starts_with("http://") || id.starts_with("https://")
}

/// Detail page URL for a slug, or the id itself when it is already a URL
pub fn detail_url(base_url: &str, id: &str) -> String {
    if is_absolute(id) {
        id.to_string()
    } else {
        endpoints::anime_category(base_url, id)
    }
}

/// Episode page URL for a slug, or the id itself when it is already a URL
pub fn episode_url(base_url: &str, id: &str) -> String {
    if id.starts_with(base_url) || is_absolute(id) {
        id.to_string()
    } else {
        endpoints::anime_episode(base_url, id)
    }
}
