//! Constants module for the media scraper API
//!
//! Endpoint URL builders parameterised by the configured base URLs, plus the
//! fixed strings and bounds the pipelines rely on.

/// URL builder functions for all upstream endpoints
pub mod endpoints {
    use url::Url;

    /// Anime filter/search page
    pub fn anime_search(base_url: &str, query: &str, page: u32) -> String {
        with_params(
            &format!("{}/filter.html", base_url),
            &[("keyword", query.to_string()), ("page", page.to_string())],
        )
    }

    /// Anime detail page for a slug
    pub fn anime_category(base_url: &str, slug: &str) -> String {
        format!("{}/category/{}", base_url, urlencoding::encode(slug))
    }

    /// Episode page for an episode slug
    pub fn anime_episode(base_url: &str, slug: &str) -> String {
        format!("{}/{}", base_url, slug.trim_start_matches('/'))
    }

    /// Episode-range listing endpoint
    pub fn episode_range(
        ajax_url: &str,
        ep_start: &str,
        ep_end: &str,
        show_id: &str,
        alias: &str,
    ) -> String {
        with_params(
            &format!("{}/load-list-episode", ajax_url),
            &[
                ("ep_start", ep_start.to_string()),
                ("ep_end", ep_end.to_string()),
                ("id", show_id.to_string()),
                ("default_ep", super::DEFAULT_EPISODE_OFFSET.to_string()),
                ("alias", alias.to_string()),
            ],
        )
    }

    /// Manga search API, ordered by descending relevance
    pub fn manga_search(api_url: &str, query: &str, limit: i32, offset: i64) -> String {
        with_params(
            &format!("{}/manga", api_url),
            &[
                ("limit", limit.to_string()),
                ("title", query.to_string()),
                ("offset", offset.to_string()),
                ("order[relevance]", "desc".to_string()),
            ],
        )
    }

    /// Cover lookup API
    pub fn manga_cover(api_url: &str, cover_id: &str) -> String {
        format!("{}/cover/{}", api_url, urlencoding::encode(cover_id))
    }

    /// Public cover image on the manga CDN
    pub fn manga_cover_image(site_url: &str, manga_id: &str, filename: &str) -> String {
        format!("{}/covers/{}/{}", site_url, manga_id, filename)
    }

    fn with_params(base: &str, params: &[(&str, String)]) -> String {
        match Url::parse_with_params(base, params) {
            Ok(url) => url.to_string(),
            // Not an absolute URL; encode the query by hand.
            Err(_) => {
                let query = params
                    .iter()
                    .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                    .collect::<Vec<_>>()
                    .join("&");
                format!("{}?{}", base, query)
            }
        }
    }
}

/// Offset passed as `default_ep` to the episode-range endpoint
pub const DEFAULT_EPISODE_OFFSET: u32 = 0;

/// Largest page size the manga API accepts
pub const MANGA_MAX_LIMIT: i32 = 100;

/// Offsets at or beyond this are rejected by the manga API
pub const MANGA_MAX_OFFSET: i64 = 10_000;

/// Page size used when the caller gives none
pub const MANGA_DEFAULT_LIMIT: i32 = 20;

/// Cover resolutions allowed in flight at once
pub const COVER_FETCH_CONCURRENCY: usize = 4;

/// Fixed language parameter sent with the social download form
pub const SOCIAL_LANGUAGE_ID: &str = "1";

#[cfg(test)]
mod tests {
    use super::endpoints;

    #[test]
    fn test_anime_search_encodes_query() {
        let url = endpoints::anime_search("https://anitaku.pe", "one piece", 2);
        assert_eq!(url, "https://anitaku.pe/filter.html?keyword=one+piece&page=2");
    }

    #[test]
    fn test_anime_category() {
        assert_eq!(
            endpoints::anime_category("https://anitaku.pe", "naruto"),
            "https://anitaku.pe/category/naruto"
        );
    }

    #[test]
    fn test_episode_range_params() {
        let url = endpoints::episode_range("https://ajax.example/ajax", "0", "220", "42", "naruto");
        assert_eq!(
            url,
            "https://ajax.example/ajax/load-list-episode?ep_start=0&ep_end=220&id=42&default_ep=0&alias=naruto"
        );
    }

    #[test]
    fn test_manga_search_params() {
        let url = endpoints::manga_search("https://api.mangadex.org", "berserk", 20, 40);
        assert!(url.starts_with("https://api.mangadex.org/manga?"));
        assert!(url.contains("limit=20"));
        assert!(url.contains("title=berserk"));
        assert!(url.contains("offset=40"));
        assert!(url.contains("order%5Brelevance%5D=desc"));
    }

    #[test]
    fn test_manga_cover_image() {
        assert_eq!(
            endpoints::manga_cover_image("https://mangadex.org", "abc", "cover.jpg"),
            "https://mangadex.org/covers/abc/cover.jpg"
        );
    }
}
