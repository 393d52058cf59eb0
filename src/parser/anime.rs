//! Anime page extraction
//!
//! Rule sets for the listing, detail, episode-range and episode pages, and the
//! pure functions that turn fetched HTML into result records.

use scraper::{ElementRef, Html};
use url::Url;

use super::{each, selector, split_nth, Field, Rule};
use crate::constants::endpoints;
use crate::models::{
    AnimeDetail, AnimeSummary, Episode, EpisodeServer, MediaFormat, MediaStatus, SearchResult,
    SubOrDub,
};
use crate::scraper::ScraperError;

/// Selectors for the search/filter listing
#[derive(Debug, Clone)]
pub struct SearchRules {
    pub item: &'static str,
    /// Currently selected page marker in the pagination bar
    pub selected_page: &'static str,
    pub title: Rule,
    pub link: Rule,
    pub image: Rule,
    pub released: Rule,
}

impl Default for SearchRules {
    fn default() -> Self {
        Self {
            item: "div.last_episodes > ul > li",
            selected_page: "div.anime_name.new_series > div > div > ul > li.selected",
            title: Rule::Text("p.name > a"),
            link: Rule::Attr("p.name > a", "href"),
            image: Rule::Attr("div > a > img", "src"),
            released: Rule::Text("p.released"),
        }
    }
}

/// Selectors for the show detail page
#[derive(Debug, Clone)]
pub struct DetailRules {
    pub title: Rule,
    pub image: Rule,
    pub released: Rule,
    pub description: Rule,
    pub media_format: Rule,
    pub status: Rule,
    pub other_name: Rule,
    pub genres: Rule,
    pub ep_start: Rule,
    pub ep_end: Rule,
    pub show_id: Rule,
    pub alias: Rule,
}

impl Default for DetailRules {
    fn default() -> Self {
        Self {
            title: Rule::Text(
                "section.content_left > div.main_body > div:nth-child(2) > div.anime_info_body_bg > h1",
            ),
            image: Rule::Attr("div.anime_info_body_bg > img", "src"),
            released: Rule::Text("div.anime_info_body_bg > p:nth-child(8)"),
            description: Rule::Text("div.anime_info_body_bg > div:nth-child(6)"),
            media_format: Rule::Text("div.anime_info_body_bg > p:nth-child(4) > a"),
            status: Rule::Text("div.anime_info_body_bg > p:nth-child(9) > a"),
            other_name: Rule::Text(".other-name a"),
            genres: Rule::Attr("div.anime_info_body_bg > p:nth-child(7) > a", "title"),
            ep_start: Rule::Attr("#episode_page > li a", "ep_start"),
            ep_end: Rule::Attr("#episode_page > li a", "ep_end"),
            show_id: Rule::Attr("#movie_id", "value"),
            alias: Rule::Attr("#alias_anime", "value"),
        }
    }
}

/// Selectors for the episode-range endpoint
#[derive(Debug, Clone)]
pub struct EpisodeListRules {
    pub item: &'static str,
    pub link: Rule,
    pub number: Rule,
}

impl Default for EpisodeListRules {
    fn default() -> Self {
        Self {
            item: "#episode_related > li",
            link: Rule::Attr("a", "href"),
            number: Rule::Text("div.name"),
        }
    }
}

/// Selectors for an episode's server list
#[derive(Debug, Clone)]
pub struct ServerRules {
    pub item: &'static str,
    pub name: Rule,
    pub video: Rule,
    /// Call-to-action text appended to every server name
    pub cta_suffix: &'static str,
}

impl Default for ServerRules {
    fn default() -> Self {
        Self {
            item: "div.anime_video_body > div.anime_muti_link > ul > li",
            name: Rule::Text("a"),
            video: Rule::Attr("a", "data-video"),
            cta_suffix: "Choose this server",
        }
    }
}

/// Every rule set the anime pipeline uses
#[derive(Debug, Clone, Default)]
pub struct AnimeRules {
    pub search: SearchRules,
    pub detail: DetailRules,
    pub episodes: EpisodeListRules,
    pub servers: ServerRules,
}

/// Parameters of the episode-range sub-fetch, read off the detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeRange {
    pub ep_start: String,
    pub ep_end: String,
    pub show_id: String,
    pub alias: String,
}

/// A parsed detail page: the show (without episodes) and where to get them
#[derive(Debug, Clone, PartialEq)]
pub struct DetailPage {
    pub detail: AnimeDetail,
    pub episode_range: EpisodeRange,
}

/// Parse the search listing
///
/// # Arguments
/// * `html` - The HTML content to parse
/// * `base_url` - Prepended to relative detail links
/// * `page` - Echoed back as `current_page`
pub fn parse_search_page(
    html: &str,
    rules: &SearchRules,
    base_url: &str,
    page: u32,
) -> Result<SearchResult, ScraperError> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let item = selector(rules.item)?;
    let selected_page = selector(rules.selected_page)?;
    let title_field = Field::compile(rules.title)?;
    let link_field = Field::compile(rules.link)?;
    let image_field = Field::compile(rules.image)?;
    let released_field = Field::compile(rules.released)?;

    let has_next_page = root
        .select(&selected_page)
        .next()
        .map(has_next_sibling_element)
        .unwrap_or(false);

    let results = each(root, &item, |li| {
        let href = link_field.first(li);
        let title = title_field.first(li);
        let released = released_field.first(li);

        Ok(AnimeSummary {
            id: split_nth(&href, "/", 2, "anime id")?.to_string(),
            url: format!("{}{}", base_url, href),
            image: image_field.first(li),
            release_date: split_nth(&released, "Released: ", 1, "release date")?
                .trim()
                .to_string(),
            sub_or_dub: SubOrDub::from_title(&title),
            title,
        })
    })?;

    Ok(SearchResult {
        current_page: page,
        has_next_page,
        results,
    })
}

fn has_next_sibling_element(el: ElementRef<'_>) -> bool {
    el.next_siblings().any(|node| node.value().is_element())
}

/// Parse a show detail page fetched from `page_url`
pub fn parse_detail_page(
    html: &str,
    rules: &DetailRules,
    page_url: &str,
) -> Result<DetailPage, ScraperError> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let title = Field::compile(rules.title)?.first(root);
    let released = Field::compile(rules.released)?.first(root);
    let description = Field::compile(rules.description)?.first(root);
    let status = Field::compile(rules.status)?.first(root);
    let media_format = Field::compile(rules.media_format)?.first(root);

    let path = Url::parse(page_url)
        .map(|url| url.path().to_string())
        .map_err(|_| ScraperError::missing("anime id", page_url))?;
    let id = split_nth(&path, "/", 2, "anime id")?.to_string();

    let detail = AnimeDetail {
        id,
        url: page_url.to_string(),
        image: Field::compile(rules.image)?.first(root),
        release_date: split_nth(&released, "Released: ", 1, "release date")?
            .trim()
            .to_string(),
        description: description
            .strip_prefix("Plot Summary:")
            .unwrap_or(&description)
            .trim()
            .to_string(),
        sub_or_dub: SubOrDub::from_title(&title),
        media_format: MediaFormat::from_label(&media_format),
        status: MediaStatus::from_source(&status),
        other_name: Field::compile(rules.other_name)?.first(root),
        genres: Field::compile(rules.genres)?.all(root),
        total_episodes: 0,
        episodes: Vec::new(),
        title,
    };

    let episode_range = EpisodeRange {
        ep_start: Field::compile(rules.ep_start)?.first(root),
        ep_end: Field::compile(rules.ep_end)?.last(root),
        show_id: Field::compile(rules.show_id)?.first(root),
        alias: Field::compile(rules.alias)?.first(root),
    };

    Ok(DetailPage {
        detail,
        episode_range,
    })
}

/// Parse the episode-range listing.
///
/// The source lists newest first; the result is ascending by number.
pub fn parse_episode_list(
    html: &str,
    rules: &EpisodeListRules,
    base_url: &str,
) -> Result<Vec<Episode>, ScraperError> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let item = selector(rules.item)?;
    let link_field = Field::compile(rules.link)?;
    let number_field = Field::compile(rules.number)?;

    let mut episodes = each(root, &item, |li| {
        let href = link_field.first(li);
        let id = split_nth(href.trim(), "/", 1, "episode id")?.to_string();

        Ok(Episode {
            url: endpoints::anime_episode(base_url, &id),
            number: parse_episode_number(&number_field.first(li)),
            id,
        })
    })?;

    episodes.reverse();
    // Stable: entries already ascending keep their relative order.
    episodes.sort_by(|a, b| a.number.total_cmp(&b.number));

    Ok(episodes)
}

/// Parse the server list of an episode page fetched from `page_url`
pub fn parse_server_list(
    html: &str,
    rules: &ServerRules,
    page_url: &str,
) -> Result<Vec<EpisodeServer>, ScraperError> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let item = selector(rules.item)?;
    let name_field = Field::compile(rules.name)?;
    let video_field = Field::compile(rules.video)?;

    let servers = each(root, &item, |li| {
        let video = video_field.first(li);
        if video.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(EpisodeServer {
            name: name_field.first(li).replacen(rules.cta_suffix, "", 1).trim().to_string(),
            url: absolute_url(video.trim(), page_url),
        }))
    })?;

    Ok(servers.into_iter().flatten().collect())
}

/// Parse an episode label such as "EP 12.5"; unparsable text yields 0.0
pub fn parse_episode_number(text: &str) -> f64 {
    let text = text.trim();
    let number: String = text
        .strip_prefix("EP ")
        .unwrap_or(text)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    number
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Make a link scheme-qualified: `//host/x` becomes `https://host/x`, and
/// relative paths are resolved against the page they came from.
pub fn absolute_url(link: &str, page_url: &str) -> String {
    if link.starts_with("//") {
        return format!("https:{}", link);
    }
    if link.starts_with("http://") || link.starts_with("https://") {
        return link.to_string();
    }

    Url::parse(page_url)
        .and_then(|base| base.join(link))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| format!("https:{}", link))
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn property_episode_number_roundtrips_integers(n in 0u32..100_000) {
            prop_assert_eq!(parse_episode_number(&format!("EP {}", n)), f64::from(n));
        }

        #[test]
        fn property_episode_number_halves(n in 0u32..10_000) {
            let text = format!("EP {}.5", n);
            prop_assert_eq!(parse_episode_number(&text), f64::from(n) + 0.5);
        }

        #[test]
        fn property_episode_number_never_fails(text in "\\PC{0,30}") {
            let number = parse_episode_number(&text);
            prop_assert!(number.is_finite());
        }

        #[test]
        fn property_dub_marker_wins(prefix in "[a-zA-Z ]{0,20}", suffix in "[a-zA-Z ]{0,20}") {
            let title = format!("{}(DuB){}", prefix, suffix);
            prop_assert_eq!(SubOrDub::from_title(&title), SubOrDub::Dub);
        }

        #[test]
        fn property_no_marker_is_sub(title in "[a-zA-Z0-9 ]{0,40}") {
            prop_assert_eq!(SubOrDub::from_title(&title), SubOrDub::Sub);
        }

        #[test]
        fn property_episode_list_ascending(mut numbers in prop::collection::vec(0u32..2_000, 0..30)) {
            numbers.sort_unstable();
            numbers.dedup();
            let items: String = numbers
                .iter()
                .rev()
                .map(|n| format!(r#"<li><a href="/ep-{0}"><div class="name">EP {0}</div></a></li>"#, n))
                .collect();
            let html = format!(r#"<ul id="episode_related">{}</ul>"#, items);

            let episodes = parse_episode_list(&html, &EpisodeListRules::default(), "https://a.example").unwrap();
            let parsed: Vec<u32> = episodes.iter().map(|e| e.number as u32).collect();
            prop_assert_eq!(parsed, numbers);
        }
    }
}
