//! Configuration module for the media scraper API
//!
//! Handles loading environment variables and the upstream source settings
//! every pipeline is constructed with.

use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Upstream base URLs and fetch settings
    pub sources: SourceConfig,
    /// SMTP configuration for error notifications
    pub smtp: Option<SmtpConfig>,
    /// Recipient of server error notifications
    pub notify_email: Option<String>,
}

/// Base URLs of every upstream the pipelines talk to.
///
/// Immutable once built; each pipeline receives its own copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Anime listing/detail site
    pub anime_base_url: String,
    /// Episode-range endpoint host
    pub anime_ajax_url: String,
    /// Manga site, used to compose cover image URLs
    pub manga_site_url: String,
    /// Manga JSON API
    pub manga_api_url: String,
    /// Social media download form endpoint
    pub social_download_url: String,
    /// Total request timeout
    pub request_timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            anime_base_url: "https://anitaku.pe".to_string(),
            anime_ajax_url: "https://ajax.gogocdn.net/ajax".to_string(),
            manga_site_url: "https://mangadex.org".to_string(),
            manga_api_url: "https://api.mangadex.org".to_string(),
            social_download_url: "https://ttsave.app/download".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl SourceConfig {
    /// Load source settings, falling back to the defaults for anything unset
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            anime_base_url: env_url("ANIME_BASE_URL", defaults.anime_base_url),
            anime_ajax_url: env_url("ANIME_AJAX_URL", defaults.anime_ajax_url),
            manga_site_url: env_url("MANGA_SITE_URL", defaults.manga_site_url),
            manga_api_url: env_url("MANGA_API_URL", defaults.manga_api_url),
            social_download_url: env_url("SOCIAL_DOWNLOAD_URL", defaults.social_download_url),
            request_timeout: env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        }
    }
}

/// SMTP configuration for email sending
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP server host
    pub host: String,
    /// SMTP server port
    pub port: u16,
    /// SMTP username
    pub username: String,
    /// SMTP password
    pub password: String,
    /// Sender email address
    pub from_email: String,
    /// Sender name
    pub from_name: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Every variable is optional; a malformed `PORT` falls back to 8080.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        // Load SMTP config if all required vars are present
        let smtp = match (
            env::var("SMTP_HOST").ok(),
            env::var("SMTP_PORT").ok(),
            env::var("SMTP_USERNAME").ok(),
            env::var("SMTP_PASSWORD").ok(),
            env::var("SMTP_FROM_EMAIL").ok(),
        ) {
            (Some(host), Some(port), Some(username), Some(password), Some(from_email)) => {
                Some(SmtpConfig {
                    host,
                    port: port.parse().unwrap_or(587),
                    username,
                    password,
                    from_email,
                    from_name: env::var("SMTP_FROM_NAME")
                        .unwrap_or_else(|_| "Media Scraper".to_string()),
                })
            }
            _ => None,
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            sources: SourceConfig::from_env(),
            smtp,
            notify_email: env::var("NOTIFY_EMAIL").ok().filter(|e| !e.trim().is_empty()),
        }
    }
}

fn env_url(key: &str, default: String) -> String {
    env::var(key)
        .ok()
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sources() {
        let sources = SourceConfig::default();
        assert_eq!(sources.anime_base_url, "https://anitaku.pe");
        assert_eq!(sources.manga_site_url, "https://mangadex.org");
        assert_eq!(sources.manga_api_url, "https://api.mangadex.org");
        assert_eq!(sources.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_env_url_falls_back_when_unset() {
        let value = env_url("MEDIA_SCRAPER_TEST_UNSET_URL", "https://fallback".to_string());
        assert_eq!(value, "https://fallback");
    }
}
