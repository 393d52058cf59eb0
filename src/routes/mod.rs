//! API Routes module for the Media Scraper API
//!
//! Thin handlers: validate query parameters, call one pipeline operation and
//! wrap the result in the JSON envelope. Server errors are logged and, when
//! configured, reported by email without delaying the response.

use std::backtrace::Backtrace;

use actix_web::{web, HttpRequest, HttpResponse, Responder, ResponseError};
use serde::Deserialize;
use tracing::{error, info, warn};
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::config::Config;
use crate::constants::MANGA_DEFAULT_LIMIT;
use crate::email::{EmailService, ErrorReport};
use crate::error::AppError;
use crate::models::{
    AnimeDetail, AnimeSummary, ApiError, ApiResponse, Episode, EpisodeServer, MangaSearchResults,
    MangaSummary, MediaFireFile, MediaFormat, MediaStatus, SearchResult, ServiceStatus,
    SocialMediaPost, SubOrDub,
};
use crate::pipeline::{AnimePipeline, MangaPipeline, SocialPipeline};
use crate::scraper::{Fetcher, ScraperError};

/// Application state shared across handlers
pub struct AppState {
    pub anime: AnimePipeline,
    pub manga: MangaPipeline,
    pub social: SocialPipeline,
    pub notifier: Option<EmailService>,
}

impl AppState {
    /// Build every pipeline over one shared HTTP client
    pub fn from_config(config: &Config) -> Result<Self, ScraperError> {
        let fetcher = Fetcher::new(config.sources.request_timeout)?;
        let notifier =
            EmailService::from_parts(config.smtp.clone(), config.notify_email.clone()).ok();

        Ok(Self {
            anime: AnimePipeline::new(fetcher.clone(), config.sources.clone()),
            manga: MangaPipeline::new(fetcher.clone(), config.sources.clone()),
            social: SocialPipeline::new(fetcher, config.sources.clone()),
            notifier,
        })
    }

    /// Turn a failed call into its response, reporting server errors
    fn fail(&self, req: &HttpRequest, err: AppError) -> HttpResponse {
        if err.is_server_error() {
            error!(method = %req.method(), url = %req.uri(), "Request failed: {}", err);
            self.notify(req, &err);
        } else {
            warn!(method = %req.method(), url = %req.uri(), "Request rejected: {}", err);
        }

        err.error_response()
    }

    fn notify(&self, req: &HttpRequest, err: &AppError) {
        let Some(notifier) = self.notifier.clone() else {
            return;
        };

        let report = error_report(req, err);

        actix_rt::spawn(async move {
            if let Err(e) = notifier.send_error_notification(&report).await {
                warn!("Failed to send error notification: {}", e);
            }
        });
    }
}

/// Report for a failed request; the trace is the reporting handler's stack
fn error_report(req: &HttpRequest, err: &AppError) -> ErrorReport {
    ErrorReport {
        method: req.method().to_string(),
        url: req.uri().to_string(),
        message: err.to_string(),
        trace: Backtrace::force_capture().to_string(),
    }
}

/// An upstream 404 on the page an id addresses means the id does not exist
fn lookup_error(err: ScraperError, what: &str) -> AppError {
    match err {
        ScraperError::HttpError(404) => AppError::not_found(format!("{} not found", what)),
        err => err.into(),
    }
}

/// Trimmed value of a required parameter, or a validation error
fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim()),
        _ => Err(AppError::validation(format!("{} is required", name))),
    }
}

/// GET /status - Service status
#[utoipa::path(
    get,
    path = "/status",
    tag = "status",
    responses(
        (status = 200, description = "Service is running", body = ServiceStatus)
    )
)]
pub async fn get_status() -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::new(ServiceStatus {
        status: "OK".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// Query parameters for anime search
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AnimeSearchQuery {
    /// Search keyword
    pub query: Option<String>,
    /// Page number (default: 1)
    pub page: Option<u32>,
}

/// GET /anime/search - Search anime by keyword
#[utoipa::path(
    get,
    path = "/anime/search",
    tag = "anime",
    params(AnimeSearchQuery),
    responses(
        (status = 200, description = "Search results retrieved successfully", body = SearchResult),
        (status = 400, description = "Bad request - query is required", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn anime_search(
    req: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<AnimeSearchQuery>,
) -> impl Responder {
    let keyword = match required(&query.query, "query") {
        Ok(k) => k,
        Err(e) => return data.fail(&req, e),
    };

    let page = query.page.unwrap_or(1);
    if page == 0 {
        return data.fail(&req, AppError::validation("page number must be greater than 0"));
    }

    info!("Searching for anime: {}", keyword);
    match data.anime.search(keyword, page).await {
        Ok(result) => HttpResponse::Ok().json(ApiResponse::new(result)),
        Err(e) => data.fail(&req, e.into()),
    }
}

/// Query parameters for endpoints addressing one show or episode
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct IdQuery {
    /// Slug or full URL
    pub id: Option<String>,
}

/// GET /anime/info - Show detail with its episode list
#[utoipa::path(
    get,
    path = "/anime/info",
    tag = "anime",
    params(IdQuery),
    responses(
        (status = 200, description = "Anime detail retrieved successfully", body = AnimeDetail),
        (status = 400, description = "Bad request - id is required", body = ApiError),
        (status = 404, description = "Anime not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn anime_info(
    req: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<IdQuery>,
) -> impl Responder {
    let id = match required(&query.id, "id") {
        Ok(id) => id,
        Err(e) => return data.fail(&req, e),
    };

    info!("Getting anime info: {}", id);
    match data.anime.info(id).await {
        Ok(detail) => HttpResponse::Ok().json(ApiResponse::new(detail)),
        Err(e) => data.fail(&req, lookup_error(e, "Anime")),
    }
}

/// GET /anime/download - Streaming servers of an episode
#[utoipa::path(
    get,
    path = "/anime/download",
    tag = "anime",
    params(IdQuery),
    responses(
        (status = 200, description = "Episode servers retrieved successfully", body = Vec<EpisodeServer>),
        (status = 400, description = "Bad request - id is required", body = ApiError),
        (status = 404, description = "Episode not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn anime_download(
    req: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<IdQuery>,
) -> impl Responder {
    let id = match required(&query.id, "id") {
        Ok(id) => id,
        Err(e) => return data.fail(&req, e),
    };

    info!("Getting episode servers: {}", id);
    match data.anime.downloads(id).await {
        Ok(servers) => HttpResponse::Ok().json(ApiResponse::new(servers)),
        Err(e) => data.fail(&req, lookup_error(e, "Episode")),
    }
}

/// Query parameters for manga search
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct MangaSearchQuery {
    /// Title to search for
    pub query: Option<String>,
    /// Page number (default: 1)
    pub page: Option<i32>,
    /// Results per page, at most 100 (default: 20)
    pub limit: Option<i32>,
}

/// GET /manga/search - Search manga by title
#[utoipa::path(
    get,
    path = "/manga/search",
    tag = "manga",
    params(MangaSearchQuery),
    responses(
        (status = 200, description = "Search results retrieved successfully", body = MangaSearchResults),
        (status = 400, description = "Bad request - missing query or pagination out of range", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn manga_search(
    req: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<MangaSearchQuery>,
) -> impl Responder {
    let title = match required(&query.query, "query") {
        Ok(t) => t,
        Err(e) => return data.fail(&req, e),
    };

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(MANGA_DEFAULT_LIMIT);

    info!("Searching for manga: {}", title);
    match data.manga.search(title, page, limit).await {
        Ok(results) => HttpResponse::Ok().json(ApiResponse::new(results)),
        Err(e) => data.fail(&req, e.into()),
    }
}

/// Query parameters for the downloaders
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct UrlQuery {
    /// Page URL to extract from
    pub url: Option<String>,
}

/// GET /downloader/mediafire - Direct link of a MediaFire file
#[utoipa::path(
    get,
    path = "/downloader/mediafire",
    tag = "downloader",
    params(UrlQuery),
    responses(
        (status = 200, description = "File info retrieved successfully", body = MediaFireFile),
        (status = 400, description = "Bad request - url is required", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn mediafire(
    req: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<UrlQuery>,
) -> impl Responder {
    let url = match required(&query.url, "url") {
        Ok(u) => u,
        Err(e) => return data.fail(&req, e),
    };

    match data.social.file_info(url).await {
        Ok(file) => HttpResponse::Ok().json(ApiResponse::new(file)),
        Err(e) => data.fail(&req, e.into()),
    }
}

/// GET /downloader/tiktok - Profile, counters and download links of a post
#[utoipa::path(
    get,
    path = "/downloader/tiktok",
    tag = "downloader",
    params(UrlQuery),
    responses(
        (status = 200, description = "Post retrieved successfully", body = SocialMediaPost),
        (status = 400, description = "Bad request - url is required", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn tiktok(
    req: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<UrlQuery>,
) -> impl Responder {
    let url = match required(&query.url, "url") {
        Ok(u) => u,
        Err(e) => return data.fail(&req, e),
    };

    match data.social.extract_post(url).await {
        Ok(post) => HttpResponse::Ok().json(ApiResponse::new(post)),
        Err(e) => data.fail(&req, e.into()),
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Media Scraper API",
        version = "0.1.0",
        description = "Structured data scraped from anime, manga, social and file-sharing sites",
        license(
            name = "MIT"
        )
    ),
    paths(
        get_status,
        anime_search,
        anime_info,
        anime_download,
        manga_search,
        mediafire,
        tiktok
    ),
    components(
        schemas(
            ServiceStatus,
            SearchResult,
            AnimeSummary,
            AnimeDetail,
            Episode,
            EpisodeServer,
            SubOrDub,
            MediaFormat,
            MediaStatus,
            MangaSearchResults,
            MangaSummary,
            MediaFireFile,
            SocialMediaPost,
            ApiError,
            AnimeSearchQuery,
            IdQuery,
            MangaSearchQuery,
            UrlQuery
        )
    ),
    tags(
        (name = "status", description = "Service status"),
        (name = "anime", description = "Anime search, detail and episode servers"),
        (name = "manga", description = "Manga search"),
        (name = "downloader", description = "Social post and file-host downloaders")
    )
)]
pub struct ApiDoc;

/// Configure API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::validation(err.to_string()).into()),
    )
    .route("/status", web::get().to(get_status))
    .service(
        web::scope("/anime")
            .route("/search", web::get().to(anime_search))
            .route("/info", web::get().to(anime_info))
            .route("/download", web::get().to(anime_download)),
    )
    .route("/manga/search", web::get().to(manga_search))
    .service(
        web::scope("/downloader")
            .route("/mediafire", web::get().to(mediafire))
            .route("/tiktok", web::get().to(tiktok)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceConfig;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn state_for(base: &str) -> web::Data<AppState> {
        let sources = SourceConfig {
            anime_base_url: base.to_string(),
            anime_ajax_url: format!("{}/ajax", base),
            manga_site_url: base.to_string(),
            manga_api_url: base.to_string(),
            social_download_url: format!("{}/download", base),
            ..SourceConfig::default()
        };
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            sources,
            smtp: None,
            notify_email: None,
        };
        web::Data::new(AppState::from_config(&config).unwrap())
    }

    /// Sources nothing listens on; any request that reaches the network fails
    fn offline_state() -> web::Data<AppState> {
        state_for("http://127.0.0.1:9")
    }

    #[::core::prelude::v1::test]
    fn test_required_param() {
        assert_eq!(required(&Some("  naruto ".to_string()), "id").unwrap(), "naruto");
        assert!(required(&Some("   ".to_string()), "id").is_err());
        assert!(required(&None, "id").is_err());
    }

    #[actix_rt::test]
    async fn test_status() {
        let app = test::init_service(
            App::new()
                .app_data(offline_state())
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/status").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_rt::test]
    async fn test_missing_params_are_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(offline_state())
                .configure(configure_routes),
        )
        .await;

        for uri in [
            "/anime/search",
            "/anime/search?query=%20%20",
            "/anime/info",
            "/anime/download?id=",
            "/manga/search",
            "/downloader/mediafire",
            "/downloader/tiktok?url=",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
        }
    }

    #[actix_rt::test]
    async fn test_manga_pagination_rejected_before_fetch() {
        let app = test::init_service(
            App::new()
                .app_data(offline_state())
                .configure(configure_routes),
        )
        .await;

        for uri in [
            "/manga/search?query=berserk&page=0",
            "/manga/search?query=berserk&limit=101",
            "/manga/search?query=berserk&page=501&limit=20",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp: ApiError = test::call_and_read_body_json(&app, req).await;
            assert!(!resp.success, "{}", uri);
        }

        let req = test::TestRequest::get()
            .uri("/manga/search?query=berserk&page=0")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn test_malformed_query_is_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(offline_state())
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/manga/search?query=berserk&page=abc")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn test_unreachable_upstream_is_server_error() {
        let app = test::init_service(
            App::new()
                .app_data(offline_state())
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/anime/search?query=naruto")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[::core::prelude::v1::test]
    fn test_lookup_error_maps_only_404() {
        let err = lookup_error(ScraperError::HttpError(404), "Anime");
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Anime not found"));

        let err = lookup_error(ScraperError::HttpError(503), "Anime");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_rt::test]
    async fn test_missing_show_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/category/nothing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let app = test::init_service(
            App::new()
                .app_data(state_for(&server.uri()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/anime/info?id=nothing")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri("/anime/download?id=nothing-episode-1")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn test_missing_cover_is_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/manga"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": "ok",
                "data": [{
                    "id": "abc",
                    "attributes": { "title": { "en": "Berserk" } },
                    "relationships": [{ "id": "gone", "type": "cover_art" }]
                }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cover/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let app = test::init_service(
            App::new()
                .app_data(state_for(&server.uri()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/manga/search?query=berserk")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[::core::prelude::v1::test]
    fn test_error_report_describes_request() {
        let req = test::TestRequest::get()
            .uri("/anime/info?id=naruto")
            .to_http_request();
        let err = AppError::from(ScraperError::HttpError(502));

        let report = error_report(&req, &err);
        assert_eq!(report.method, "GET");
        assert_eq!(report.url, "/anime/info?id=naruto");
        assert_eq!(report.message, "Scraping error: Server returned status 502");
        assert!(!report.trace.is_empty());
    }
}
