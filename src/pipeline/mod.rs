//! Pipelines composing fetches and extractions into result records
//!
//! Every pipeline owns a clone of the shared [`Fetcher`](crate::scraper::Fetcher)
//! and the configured source URLs. Parsed documents never outlive the
//! synchronous parse call, so pipeline futures stay `Send`.

pub mod anime;
pub mod manga;
pub mod social;

pub use anime::AnimePipeline;
pub use manga::{MangaPipeline, QueryError};
pub use social::SocialPipeline;
