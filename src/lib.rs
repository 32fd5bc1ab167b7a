//! news-digest-bot: poll RSS feeds, score and dedupe items, summarize the
//! survivors through a chat-completion model, and deliver the result as a
//! Feishu card.

pub mod analyze;
pub mod cache;
pub mod classify;
pub mod config;
pub mod ingest;
pub mod notify;
pub mod pipeline;
pub mod prices;
pub mod retry;
pub mod score;
pub mod source_weights;

pub use config::AppConfig;
pub use ingest::types::{FeedEntry, NewsItem, NewsSource};
pub use pipeline::Pipeline;
