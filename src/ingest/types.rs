// src/ingest/types.rs
use anyhow::Result;

/// One raw entry as parsed from an RSS/Atom document, before normalization.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub summary: String,
    pub link: String,
    /// Raw publication timestamp as it appeared in the feed, if any.
    pub published: Option<String>,
}

/// A scored news item. Immutable after scoring; only its URL survives a run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct NewsItem {
    pub title: String,
    /// HTML-stripped, truncated to 200 chars.
    pub summary: String,
    /// Unique key for cross-run deduplication.
    pub link: String,
    /// Heuristic ranking in [0, 10].
    pub importance_score: f32,
}

#[async_trait::async_trait]
pub trait NewsSource: Send + Sync {
    /// Fetch and parse the latest entries. Exhausted retries surface as an
    /// empty list, never as an error that aborts the run.
    async fn fetch_entries(&self) -> Result<Vec<FeedEntry>>;
    /// The feed URL; also the key into the source weight table.
    fn url(&self) -> &str;
}
