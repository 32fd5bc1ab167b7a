// src/ingest/mod.rs
pub mod feeds;
pub mod fetcher;
pub mod rss;
pub mod types;

use std::cmp::Ordering;

use metrics::counter;
use once_cell::sync::OnceCell;

use crate::cache::ProcessedUrls;
use crate::classify::KeywordConfig;
use crate::score::{importance_score, ScoreKeywords};
use crate::source_weights::SourceWeightsConfig;
use types::{NewsItem, NewsSource};

/// Entries considered per feed; the rest of a busy feed is ignored.
pub const MAX_ENTRIES_PER_FEED: usize = 5;

/// Summary truncation length in chars.
pub const SUMMARY_MAX_CHARS: usize = 200;

/// Strip HTML and collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

/// Cap the summary at `SUMMARY_MAX_CHARS` chars, marking the cut.
pub fn truncate_summary(s: &str) -> String {
    if s.chars().count() > SUMMARY_MAX_CHARS {
        let mut t: String = s.chars().take(SUMMARY_MAX_CHARS).collect();
        t.push_str("...");
        t
    } else {
        s.to_string()
    }
}

/// Fetch every source in sequence and turn entries into scored, deduplicated
/// `NewsItem`s, sorted by importance descending (discovery order breaks
/// ties). Kept items' URLs are added to `processed`; the caller persists it.
pub async fn collect_items(
    sources: &[Box<dyn NewsSource>],
    weights: &SourceWeightsConfig,
    keywords: &KeywordConfig,
    score_keywords: &ScoreKeywords,
    processed: &mut ProcessedUrls,
    now_unix: i64,
) -> Vec<NewsItem> {
    let mut all_news: Vec<NewsItem> = Vec::new();
    let mut seen_titles: std::collections::HashSet<String> = std::collections::HashSet::new();
    let mut filtered_out = 0usize;
    let mut dedup_out = 0usize;

    for source in sources {
        let entries = match source.fetch_entries().await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(url = source.url(), error = ?e, "source error");
                counter!("ingest_provider_errors_total").increment(1);
                continue;
            }
        };

        let weight = weights.weight_for(source.url());

        for entry in entries.into_iter().take(MAX_ENTRIES_PER_FEED) {
            let title = normalize_text(&entry.title);
            if title.is_empty() || entry.link.is_empty() {
                filtered_out += 1;
                continue;
            }
            if processed.contains(&entry.link) || !seen_titles.insert(title.clone()) {
                dedup_out += 1;
                continue;
            }

            let summary = truncate_summary(&normalize_text(&entry.summary));

            let class = keywords.classify(&title, &summary);
            if class.is_boring {
                filtered_out += 1;
                continue;
            }

            let published_unix = entry
                .published
                .as_deref()
                .and_then(rss::parse_published_unix);

            let score = importance_score(
                score_keywords,
                &title,
                &summary,
                weight,
                published_unix,
                now_unix,
                &class,
            );

            all_news.push(NewsItem {
                title,
                summary,
                link: entry.link,
                importance_score: score,
            });
        }
    }

    // Stable sort keeps discovery order for equal scores.
    all_news.sort_by(|a, b| {
        b.importance_score
            .partial_cmp(&a.importance_score)
            .unwrap_or(Ordering::Equal)
    });

    for item in &all_news {
        processed.insert(item.link.clone(), now_unix.max(0) as u64);
    }

    counter!("ingest_kept_total").increment(all_news.len() as u64);
    counter!("ingest_filtered_total").increment(filtered_out as u64);
    counter!("ingest_dedup_total").increment(dedup_out as u64);
    tracing::info!(
        kept = all_news.len(),
        filtered = filtered_out,
        dedup = dedup_out,
        "ingest complete"
    );

    all_news
}
