//! # Source Weights
//!
//! Configurable mapping from feed URL to a trust/authority weight in
//! `[0.0, 1.0]`, used as the base term of the importance score.
//!
//! - Loads from JSON config (falls back to the built-in seed on error).
//! - Exact match first, then substring fallback (catches URL variants that
//!   differ only in query parameters), then the default weight.

use serde::Deserialize;
use std::{collections::HashMap, fs, path::Path};

#[derive(Debug, Clone, Deserialize)]
pub struct SourceWeightsConfig {
    /// Weight applied when no match is found.
    #[serde(default = "default_default_weight")]
    pub default_weight: f32,
    /// Explicit weights keyed by feed URL.
    #[serde(default)]
    pub weights: HashMap<String, f32>,
}

fn default_default_weight() -> f32 {
    0.5
}

impl SourceWeightsConfig {
    /// Load configuration from a JSON file.
    /// Falls back to `default_seed()` on error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|_| Self::default_seed()),
            Err(_) => Self::default_seed(),
        }
    }

    /// Default location: `config/source_weights.json`.
    pub fn load_default() -> Self {
        Self::load_from_file("config/source_weights.json")
    }

    pub fn weight_for(&self, url: &str) -> f32 {
        let s = url.trim();

        if let Some(&w) = self.weights.get(s) {
            return clamp01(w);
        }

        for (k, &w) in &self.weights {
            if s.contains(k.as_str()) || k.contains(s) {
                return clamp01(w);
            }
        }

        clamp01(self.default_weight)
    }

    /// Built-in seed: higher weight for wire services and state outlets,
    /// lower for aggregators.
    pub fn default_seed() -> Self {
        let mut weights = HashMap::new();
        for (k, v) in [
            ("https://feeds.bbci.co.uk/news/world/rss.xml", 1.0),
            ("https://rss.nytimes.com/services/xml/rss/nyt/World.xml", 1.0),
            (
                "https://search.cnbc.com/rs/search/combinedcms/view.xml?partnerId=wrss01&id=10000664",
                0.9,
            ),
            ("https://techcrunch.com/feed/", 0.8),
            ("https://finance.yahoo.com/news/rssindex", 0.8),
            ("https://www.coindesk.com/arc/outboundfeeds/rss/", 0.7),
            ("https://oilprice.com/rss/main", 0.7),
            ("https://news.ycombinator.com/rss", 0.7),
            ("https://www.reddit.com/r/worldnews/top/.rss?t=day", 0.6),
            ("https://www.reddit.com/r/videos/top/.rss?t=day", 0.5),
            ("https://www.scmp.com/rss/2/feed", 0.8),
            ("http://arxiv.org/rss/cs.AI", 0.6),
            ("http://news.baidu.com/n?cmd=file&format=rss&tn=rss&sub=0", 0.7),
            ("http://rss.people.com.cn/GB/303140/index.xml", 0.9),
            ("http://www.xinhuanet.com/politics/news_politics.xml", 0.9),
            ("http://www.chinanews.com/rss/scroll-news.xml", 0.7),
            ("https://www.thepaper.cn/rss.jsp", 0.6),
            ("http://www.ce.cn/cysc/jg/zxbd/rss2.xml", 0.7),
            ("https://www.zhihu.com/rss", 0.5),
            ("https://www.36kr.com/feed", 0.6),
            ("https://news.qq.com/rss/channels/finance/rss.xml", 0.7),
            ("https://rss.sina.com.cn/news/china/focus15.xml", 0.7),
        ] {
            weights.insert(k.to_string(), v);
        }

        Self {
            default_weight: 0.5,
            weights,
        }
    }
}

/// Clamp to [0.0, 1.0].
fn clamp01(x: f32) -> f32 {
    if x < 0.0 {
        0.0
    } else if x > 1.0 {
        1.0
    } else {
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> SourceWeightsConfig {
        SourceWeightsConfig::default_seed()
    }

    #[test]
    fn exact_match() {
        let c = cfg();
        assert!((c.weight_for("https://feeds.bbci.co.uk/news/world/rss.xml") - 1.0).abs() < 1e-6);
    }

    #[test]
    fn substring_match_tolerates_query_variants() {
        let c = cfg();
        let w = c.weight_for("https://news.ycombinator.com/rss?extra=1");
        assert!((w - 0.7).abs() < 1e-6);
    }

    #[test]
    fn default_weight_used_for_unknown_source() {
        let c = cfg();
        assert!((c.weight_for("https://unknown.example/feed") - c.default_weight).abs() < 1e-6);
    }

    #[test]
    fn weights_are_clamped() {
        let mut c = cfg();
        c.weights.insert("https://hot.example/rss".to_string(), 7.5);
        assert!((c.weight_for("https://hot.example/rss") - 1.0).abs() < 1e-6);
    }

    #[test]
    fn bad_config_file_falls_back_to_seed() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("weights.json");
        std::fs::write(&p, "not json at all").unwrap();
        let c = SourceWeightsConfig::load_from_file(&p);
        assert_eq!(c.weights.len(), cfg().weights.len());
    }
}
