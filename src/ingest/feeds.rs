// src/ingest/feeds.rs
//! Feed catalog: the list of RSS/Atom URLs polled each run. Loaded from an
//! explicit path, a config file, or the built-in seed, in that order.

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const ENV_PATH: &str = "NEWS_FEEDS_PATH";

/// Load the feed list from an explicit path. Supports TOML or JSON.
pub fn load_feeds_from(path: &Path) -> Result<Vec<String>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading feeds from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_feeds(&content, ext.as_str())
}

/// Load the feed list using env var + fallbacks:
/// 1) $NEWS_FEEDS_PATH
/// 2) config/feeds.toml
/// 3) config/feeds.json
/// 4) built-in seed
pub fn load_feeds_default() -> Result<Vec<String>> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_feeds_from(&pb);
        } else {
            return Err(anyhow!("NEWS_FEEDS_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/feeds.toml");
    if toml_p.exists() {
        return load_feeds_from(&toml_p);
    }
    let json_p = PathBuf::from("config/feeds.json");
    if json_p.exists() {
        return load_feeds_from(&json_p);
    }
    Ok(default_seed())
}

fn parse_feeds(s: &str, hint_ext: &str) -> Result<Vec<String>> {
    let try_toml = hint_ext == "toml" || s.contains("feeds");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported feeds format"))
}

fn parse_toml(s: &str) -> Result<Vec<String>> {
    #[derive(serde::Deserialize)]
    struct TomlFeeds {
        feeds: Vec<String>,
    }
    let v: TomlFeeds = toml::from_str(s)?;
    Ok(clean_list(v.feeds))
}

fn parse_json(s: &str) -> Result<Vec<String>> {
    let v: Vec<String> = serde_json::from_str(s)?;
    Ok(clean_list(v))
}

/// Trim and drop empties; order is preserved (it is the discovery order
/// used for score tie-breaks).
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if !t.is_empty() && !out.iter().any(|x| x == t) {
            out.push(t.to_string());
        }
    }
    out
}

/// The polled sources: international wires, finance, tech, crypto, energy,
/// aggregators, and domestic Chinese outlets.
pub fn default_seed() -> Vec<String> {
    [
        "https://feeds.bbci.co.uk/news/world/rss.xml",
        "https://rss.nytimes.com/services/xml/rss/nyt/World.xml",
        "https://search.cnbc.com/rs/search/combinedcms/view.xml?partnerId=wrss01&id=10000664",
        "https://techcrunch.com/feed/",
        "https://finance.yahoo.com/news/rssindex",
        "https://www.coindesk.com/arc/outboundfeeds/rss/",
        "https://oilprice.com/rss/main",
        "https://news.ycombinator.com/rss",
        "https://www.reddit.com/r/worldnews/top/.rss?t=day",
        "https://www.reddit.com/r/videos/top/.rss?t=day",
        "https://www.scmp.com/rss/2/feed",
        "http://arxiv.org/rss/cs.AI",
        "http://news.baidu.com/n?cmd=file&format=rss&tn=rss&sub=0",
        "http://rss.people.com.cn/GB/303140/index.xml",
        "http://www.xinhuanet.com/politics/news_politics.xml",
        "http://www.chinanews.com/rss/scroll-news.xml",
        "https://www.thepaper.cn/rss.jsp",
        "http://www.ce.cn/cysc/jg/zxbd/rss2.xml",
        "https://www.zhihu.com/rss",
        "https://www.36kr.com/feed",
        "https://news.qq.com/rss/channels/finance/rss.xml",
        "https://rss.sina.com.cn/news/china/focus15.xml",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
