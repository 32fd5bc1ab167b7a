//! Feed document parsing: RSS 2.0 and Atom, consumed as opaque strings.

use anyhow::{Context, Result};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::{OffsetDateTime, UtcOffset};

use crate::ingest::types::FeedEntry;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entry: Vec<AtomEntry>,
}
#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<Text>,
    #[serde(rename = "link", default)]
    link: Vec<AtomLink>,
    summary: Option<Text>,
    content: Option<Text>,
    published: Option<String>,
    updated: Option<String>,
}
// Atom text constructs carry a `type` attribute, so plain String won't do.
#[derive(Debug, Deserialize)]
struct Text {
    #[serde(rename = "$text", default)]
    value: Option<String>,
}
#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
}

/// Parse a fetched feed document into entries. Detects Atom by its root
/// element; everything else is treated as RSS 2.0.
pub fn parse_feed(s: &str) -> Result<Vec<FeedEntry>> {
    let xml_clean = scrub_html_entities_for_xml(s);
    if looks_like_atom(&xml_clean) {
        parse_atom(&xml_clean)
    } else {
        parse_rss(&xml_clean)
    }
}

fn looks_like_atom(s: &str) -> bool {
    // First real element after the prolog/comments.
    s.split('<')
        .skip(1)
        .map(|frag| frag.trim_start())
        .find(|frag| {
            !frag.starts_with('?') && !frag.starts_with('!') && !frag.starts_with('/')
        })
        .is_some_and(|frag| frag.starts_with("feed"))
}

fn parse_rss(s: &str) -> Result<Vec<FeedEntry>> {
    let rss: Rss = from_str(s).context("parsing rss xml")?;
    let mut out = Vec::with_capacity(rss.channel.item.len());
    for it in rss.channel.item {
        out.push(FeedEntry {
            title: it.title.unwrap_or_default(),
            summary: it.description.unwrap_or_default(),
            link: it.link.unwrap_or_default(),
            published: it.pub_date,
        });
    }
    Ok(out)
}

fn parse_atom(s: &str) -> Result<Vec<FeedEntry>> {
    let feed: AtomFeed = from_str(s).context("parsing atom xml")?;
    let mut out = Vec::with_capacity(feed.entry.len());
    for e in feed.entry {
        let summary = e
            .summary
            .and_then(|t| t.value)
            .or_else(|| e.content.and_then(|t| t.value))
            .unwrap_or_default();
        out.push(FeedEntry {
            title: e.title.and_then(|t| t.value).unwrap_or_default(),
            summary,
            link: e
                .link
                .into_iter()
                .find_map(|l| l.href)
                .unwrap_or_default(),
            published: e.published.or(e.updated),
        });
    }
    Ok(out)
}

/// Parse an RFC 2822 (`pubDate`) or RFC 3339 (`published`) timestamp into
/// unix seconds. Unparseable input yields `None`; the scorer treats that as
/// a missing recency signal rather than an error.
pub fn parse_published_unix(ts: &str) -> Option<i64> {
    let t = ts.trim();
    OffsetDateTime::parse(t, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(t, &Rfc3339))
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS_DOC: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
  <title>Example</title>
  <item>
    <title>First headline</title>
    <link>https://example.test/a</link>
    <pubDate>Tue, 10 Jun 2025 08:00:00 GMT</pubDate>
    <description>Body &ndash; with entities</description>
  </item>
  <item>
    <title>Second headline</title>
    <link>https://example.test/b</link>
  </item>
</channel></rss>"#;

    const ATOM_DOC: &str = r#"<?xml version="1.0"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <title type="html">Atom headline</title>
    <link href="https://example.test/atom/1"/>
    <summary type="html">Atom body</summary>
    <published>2025-06-10T08:00:00Z</published>
  </entry>
</feed>"#;

    #[test]
    fn rss_items_parse_with_optional_fields() {
        let entries = parse_feed(RSS_DOC).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "First headline");
        assert_eq!(entries[0].summary, "Body - with entities");
        assert!(entries[0].published.is_some());
        assert!(entries[1].published.is_none());
    }

    #[test]
    fn atom_entries_parse() {
        let entries = parse_feed(ATOM_DOC).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Atom headline");
        assert_eq!(entries[0].link, "https://example.test/atom/1");
        assert_eq!(entries[0].published.as_deref(), Some("2025-06-10T08:00:00Z"));
    }

    #[test]
    fn both_date_formats_parse_to_the_same_instant() {
        let a = parse_published_unix("Tue, 10 Jun 2025 08:00:00 GMT").unwrap();
        let b = parse_published_unix("2025-06-10T08:00:00Z").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn garbage_dates_yield_none() {
        assert!(parse_published_unix("yesterday-ish").is_none());
        assert!(parse_published_unix("").is_none());
    }
}
