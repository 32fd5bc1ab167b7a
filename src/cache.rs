//! # Processed-URL Store
//!
//! Cross-run deduplication: URLs that were already digested are never
//! processed again. Persisted as a single JSON file mapping URL to its
//! insertion timestamp so that old entries can be evicted on save (the
//! legacy bare-array format is still accepted on load).
//!
//! Loading fails open: a missing file is created empty, a corrupt file is
//! logged and treated as empty. No locking; single-run-at-a-time execution
//! is the caller's (external scheduler's) responsibility.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct ProcessedUrlStore {
    path: PathBuf,
    /// Entries older than this are dropped on save; bounds file growth.
    ttl_secs: u64,
}

/// In-memory view of the store: URL → unix insertion time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedUrls {
    entries: HashMap<String, u64>,
}

impl ProcessedUrls {
    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    pub fn insert(&mut self, url: impl Into<String>, now_unix: u64) {
        self.entries.entry(url.into()).or_insert(now_unix);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Serialize)]
struct FileShape<'a> {
    processed_urls: &'a HashMap<String, u64>,
}

/// Accepts both the current map shape and the legacy array shape.
#[derive(Deserialize)]
struct FileShapeOwned {
    #[serde(default)]
    processed_urls: UrlsField,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UrlsField {
    Timestamped(HashMap<String, u64>),
    Legacy(Vec<String>),
}

impl Default for UrlsField {
    fn default() -> Self {
        UrlsField::Timestamped(HashMap::new())
    }
}

impl ProcessedUrlStore {
    pub fn new(path: impl Into<PathBuf>, ttl_secs: u64) -> Self {
        Self {
            path: path.into(),
            ttl_secs,
        }
    }

    /// Load the set of processed URLs. A missing file is created empty; any
    /// read/parse error yields an empty set with a warning; prior cache
    /// contents may be lost, but the run proceeds.
    pub fn load(&self, now_unix: u64) -> ProcessedUrls {
        if !self.path.exists() {
            let empty = ProcessedUrls::default();
            if let Err(e) = self.save(&empty, now_unix) {
                tracing::warn!(path = %self.path.display(), error = %e, "could not create cache file");
            }
            return empty;
        }
        match fs::read_to_string(&self.path) {
            Ok(s) => match serde_json::from_str::<FileShapeOwned>(&s) {
                Ok(parsed) => {
                    let entries = match parsed.processed_urls {
                        UrlsField::Timestamped(m) => m,
                        UrlsField::Legacy(v) => {
                            // Old files carry no timestamps; treat entries as fresh
                            // so they survive until a full TTL from now.
                            v.into_iter().map(|u| (u, now_unix)).collect()
                        }
                    };
                    ProcessedUrls { entries }
                }
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "cache parse error, starting empty");
                    ProcessedUrls::default()
                }
            },
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cache read error, starting empty");
                ProcessedUrls::default()
            }
        }
    }

    /// Rewrite the whole store, evicting entries older than the TTL.
    /// Atomic via tmp + rename.
    pub fn save(&self, urls: &ProcessedUrls, now_unix: u64) -> Result<()> {
        let cutoff = now_unix.saturating_sub(self.ttl_secs);
        let kept: HashMap<String, u64> = urls
            .entries
            .iter()
            .filter(|(_, &ts)| ts >= cutoff)
            .map(|(u, &ts)| (u.clone(), ts))
            .collect();

        let json = serde_json::to_string_pretty(&FileShape {
            processed_urls: &kept,
        })?;
        write_atomic(&self.path, json.as_bytes())
            .with_context(|| format!("saving cache to {}", self.path.display()))
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let mut f = fs::File::create(&tmp)?;
    f.write_all(bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = 86_400;

    fn store(dir: &tempfile::TempDir) -> ProcessedUrlStore {
        ProcessedUrlStore::new(dir.path().join("history.json"), 30 * DAY)
    }

    #[test]
    fn missing_file_is_created_and_yields_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        let urls = s.load(1_000_000);
        assert!(urls.is_empty());
        assert!(dir.path().join("history.json").exists());
    }

    #[test]
    fn save_load_is_a_fixed_point() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        let now = 1_000_000;

        let mut urls = s.load(now);
        urls.insert("https://example.test/a", now);
        urls.insert("https://example.test/b", now);
        s.save(&urls, now).unwrap();

        let reloaded = s.load(now);
        assert_eq!(reloaded, urls);

        // save(load()) changes nothing.
        s.save(&reloaded, now).unwrap();
        assert_eq!(s.load(now), reloaded);
    }

    #[test]
    fn corrupt_file_yields_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        fs::write(dir.path().join("history.json"), "{ not json").unwrap();
        assert!(s.load(1_000_000).is_empty());
    }

    #[test]
    fn legacy_array_format_loads() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        fs::write(
            dir.path().join("history.json"),
            r#"{"processed_urls": ["https://example.test/old"]}"#,
        )
        .unwrap();
        let urls = s.load(1_000_000);
        assert!(urls.contains("https://example.test/old"));
    }

    #[test]
    fn expired_entries_are_evicted_on_save() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        let now = 100 * DAY;

        let mut urls = ProcessedUrls::default();
        urls.insert("https://example.test/stale", now - 31 * DAY);
        urls.insert("https://example.test/fresh", now - DAY);
        s.save(&urls, now).unwrap();

        let reloaded = s.load(now);
        assert!(!reloaded.contains("https://example.test/stale"));
        assert!(reloaded.contains("https://example.test/fresh"));
    }

    #[test]
    fn insert_keeps_the_earliest_timestamp() {
        let mut urls = ProcessedUrls::default();
        urls.insert("u", 10);
        urls.insert("u", 20);
        assert_eq!(urls.len(), 1);
        assert_eq!(urls.entries["u"], 10);
    }
}
