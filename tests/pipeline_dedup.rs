// tests/pipeline_dedup.rs
//
// Full pipeline over mock components: items delivered on the first run are
// remembered in the URL store and never delivered again.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use news_digest_bot::analyze::llm::ChatProvider;
use news_digest_bot::analyze::BatchAnalyzer;
use news_digest_bot::cache::ProcessedUrlStore;
use news_digest_bot::classify::KeywordConfig;
use news_digest_bot::ingest::types::{FeedEntry, NewsSource};
use news_digest_bot::notify::Notifier;
use news_digest_bot::score::ScoreKeywords;
use news_digest_bot::source_weights::SourceWeightsConfig;
use news_digest_bot::Pipeline;

struct MockSource;

#[async_trait]
impl NewsSource for MockSource {
    async fn fetch_entries(&self) -> Result<Vec<FeedEntry>> {
        Ok(vec![
            FeedEntry {
                title: "央行宣布降准0.25个百分点".to_string(),
                summary: "市场流动性释放约五千亿元。".to_string(),
                link: "https://example.test/rrr-cut".to_string(),
                published: None,
            },
            FeedEntry {
                title: "Chipmaker posts record quarter".to_string(),
                summary: "AI demand keeps climbing.".to_string(),
                link: "https://example.test/chips".to_string(),
                published: None,
            },
        ])
    }
    fn url(&self) -> &str {
        "https://example.test/rss"
    }
}

struct EchoProvider;

#[async_trait]
impl ChatProvider for EchoProvider {
    async fn complete(&self, _system: &str, user: &str) -> Result<String> {
        Ok(format!("analyzed: {}", user.lines().count()))
    }
    fn name(&self) -> &'static str {
        "echo"
    }
}

#[derive(Default)]
struct RecordingNotifier {
    reports: Mutex<Vec<String>>,
    alerts: AtomicU32,
    report_ok: bool,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_report(&self, message: &str) -> bool {
        self.reports.lock().unwrap().push(message.to_string());
        self.report_ok
    }
    async fn send_error_alert(&self, _error: &str) -> bool {
        self.alerts.fetch_add(1, Ordering::SeqCst);
        true
    }
    fn name(&self) -> &'static str {
        "recording"
    }
}

struct SharedNotifier(Arc<RecordingNotifier>);

#[async_trait]
impl Notifier for SharedNotifier {
    async fn send_report(&self, message: &str) -> bool {
        self.0.send_report(message).await
    }
    async fn send_error_alert(&self, error: &str) -> bool {
        self.0.send_error_alert(error).await
    }
    fn name(&self) -> &'static str {
        self.0.name()
    }
}

fn pipeline(history: &std::path::Path, notifier: Arc<RecordingNotifier>) -> Pipeline {
    Pipeline::new(
        vec![Box::new(MockSource)],
        SourceWeightsConfig::default_seed(),
        KeywordConfig::default_seed(),
        ScoreKeywords::default_seed(),
        ProcessedUrlStore::new(history, 30 * 24 * 3600),
        BatchAnalyzer::new(Arc::new(EchoProvider), None),
        Box::new(SharedNotifier(notifier)),
    )
}

#[tokio::test]
async fn second_run_delivers_nothing_new() {
    let dir = tempfile::tempdir().unwrap();
    let history = dir.path().join("history.json");

    let notifier = Arc::new(RecordingNotifier {
        report_ok: true,
        ..Default::default()
    });

    // First run: both items are fresh, one report goes out.
    pipeline(&history, Arc::clone(&notifier))
        .run_once()
        .await
        .unwrap();
    assert_eq!(notifier.reports.lock().unwrap().len(), 1);

    // Second run over the same store: everything is cached, no delivery.
    pipeline(&history, Arc::clone(&notifier))
        .run_once()
        .await
        .unwrap();
    assert_eq!(notifier.reports.lock().unwrap().len(), 1);
    assert_eq!(notifier.alerts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_delivery_raises_an_error_alert() {
    let dir = tempfile::tempdir().unwrap();
    let history = dir.path().join("history.json");

    let notifier = Arc::new(RecordingNotifier {
        report_ok: false,
        ..Default::default()
    });

    let ok = pipeline(&history, Arc::clone(&notifier)).run_guarded().await;
    assert!(!ok);
    assert_eq!(notifier.reports.lock().unwrap().len(), 1);
    assert_eq!(notifier.alerts.load(Ordering::SeqCst), 1);
}
