//! One end-to-end run: fetch, score, dedupe, analyze, deliver.

use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::analyze::llm::DeepSeekProvider;
use crate::analyze::BatchAnalyzer;
use crate::cache::ProcessedUrlStore;
use crate::classify::KeywordConfig;
use crate::config::AppConfig;
use crate::ingest::fetcher::HttpFeedSource;
use crate::ingest::types::NewsSource;
use crate::ingest::{self, feeds};
use crate::notify::{self, Notifier};
use crate::prices::PriceLookup;
use crate::score::ScoreKeywords;
use crate::source_weights::SourceWeightsConfig;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

pub struct Pipeline {
    sources: Vec<Box<dyn NewsSource>>,
    weights: SourceWeightsConfig,
    keywords: KeywordConfig,
    score_keywords: ScoreKeywords,
    store: ProcessedUrlStore,
    analyzer: BatchAnalyzer,
    notifier: Box<dyn Notifier>,
}

impl Pipeline {
    /// Wire every component from the configuration. Fails only on the one
    /// thing a run cannot proceed without: a delivery channel. A missing LLM
    /// key degrades to the analyzer's fallback report instead.
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        let feed_urls = feeds::load_feeds_default().context("loading feed catalog")?;
        let sources: Vec<Box<dyn NewsSource>> = feed_urls
            .into_iter()
            .map(|url| Box::new(HttpFeedSource::new(url)) as Box<dyn NewsSource>)
            .collect();

        let provider = Arc::new(DeepSeekProvider::from_config(cfg));
        let prices = cfg.price_hints.then(PriceLookup::new);
        let analyzer = BatchAnalyzer::new(provider, prices);

        let notifier = match notify::build_notifier(cfg) {
            Some(n) => n,
            None => bail!("no delivery channel configured"),
        };

        Ok(Self {
            sources,
            weights: SourceWeightsConfig::load_default(),
            keywords: KeywordConfig::load_default(),
            score_keywords: ScoreKeywords::load_default(),
            store: ProcessedUrlStore::new(
                cfg.history_path.clone(),
                cfg.cache_ttl_days * SECS_PER_DAY,
            ),
            analyzer,
            notifier,
        })
    }

    /// Assembly seam for tests and tools.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sources: Vec<Box<dyn NewsSource>>,
        weights: SourceWeightsConfig,
        keywords: KeywordConfig,
        score_keywords: ScoreKeywords,
        store: ProcessedUrlStore,
        analyzer: BatchAnalyzer,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            sources,
            weights,
            keywords,
            score_keywords,
            store,
            analyzer,
            notifier,
        }
    }

    /// The whole run. Errors bubble up to `run_guarded`, which turns them
    /// into an alert card.
    pub async fn run_once(&self) -> Result<()> {
        let now_unix = chrono::Utc::now().timestamp();
        let mut processed = self.store.load(now_unix.max(0) as u64);
        tracing::info!(cached = processed.len(), sources = self.sources.len(), "run started");

        let items = ingest::collect_items(
            &self.sources,
            &self.weights,
            &self.keywords,
            &self.score_keywords,
            &mut processed,
            now_unix,
        )
        .await;

        if items.is_empty() {
            tracing::info!("no new items, nothing to deliver");
            return Ok(());
        }

        // Persist before the long LLM phase so a crash there cannot cause
        // the same items to be re-delivered next run.
        self.store.save(&processed, now_unix.max(0) as u64)?;

        let report = self.analyzer.analyze(&items).await;

        if !self.notifier.send_report(&report).await {
            bail!("report delivery failed via {}", self.notifier.name());
        }
        tracing::info!(items = items.len(), "run finished");
        Ok(())
    }

    /// Top-level guard: any error becomes a log line plus a best-effort
    /// alert card. Returns whether the run succeeded.
    pub async fn run_guarded(&self) -> bool {
        match self.run_once().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = ?e, "run failed");
                let alerted = self.notifier.send_error_alert(&format!("{e:#}")).await;
                if !alerted {
                    tracing::error!("error alert delivery also failed");
                }
                false
            }
        }
    }
}
