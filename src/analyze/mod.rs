//! Turns the scored item list into one report: fixed-size batches, one chat
//! call per batch (with retry and a templated fallback), and a final merge
//! call when more than one batch was produced.

pub mod llm;
pub mod prompt;

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;

use crate::ingest::types::NewsItem;
use crate::prices::PriceLookup;
use crate::retry::{Attempt, RetryPolicy};
use llm::ChatProvider;

/// Items per chat call.
pub const BATCH_SIZE: usize = 30;

/// Report body when there is nothing to analyze.
pub const EMPTY_REPORT: &str = "今日无重要新闻更新。";

pub struct BatchAnalyzer {
    provider: Arc<dyn ChatProvider>,
    prices: Option<PriceLookup>,
    retry: RetryPolicy,
}

impl BatchAnalyzer {
    pub fn new(provider: Arc<dyn ChatProvider>, prices: Option<PriceLookup>) -> Self {
        Self::with_retry(provider, prices, RetryPolicy::new(3, Duration::from_secs(5)))
    }

    pub fn with_retry(
        provider: Arc<dyn ChatProvider>,
        prices: Option<PriceLookup>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            provider,
            prices,
            retry,
        }
    }

    /// Produce the report text. Never errors: a batch whose calls all fail
    /// degrades to a templated excerpt, a failed merge degrades to plain
    /// concatenation.
    pub async fn analyze(&self, items: &[NewsItem]) -> String {
        if items.is_empty() {
            return EMPTY_REPORT.to_string();
        }

        let mut parts: Vec<String> = Vec::new();
        for (idx, chunk) in items.chunks(BATCH_SIZE).enumerate() {
            let hints = self.price_hints(chunk).await;
            let content = prompt::batch_content(chunk, &hints);
            let user = prompt::batch_user_message(chunk, &content);

            match self.complete_with_retry(prompt::SYSTEM_PROMPT, &user).await {
                Some(text) => parts.push(text),
                None => {
                    tracing::warn!(batch = idx, "analysis calls exhausted, using fallback text");
                    counter!("analyze_fallback_total").increment(1);
                    parts.push(prompt::fallback_report(chunk));
                }
            }
        }

        if parts.len() == 1 {
            return parts.into_iter().next().unwrap_or_default();
        }

        let merge_user = prompt::merge_user_message(&parts);
        match self
            .complete_with_retry(prompt::MERGE_SYSTEM_PROMPT, &merge_user)
            .await
        {
            Some(merged) => merged,
            None => {
                counter!("analyze_merge_fallback_total").increment(1);
                parts.join("\n\n")
            }
        }
    }

    async fn complete_with_retry(&self, system: &str, user: &str) -> Option<String> {
        // Chat calls retry on a fixed delay rather than the linear backoff.
        let fixed = Some(self.retry.base_delay);
        self.retry
            .run(|attempt| {
                let provider = Arc::clone(&self.provider);
                let system = system.to_string();
                let user = user.to_string();
                async move {
                    match provider.complete(&system, &user).await {
                        Ok(text) => Attempt::Done(text),
                        Err(e) => {
                            tracing::warn!(
                                attempt,
                                provider = provider.name(),
                                error = ?e,
                                "chat call failed"
                            );
                            Attempt::Retry { wait: fixed }
                        }
                    }
                }
            })
            .await
    }

    async fn price_hints(&self, chunk: &[NewsItem]) -> Vec<Option<String>> {
        let Some(prices) = &self.prices else {
            return vec![None; chunk.len()];
        };
        let mut hints = Vec::with_capacity(chunk.len());
        for item in chunk {
            let text = format!("{} {}", item.title, item.summary);
            hints.push(prices.quote_for_text(&text).await);
        }
        hints
    }
}
