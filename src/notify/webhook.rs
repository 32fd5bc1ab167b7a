//! Unauthenticated group-webhook delivery.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::card::{self, CardMessage};
use super::{now_stamp, Notifier};
use crate::retry::{Attempt, RetryPolicy};

/// Webhook responses came in two vintages; either zero field means accepted.
#[derive(Debug, Deserialize)]
struct HookResp {
    #[serde(default)]
    code: Option<i64>,
    #[serde(rename = "StatusCode", default)]
    status_code: Option<i64>,
    #[serde(default)]
    msg: Option<String>,
}

impl HookResp {
    fn accepted(&self) -> bool {
        self.code == Some(0) || self.status_code == Some(0)
    }
}

pub struct WebhookNotifier {
    url: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Self {
        Self::with_retry(url, RetryPolicy::new(3, Duration::from_secs(5)))
    }

    pub fn with_retry(url: String, retry: RetryPolicy) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self { url, client, retry }
    }

    async fn post_card(&self, msg: &CardMessage) -> bool {
        let fixed = Some(self.retry.base_delay);
        let out = self
            .retry
            .run(|attempt| async move {
                tracing::info!(attempt, "posting card to webhook");
                let resp = match self.client.post(&self.url).json(msg).send().await {
                    Ok(r) => r,
                    Err(e) => {
                        tracing::warn!(attempt, error = ?e, "webhook request failed");
                        return Attempt::Retry { wait: fixed };
                    }
                };
                let status = resp.status();
                if !status.is_success() {
                    tracing::warn!(attempt, %status, "webhook returned HTTP error");
                    return Attempt::Retry { wait: fixed };
                }
                match resp.json::<HookResp>().await {
                    Ok(body) if body.accepted() => Attempt::Done(()),
                    Ok(body) => {
                        tracing::warn!(attempt, msg = ?body.msg, "webhook rejected the card");
                        Attempt::Retry { wait: fixed }
                    }
                    Err(e) => {
                        tracing::warn!(attempt, error = ?e, "webhook body unreadable");
                        Attempt::Retry { wait: fixed }
                    }
                }
            })
            .await;
        out.is_some()
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send_report(&self, message: &str) -> bool {
        let body = card::clean_markdown(message);
        let msg = card::daily_card(&body, &now_stamp());
        let ok = self.post_card(&msg).await;
        if ok {
            tracing::info!("report delivered via webhook");
        } else {
            tracing::error!("report delivery via webhook failed");
        }
        ok
    }

    async fn send_error_alert(&self, error: &str) -> bool {
        let msg = card::error_alert_card(error, &now_stamp());
        self.post_card(&msg).await
    }

    fn name(&self) -> &'static str {
        "feishu-webhook"
    }
}
