//! Delivery of the finished report to Feishu.
//!
//! Two channels: the unauthenticated group webhook and the app-credential
//! path (token exchange + chat message API). Both return `bool` and never
//! propagate errors; delivery failure must not bring the run down.

pub mod app;
pub mod card;
pub mod webhook;

use async_trait::async_trait;

use crate::config::AppConfig;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver the report body. `true` on confirmed delivery.
    async fn send_report(&self, message: &str) -> bool;

    /// Deliver a short failure notice. Best-effort.
    async fn send_error_alert(&self, error: &str) -> bool;

    fn name(&self) -> &'static str;
}

/// Pick the delivery channel from the configuration: webhook when present,
/// otherwise the app-credential path, otherwise nothing.
pub fn build_notifier(cfg: &AppConfig) -> Option<Box<dyn Notifier>> {
    if let Some(url) = &cfg.webhook_url {
        return Some(Box::new(webhook::WebhookNotifier::new(url.clone())));
    }
    if cfg.has_app_credentials() {
        return Some(Box::new(app::LarkAppNotifier::from_config(cfg)));
    }
    tracing::error!("no delivery channel configured (webhook URL or app credentials)");
    None
}

pub(crate) fn now_stamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
