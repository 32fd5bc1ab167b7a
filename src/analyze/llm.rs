//! Chat-completion provider abstraction + the DeepSeek-compatible client.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

/// One chat-completion round trip. Implementations do a single call; retry
/// and fallback live in the analyzer.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
    fn name(&self) -> &'static str;
}

/// OpenAI-compatible chat-completions client pointed at DeepSeek.
pub struct DeepSeekProvider {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl DeepSeekProvider {
    /// A missing key is not a constructor error: calls fail and the analyzer
    /// degrades to its fallback report, so the digest still goes out.
    pub fn from_config(cfg: &AppConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("news-digest-bot/0.1")
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key: cfg.llm_api_key.clone().unwrap_or_default(),
            base_url: cfg.llm_base_url.trim_end_matches('/').to_string(),
            model: cfg.llm_model.clone(),
        }
    }
}

#[async_trait]
impl ChatProvider for DeepSeekProvider {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        if self.api_key.is_empty() {
            bail!("DEEPSEEK_API_KEY is not set");
        }

        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            max_tokens: u32,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: system,
                },
                Msg {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.7,
            max_tokens: 4000,
        };

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("chat-completions request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("chat-completions returned {status}: {body}");
        }

        let body: Resp = resp.json().await.context("chat-completions bad body")?;
        let content = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();
        if content.trim().is_empty() {
            bail!("chat-completions returned an empty choice");
        }
        Ok(content)
    }

    fn name(&self) -> &'static str {
        "deepseek"
    }
}
