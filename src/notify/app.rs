//! App-credential delivery: tenant token exchange, then the chat message API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::card::{self, CardMessage};
use super::{now_stamp, Notifier};
use crate::config::AppConfig;
use crate::retry::{Attempt, RetryPolicy};

const TOKEN_URL: &str = "https://open.feishu.cn/open-apis/auth/v3/tenant_access_token/internal";
const MESSAGES_URL: &str = "https://open.feishu.cn/open-apis/im/v1/messages";

pub struct LarkAppNotifier {
    app_id: String,
    app_secret: String,
    chat_id: Option<String>,
    user_id: Option<String>,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl LarkAppNotifier {
    pub fn from_config(cfg: &AppConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self {
            app_id: cfg.app_id.clone().unwrap_or_default(),
            app_secret: cfg.app_secret.clone().unwrap_or_default(),
            chat_id: cfg.chat_id.clone(),
            user_id: cfg.user_id.clone(),
            client,
            retry: RetryPolicy::new(3, Duration::from_secs(5)),
        }
    }

    /// Exchange app credentials for a short-lived tenant token.
    async fn tenant_token(&self) -> Option<String> {
        #[derive(Serialize)]
        struct Req<'a> {
            app_id: &'a str,
            app_secret: &'a str,
        }
        #[derive(Deserialize)]
        struct Resp {
            code: i64,
            #[serde(default)]
            msg: Option<String>,
            #[serde(default)]
            tenant_access_token: Option<String>,
        }

        let req = Req {
            app_id: &self.app_id,
            app_secret: &self.app_secret,
        };
        let fixed = Some(self.retry.base_delay);
        let req = &req;
        self.retry
            .run(|attempt| {
                async move {
                    tracing::info!(attempt, "requesting tenant access token");
                    let resp = match self.client.post(TOKEN_URL).json(req).send().await {
                        Ok(r) => r,
                        Err(e) => {
                            tracing::warn!(attempt, error = ?e, "token request failed");
                            return Attempt::Retry { wait: fixed };
                        }
                    };
                    if !resp.status().is_success() {
                        tracing::warn!(attempt, status = %resp.status(), "token HTTP error");
                        return Attempt::Retry { wait: fixed };
                    }
                    match resp.json::<Resp>().await {
                        Ok(body) if body.code == 0 => match body.tenant_access_token {
                            Some(t) => Attempt::Done(t),
                            None => Attempt::Fail,
                        },
                        Ok(body) => {
                            tracing::warn!(attempt, code = body.code, msg = ?body.msg, "token rejected");
                            Attempt::Retry { wait: fixed }
                        }
                        Err(e) => {
                            tracing::warn!(attempt, error = ?e, "token body unreadable");
                            Attempt::Retry { wait: fixed }
                        }
                    }
                }
            })
            .await
    }

    /// Targets in preference order: the group chat, then the direct user.
    fn targets(&self) -> Vec<(&'static str, String)> {
        let mut targets = Vec::new();
        if let Some(chat_id) = &self.chat_id {
            targets.push(("chat_id", chat_id.clone()));
        }
        if let Some(user_id) = &self.user_id {
            targets.push(("user_id", user_id.clone()));
        }
        targets
    }

    async fn send_card(&self, msg: &CardMessage) -> bool {
        let Some(token) = self.tenant_token().await else {
            tracing::error!("no access token, message not sent");
            return false;
        };

        let targets = self.targets();
        if targets.is_empty() {
            tracing::error!("neither LARK_CHAT_ID nor LARK_USER_ID is set");
            return false;
        }

        // The message API carries the card as a JSON-encoded string.
        let content = match serde_json::to_string(&msg.card) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = ?e, "card serialization failed");
                return false;
            }
        };

        #[derive(Serialize)]
        struct Req<'a> {
            receive_id: &'a str,
            msg_type: &'a str,
            content: &'a str,
        }
        #[derive(Deserialize)]
        struct Resp {
            code: i64,
            #[serde(default)]
            msg: Option<String>,
        }

        let fixed = Some(self.retry.base_delay);
        for (receive_id_type, receive_id) in &targets {
            let url = format!("{MESSAGES_URL}?receive_id_type={receive_id_type}");
            let req = Req {
                receive_id,
                msg_type: "interactive",
                content: &content,
            };

            let url = &url;
            let req = &req;
            let token = &token;
            let sent = self
                .retry
                .run(|attempt| {
                    async move {
                        tracing::info!(attempt, receive_id_type, "sending card via message API");
                        let resp = match self
                            .client
                            .post(url)
                            .bearer_auth(token)
                            .json(req)
                            .send()
                            .await
                        {
                            Ok(r) => r,
                            Err(e) => {
                                tracing::warn!(attempt, error = ?e, "message request failed");
                                return Attempt::Retry { wait: fixed };
                            }
                        };
                        if !resp.status().is_success() {
                            tracing::warn!(attempt, status = %resp.status(), "message HTTP error");
                            return Attempt::Retry { wait: fixed };
                        }
                        match resp.json::<Resp>().await {
                            Ok(body) if body.code == 0 => Attempt::Done(()),
                            Ok(body) => {
                                tracing::warn!(attempt, code = body.code, msg = ?body.msg, "message rejected");
                                Attempt::Retry { wait: fixed }
                            }
                            Err(e) => {
                                tracing::warn!(attempt, error = ?e, "message body unreadable");
                                Attempt::Retry { wait: fixed }
                            }
                        }
                    }
                })
                .await;

            if sent.is_some() {
                return true;
            }
            tracing::warn!(receive_id_type, "delivery to target failed, trying next");
        }
        false
    }
}

#[async_trait]
impl Notifier for LarkAppNotifier {
    async fn send_report(&self, message: &str) -> bool {
        let msg = card::daily_card(message, &now_stamp());
        self.send_card(&msg).await
    }

    async fn send_error_alert(&self, error: &str) -> bool {
        let msg = card::error_alert_card(error, &now_stamp());
        self.send_card(&msg).await
    }

    fn name(&self) -> &'static str {
        "lark-app"
    }
}
