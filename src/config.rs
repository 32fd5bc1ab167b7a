//! Process configuration, built once from the environment in `main` and
//! passed by reference into each component constructor.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// DeepSeek (OpenAI-compatible) chat-completions credentials.
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,

    /// Feishu group webhook URL (unauthenticated card delivery).
    pub webhook_url: Option<String>,

    /// Feishu app credentials for the authenticated message path.
    pub app_id: Option<String>,
    pub app_secret: Option<String>,
    pub chat_id: Option<String>,
    pub user_id: Option<String>,

    /// Processed-URL store location and retention.
    pub history_path: PathBuf,
    pub cache_ttl_days: u64,

    /// Inject best-effort live asset prices into prompts.
    pub price_hints: bool,
}

impl AppConfig {
    /// Missing optional variables degrade features rather than failing hard;
    /// delivery only fails later, at the notifier, if neither the webhook
    /// nor the app credentials are present.
    pub fn from_env() -> Self {
        let opt = |k: &str| std::env::var(k).ok().filter(|v| !v.trim().is_empty());

        Self {
            llm_api_key: opt("DEEPSEEK_API_KEY"),
            llm_base_url: opt("DEEPSEEK_BASE_URL")
                .unwrap_or_else(|| "https://api.deepseek.com".to_string()),
            llm_model: opt("DEEPSEEK_MODEL").unwrap_or_else(|| "deepseek-chat".to_string()),
            webhook_url: opt("FEISHU_WEBHOOK_URL"),
            app_id: opt("LARK_APP_ID"),
            app_secret: opt("LARK_APP_SECRET"),
            chat_id: opt("LARK_CHAT_ID"),
            user_id: opt("LARK_USER_ID"),
            history_path: opt("NEWS_HISTORY_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("history.json")),
            cache_ttl_days: opt("NEWS_CACHE_TTL_DAYS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            price_hints: opt("NEWS_PRICE_HINTS").map(|v| v != "0").unwrap_or(true),
        }
    }

    pub fn has_app_credentials(&self) -> bool {
        self.app_id.is_some() && self.app_secret.is_some()
    }
}
