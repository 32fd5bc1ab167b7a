//! Best-effort live price lookups for asset mentions.
//!
//! Prompts read better when "bitcoin rallies" comes with the actual quote.
//! Every lookup is optional: any network or shape problem returns `None`
//! and the caller simply omits the annotation.

use std::time::Duration;

use serde_json::Value;

/// Keywords scanned in item text, in priority order. First hit wins.
pub const ASSET_KEYWORDS: &[&str] = &[
    "bitcoin", "btc", "ethereum", "eth", "gold", "nvidia", "nvda", "apple", "aapl", "s&p 500",
    "sp500",
];

#[derive(Debug, Clone)]
pub struct PriceLookup {
    client: reqwest::Client,
}

impl PriceLookup {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent("news-digest-bot/0.1")
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self { client }
    }

    /// Quote for the first asset keyword found in `text`, if any.
    pub async fn quote_for_text(&self, text: &str) -> Option<String> {
        let lower = text.to_lowercase();
        let asset = ASSET_KEYWORDS.iter().find(|a| lower.contains(**a))?;
        self.quote(asset).await
    }

    async fn quote(&self, asset: &str) -> Option<String> {
        match asset {
            "bitcoin" | "btc" => self.coingecko("bitcoin").await,
            "ethereum" | "eth" => self.coingecko("ethereum").await,
            // COMEX front-month futures stand in for a spot gold quote.
            "gold" => self.yahoo_chart("GC=F").await,
            "nvidia" | "nvda" => self.yahoo_chart("NVDA").await,
            "apple" | "aapl" => self.yahoo_chart("AAPL").await,
            "s&p 500" | "sp500" => self.yahoo_chart("SPY").await,
            _ => None,
        }
    }

    async fn coingecko(&self, id: &str) -> Option<String> {
        let url = format!(
            "https://api.coingecko.com/api/v3/simple/price?ids={id}&vs_currencies=usd"
        );
        let body: Value = self.get_json(&url).await?;
        let usd = body.get(id)?.get("usd")?.as_f64()?;
        Some(format!("${usd:.0}"))
    }

    async fn yahoo_chart(&self, symbol: &str) -> Option<String> {
        let url = format!("https://query1.finance.yahoo.com/v8/finance/chart/{symbol}");
        let body: Value = self.get_json(&url).await?;
        let price = body
            .get("chart")?
            .get("result")?
            .get(0)?
            .get("meta")?
            .get("regularMarketPrice")?
            .as_f64()?;
        Some(format!("${price:.2}"))
    }

    async fn get_json(&self, url: &str) -> Option<Value> {
        let resp = self.client.get(url).send().await.ok()?;
        if !resp.status().is_success() {
            tracing::debug!(url, status = %resp.status(), "price lookup skipped");
            return None;
        }
        resp.json().await.ok()
    }
}

impl Default for PriceLookup {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_keyword_hit_wins() {
        let lower = "Apple beats estimates as Bitcoin slides".to_lowercase();
        let hit = ASSET_KEYWORDS.iter().find(|a| lower.contains(**a));
        assert_eq!(hit, Some(&"bitcoin"));
    }

    #[test]
    fn no_keyword_means_no_lookup() {
        let lower = "quiet day in the bond market".to_lowercase();
        assert!(ASSET_KEYWORDS.iter().all(|a| !lower.contains(*a)));
    }
}
