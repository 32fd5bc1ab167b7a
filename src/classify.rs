//! # Keyword Classifier
//!
//! Pure category flags over `(title, summary)` via case-insensitive
//! substring membership against configurable word lists. The lists are
//! policy, not algorithm, so they load from JSON config with a built-in
//! seed as fallback, same as the source weight table.
//!
//! Any hit on the boring list removes the item entirely, regardless of
//! what else matched.

use serde::Deserialize;
use std::{fs, path::Path};

#[derive(Debug, Clone, Deserialize)]
pub struct KeywordConfig {
    #[serde(default)]
    pub domestic: Vec<String>,
    #[serde(default)]
    pub finance: Vec<String>,
    #[serde(default)]
    pub ai_tech: Vec<String>,
    #[serde(default)]
    pub crypto: Vec<String>,
    #[serde(default)]
    pub energy: Vec<String>,
    #[serde(default)]
    pub boring: Vec<String>,
}

/// Per-category flags for one item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classification {
    pub is_domestic: bool,
    pub is_finance: bool,
    pub is_ai_tech: bool,
    pub is_crypto: bool,
    pub is_energy: bool,
    pub is_boring: bool,
}

impl KeywordConfig {
    /// Load from a JSON file; falls back to `default_seed()` on error.
    /// Matching is against lowercased text, so the lists are lowercased
    /// here regardless of how the file spells them.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(path) {
            Ok(s) => serde_json::from_str(&s)
                .map(Self::lowercased)
                .unwrap_or_else(|_| Self::default_seed()),
            Err(_) => Self::default_seed(),
        }
    }

    fn lowercased(mut self) -> Self {
        for list in [
            &mut self.domestic,
            &mut self.finance,
            &mut self.ai_tech,
            &mut self.crypto,
            &mut self.energy,
            &mut self.boring,
        ] {
            for kw in list.iter_mut() {
                *kw = kw.to_lowercase();
            }
        }
        self
    }

    /// Default location: `config/keywords.json`.
    pub fn load_default() -> Self {
        Self::load_from_file("config/keywords.json")
    }

    pub fn classify(&self, title: &str, summary: &str) -> Classification {
        let text = format!("{} {}", title, summary).to_lowercase();
        let hit = |list: &[String]| list.iter().any(|k| text.contains(k.as_str()));
        Classification {
            is_domestic: hit(&self.domestic),
            is_finance: hit(&self.finance),
            is_ai_tech: hit(&self.ai_tech),
            is_crypto: hit(&self.crypto),
            is_energy: hit(&self.energy),
            is_boring: hit(&self.boring),
        }
    }

    pub fn default_seed() -> Self {
        let list = |items: &[&str]| items.iter().map(|s| s.to_lowercase()).collect();
        Self {
            domestic: list(&[
                "中国", "国内", "国产", "北京", "上海", "人民币", "a股", "中美", "美中", "贸易",
                "beijing", "shanghai", "chinese",
            ]),
            finance: list(&[
                "经济", "股市", "基金", "债券", "美元", "黄金", "央行", "利率", "降准", "降息",
                "通胀", "财报", "fed", "stock", "inflation", "market",
            ]),
            ai_tech: list(&[
                "人工智能", "大模型", "芯片", "算力", "机器学习", "科技", "ai", "chip", "llm",
                "openai", "chatgpt",
            ]),
            crypto: list(&[
                "比特币", "以太坊", "加密", "区块链", "bitcoin", "btc", "ethereum", "eth",
                "crypto", "blockchain", "stablecoin",
            ]),
            energy: list(&[
                "石油", "原油", "天然气", "能源", "新能源", "光伏", "电池", "oil", "opec",
                "gas", "solar",
            ]),
            boring: list(&[
                "nba", "soccer", "olympics", "world cup", "celebrity", "gossip", "box office",
                "体育", "娱乐", "明星", "电影", "综艺", "八卦", "彩票", "选秀",
            ]),
        }
    }
}

/// Category bonus added to the importance score. Categories stack.
pub fn category_bonus(c: &Classification) -> f32 {
    let mut bonus = 0.0;
    if c.is_domestic {
        bonus += 1.0;
    }
    if c.is_finance {
        bonus += 1.5;
    }
    if c.is_ai_tech {
        bonus += 1.2;
    }
    if c.is_crypto {
        bonus += 1.0;
    }
    if c.is_energy {
        bonus += 0.8;
    }
    bonus
}
