//! # Importance Scorer
//!
//! Pure, deterministic scoring of a news item: source trust, keyword
//! signals in the title, content length, recency, title shape, and
//! category bonuses, clamped to [0, 10].

use serde::Deserialize;
use std::{fs, path::Path};

use crate::classify::{category_bonus, Classification};

/// Keyword lists feeding the score terms. Like the classifier lists these
/// are policy, loadable from JSON with a built-in seed.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreKeywords {
    #[serde(default)]
    pub urgency: Vec<String>,
    #[serde(default)]
    pub financial: Vec<String>,
    #[serde(default)]
    pub china: Vec<String>,
}

impl ScoreKeywords {
    /// Scans run over lowercased titles, so the lists are lowercased here
    /// regardless of how the file spells them.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(path) {
            Ok(s) => serde_json::from_str(&s)
                .map(Self::lowercased)
                .unwrap_or_else(|_| Self::default_seed()),
            Err(_) => Self::default_seed(),
        }
    }

    fn lowercased(mut self) -> Self {
        for list in [&mut self.urgency, &mut self.financial, &mut self.china] {
            for kw in list.iter_mut() {
                *kw = kw.to_lowercase();
            }
        }
        self
    }

    /// Default location: `config/score_keywords.json`.
    pub fn load_default() -> Self {
        Self::load_from_file("config/score_keywords.json")
    }

    pub fn default_seed() -> Self {
        let list = |items: &[&str]| items.iter().map(|s| s.to_lowercase()).collect();
        Self {
            urgency: list(&[
                "突发", "紧急", "警告", "危机", "暴跌", "暴涨", "战", "冲突", "制裁", "政策",
                "央行", "利率", "gdp", "就业", "通胀",
            ]),
            financial: list(&[
                "经济", "股市", "基金", "债券", "美元", "人民币", "黄金", "石油", "比特币",
                "降准", "降息", "ai", "科技", "公司", "财报",
            ]),
            china: list(&[
                "中国", "chinese", "beijing", "shanghai", "hk", "港", "a股", "人民币", "cny",
                "贸易", "中美", "美中", "央行", "降准",
            ]),
        }
    }
}

const MAX_SCORE: f32 = 10.0;

/// Compute the importance score for one item.
///
/// `published_unix` is the parsed publication time; `None` (missing or
/// unparseable) contributes zero recency, no penalty.
pub fn importance_score(
    keywords: &ScoreKeywords,
    title: &str,
    summary: &str,
    source_weight: f32,
    published_unix: Option<i64>,
    now_unix: i64,
    class: &Classification,
) -> f32 {
    let mut score = 0.0f32;

    // 1) Source authority as the base term.
    score += source_weight * 4.0;

    // 2) Keyword signals, scanned over the title.
    let title_lower = title.to_lowercase();
    for kw in &keywords.urgency {
        if title_lower.contains(kw.as_str()) {
            score += 1.0;
        }
    }
    for kw in &keywords.financial {
        if title_lower.contains(kw.as_str()) {
            score += 0.5;
        }
    }
    for kw in &keywords.china {
        if title_lower.contains(kw.as_str()) {
            score += 1.0;
        }
    }

    // 3) Content length.
    let content_len = title.chars().count() + summary.chars().count();
    if content_len >= 200 {
        score += 1.0;
    } else if content_len >= 100 {
        score += 0.5;
    }

    // 4) Recency.
    if let Some(pub_ts) = published_unix {
        let hours = (now_unix - pub_ts) as f32 / 3600.0;
        if hours <= 24.0 {
            score += 1.0;
        } else if hours <= 48.0 {
            score += 0.5;
        }
    }

    // 5) Title shape.
    let title_len = title.chars().count();
    if title_len > 30 && title_len < 100 {
        score += 0.5;
    }
    if title.contains(':') || title.contains('-') {
        score += 0.3;
    }
    if title.chars().any(|c| c.is_numeric()) {
        score += 0.2;
    }

    // 6) Category bonus.
    score += category_bonus(class);

    score.clamp(0.0, MAX_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::KeywordConfig;

    const HOUR: i64 = 3600;

    fn kw() -> ScoreKeywords {
        ScoreKeywords::default_seed()
    }

    #[test]
    fn rrr_cut_headline_scores_high() {
        // Source weight 0.9, summary length 180, published 2 hours ago.
        let title = "央行宣布降准0.25个百分点";
        let summary = "摘".repeat(180);
        let class = KeywordConfig::default_seed().classify(title, &summary);
        let now = 1_750_000_000;
        let s = importance_score(&kw(), title, &summary, 0.9, Some(now - 2 * HOUR), now, &class);
        assert!(s >= 6.6, "expected at least 6.6, got {s}");
        assert!(s <= 10.0);
    }

    #[test]
    fn score_is_always_within_bounds() {
        let loud = "突发紧急警告危机暴跌暴涨战冲突制裁政策央行利率gdp就业通胀中国人民币";
        let class = KeywordConfig::default_seed().classify(loud, loud);
        let now = 1_750_000_000;
        let s = importance_score(&kw(), loud, loud, 1.0, Some(now), now, &class);
        assert!(s <= 10.0);
        let quiet = importance_score(&kw(), "", "", 0.0, None, now, &Classification::default());
        assert!(quiet >= 0.0);
        assert_eq!(quiet, 0.0);
    }

    #[test]
    fn missing_timestamp_contributes_zero() {
        let now = 1_750_000_000;
        let with = importance_score(&kw(), "t", "", 0.5, Some(now - HOUR), now, &Classification::default());
        let without = importance_score(&kw(), "t", "", 0.5, None, now, &Classification::default());
        assert!((with - without - 1.0).abs() < 1e-6);
    }

    #[test]
    fn recency_tiers() {
        let now = 1_750_000_000;
        let base = |ts| importance_score(&kw(), "t", "", 0.0, ts, now, &Classification::default());
        assert_eq!(base(Some(now - 2 * HOUR)), 1.0);
        assert_eq!(base(Some(now - 36 * HOUR)), 0.5);
        assert_eq!(base(Some(now - 72 * HOUR)), 0.0);
    }

    #[test]
    fn uppercase_config_keywords_still_score() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("score_keywords.json");
        std::fs::write(&p, r#"{"urgency": ["GDP"]}"#).unwrap();
        let keywords = ScoreKeywords::load_from_file(&p);

        let now = 1_750_000_000;
        let s = importance_score(
            &keywords,
            "GDP growth slows",
            "",
            0.0,
            None,
            now,
            &Classification::default(),
        );
        // Only the urgency hit contributes.
        assert!((s - 1.0).abs() < 1e-6, "expected 1.0, got {s}");
    }

    #[test]
    fn title_shape_bonuses() {
        let now = 1_750_000_000;
        let class = Classification::default();
        let shaped = "Markets update: index moves 3 percent on rate talk";
        let s = importance_score(&kw(), shaped, "", 0.0, None, now, &class);
        // 30<len<100 (+0.5), ':' (+0.3), digit (+0.2), "market"/"stock"? not in title scan lists
        assert!((s - 1.0).abs() < 1e-6);
    }
}
