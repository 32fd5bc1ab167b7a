//! Feishu interactive-card payloads and the cosmetic markdown cleanup.
//!
//! Everything here is pure: builders in, serializable structs out. The
//! HTTP delivery lives in `webhook` and `app`.

use serde::Serialize;

pub const DAILY_TITLE: &str = "🌍 全球情报与金融分析日报";
pub const ALERT_TITLE: &str = "🚨 机器人故障警报";
const FOOTER_PREFIX: &str = "🤖 智能分析系统 | 📅 ";

#[derive(Debug, Serialize)]
pub struct CardMessage {
    pub msg_type: &'static str,
    pub card: Card,
}

#[derive(Debug, Serialize)]
pub struct Card {
    pub config: CardConfig,
    pub header: CardHeader,
    pub elements: Vec<Element>,
}

#[derive(Debug, Serialize)]
pub struct CardConfig {
    pub wide_screen_mode: bool,
}

#[derive(Debug, Serialize)]
pub struct CardHeader {
    pub template: &'static str,
    pub title: PlainText,
}

#[derive(Debug, Serialize)]
pub struct PlainText {
    pub content: String,
    pub tag: &'static str,
}

impl PlainText {
    fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tag: "plain_text",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum Element {
    Markdown { content: String },
    Note { elements: Vec<NoteElement> },
}

#[derive(Debug, Serialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum NoteElement {
    PlainText { content: String },
}

/// Feishu markdown renders our heading levels poorly, so headings become
/// bullet glyphs and horizontal rules become a single thin line. Order
/// matters: rules first, then deepest headings first.
pub fn clean_markdown(message: &str) -> String {
    message
        .replace("---", "\n──────\n")
        .replace("####", "###")
        .replace("###", "\n● ")
        .replace("##", "\n◆ ")
        .replace('#', "\n★ ")
}

/// Blue daily-report card. `generated_at` goes into the note footer.
pub fn daily_card(body: &str, generated_at: &str) -> CardMessage {
    card("blue", DAILY_TITLE, body, generated_at)
}

/// Red failure-notice card.
pub fn error_alert_card(error: &str, generated_at: &str) -> CardMessage {
    let body = format!(
        "**🚨 机器人故障警报**\n\n**错误详情**：{error}\n\n请及时检查机器人状态！"
    );
    card("red", ALERT_TITLE, &body, generated_at)
}

fn card(template: &'static str, title: &str, body: &str, generated_at: &str) -> CardMessage {
    CardMessage {
        msg_type: "interactive",
        card: Card {
            config: CardConfig {
                wide_screen_mode: true,
            },
            header: CardHeader {
                template,
                title: PlainText::new(title),
            },
            elements: vec![
                Element::Markdown {
                    content: body.to_string(),
                },
                Element::Note {
                    elements: vec![NoteElement::PlainText {
                        content: format!("{FOOTER_PREFIX}{generated_at}"),
                    }],
                },
            ],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_become_bullet_glyphs() {
        let input = "# top\n## mid\n### low\n#### lowest";
        let out = clean_markdown(input);
        assert!(out.contains("★ top"));
        assert!(out.contains("◆ mid"));
        assert!(out.contains("● low"));
        // #### collapses into ### first, then into the bullet.
        assert!(out.contains("● lowest"));
        assert!(!out.contains('#'));
    }

    #[test]
    fn horizontal_rules_collapse_to_one_line() {
        let out = clean_markdown("above\n---\nbelow");
        assert!(out.contains("──────"));
        assert!(!out.contains("---"));
    }

    #[test]
    fn daily_card_serializes_to_the_wire_shape() {
        let msg = daily_card("**hello**", "2026-01-02 03:04:05");
        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(v["msg_type"], "interactive");
        assert_eq!(v["card"]["config"]["wide_screen_mode"], true);
        assert_eq!(v["card"]["header"]["template"], "blue");
        assert_eq!(v["card"]["header"]["title"]["tag"], "plain_text");
        assert_eq!(v["card"]["elements"][0]["tag"], "markdown");
        assert_eq!(v["card"]["elements"][0]["content"], "**hello**");
        assert_eq!(v["card"]["elements"][1]["tag"], "note");
        let footer = v["card"]["elements"][1]["elements"][0]["content"]
            .as_str()
            .unwrap();
        assert!(footer.ends_with("2026-01-02 03:04:05"));
    }

    #[test]
    fn alert_card_uses_the_red_template() {
        let msg = error_alert_card("boom", "ts");
        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(v["card"]["header"]["template"], "red");
        assert!(v["card"]["elements"][0]["content"]
            .as_str()
            .unwrap()
            .contains("boom"));
    }
}
