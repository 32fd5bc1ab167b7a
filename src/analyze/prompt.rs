//! Prompt assembly: pure string builders, no I/O.

use crate::ingest::types::NewsItem;

/// Persona and output-format contract for the per-batch analysis call.
pub const SYSTEM_PROMPT: &str = r#"# Role
你是一名宏观策略首席分析师，读者是身在中国、时间极其有限的资深从业者。
任务：透视新闻表象，给出简洁冷静的判断。

# Constraints
1. 极度精简，电报风格，全篇控制在 300 字以内。
2. 只要结论，不要背景铺垫。
3. 时间一律输出北京时间 (YYYY-MM-DD HH:mm)。
4. 严禁输出任何 "---" 分割线。
5. 重复话题必须合并为一条。

# Output (Markdown)
### [情绪分 | 分数] 新闻标题 (中文，加粗)

> [🔗 直达原新闻](新闻URL)

* **📍 核心事实**：一句话概括 (Who + What)。
* **🇨🇳 中国影响**：短期冲击与长期含义各一句。
* **📉 股市钱包**：利好/利空板块。
* **🛑 操作建议**：[空仓/止盈/抄底/观望] + 一句话理由。"#;

/// Persona for the cross-batch merge call.
pub const MERGE_SYSTEM_PROMPT: &str = "你是一名资深财经编辑。\
把多段分析报告合并为一份连贯的报告：去掉重复话题，保留每条的格式，\
按重要性排序，不要新增内容。";

/// Render one batch of items as the user-message body. `price_hints[i]`
/// is an optional live quote for item `i`, appended to its title.
pub fn batch_content(items: &[NewsItem], price_hints: &[Option<String>]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        let price = price_hints
            .get(i)
            .and_then(|p| p.as_deref())
            .map(|p| format!(" (当前价格：{p})"))
            .unwrap_or_default();
        out.push_str(&format!(
            "**ID**: {}\n**标题**: {}{}\n**摘要**: {}\n**链接**: {}\n\n",
            i + 1,
            item.title,
            price,
            item.summary,
            item.link
        ));
    }
    out
}

pub fn batch_user_message(items: &[NewsItem], content: &str) -> String {
    format!(
        "请分析以下新闻（共{}条），对重复话题进行合并，为每条新闻添加情绪评分：\n\n{}",
        items.len(),
        content
    )
}

pub fn merge_user_message(parts: &[String]) -> String {
    let mut msg = String::from("请把以下几段分析报告合并为一份：\n\n");
    for (i, part) in parts.iter().enumerate() {
        msg.push_str(&format!("## 第{}段\n{}\n\n", i + 1, part));
    }
    msg
}

/// Minimal templated report used when the model is unreachable. Covers the
/// top three items so the delivery still carries something useful.
pub fn fallback_report(items: &[NewsItem]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().take(3).enumerate() {
        let summary: String = item.summary.chars().take(30).collect();
        out.push_str(&format!(
            "### {}. [点击直达：{}]({})\n",
            i + 1,
            item.title,
            item.link
        ));
        out.push_str(&format!("- **📝 核心事实**: {summary}...\n"));
        out.push_str("- **📊 深度研报**: 暂不可用，请点击原文。\n\n");
    }
    out
}
