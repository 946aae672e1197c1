//! Reviewer 输出切分：Delta List 与 Validated Itinerary
//!
//! Reviewer 的输出是约定格式的自然语言，不是严格的语法。按标题做尽力而为的切分：
//! 1. 没有 "Delta List" 标记 → 原文整体作为行程，无修订清单
//! 2. 依次尝试加粗标题 `**Validated Itinerary**`、编号标题 `2. Validated Itinerary`、Markdown 标题
//!    `## Validated Itinerary`；第一个命中且其后有内容的标记把文本切成两段
//! 3. 都未命中 → 同 1
//!
//! 切分失败不是错误，静默退化为整段展示。

use std::sync::OnceLock;

use regex::Regex;

const DELTA_MARKER: &str = "Delta List";

/// 切分结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSections {
    pub delta_list: Option<String>,
    pub itinerary: String,
}

impl ReviewSections {
    fn unsplit(text: &str) -> Self {
        Self {
            delta_list: None,
            itinerary: text.to_string(),
        }
    }
}

/// 行程标题的候选写法，按优先级排列
fn itinerary_markers() -> &'static [Regex] {
    static MARKERS: OnceLock<Vec<Regex>> = OnceLock::new();
    MARKERS.get_or_init(|| {
        [
            r"\*\*(?:2\.[ \t]*)?Validated Itinerary[ \t]*:?\*\*:?",
            r"(?m)^[ \t]*2\.[ \t]*Validated Itinerary\b[^\n]*",
            r"(?m)^[ \t]*#{1,6}[ \t]*(?:2\.[ \t]*)?Validated Itinerary\b[^\n]*",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("static itinerary marker regex"))
        .collect()
    })
}

/// Delta List 标题行（可带编号、加粗、Markdown 井号、括号说明、冒号）
fn delta_heading() -> &'static Regex {
    static HEADING: OnceLock<Regex> = OnceLock::new();
    HEADING.get_or_init(|| {
        Regex::new(
            r"(?m)^[ \t]*(?:#{1,6}[ \t]*)?(?:1\.[ \t]*)?(?:\*\*)?(?:1\.[ \t]*)?Delta List(?:[ \t]*\([^)\n]*\))?[ \t]*:?(?:\*\*)?:?[ \t]*",
        )
        .expect("static delta heading regex")
    })
}

/// 去掉切分点前残留的 "2." / "###" 之类标题前缀行
fn strip_dangling_prefix(before: &str) -> &str {
    let trimmed = before.trim_end();
    let (head, last) = match trimmed.rsplit_once('\n') {
        Some((head, last)) => (head, last),
        None => ("", trimmed),
    };
    let last = last.trim();
    let is_prefix = (last.contains('#') || last.ends_with('.'))
        && last
            .chars()
            .all(|c| c == '#' || c == '.' || c.is_ascii_digit() || c.is_whitespace());
    if is_prefix {
        head
    } else {
        trimmed
    }
}

fn clean_delta(before: &str) -> Option<String> {
    let body = strip_dangling_prefix(before);
    let body = delta_heading().replace_all(body, "");
    let body = body
        .replace("**Delta List**", "")
        .replace(DELTA_MARKER, "");
    let body = body.trim();
    if body.is_empty() {
        None
    } else {
        Some(body.to_string())
    }
}

/// 把 Reviewer 的输出切成 (修订清单, 行程)
pub fn parse_review(text: &str) -> ReviewSections {
    if !text.contains(DELTA_MARKER) {
        return ReviewSections::unsplit(text);
    }
    for marker in itinerary_markers() {
        let Some(m) = marker.find(text) else {
            continue;
        };
        let itinerary = text[m.end()..].trim();
        if itinerary.is_empty() {
            continue;
        }
        return ReviewSections {
            delta_list: clean_delta(&text[..m.start()]),
            itinerary: itinerary.to_string(),
        };
    }
    ReviewSections::unsplit(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_delta_heading_returns_input() {
        let text = "Looks great, no changes needed.";
        assert_eq!(
            parse_review(text),
            ReviewSections {
                delta_list: None,
                itinerary: text.to_string()
            }
        );
    }

    #[test]
    fn test_bold_headings() {
        let text = "**Delta List**\n- issue: reason → fix\n**Validated Itinerary**\nDay 1: ...";
        let out = parse_review(text);
        assert_eq!(out.delta_list.as_deref(), Some("- issue: reason → fix"));
        assert!(out.itinerary.starts_with("Day 1: ..."));
    }

    #[test]
    fn test_numbered_bold_headings() {
        let text = "1. **Delta List**\n- Louvre at 8 PM: closes at 6 PM → Move to 2 PM\n\n2. **Validated Itinerary**\n**Day 1**\n- 14:00 Louvre";
        let out = parse_review(text);
        assert_eq!(
            out.delta_list.as_deref(),
            Some("- Louvre at 8 PM: closes at 6 PM → Move to 2 PM")
        );
        assert_eq!(out.itinerary, "**Day 1**\n- 14:00 Louvre");
    }

    #[test]
    fn test_numbered_plain_headings() {
        let text = "1. Delta List (if issues found)\n- a: b → c\n2. Validated Itinerary:\nDay 1: Rome";
        let out = parse_review(text);
        assert_eq!(out.delta_list.as_deref(), Some("- a: b → c"));
        assert_eq!(out.itinerary, "Day 1: Rome");
    }

    #[test]
    fn test_markdown_headings() {
        let text = "## Delta List\n- a: b → c\n\n## Validated Itinerary\nDay 1: Kyoto";
        let out = parse_review(text);
        assert_eq!(out.delta_list.as_deref(), Some("- a: b → c"));
        assert_eq!(out.itinerary, "Day 1: Kyoto");
    }

    #[test]
    fn test_bold_heading_with_markdown_prefix() {
        let text = "### **Delta List**\n- x → y\n\n### **Validated Itinerary**\nDay 1";
        let out = parse_review(text);
        assert_eq!(out.delta_list.as_deref(), Some("- x → y"));
        assert_eq!(out.itinerary, "Day 1");
    }

    #[test]
    fn test_delta_without_itinerary_heading_falls_back() {
        let text = "**Delta List**\n- a → b\nThe rest of the plan is fine.";
        assert_eq!(parse_review(text), ReviewSections::unsplit(text));
    }

    #[test]
    fn test_empty_itinerary_section_falls_back() {
        let text = "**Delta List**\n- a → b\n**Validated Itinerary**\n   ";
        assert_eq!(parse_review(text), ReviewSections::unsplit(text));
    }

    #[test]
    fn test_empty_delta_section_is_none() {
        let out = parse_review("**Delta List**\n\n**Validated Itinerary**\nDay 1");
        assert_eq!(out.delta_list, None);
        assert_eq!(out.itinerary, "Day 1");
    }

    #[test]
    fn test_later_mentions_stay_in_itinerary() {
        let text = "**Delta List**\n- a → b\n**Validated Itinerary**\nDay 1\nNote: see the Validated Itinerary above.";
        let out = parse_review(text);
        assert_eq!(out.itinerary, "Day 1\nNote: see the Validated Itinerary above.");
    }

    #[test]
    fn test_itinerary_is_stable_under_reparse() {
        let first = parse_review("**Delta List**\n- a → b\n**Validated Itinerary**\nDay 1: Lisbon");
        let second = parse_review(&first.itinerary);
        assert_eq!(second.itinerary, first.itinerary);
        assert_eq!(second.delta_list, None);
    }
}
