//! 界面渲染
//!
//! 左侧为对话区（标题栏显示阶段；行程消息分为 Delta List 与 Validated Itinerary 两块，附调用链说明）、
//! 运行中的进度条与输入框；右侧边栏为快捷键、示例请求与工具活动面板。

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Gauge, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Frame,
};

use crate::core::{AgentPhase, UiState};
use crate::session::{ActivityLevel, ChatRole, SessionMessage, TurnMeta};

/// 侧边栏示例请求，F1–F4 依次提交
pub const EXAMPLE_PROMPTS: [&str; 4] = [
    "Plan a week-long Europe trip for a student on a $1,500 budget who loves history and food",
    "3-day Paris trip for art lovers with $800 budget",
    "5-day Tokyo itinerary for food enthusiasts, budget $2,000",
    "Weekend getaway to New York City, $500 budget, interested in museums and Broadway",
];

const WELCOME: &str = "👋 Welcome to Wayfarer, the multi-agent travel planner!\n\n\
I can help you create detailed, validated travel itineraries. Just describe:\n\
- Your destination(s)\n\
- Duration of trip\n\
- Budget\n\
- Your interests (history, food, art, nature, etc.)\n\n\
The Planner Agent drafts a day-by-day itinerary, then the Reviewer Agent fact-checks it with live web search.";

const INDENT: &str = "    ";

/// 视图开关（只影响展示，不进入会话状态）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewState {
    pub show_activity: bool,
    pub show_details: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            show_activity: true,
            show_details: false,
        }
    }
}

/// 将内容按宽度换行，支持 UTF-8（按字符数，避免在 UTF-8 中间截断）
fn wrap_text(s: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![s.to_string()];
    }
    let mut lines = Vec::new();
    for para in s.split('\n') {
        let mut line = String::new();
        for ch in para.chars() {
            if line.chars().count() >= width {
                lines.push(std::mem::take(&mut line));
            }
            line.push(ch);
        }
        lines.push(line);
    }
    lines
}

fn heading(text: &str, color: Color) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

fn body(lines: &mut Vec<Line<'static>>, text: &str, width: usize, style: Style) {
    for line in wrap_text(text, width) {
        lines.push(Line::from(vec![Span::raw(INDENT), Span::styled(line, style)]));
    }
}

/// 单条消息的展示行；show_details 时附上 Planner 原稿与 Reviewer 全文
fn message_lines(
    msg: &SessionMessage,
    meta: Option<&TurnMeta>,
    show_details: bool,
    width: usize,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    match msg.role {
        ChatRole::User => {
            lines.push(heading("You", Color::Cyan));
            body(&mut lines, &msg.content, width, Style::default());
        }
        ChatRole::Assistant if msg.is_itinerary() => {
            if let Some(delta) = &msg.delta_list {
                lines.push(heading("🔍 Changes Made (Delta List)", Color::Yellow));
                body(&mut lines, delta, width, Style::default().fg(Color::Yellow));
                lines.push(Line::from(""));
            }
            lines.push(heading("✅ Validated Itinerary", Color::Green));
            body(&mut lines, &msg.content, width, Style::default());
            if show_details {
                let dim = Style::default().fg(Color::Gray);
                if let Some(plan) = &msg.plan {
                    lines.push(Line::from(""));
                    lines.push(heading("📋 Original plan from Planner Agent", Color::Magenta));
                    body(&mut lines, plan, width, dim);
                }
                if let Some(review) = &msg.review {
                    lines.push(Line::from(""));
                    lines.push(heading("🔎 Full Reviewer output", Color::Magenta));
                    body(&mut lines, review, width, dim);
                }
            }
        }
        ChatRole::Assistant => {
            lines.push(heading("Wayfarer", Color::Red));
            body(&mut lines, &msg.content, width, Style::default().fg(Color::Red));
        }
    }
    if let Some(meta) = meta {
        lines.push(Line::from(Span::styled(
            format!("{INDENT}↳ {}", meta.trace),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }
    lines
}

/// 对话区全部展示行；空会话显示欢迎语，详情视图只展开最近一轮行程
pub fn conversation_lines(state: &UiState, view: &ViewState, width: usize) -> Vec<Line<'static>> {
    if state.history.is_empty() {
        let mut lines = Vec::new();
        body(&mut lines, WELCOME, width, Style::default().fg(Color::Gray));
        return lines;
    }
    let latest_itinerary = state.history.iter().rposition(SessionMessage::is_itinerary);
    let mut lines = Vec::new();
    for (idx, msg) in state.history.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::from(""));
        }
        let meta = state.meta.get(idx).and_then(Option::as_ref);
        let details = view.show_details && latest_itinerary == Some(idx);
        lines.extend(message_lines(msg, meta, details, width));
    }
    lines
}

fn draw_sidebar(f: &mut Frame, area: Rect, state: &UiState, view: &ViewState) {
    let activity_height = if view.show_activity {
        Constraint::Min(6)
    } else {
        Constraint::Length(0)
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Length(10), activity_height])
        .split(area);

    let key = Style::default().fg(Color::Yellow);
    let controls: Vec<Line> = [
        ("Ctrl+L", "Reset conversation"),
        ("F1–F4 ", "Example prompts"),
        ("F5    ", "Toggle tool activity"),
        ("Ctrl+O", "Plan / review details"),
        ("Ctrl+Q", "Quit"),
    ]
    .into_iter()
    .map(|(k, d)| Line::from(vec![Span::styled(k, key), Span::raw(format!("  {d}"))]))
    .collect();
    f.render_widget(
        Paragraph::new(controls).block(Block::default().title(" 📋 Session Controls ").borders(Borders::ALL)),
        chunks[0],
    );

    let examples: Vec<Line> = EXAMPLE_PROMPTS
        .iter()
        .enumerate()
        .map(|(i, p)| Line::from(vec![Span::styled(format!("F{} ", i + 1), key), Span::raw(*p)]))
        .collect();
    f.render_widget(
        Paragraph::new(examples)
            .wrap(Wrap { trim: true })
            .block(Block::default().title(" 💡 Example Prompts ").borders(Borders::ALL)),
        chunks[1],
    );

    if view.show_activity {
        let block = Block::default().title(" 🔧 Tool Activity ").borders(Borders::ALL);
        let visible = block.inner(chunks[2]).height as usize;
        let lines: Vec<Line> = if state.activity.is_empty() {
            vec![Line::from(Span::styled("No tool calls yet.", Style::default().fg(Color::DarkGray)))]
        } else {
            let skip = state.activity.len().saturating_sub(visible);
            state
                .activity
                .iter()
                .skip(skip)
                .map(|l| {
                    let style = match l.level {
                        ActivityLevel::Info => Style::default(),
                        ActivityLevel::Error => Style::default().fg(Color::Red),
                    };
                    Line::from(Span::styled(l.text.replace('\n', " "), style))
                })
                .collect()
        };
        f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }).block(block), chunks[2]);
    }
}

/// 绘制一帧；将 (总行数, 可视高度) 写入 out 供外部 clamp 滚动
pub fn draw(
    f: &mut Frame,
    state: &UiState,
    view: &ViewState,
    input_buffer: &str,
    conversation_scroll: usize,
    out: &mut (usize, usize),
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
        .split(f.area());

    let gauge_height = if state.phase.is_busy() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),
            Constraint::Length(gauge_height),
            Constraint::Length(5),
        ])
        .split(columns[0]);

    let conv_area = chunks[0];
    let content_width = conv_area.width.saturating_sub(2).saturating_sub(1) as usize; // 边框 + 滚动条
    let text_width = content_width.saturating_sub(INDENT.len()).max(20);

    let title = format!(" ✈ Wayfarer │ {} ", state.phase.label());
    let border = if state.phase == AgentPhase::Error {
        Color::Red
    } else {
        Color::Yellow
    };
    let block = Block::default()
        .title(title)
        .title_bottom(Line::from(Span::styled(
            " Planner Agent drafts → Reviewer Agent fact-checks ",
            Style::default().fg(Color::DarkGray),
        )))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let text_lines = conversation_lines(state, view, text_width);
    let content_height = conv_area.height.saturating_sub(2) as usize; // 边框
    let total_lines = text_lines.len();
    let max_scroll = total_lines.saturating_sub(content_height);
    let scroll_offset = conversation_scroll.min(max_scroll);

    let inner = block.inner(conv_area);
    let paragraph = Paragraph::new(Text::from(text_lines))
        .block(block)
        .scroll((scroll_offset as u16, 0));
    f.render_widget(paragraph, conv_area);

    if total_lines > content_height {
        let mut scrollbar_state = ScrollbarState::new(total_lines)
            .position(scroll_offset)
            .viewport_content_length(content_height);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .thumb_symbol("█")
            .track_symbol(Some("░"));
        f.render_stateful_widget(scrollbar, inner, &mut scrollbar_state);
    }

    if state.phase.is_busy() {
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL))
            .gauge_style(Style::default().fg(Color::Cyan))
            .percent(state.progress.min(100))
            .label(state.phase.label());
        f.render_widget(gauge, chunks[1]);
    }

    let input_prompt = if let Some(err) = &state.error_message {
        format!(" Error: {} ", err.chars().take(48).collect::<String>())
    } else if state.input_locked {
        " Working… ".to_string()
    } else {
        " Describe your trip ".to_string()
    };
    let border_color = if state.error_message.is_some() {
        Color::Red
    } else {
        Color::Blue
    };
    let hint = " Enter send │ ↑↓ PgUp/PgDn scroll │ Ctrl+Q quit ";
    let input_block = Block::default()
        .title(input_prompt)
        .title_bottom(Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    let input = Paragraph::new(input_buffer)
        .block(input_block)
        .wrap(Wrap { trim: false })
        .style(if state.input_locked {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        });
    f.render_widget(input, chunks[2]);

    draw_sidebar(f, columns[1], state, view);

    out.0 = total_lines;
    out.1 = content_height;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{ActivityLine, TRACE_OK};

    fn plain(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect()
    }

    fn itinerary_state() -> UiState {
        let mut reply = SessionMessage::assistant("**Day 1**\n- 14:00 Louvre\n\n- 19:00 Dinner");
        reply.delta_list = Some("- Louvre at 8 PM: closes at 6 PM → Move to 2 PM".into());
        reply.plan = Some("PLAN TEXT".into());
        reply.review = Some("REVIEW TEXT".into());
        UiState {
            history: vec![SessionMessage::user("Paris"), reply],
            meta: vec![None, Some(TurnMeta::trace(TRACE_OK))],
            ..UiState::default()
        }
    }

    #[test]
    fn test_welcome_when_empty() {
        let lines = plain(&conversation_lines(&UiState::default(), &ViewState::default(), 200));
        assert!(lines[0].contains("Welcome to Wayfarer"));
    }

    #[test]
    fn test_itinerary_rendered_verbatim() {
        let state = itinerary_state();
        let lines = plain(&conversation_lines(&state, &ViewState::default(), 200));
        let itinerary = &state.history[1].content;
        for expected in itinerary.split('\n') {
            assert!(
                lines.iter().any(|l| l == &format!("{INDENT}{expected}")),
                "missing line {expected:?}"
            );
        }
        assert!(lines.iter().any(|l| l.contains("Changes Made (Delta List)")));
        assert!(lines.iter().any(|l| l.ends_with("↳ Planner Agent → Reviewer Agent")));
        assert!(!lines.iter().any(|l| l.contains("PLAN TEXT")));
    }

    #[test]
    fn test_details_show_plan_and_review() {
        let view = ViewState {
            show_details: true,
            ..ViewState::default()
        };
        let lines = plain(&conversation_lines(&itinerary_state(), &view, 200));
        assert!(lines.iter().any(|l| l.contains("PLAN TEXT")));
        assert!(lines.iter().any(|l| l.contains("REVIEW TEXT")));
    }

    #[test]
    fn test_wrap_counts_chars() {
        assert_eq!(wrap_text("ééééé", 2), vec!["éé", "éé", "é"]);
        assert_eq!(wrap_text("a\n\nb", 10), vec!["a", "", "b"]);
    }

    #[test]
    fn test_draw_smoke() {
        use ratatui::{backend::TestBackend, Terminal};

        let mut state = itinerary_state();
        state.phase = AgentPhase::Reviewing;
        state.progress = 40;
        state.activity = vec![ActivityLine {
            level: ActivityLevel::Error,
            text: "internet_search error: boom".into(),
        }];
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        let mut out = (0, 0);
        terminal
            .draw(|f| draw(f, &state, &ViewState::default(), "", usize::MAX, &mut out))
            .unwrap();
        assert!(out.0 > 0);
        assert!(out.1 > 0);
    }
}
