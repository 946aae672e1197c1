//! 事件处理
//!
//! 轮询 crossterm 键盘事件，将 Ctrl+L、Ctrl+Q（或 Ctrl+C）转为 Command（Reset/Quit），F1–F4 转为示例请求，
//! F5 / Ctrl+O 切换活动面板与详情视图；其余按键交给 run_app 拼 input_buffer，Enter 时 send_submit。

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use crate::core::Command;

/// 应用事件：来自快捷键的 Command、视图切换或原始 KeyEvent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Command(Command),
    /// 提交第 n 个示例请求（0 起）
    Example(usize),
    ToggleActivity,
    ToggleDetails,
    Key(KeyEvent),
}

/// 按键到应用事件的映射（不含副作用）
pub fn map_key(key: KeyEvent) -> AppEvent {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('l') if ctrl => AppEvent::Command(Command::Reset),
        KeyCode::Char('q') | KeyCode::Char('c') if ctrl => AppEvent::Command(Command::Quit),
        KeyCode::Char('o') if ctrl => AppEvent::ToggleDetails,
        KeyCode::F(n @ 1..=4) => AppEvent::Example(usize::from(n - 1)),
        KeyCode::F(5) => AppEvent::ToggleActivity,
        _ => AppEvent::Key(key),
    }
}

/// 事件处理器：持有 cmd_tx，poll 时读键盘并返回 AppEvent，send_submit 发送用户输入
pub struct EventHandler {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl EventHandler {
    pub fn new(cmd_tx: mpsc::UnboundedSender<Command>) -> Self {
        Self { cmd_tx }
    }

    pub fn poll(&self) -> anyhow::Result<Option<AppEvent>> {
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(Some(self.handle_key(key)));
                }
            }
        }
        Ok(None)
    }

    fn handle_key(&self, key: KeyEvent) -> AppEvent {
        let ev = map_key(key);
        if let AppEvent::Command(cmd) = &ev {
            let _ = self.cmd_tx.send(cmd.clone());
        }
        ev
    }

    pub fn send_submit(&self, input: String) {
        let _ = self.cmd_tx.send(Command::Submit(input));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_shortcuts() {
        assert_eq!(
            map_key(key(KeyCode::Char('l'), KeyModifiers::CONTROL)),
            AppEvent::Command(Command::Reset)
        );
        assert_eq!(
            map_key(key(KeyCode::Char('q'), KeyModifiers::CONTROL)),
            AppEvent::Command(Command::Quit)
        );
        assert_eq!(map_key(key(KeyCode::F(1), KeyModifiers::NONE)), AppEvent::Example(0));
        assert_eq!(map_key(key(KeyCode::F(4), KeyModifiers::NONE)), AppEvent::Example(3));
        assert_eq!(map_key(key(KeyCode::F(5), KeyModifiers::NONE)), AppEvent::ToggleActivity);
        assert_eq!(
            map_key(key(KeyCode::Char('o'), KeyModifiers::CONTROL)),
            AppEvent::ToggleDetails
        );
    }

    #[test]
    fn test_plain_chars_pass_through() {
        let k = key(KeyCode::Char('l'), KeyModifiers::NONE);
        assert_eq!(map_key(k), AppEvent::Key(k));
    }

    #[test]
    fn test_reset_is_forwarded_to_runtime() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handler = EventHandler::new(tx);
        handler.handle_key(key(KeyCode::Char('l'), KeyModifiers::CONTROL));
        handler.handle_key(key(KeyCode::F(5), KeyModifiers::NONE));
        assert_eq!(rx.try_recv().unwrap(), Command::Reset);
        assert!(rx.try_recv().is_err());
    }
}
