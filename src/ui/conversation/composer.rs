use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Result returned when the user interacts with the composer
#[derive(Debug, PartialEq, Eq)]
pub enum ComposerResult {
    Submit,
    Edited,
    None,
}

/// Single-line input for the draft message.
///
/// The draft text itself lives in the chat session; the composer only keeps
/// the cursor, counted in characters.
#[derive(Debug, Clone, Default)]
pub struct ConversationComposer {
    cursor: usize,
}

impl ConversationComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Handle key input against the draft
    pub fn handle_key(&mut self, key: KeyEvent, draft: &mut String) -> ComposerResult {
        if key.kind != KeyEventKind::Press {
            return ComposerResult::None;
        }

        self.cursor = self.cursor.min(draft.chars().count());

        match key.code {
            KeyCode::Enter => return ComposerResult::Submit,
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                draft.insert(byte_index(draft, self.cursor), c);
                self.cursor += 1;
            }
            KeyCode::Backspace => {
                if self.cursor == 0 {
                    return ComposerResult::None;
                }
                self.cursor -= 1;
                draft.remove(byte_index(draft, self.cursor));
            }
            KeyCode::Delete => {
                if self.cursor >= draft.chars().count() {
                    return ComposerResult::None;
                }
                draft.remove(byte_index(draft, self.cursor));
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                return ComposerResult::None;
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(draft.chars().count());
                return ComposerResult::None;
            }
            KeyCode::Home => {
                self.cursor = 0;
                return ComposerResult::None;
            }
            KeyCode::End => {
                self.cursor = draft.chars().count();
                return ComposerResult::None;
            }
            _ => return ComposerResult::None,
        }

        ComposerResult::Edited
    }

    /// Widget view of the composer over the given draft
    pub fn view<'a>(
        &'a self,
        draft: &'a str,
        placeholder: &'a str,
        busy: bool,
    ) -> ComposerView<'a> {
        ComposerView {
            draft,
            placeholder,
            cursor: self.cursor,
            busy,
        }
    }
}

fn byte_index(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map_or(text.len(), |(index, _)| index)
}

pub struct ComposerView<'a> {
    draft: &'a str,
    placeholder: &'a str,
    cursor: usize,
    busy: bool,
}

impl Widget for ComposerView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (title, border) = if self.busy {
            ("✉ Waiting for reply", Style::default().fg(Color::DarkGray))
        } else {
            ("✉ Message (Enter to send)", Style::default().fg(Color::Cyan))
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(title);
        let inner = block.inner(area);
        block.render(area, buf);

        let line = if self.draft.is_empty() {
            Line::from(vec![Span::styled(
                self.placeholder,
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )])
        } else {
            let chars: Vec<char> = self.draft.chars().collect();
            let cursor = self.cursor.min(chars.len());
            let before: String = chars[..cursor].iter().collect();
            let at: String = chars.get(cursor).map_or(" ".to_string(), |c| c.to_string());
            let after: String = chars
                .get(cursor + 1..)
                .map_or(String::new(), |rest| rest.iter().collect());
            Line::from(vec![
                Span::raw(before),
                Span::styled(at, Style::default().add_modifier(Modifier::REVERSED)),
                Span::raw(after),
            ])
        };

        buf.set_line(inner.x, inner.y, &line, inner.width);
    }
}
