use crate::config::UiConfig;
use crate::controller::{ConversationController, DispatchStatus};
use crate::ui::conversation::{
    ComposerResult, ConversationComposer, ConversationHistory, HistoryState, LoadingIndicator,
};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{StatefulWidget, Widget},
};
use tracing::debug;

const PAGE_LINES: usize = 10;

/// Actions that can be requested by the conversation manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationAction {
    None,
    Exit,
}

/// Ties the controller to the terminal widgets
pub struct ConversationManager {
    controller: ConversationController,
    history: HistoryState,
    composer: ConversationComposer,
    indicator: LoadingIndicator,
    ui: UiConfig,
}

impl ConversationManager {
    pub fn new(controller: ConversationController, ui: UiConfig) -> Self {
        Self {
            controller,
            history: HistoryState::new(),
            composer: ConversationComposer::new(),
            indicator: LoadingIndicator::new(),
            ui,
        }
    }

    pub fn controller(&self) -> &ConversationController {
        &self.controller
    }

    pub fn history_state(&self) -> &HistoryState {
        &self.history
    }

    /// Called once per UI tick: folds in a finished request and animates
    pub fn tick(&mut self) -> bool {
        let settled = self.controller.poll_settlement();
        if settled {
            self.history.clear_selection();
            self.history.scroll_to_bottom();
        }
        self.indicator.tick(self.controller.is_request_in_flight());
        settled
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ConversationAction {
        if key.kind != KeyEventKind::Press {
            return ConversationAction::None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return ConversationAction::Exit;
        }

        let suggestion_count = self.controller.latest_suggestions().map_or(0, <[String]>::len);

        match key.code {
            KeyCode::Tab => {
                self.history.cycle_suggestion(suggestion_count, true);
                return ConversationAction::None;
            }
            KeyCode::BackTab => {
                self.history.cycle_suggestion(suggestion_count, false);
                return ConversationAction::None;
            }
            KeyCode::Esc => {
                if self.history.selected_suggestion().is_some() {
                    self.history.clear_selection();
                    return ConversationAction::None;
                }
                if self.controller.draft().is_empty() {
                    return ConversationAction::Exit;
                }
                return ConversationAction::None;
            }
            KeyCode::PageUp => {
                self.history.scroll_up(PAGE_LINES);
                return ConversationAction::None;
            }
            KeyCode::PageDown => {
                self.history.scroll_down(PAGE_LINES);
                return ConversationAction::None;
            }
            _ => {}
        }

        match self.composer.handle_key(key, self.controller.draft_mut()) {
            ComposerResult::Submit => self.submit(),
            // Typed text takes precedence over a highlighted suggestion.
            ComposerResult::Edited => self.history.clear_selection(),
            ComposerResult::None => {}
        }
        ConversationAction::None
    }

    fn submit(&mut self) {
        if self.controller.is_request_in_flight() {
            return;
        }

        let selected = self
            .history
            .selected_suggestion()
            .filter(|_| self.controller.draft().trim().is_empty())
            .and_then(|index| self.controller.latest_suggestions()?.get(index).cloned());

        let status = match selected {
            Some(label) => self.controller.select_suggestion(&label),
            None => self.controller.submit_draft(),
        };
        debug!(?status, "submission handled");

        if status != DispatchStatus::Blank {
            self.history.clear_selection();
            self.history.scroll_to_bottom();
        }
        self.indicator.tick(self.controller.is_request_in_flight());
    }

    /// Render the conversation UI components
    pub fn render(&mut self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Min(5),    // History
                Constraint::Length(1), // Loading indicator
                Constraint::Length(3), // Composer
            ])
            .split(area);

        let header = Line::from(vec![
            Span::styled(self.ui.title.as_str(), Style::default().fg(Color::Magenta)),
            Span::raw("  "),
            Span::styled(self.ui.subtitle.as_str(), Style::default().fg(Color::DarkGray)),
        ]);
        buf.set_line(chunks[0].x, chunks[0].y, &header, chunks[0].width);

        ConversationHistory::new(self.controller.transcript(), "Conversation").render(
            chunks[1],
            buf,
            &mut self.history,
        );
        (&self.indicator).render(chunks[2], buf);
        self.composer
            .view(
                self.controller.draft(),
                &self.ui.placeholder,
                self.controller.is_request_in_flight(),
            )
            .render(chunks[3], buf);
    }
}
