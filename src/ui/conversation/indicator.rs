use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

const DOT_FRAMES: [&str; 4] = ["·  ", "·· ", "···", " ··"];

/// Animated dots shown while a request is in flight
#[derive(Debug, Clone, Default)]
pub struct LoadingIndicator {
    frame: usize,
    active: bool,
}

impl LoadingIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one animation step; inactive indicators reset to the first frame
    pub fn tick(&mut self, active: bool) {
        if active && self.active {
            self.frame = (self.frame + 1) % DOT_FRAMES.len();
        } else {
            self.frame = 0;
        }
        self.active = active;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn frame(&self) -> &'static str {
        DOT_FRAMES[self.frame]
    }
}

impl Widget for &LoadingIndicator {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if !self.active {
            return;
        }

        let line = Line::from(vec![
            Span::styled("🤖 ", Style::default().fg(Color::Green)),
            Span::styled(self.frame(), Style::default().fg(Color::Yellow)),
        ]);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn animates_only_while_active() {
        let mut indicator = LoadingIndicator::new();
        indicator.tick(true);
        assert_eq!(indicator.frame(), DOT_FRAMES[0]);
        indicator.tick(true);
        assert_eq!(indicator.frame(), DOT_FRAMES[1]);
        indicator.tick(false);
        assert!(!indicator.is_active());
        assert_eq!(indicator.frame(), DOT_FRAMES[0]);
    }
}
