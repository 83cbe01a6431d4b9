//! Conversation history display component

use crate::transcript::{EntryContent, Sender, Transcript, TranscriptEntry};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, StatefulWidget, Widget},
};

/// Scroll and suggestion-selection state for the history pane
#[derive(Debug, Clone, Default)]
pub struct HistoryState {
    /// Lines scrolled up from the bottom
    scroll_offset: usize,
    /// Highlighted label in the latest suggestion set
    selected_suggestion: Option<usize>,
}

impl HistoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn selected_suggestion(&self) -> Option<usize> {
        self.selected_suggestion
    }

    /// Move the highlight through `count` suggestions, wrapping at both ends
    pub fn cycle_suggestion(&mut self, count: usize, forward: bool) {
        if count == 0 {
            self.selected_suggestion = None;
            return;
        }
        self.selected_suggestion = Some(match (self.selected_suggestion, forward) {
            (None, true) => 0,
            (None, false) => count - 1,
            (Some(i), true) => (i + 1) % count,
            (Some(i), false) => (i + count - 1) % count,
        });
    }

    pub fn clear_selection(&mut self) {
        self.selected_suggestion = None;
    }
}

/// Conversation history widget, rendered from the transcript
pub struct ConversationHistory<'a> {
    transcript: &'a Transcript,
    title: &'a str,
}

impl<'a> ConversationHistory<'a> {
    pub fn new(transcript: &'a Transcript, title: &'a str) -> Self {
        Self { transcript, title }
    }
}

impl StatefulWidget for ConversationHistory<'_> {
    type State = HistoryState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut HistoryState) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("📖 {}", self.title));

        let inner_area = block.inner(area);
        block.render(area, buf);

        if self.transcript.is_empty() {
            let welcome_lines = vec![
                Line::from(vec![Span::styled(
                    "Ask anything about the collection.",
                    Style::default().fg(Color::Green),
                )]),
                Line::from(vec![Span::raw("")]),
                Line::from(vec![Span::styled(
                    "Enter to send · Tab to pick a suggestion · Ctrl+C to quit",
                    Style::default().fg(Color::DarkGray),
                )]),
            ];

            for (i, line) in welcome_lines.iter().enumerate() {
                if i < inner_area.height as usize {
                    buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
                }
            }
            state.scroll_offset = 0;
            return;
        }

        let width = inner_area.width.saturating_sub(2) as usize;
        let last_index = self.transcript.len() - 1;
        let mut all_lines: Vec<Line> = Vec::new();
        for (index, entry) in self.transcript.iter().enumerate() {
            let selected = if index == last_index {
                state.selected_suggestion
            } else {
                None
            };
            all_lines.extend(render_entry(entry, width, selected));
            all_lines.push(Line::from(vec![Span::raw("")]));
        }

        let height = inner_area.height as usize;
        let total = all_lines.len();
        // Scrolling past the first line is clamped so PageDown reacts immediately.
        state.scroll_offset = state.scroll_offset.min(total.saturating_sub(height));
        let end = total - state.scroll_offset;
        let start = end.saturating_sub(height);

        for (i, line) in all_lines[start..end].iter().enumerate() {
            buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
        }
    }
}

/// Render a single entry into lines
fn render_entry(
    entry: &TranscriptEntry,
    width: usize,
    selected: Option<usize>,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if !matches!(entry.content, EntryContent::SuggestionSet(_)) {
        let role_icon = match entry.sender {
            Sender::User => "👤",
            Sender::Agent => "🤖",
        };
        let timestamp = entry.timestamp.format("%H:%M:%S").to_string();
        lines.push(Line::from(vec![Span::styled(
            format!("{} {} {}", role_icon, timestamp, "─".repeat(20)),
            Style::default().fg(Color::DarkGray),
        )]));
    }

    match &entry.content {
        EntryContent::PlainText(text) => {
            let words = vec![(text.clone(), content_style(entry.sender))];
            lines.extend(indent(wrap_spans(&words, width)));
        }
        EntryContent::RenderedMarkup(markup) => {
            let mut body = Vec::new();
            for block in markup_lines(markup) {
                if block.preformatted {
                    let spans: Vec<Span<'static>> = block
                        .spans
                        .into_iter()
                        .map(|(text, style)| Span::styled(text, style))
                        .collect();
                    body.push(Line::from(spans));
                    continue;
                }
                body.extend(wrap_spans(&block.spans, width));
            }
            lines.extend(indent(body));
        }
        EntryContent::SuggestionSet(labels) => {
            lines.extend(indent(suggestion_chips(labels, width, selected)));
        }
    }

    lines
}

fn indent(lines: Vec<Line<'static>>) -> Vec<Line<'static>> {
    lines
        .into_iter()
        .map(|line| {
            let mut spans = vec![Span::raw("  ")];
            spans.extend(line.spans);
            Line::from(spans)
        })
        .collect()
}

/// Get content style based on sender
fn content_style(sender: Sender) -> Style {
    match sender {
        Sender::User => Style::default().fg(Color::Blue),
        Sender::Agent => Style::default().fg(Color::Green),
    }
}

/// Lay out suggestion labels as bracketed chips, wrapping at `width`
fn suggestion_chips(
    labels: &[String],
    width: usize,
    selected: Option<usize>,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut used = 0;

    for (i, label) in labels.iter().enumerate() {
        let chip = format!("[ {} ]", label);
        let chip_width = chip.chars().count();
        if used > 0 && used + chip_width + 1 > width {
            lines.push(Line::from(std::mem::take(&mut current)));
            used = 0;
        }
        if used > 0 {
            current.push(Span::raw(" "));
            used += 1;
        }
        let style = if selected == Some(i) {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Yellow)
        };
        current.push(Span::styled(chip, style));
        used += chip_width;
    }
    if !current.is_empty() {
        lines.push(Line::from(current));
    }
    lines
}

/// Word-wrap styled text to fit within the given width.
///
/// Breaks only where the text has whitespace; fragments from adjacent spans
/// with no whitespace between them stay glued together.
fn wrap_spans(spans: &[(String, Style)], width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut used = 0;
    let mut pending_space = false;

    for (text, style) in spans {
        let mut rest = text.as_str();
        while !rest.is_empty() {
            let trimmed = rest.trim_start();
            if trimmed.len() != rest.len() {
                pending_space = true;
                rest = trimmed;
                continue;
            }

            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let (word, tail) = rest.split_at(end);
            rest = tail;

            let word_width = word.chars().count();
            if pending_space && used > 0 {
                if width > 0 && used + 1 + word_width > width {
                    lines.push(Line::from(std::mem::take(&mut current)));
                    used = 0;
                } else {
                    current.push(Span::raw(" "));
                    used += 1;
                }
            }
            pending_space = false;
            current.push(Span::styled(word.to_string(), *style));
            used += word_width;
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(Line::from(current));
    }
    lines
}

/// One visual block extracted from rendered markup
#[derive(Debug, Clone, PartialEq)]
pub struct MarkupLine {
    pub spans: Vec<(String, Style)>,
    pub preformatted: bool,
}

impl MarkupLine {
    /// Unstyled text of the line; runs of whitespace collapse outside code blocks
    pub fn plain_text(&self) -> String {
        let text: String = self.spans.iter().map(|(text, _)| text.as_str()).collect();
        if self.preformatted {
            text
        } else {
            text.split_whitespace().collect::<Vec<_>>().join(" ")
        }
    }
}

/// Lay out HTML produced by the Markdown renderer as styled terminal lines.
///
/// Only the tag set the renderer emits is recognized; anything else is
/// dropped and its text kept.
pub fn markup_lines(markup: &str) -> Vec<MarkupLine> {
    let mut out = Vec::new();
    let mut current: Vec<(String, Style)> = Vec::new();
    let mut bold = 0usize;
    let mut italic = 0usize;
    let mut code = 0usize;
    let mut pre = false;
    let mut quote = 0usize;
    let mut rest = markup;

    let style = |bold: usize, italic: usize, code: usize, quote: usize| {
        let mut style = Style::default().fg(Color::Green);
        if bold > 0 {
            style = style.add_modifier(Modifier::BOLD);
        }
        if italic > 0 {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if code > 0 {
            style = style.fg(Color::Cyan);
        }
        if quote > 0 {
            style = style.fg(Color::Gray).add_modifier(Modifier::ITALIC);
        }
        style
    };

    fn flush(out: &mut Vec<MarkupLine>, current: &mut Vec<(String, Style)>, preformatted: bool) {
        if current.iter().any(|(text, _)| !text.trim().is_empty()) || preformatted {
            out.push(MarkupLine {
                spans: std::mem::take(current),
                preformatted,
            });
        } else {
            current.clear();
        }
    }

    while !rest.is_empty() {
        let (text, tag) = match rest.find('<') {
            Some(0) => match rest.find('>') {
                Some(close) => {
                    let tag = &rest[1..close];
                    rest = &rest[close + 1..];
                    ("", Some(tag))
                }
                None => {
                    let text = rest;
                    rest = "";
                    (text, None)
                }
            },
            Some(open) => {
                let text = &rest[..open];
                rest = &rest[open..];
                (text, None)
            }
            None => {
                let text = rest;
                rest = "";
                (text, None)
            }
        };

        if !text.is_empty() {
            let decoded = decode_entities(text);
            let current_style = style(bold, italic, code, quote);
            if pre {
                let mut pieces = decoded.split('\n').peekable();
                while let Some(piece) = pieces.next() {
                    if !piece.is_empty() {
                        current.push((piece.to_string(), current_style));
                    }
                    if pieces.peek().is_some() {
                        flush(&mut out, &mut current, true);
                    }
                }
            } else {
                current.push((decoded.replace('\n', " "), current_style));
            }
        }

        let Some(tag) = tag else { continue };
        let closing = tag.starts_with('/');
        let name = tag
            .trim_start_matches('/')
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();

        match (name.as_str(), closing) {
            ("strong" | "b" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th", false) => bold += 1,
            ("strong" | "b", true) => bold = bold.saturating_sub(1),
            ("th", true) => {
                bold = bold.saturating_sub(1);
                current.push((" │ ".to_string(), Style::default().fg(Color::DarkGray)));
            }
            ("h1" | "h2" | "h3" | "h4" | "h5" | "h6", true) => {
                bold = bold.saturating_sub(1);
                flush(&mut out, &mut current, false);
            }
            ("em" | "i", false) => italic += 1,
            ("em" | "i", true) => italic = italic.saturating_sub(1),
            ("code", false) => code += 1,
            ("code", true) => code = code.saturating_sub(1),
            ("pre", false) => {
                flush(&mut out, &mut current, false);
                pre = true;
            }
            ("pre", true) => {
                if !current.is_empty() {
                    flush(&mut out, &mut current, true);
                }
                pre = false;
            }
            ("blockquote", false) => quote += 1,
            ("blockquote", true) => quote = quote.saturating_sub(1),
            ("li", false) => {
                flush(&mut out, &mut current, false);
                current.push(("• ".to_string(), style(bold, italic, code, quote)));
            }
            ("br", _) | ("hr", _) => flush(&mut out, &mut current, false),
            ("td", true) => {
                current.push((" │ ".to_string(), Style::default().fg(Color::DarkGray)));
            }
            ("p", false) => {}
            ("p" | "li" | "tr" | "ul" | "ol" | "table", _) => flush(&mut out, &mut current, false),
            _ => {}
        }
    }
    flush(&mut out, &mut current, false);
    out
}

// The renderer only ever escapes these; other references are already decoded.
fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::render_markdown;

    fn plain(lines: &[MarkupLine]) -> Vec<String> {
        lines.iter().map(MarkupLine::plain_text).collect()
    }

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn paragraphs_and_list_items_become_lines() {
        let lines = markup_lines(
            "<p>It's a <em>poetry</em> collection.</p>\n<ul>\n<li>Love</li>\n<li>Loss</li>\n</ul>",
        );
        assert_eq!(
            plain(&lines),
            vec!["It's a poetry collection.", "• Love", "• Loss"]
        );
    }

    #[test]
    fn inline_markup_next_to_punctuation_keeps_spacing() {
        let cases = [
            ("Hello *world*!", "Hello world!"),
            ("It's **Tagore**'s work.", "It's Tagore's work."),
            ("See `code`, then go.", "See code, then go."),
            ("*one* **two**", "one two"),
        ];

        for (markdown, expected) in cases {
            let lines = markup_lines(&render_markdown(markdown));
            assert_eq!(plain(&lines), vec![expected], "markdown {markdown:?}");

            let wrapped = wrap_spans(&lines[0].spans, 80);
            assert_eq!(wrapped.len(), 1);
            assert_eq!(line_text(&wrapped[0]), expected, "markdown {markdown:?}");
        }
    }

    #[test]
    fn emphasis_is_styled() {
        let lines = markup_lines("<p><strong>Bold</strong> plain</p>");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].spans[0].1.add_modifier.contains(Modifier::BOLD));
        assert!(!lines[0].spans[1].1.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn code_blocks_keep_their_lines() {
        let lines = markup_lines("<pre><code>first\n  second\n</code></pre>");
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|line| line.preformatted));
        assert_eq!(lines[1].plain_text(), "  second");
    }

    #[test]
    fn entities_are_decoded() {
        let lines = markup_lines("<p>a &lt;b&gt; &amp; &quot;c&quot;</p>");
        assert_eq!(plain(&lines), vec!["a <b> & \"c\""]);
    }

    #[test]
    fn suggestion_cycle_wraps_both_ways() {
        let mut state = HistoryState::new();
        state.cycle_suggestion(3, true);
        assert_eq!(state.selected_suggestion(), Some(0));
        state.cycle_suggestion(3, false);
        assert_eq!(state.selected_suggestion(), Some(2));
        state.cycle_suggestion(3, true);
        assert_eq!(state.selected_suggestion(), Some(0));
        state.cycle_suggestion(0, true);
        assert_eq!(state.selected_suggestion(), None);
    }

    #[test]
    fn wrap_breaks_on_width() {
        let lines = wrap_spans(&[("one two three".to_string(), Style::default())], 8);
        assert_eq!(lines.len(), 2);
        assert_eq!(line_text(&lines[0]), "one two");
        assert_eq!(line_text(&lines[1]), "three");
    }

    #[test]
    fn scroll_is_clamped_to_the_first_line() {
        let mut transcript = Transcript::new();
        for turn in 1..=4 {
            transcript.push(TranscriptEntry::new(
                Sender::User,
                EntryContent::PlainText("hi".to_string()),
                turn,
            ));
        }

        // Each entry is a header, one text line and a spacer; the pane shows four.
        let area = Rect::new(0, 0, 40, 6);
        let mut buf = Buffer::empty(area);
        let mut state = HistoryState::new();
        state.scroll_up(1000);
        ConversationHistory::new(&transcript, "Conversation").render(area, &mut buf, &mut state);
        assert_eq!(state.scroll_offset(), 8);

        state.scroll_down(3);
        assert_eq!(state.scroll_offset(), 5);
    }
}
