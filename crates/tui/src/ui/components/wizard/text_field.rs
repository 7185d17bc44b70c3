use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::Paragraph,
};
use unicode_width::UnicodeWidthChar;

use crate::ui::components::common::TextInputState;
use crate::ui::theme::{Theme, theme_helpers as th};

const LABEL_WIDTH: u16 = 30;

pub struct TextFieldView<'a> {
    pub label: &'a str,
    pub input: &'a TextInputState,
    pub focused: bool,
    /// Inline validation message.
    pub message: Option<&'a str>,
    pub placeholder: Option<&'a str>,
}

/// Renders `label  value  message` on a single row and places the terminal
/// cursor when focused.
pub fn render_text_field(frame: &mut Frame, area: Rect, view: TextFieldView<'_>, theme: &dyn Theme) {
    let message_width = view.message.map_or(0, |message| message.chars().count() as u16 + 3);
    let [label_area, value_area, message_area] = Layout::horizontal([
        Constraint::Length(LABEL_WIDTH.min(area.width / 2)),
        Constraint::Min(1),
        Constraint::Length(message_width),
    ])
    .areas(area);

    let marker = if view.focused { "› " } else { "  " };
    let label = Line::from(vec![
        Span::styled(marker, theme.accent_primary_style()),
        Span::styled(view.label, theme.text_secondary_style().add_modifier(Modifier::BOLD)),
    ]);
    frame.render_widget(Paragraph::new(label), label_area);

    let text = view.input.input();
    let value_width = value_area.width.saturating_sub(1) as usize;
    let (visible, cursor_offset) = visible_window(text, view.input.cursor_column(), value_width);
    let value_line = if text.is_empty() && !view.focused {
        Line::from(Span::styled(view.placeholder.unwrap_or(""), theme.text_muted_style()))
    } else {
        Line::from(Span::styled(visible, th::input_style(theme, view.message.is_none(), view.focused)))
    };
    frame.render_widget(Paragraph::new(value_line).style(th::panel_style(theme)), value_area);

    if let Some(message) = view.message {
        let line = Line::from(Span::styled(format!(" ⚠ {message}"), theme.status_error()));
        frame.render_widget(Paragraph::new(line), message_area);
    }

    if view.focused && value_area.width > 0 {
        let x = value_area.x + (cursor_offset as u16).min(value_area.width - 1);
        frame.set_cursor_position((x, value_area.y));
    }
}

/// Slice of `text` that fits in `width` columns while keeping the cursor
/// (given in chars) visible, plus the cursor's column inside that slice.
pub fn visible_window(text: &str, cursor_chars: usize, width: usize) -> (String, usize) {
    let chars: Vec<char> = text.chars().collect();
    let char_width = |c: &char| c.width().unwrap_or(0);
    let mut start = 0;
    while start < cursor_chars && chars[start..cursor_chars].iter().map(char_width).sum::<usize>() > width {
        start += 1;
    }
    let mut used = 0;
    let mut visible = String::new();
    for c in &chars[start..] {
        let w = char_width(c);
        if used + w > width {
            break;
        }
        used += w;
        visible.push(*c);
    }
    let cursor = chars[start..cursor_chars.min(chars.len())].iter().map(char_width).sum();
    (visible, cursor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_shown_whole() {
        assert_eq!(visible_window("Ana", 3, 10), ("Ana".to_string(), 3));
    }

    #[test]
    fn long_text_scrolls_to_keep_the_cursor_visible() {
        let (visible, cursor) = visible_window("abcdefghij", 10, 4);
        assert_eq!(visible, "ghij");
        assert_eq!(cursor, 4);

        let (visible, cursor) = visible_window("abcdefghij", 2, 4);
        assert_eq!(visible, "abcd");
        assert_eq!(cursor, 2);
    }
}
