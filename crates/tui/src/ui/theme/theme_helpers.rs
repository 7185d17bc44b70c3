use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, BorderType, Borders, Padding, Paragraph},
};

use super::roles::{Theme, ThemeRoles};

/// Build a standard Block with theme surfaces and borders.
pub fn block<'a, T: Theme + ?Sized>(theme: &'a T, title: Option<&'a str>, focused: bool) -> Block<'a> {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Plain)
        .border_style(theme.border_style(focused))
        .style(panel_style(theme));
    if let Some(t) = title {
        block = block.title(Span::styled(t, theme.text_secondary_style().add_modifier(Modifier::BOLD)));
    }
    block
}

/// Style for panel-like containers (set background on widget using `.style`).
pub fn panel_style<T: Theme + ?Sized>(theme: &T) -> Style {
    let ThemeRoles { surface, text, .. } = *theme.roles();
    Style::default().bg(surface).fg(text)
}

/// Row style for list rows, with the selected row highlighted.
pub fn list_row_style<T: Theme + ?Sized>(theme: &T, selected: bool, focused: bool) -> Style {
    match (selected, focused) {
        (true, true) => theme.selection_style().add_modifier(Modifier::BOLD),
        (true, false) => theme.selection_style(),
        _ => theme.text_primary_style(),
    }
}

/// Style for input fields; caller sets the block border based on focus.
pub fn input_style<T: Theme + ?Sized>(theme: &T, valid: bool, focused: bool) -> Style {
    let ThemeRoles { surface, text, error, .. } = *theme.roles();
    let mut style = Style::default().bg(surface).fg(text);
    if !valid {
        style = style.fg(error);
    }
    if focused {
        style = style.add_modifier(Modifier::BOLD);
    }
    style
}

/// Primary button style (filled accent background).
pub fn button_primary_style<T: Theme + ?Sized>(theme: &T, enabled: bool) -> Style {
    let roles = theme.roles();
    if enabled {
        Style::default()
            .bg(roles.accent_primary)
            .fg(roles.background)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().bg(roles.surface_muted).fg(roles.text_muted)
    }
}

/// Secondary button style (outline-like, relies on the border color).
pub fn button_secondary_style<T: Theme + ?Sized>(theme: &T, enabled: bool, selected: bool) -> Style {
    if !enabled {
        return theme.text_muted_style();
    }
    let roles = theme.roles();
    let style = Style::default().fg(roles.accent_secondary);
    if selected { style.bg(roles.selection_bg) } else { style }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonType {
    Primary,
    Secondary,
}

/// Flags controlling how [`render_button`] draws a button.
#[derive(Debug, Clone, Copy)]
pub struct ButtonRenderOptions {
    pub enabled: bool,
    pub focused: bool,
    pub selected: bool,
    pub borders: Borders,
    pub button_type: ButtonType,
}

impl ButtonRenderOptions {
    pub fn new(enabled: bool, focused: bool, selected: bool, borders: Borders, button_type: ButtonType) -> Self {
        Self {
            enabled,
            focused,
            selected,
            borders,
            button_type,
        }
    }
}

/// Renders a standard button.
pub fn render_button<T: Theme + ?Sized>(frame: &mut Frame, area: Rect, label: &str, theme: &T, options: ButtonRenderOptions) {
    let border_style = if options.enabled {
        theme.border_style(options.focused)
    } else {
        theme.text_muted_style()
    };

    let button_style = match options.button_type {
        ButtonType::Primary => button_primary_style(theme, options.enabled),
        ButtonType::Secondary => button_secondary_style(theme, options.enabled, options.selected),
    };

    // Without borders, pad so the label sits where a bordered one would.
    let padding = if options.borders.is_empty() {
        Padding::uniform(1)
    } else {
        Padding::uniform(0)
    };

    frame.render_widget(
        Paragraph::new(label)
            .centered()
            .block(
                Block::bordered()
                    .borders(options.borders)
                    .border_style(border_style)
                    .padding(padding),
            )
            .style(button_style),
        area,
    );
}

/// Key/description pairs rendered as hint spans: key emphasized, text muted.
pub fn build_hint_spans<'a, T: Theme + ?Sized>(theme: &T, hints: &[(&'a str, &'a str)]) -> Vec<Span<'a>> {
    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (key, description) in hints {
        spans.push(Span::styled(*key, theme.accent_emphasis_style()));
        spans.push(Span::styled(*description, theme.text_muted_style()));
    }
    spans
}
