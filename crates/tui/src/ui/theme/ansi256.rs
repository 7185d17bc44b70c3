//! ANSI 256-color fallback for terminals without truecolor support.
//!
//! Approximates the Dracula palette with indexed colors.

use ratatui::style::Color;

use super::roles::{Theme, ThemeRoles};

#[derive(Debug, Clone)]
pub struct Ansi256Theme {
    roles: ThemeRoles,
}

impl Ansi256Theme {
    pub fn new() -> Self {
        Self {
            roles: ThemeRoles {
                background: Color::Indexed(236),
                surface: Color::Indexed(236),
                surface_muted: Color::Indexed(239),
                border: Color::Indexed(239),
                divider: Color::Indexed(239),

                text: Color::Indexed(255),
                text_secondary: Color::Indexed(250),
                text_muted: Color::Indexed(247),

                accent_primary: Color::Indexed(212),
                accent_secondary: Color::Indexed(117),

                info: Color::Indexed(117),
                success: Color::Indexed(84),
                warning: Color::Indexed(215),
                error: Color::Indexed(203),

                selection_bg: Color::Indexed(239),
                selection_fg: Color::Indexed(255),
                focus: Color::Indexed(117),

                syntax_keyword: Color::Indexed(212),
                syntax_string: Color::Indexed(229),
                syntax_number: Color::Indexed(141),
                syntax_type: Color::Indexed(123),

                track: Color::Indexed(239),
            },
        }
    }
}

impl Default for Ansi256Theme {
    fn default() -> Self {
        Self::new()
    }
}

impl Theme for Ansi256Theme {
    fn roles(&self) -> &ThemeRoles {
        &self.roles
    }
}
