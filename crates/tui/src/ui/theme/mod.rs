//! Theme styling module for the TUI UI layer.
//!
//! Defines the color palettes (Dracula, Nord), an ANSI 256-color fallback,
//! semantic theme roles and helper builders for Ratatui widgets. Prefer these
//! helpers over hard-coding colors.

use std::env;

use tracing::debug;

pub mod ansi256;
pub mod catalog;
pub mod dracula;
pub mod nord;
pub mod roles;
pub mod theme_helpers;

pub use ansi256::Ansi256Theme;
pub use catalog::ThemeDefinition;
pub use dracula::DraculaTheme;
pub use nord::NordTheme;
pub use roles::Theme;

/// Environment override for the palette.
pub const THEME_ENV: &str = "TUI_THEME";

/// Theme plus the definition it was built from.
pub struct LoadedTheme {
    pub definition: &'static ThemeDefinition,
    pub theme: Box<dyn Theme>,
}

impl LoadedTheme {
    pub fn from_definition(definition: &'static ThemeDefinition) -> Self {
        Self {
            definition,
            theme: definition.build(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorCapability {
    Truecolor,
    Ansi256,
}

/// Selects a theme from `TUI_THEME`, then the explicit request (CLI flag),
/// then the persisted preference, then the default for the terminal.
pub fn load(requested: Option<&str>, preferred: Option<&str>) -> LoadedTheme {
    if matches!(detect_color_capability(), ColorCapability::Ansi256) {
        debug!("ANSI-only terminal detected; forcing fallback palette");
        return LoadedTheme::from_definition(catalog::default_ansi());
    }

    let env_choice = env::var(THEME_ENV).ok();
    for candidate in [env_choice.as_deref(), requested, preferred].into_iter().flatten() {
        if let Some(definition) = catalog::resolve(candidate.trim()) {
            return LoadedTheme::from_definition(definition);
        }
        debug!(theme = candidate, "unknown theme ignored");
    }

    LoadedTheme::from_definition(catalog::default_truecolor())
}

fn detect_color_capability() -> ColorCapability {
    let color_term = env::var("COLORTERM").unwrap_or_default().to_ascii_lowercase();
    if color_term.contains("truecolor") || color_term.contains("24bit") {
        return ColorCapability::Truecolor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term.contains("truecolor") || term.contains("direct") {
        return ColorCapability::Truecolor;
    }
    // Apple Terminal is the common 8-bit holdout.
    if env::var("TERM_PROGRAM").is_ok_and(|program| program == "Apple_Terminal") {
        return ColorCapability::Ansi256;
    }
    if term.contains("256color") && color_term.is_empty() {
        return ColorCapability::Ansi256;
    }
    ColorCapability::Truecolor
}
