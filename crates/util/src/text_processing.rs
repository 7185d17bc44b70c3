//! # Text Processing Utilities
//!
//! Input filters for name fields, human readable file sizes and truncation
//! helpers for narrow terminal layouts.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Letters (including Spanish accented letters), whitespace, apostrophes and hyphens.
static LETTERS_ONLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-ZáéíóúÁÉÍÓÚàèìòùÀÈÌÒÙäëïöüÄËÏÖÜâêîôûÂÊÎÔÛãõÃÕçÇñÑ\s'\-]*$").expect("valid letters regex")
});

/// Returns `true` when every character of `input` is allowed in a person's name.
pub fn is_letters_only(input: &str) -> bool {
    LETTERS_ONLY.is_match(input)
}

/// Drops characters not allowed in a name field and caps the result at
/// `max_chars` characters.
///
/// # Example
/// ```rust
/// use impugna_util::sanitize_letters_input;
///
/// assert_eq!(sanitize_letters_input("José 2 Núñez", 40), "José  Núñez");
/// assert_eq!(sanitize_letters_input("Ana", 2), "An");
/// ```
pub fn sanitize_letters_input(input: &str, max_chars: usize) -> String {
    let mut buffer = [0u8; 4];
    input
        .chars()
        .filter(|ch| is_letters_only(ch.encode_utf8(&mut buffer)))
        .take(max_chars)
        .collect()
}

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Formats a byte count using base 1024 and at most two decimals.
///
/// # Example
/// ```rust
/// use impugna_util::format_file_size;
///
/// assert_eq!(format_file_size(0), "0 Bytes");
/// assert_eq!(format_file_size(1536), "1.5 KB");
/// ```
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let bytes = bytes as f64;
    let exponent = (bytes.ln() / 1024f64.ln()).floor().clamp(0.0, (SIZE_UNITS.len() - 1) as f64);
    let scaled = bytes / 1024f64.powf(exponent);
    let rounded = (scaled * 100.0).round() / 100.0;
    format!("{rounded} {}", SIZE_UNITS[exponent as usize])
}

/// Shortens `file_name` to `max_chars` characters keeping its extension,
/// e.g. `demanda_firmada_version_final.pdf` capped at 20 becomes `demanda_firma...pdf`.
pub fn truncate_file_name(file_name: &str, max_chars: usize) -> String {
    let total = file_name.chars().count();
    if total <= max_chars {
        return file_name.to_string();
    }
    match file_name.rsplit_once('.') {
        Some((stem, extension)) => {
            let keep = max_chars.saturating_sub(extension.chars().count() + 4);
            let head: String = stem.chars().take(keep).collect();
            format!("{head}...{extension}")
        }
        None => {
            let head: String = file_name.chars().take(max_chars.saturating_sub(3)).collect();
            format!("{head}...")
        }
    }
}

/// Cuts `text` so it occupies at most `max_width` terminal cells, ending in
/// an ellipsis when something was removed.
pub fn truncate_display_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let width = ch.width().unwrap_or(0);
        if used + width > max_width - 1 {
            break;
        }
        used += width;
        out.push(ch);
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_filter_accepts_spanish_names() {
        assert!(is_letters_only("María José O'Neil-Núñez"));
        assert!(is_letters_only(""));
        assert!(!is_letters_only("Juan_2"));
        assert_eq!(sanitize_letters_input("Ñandú #1 Güemes", 40), "Ñandú  Güemes");
    }

    #[test]
    fn sanitize_caps_by_characters_not_bytes() {
        let long = "á".repeat(50);
        assert_eq!(sanitize_letters_input(&long, 40).chars().count(), 40);
    }

    #[test]
    fn file_sizes_use_binary_units() {
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5 MB");
        assert_eq!(format_file_size(1_288_490_189), "1.2 GB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024 * 1024), "3072 GB");
    }

    #[test]
    fn truncation_keeps_extension() {
        assert_eq!(truncate_file_name("corto.pdf", 30), "corto.pdf");
        let truncated = truncate_file_name("demanda_firmada_version_final_2025.pdf", 20);
        assert_eq!(truncated, "demanda_firma...pdf");
        assert_eq!(truncate_file_name("sin_extension_muy_largo", 10), "sin_ext...");
    }

    #[test]
    fn display_truncation_respects_wide_chars() {
        assert_eq!(truncate_display_width("Autoridad", 20), "Autoridad");
        assert_eq!(truncate_display_width("Impugnación", 6), "Impug…");
        assert_eq!(truncate_display_width("漢字漢字", 5), "漢字…");
    }
}
