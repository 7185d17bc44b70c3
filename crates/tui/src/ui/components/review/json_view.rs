//! Syntax-highlighted JSON lines built by walking a [`serde_json::Value`].

use ratatui::text::{Line, Span};
use serde_json::Value;

use crate::ui::theme::Theme;

const INDENT: &str = "  ";

/// Pretty JSON for `value`, one [`Line`] per output line.
pub fn highlight_json(value: &Value, theme: &dyn Theme) -> Vec<Line<'static>> {
    let mut writer = LineWriter::new(theme);
    writer.value(value, 0);
    writer.finish()
}

struct LineWriter<'t> {
    theme: &'t dyn Theme,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
}

impl<'t> LineWriter<'t> {
    fn new(theme: &'t dyn Theme) -> Self {
        Self {
            theme,
            lines: Vec::new(),
            current: Vec::new(),
        }
    }

    fn push(&mut self, text: impl Into<String>, style: ratatui::style::Style) {
        self.current.push(Span::styled(text.into(), style));
    }

    fn punctuation(&mut self, text: &'static str) {
        let style = self.theme.syntax_type_style();
        self.push(text, style);
    }

    fn newline(&mut self, depth: usize) {
        self.lines.push(Line::from(std::mem::take(&mut self.current)));
        if depth > 0 {
            let style = self.theme.text_primary_style();
            self.push(INDENT.repeat(depth), style);
        }
    }

    fn value(&mut self, value: &Value, depth: usize) {
        match value {
            Value::Null => {
                let style = self.theme.text_muted_style();
                self.push("null", style);
            }
            Value::Bool(flag) => {
                let style = self.theme.syntax_keyword_style();
                self.push(flag.to_string(), style);
            }
            Value::Number(number) => {
                let style = self.theme.syntax_number_style();
                self.push(number.to_string(), style);
            }
            Value::String(text) => self.string(text),
            Value::Array(items) if items.is_empty() => self.punctuation("[]"),
            Value::Array(items) => {
                self.punctuation("[");
                for (index, item) in items.iter().enumerate() {
                    self.newline(depth + 1);
                    self.value(item, depth + 1);
                    if index + 1 < items.len() {
                        self.punctuation(",");
                    }
                }
                self.newline(depth);
                self.punctuation("]");
            }
            Value::Object(map) if map.is_empty() => self.punctuation("{}"),
            Value::Object(map) => {
                self.punctuation("{");
                for (index, (key, item)) in map.iter().enumerate() {
                    self.newline(depth + 1);
                    self.string(key);
                    self.punctuation(": ");
                    self.value(item, depth + 1);
                    if index + 1 < map.len() {
                        self.punctuation(",");
                    }
                }
                self.newline(depth);
                self.punctuation("}");
            }
        }
    }

    fn string(&mut self, text: &str) {
        // serde_json escapes quotes and control characters for us.
        let quoted = Value::String(text.to_string()).to_string();
        let style = self.theme.syntax_string_style();
        self.push(quoted, style);
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        if !self.current.is_empty() {
            self.lines.push(Line::from(self.current));
        }
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::dracula::DraculaTheme;
    use serde_json::json;

    fn plain(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|span| span.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn matches_serde_pretty_printing() {
        let value = json!({
            "step0": {"step": "actores", "data": {"option": "titular", "expediente": null}},
            "archivos": [{"nombre": "demanda \"firmada\".pdf", "tamano": 2048}, true],
            "vacio": []
        });
        let lines = highlight_json(&value, &DraculaTheme::new());
        let expected = serde_json::to_string_pretty(&value).expect("pretty json");
        assert_eq!(plain(&lines).join("\n"), expected);
    }

    #[test]
    fn scalars_take_their_syntax_style() {
        let theme = DraculaTheme::new();
        let lines = highlight_json(&json!([1, "a"]), &theme);
        assert_eq!(lines[1].spans[1].style, theme.syntax_number_style());
        assert_eq!(lines[2].spans[1].style, theme.syntax_string_style());
    }
}
