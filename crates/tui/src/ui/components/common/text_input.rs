//! UTF-8 safe single-line text input with cursor management.
//!
//! Used by every editable field of the wizard. The owning form model may
//! normalize the text (letters-only names, character caps); the view then
//! calls [`TextInputState::sync_from`] so the buffer mirrors the model.

#[derive(Clone, Debug, Default)]
pub struct TextInputState {
    /// The underlying text buffer
    input: String,
    /// Cursor byte index into `input` (always on a UTF-8 boundary)
    cursor: usize,
}

impl TextInputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer pre-filled with `value`, cursor at the end.
    pub fn with_value(value: &str) -> Self {
        Self {
            input: value.to_string(),
            cursor: value.len(),
        }
    }

    // ----- Getters -----
    pub fn input(&self) -> &str {
        &self.input
    }
    pub fn cursor(&self) -> usize {
        self.cursor
    }
    pub fn is_empty(&self) -> bool {
        self.input.trim().is_empty()
    }

    /// Number of chars before the cursor, for placing the terminal cursor.
    pub fn cursor_column(&self) -> usize {
        self.input[..self.cursor].chars().count()
    }

    // ----- Setters -----
    pub fn set_input<S: Into<String>>(&mut self, s: S) {
        self.input = s.into();
        self.cursor = self.input.len().min(self.cursor);
        while !self.input.is_char_boundary(self.cursor) {
            self.cursor -= 1;
        }
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.input.len());
    }

    /// Replaces the buffer with the normalized model value when they differ.
    pub fn sync_from(&mut self, model_value: &str) {
        if self.input != model_value {
            self.set_input(model_value);
        }
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }

    // ----- Editing primitives (UTF-8 safe) -----

    /// Move cursor one Unicode scalar to the left.
    pub fn move_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev_len = self.input[..self.cursor].chars().last().map(|c| c.len_utf8()).unwrap_or(1);
        self.cursor = self.cursor.saturating_sub(prev_len);
    }

    /// Move cursor one Unicode scalar to the right.
    pub fn move_right(&mut self) {
        if let Some(next) = self.input[self.cursor..].chars().next() {
            self.cursor += next.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.input.len();
    }

    /// Insert a char at the cursor.
    pub fn insert_char(&mut self, c: char) {
        self.input.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Backspace the char immediately before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = self.input[..self.cursor].chars().last().map(|c| c.len_utf8()).unwrap_or(1);
        let start = self.cursor - prev;
        self.input.drain(start..self.cursor);
        self.cursor = start;
    }

    /// Delete the char under the cursor.
    pub fn delete(&mut self) {
        if let Some(next) = self.input[self.cursor..].chars().next() {
            let end = self.cursor + next.len_utf8();
            self.input.drain(self.cursor..end);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_move_insert_backspace() {
        let mut st = TextInputState::new();
        st.set_input("Mría");
        st.set_cursor(1);
        st.insert_char('a');
        assert_eq!(st.input(), "María");
        st.move_right();
        st.move_right();
        st.backspace(); // removes 'í'
        assert_eq!(st.input(), "Mara");
        st.move_home();
        st.delete();
        assert_eq!(st.input(), "ara");
    }

    #[test]
    fn sync_keeps_cursor_on_char_boundary() {
        let mut st = TextInputState::with_value("Ramírez9");
        assert_eq!(st.cursor_column(), 8);
        st.sync_from("Ramírez");
        assert_eq!(st.input(), "Ramírez");
        assert_eq!(st.cursor(), "Ramírez".len());

        st.set_cursor(4); // inside 'í'
        st.set_input("Ramí");
        assert!(st.input().is_char_boundary(st.cursor()));
    }
}
