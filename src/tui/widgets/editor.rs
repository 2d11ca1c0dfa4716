use ratatui::layout::Rect;
use std::cmp;

/// Single-line text input used by the task form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Editor {
    pub text: String,
    /// Cursor position in characters, not bytes
    pub cursor_col: usize,
    /// First visible character when the text is wider than the field
    pub scroll_col: usize,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_string(content: String) -> Self {
        // Form fields are single-line; keep only what precedes a newline
        let text = content.lines().next().unwrap_or_default().to_string();
        let cursor_col = text.chars().count();
        Self {
            text,
            cursor_col,
            scroll_col: 0,
        }
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, col: usize) -> usize {
        self.text
            .char_indices()
            .nth(col)
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len())
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' || ch == '\r' {
            return;
        }
        let col = cmp::min(self.cursor_col, self.char_len());
        let idx = self.byte_index(col);
        self.text.insert(idx, ch);
        self.cursor_col = col + 1;
    }

    /// Backspace
    pub fn delete_char(&mut self) {
        let col = cmp::min(self.cursor_col, self.char_len());
        if col == 0 {
            return;
        }
        let idx = self.byte_index(col - 1);
        self.text.remove(idx);
        self.cursor_col = col - 1;
    }

    /// Delete key
    pub fn delete_forward(&mut self) {
        let col = cmp::min(self.cursor_col, self.char_len());
        if col < self.char_len() {
            let idx = self.byte_index(col);
            self.text.remove(idx);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_col = self.cursor_col.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor_col = cmp::min(self.cursor_col + 1, self.char_len());
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_col = self.char_len();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor_col = 0;
        self.scroll_col = 0;
    }

    /// Keep the cursor inside a field `viewport_width` characters wide
    pub fn update_horizontal_scroll(&mut self, viewport_width: usize) {
        if viewport_width == 0 {
            return;
        }
        if self.cursor_col < self.scroll_col {
            self.scroll_col = self.cursor_col;
        } else if self.cursor_col >= self.scroll_col + viewport_width {
            self.scroll_col = self.cursor_col + 1 - viewport_width;
        }
    }

    /// The slice of text that fits in the field
    pub fn visible_text(&self, viewport_width: usize) -> String {
        self.text.chars().skip(self.scroll_col).take(viewport_width).collect()
    }

    pub fn value(&self) -> String {
        self.text.clone()
    }

    /// Terminal position of the cursor inside a bordered field
    pub fn get_cursor_screen_pos(&self, area: Rect) -> Option<(u16, u16)> {
        if area.width < 3 || area.height < 3 {
            return None;
        }
        let inner_width = area.width.saturating_sub(2) as usize;
        let offset = self.cursor_col.saturating_sub(self.scroll_col).min(inner_width.saturating_sub(1));
        Some((area.x + 1 + offset as u16, area.y + 1))
    }
}
