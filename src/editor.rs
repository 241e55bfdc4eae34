//! Text model behind the code editor: soft-tab indentation, line numbering and
//! a cursor-carrying buffer used by the TUI.
//!
//! Offsets are byte offsets into the text and always sit on a char boundary.
//! Indentation only ever inserts or removes ASCII spaces, so boundaries stay
//! valid across edits.

/// One soft tab.
pub const INDENT_UNIT: &str = "    ";
const INDENT_WIDTH: usize = INDENT_UNIT.len();

/// Text plus the cursor position after an indentation edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub text: String,
    pub cursor: usize,
}

/// Replace `[start, end)` with one soft tab; the cursor lands after it.
pub fn indent(text: &str, start: usize, end: usize) -> Edit {
    let start = clamp_offset(text, start);
    let end = clamp_offset(text, end).max(start);
    let mut out = String::with_capacity(text.len() + INDENT_WIDTH);
    out.push_str(&text[..start]);
    out.push_str(INDENT_UNIT);
    out.push_str(&text[end..]);
    Edit {
        text: out,
        cursor: start + INDENT_WIDTH,
    }
}

/// Remove one soft tab from the cursor's line.
///
/// Acts only when the line, read from its start up to the cursor, begins with
/// a full unit. If the four bytes right before the cursor are spaces those are
/// removed (undoing an `indent` in place), otherwise the leading unit is. In
/// both cases the cursor moves back by four. Anything else is a no-op.
pub fn outdent(text: &str, cursor: usize) -> Edit {
    let cursor = clamp_offset(text, cursor);
    let line_start = line_start(text, cursor);
    let prefix = &text[line_start..cursor];
    if !prefix.starts_with(INDENT_UNIT) {
        return Edit {
            text: text.to_string(),
            cursor,
        };
    }

    let remove_at = if prefix.ends_with(INDENT_UNIT) {
        cursor - INDENT_WIDTH
    } else {
        line_start
    };
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..remove_at]);
    out.push_str(&text[remove_at + INDENT_WIDTH..]);
    Edit {
        text: out,
        cursor: cursor - INDENT_WIDTH,
    }
}

/// Number of `\n`-delimited segments; empty text still has one line.
pub fn line_count(text: &str) -> usize {
    text.split('\n').count()
}

fn line_start(text: &str, offset: usize) -> usize {
    text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

fn line_end(text: &str, offset: usize) -> usize {
    text[offset..]
        .find('\n')
        .map(|i| offset + i)
        .unwrap_or(text.len())
}

/// Clamp into `[0, len]` and back off to the previous char boundary.
fn clamp_offset(text: &str, offset: usize) -> usize {
    let mut o = offset.min(text.len());
    while !text.is_char_boundary(o) {
        o -= 1;
    }
    o
}

/// Byte offset of the `col`-th char of `line`, clamped to the line end.
fn offset_for_col(line: &str, col: usize) -> usize {
    line.char_indices()
        .nth(col)
        .map(|(i, _)| i)
        .unwrap_or(line.len())
}

/// Editable text with a cursor. `revision` bumps on every content change so
/// callers can tell whether anything changed since a checkpoint.
#[derive(Debug, Clone, Default)]
pub struct EditorBuffer {
    text: String,
    cursor: usize,
    revision: u64,
}

impl EditorBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        Self {
            text,
            cursor,
            revision: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn line_count(&self) -> usize {
        line_count(&self.text)
    }

    /// Replace the whole content; the cursor moves to the start.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = 0;
        self.revision += 1;
    }

    pub fn clear(&mut self) {
        self.set_text(String::new());
    }

    fn apply(&mut self, edit: Edit) {
        if edit.text != self.text {
            self.revision += 1;
        }
        self.text = edit.text;
        self.cursor = edit.cursor;
    }

    pub fn indent(&mut self) {
        let edit = indent(&self.text, self.cursor, self.cursor);
        self.apply(edit);
    }

    pub fn outdent(&mut self) {
        let edit = outdent(&self.text, self.cursor);
        self.apply(edit);
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
        self.revision += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
        self.revision += 1;
    }

    pub fn backspace(&mut self) {
        if let Some(c) = self.text[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
            self.text.remove(self.cursor);
            self.revision += 1;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.len() {
            self.text.remove(self.cursor);
            self.revision += 1;
        }
    }

    pub fn move_left(&mut self) {
        if let Some(c) = self.text[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(c) = self.text[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = line_start(&self.text, self.cursor);
    }

    pub fn move_end(&mut self) {
        self.cursor = line_end(&self.text, self.cursor);
    }

    pub fn move_up(&mut self) {
        let start = line_start(&self.text, self.cursor);
        if start == 0 {
            self.cursor = 0;
            return;
        }
        let col = self.text[start..self.cursor].chars().count();
        let prev_start = line_start(&self.text, start - 1);
        let prev_line = &self.text[prev_start..start - 1];
        self.cursor = prev_start + offset_for_col(prev_line, col);
    }

    pub fn move_down(&mut self) {
        let start = line_start(&self.text, self.cursor);
        let end = line_end(&self.text, self.cursor);
        if end == self.text.len() {
            self.cursor = end;
            return;
        }
        let col = self.text[start..self.cursor].chars().count();
        let next_start = end + 1;
        let next_end = line_end(&self.text, next_start);
        let next_line = &self.text[next_start..next_end];
        self.cursor = next_start + offset_for_col(next_line, col);
    }

    /// Zero-based (line, char column) of the cursor.
    pub fn cursor_position(&self) -> (usize, usize) {
        let before = &self.text[..self.cursor];
        let line = before.matches('\n').count();
        let col = before[line_start(&self.text, self.cursor)..].chars().count();
        (line, col)
    }
}
