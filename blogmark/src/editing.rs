//! Text-insertion helpers for the post editor.
//!
//! The admin toolbar and its keyboard shortcuts edit a plain textarea. These
//! functions compute the new text and selection; the UI only applies them.
//! Offsets count Unicode scalar values and are clamped to the text.

use serde::{Deserialize, Serialize};

/// Maximum number of snapshots kept by `History`.
pub const HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A collapsed selection.
    pub fn caret(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Result of an editing operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub text: String,
    pub selection: Selection,
}

/// Wrap the selection in `prefix`/`suffix`.
///
/// With nothing selected, `placeholder` is inserted and left selected so the
/// author can type over it. Otherwise the caret lands after the suffix.
///
/// ```
/// use blogmark::editing::{insert_formatting, Selection};
///
/// let edit = insert_formatting("say hi", Selection::new(4, 6), "**", "**", "bold text");
/// assert_eq!(edit.text, "say **hi**");
/// assert_eq!(edit.selection, Selection::caret(10));
/// ```
pub fn insert_formatting(
    text: &str,
    selection: Selection,
    prefix: &str,
    suffix: &str,
    placeholder: &str,
) -> Edit {
    let (start, end) = clamp(text, selection);
    let (before, selected, after) = split_at_chars(text, start, end);
    let inserted = if selected.is_empty() { placeholder } else { selected };

    let new_text = format!("{before}{prefix}{inserted}{suffix}{after}");
    let inner_start = start + char_len(prefix);
    let inner_end = inner_start + char_len(inserted);

    let selection = if selected.is_empty() {
        Selection::new(inner_start, inner_end)
    } else {
        Selection::caret(inner_end + char_len(suffix))
    };

    Edit {
        text: new_text,
        selection,
    }
}

/// Replace the selection with `snippet`.
///
/// If `select` occurs in the snippet, its first occurrence is selected;
/// otherwise the caret lands after the snippet.
pub fn insert_at_cursor(
    text: &str,
    selection: Selection,
    snippet: &str,
    select: Option<&str>,
) -> Edit {
    let (start, end) = clamp(text, selection);
    let (before, _, after) = split_at_chars(text, start, end);
    let new_text = format!("{before}{snippet}{after}");

    let found = select
        .filter(|s| !s.is_empty())
        .and_then(|s| snippet.find(s).map(|byte| (byte, s)));

    let selection = match found {
        Some((byte, s)) => {
            let sel_start = start + char_len(&snippet[..byte]);
            Selection::new(sel_start, sel_start + char_len(s))
        }
        None => Selection::caret(start + char_len(snippet)),
    };

    Edit {
        text: new_text,
        selection,
    }
}

/// Toolbar actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Format {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Code,
    Heading,
    Quote,
    BulletItem,
    NumberedItem,
    Rule,
    Link { url: String },
    Image { url: String, alt: Option<String> },
}

impl Format {
    /// Map a Ctrl/Cmd shortcut key to its action. `k` (link) needs a URL.
    pub fn from_shortcut(key: char, url: Option<&str>) -> Option<Format> {
        match key.to_ascii_lowercase() {
            'b' => Some(Format::Bold),
            'i' => Some(Format::Italic),
            'u' => Some(Format::Underline),
            'k' => url.filter(|u| !u.is_empty()).map(|u| Format::Link { url: u.to_string() }),
            _ => None,
        }
    }

    pub fn apply(&self, text: &str, selection: Selection) -> Edit {
        match self {
            Format::Bold => insert_formatting(text, selection, "**", "**", "bold text"),
            Format::Italic => insert_formatting(text, selection, "*", "*", "italic text"),
            Format::Underline => insert_formatting(text, selection, "<u>", "</u>", "underlined text"),
            Format::Strikethrough => {
                insert_formatting(text, selection, "~~", "~~", "strikethrough text")
            }
            Format::Code => insert_formatting(text, selection, "`", "`", "code"),
            Format::Heading => insert_formatting(text, selection, "## ", "", "Heading"),
            Format::Quote => insert_formatting(text, selection, "> ", "", "quote"),
            Format::BulletItem => insert_formatting(text, selection, "- ", "", "list item"),
            Format::NumberedItem => insert_formatting(text, selection, "1. ", "", "list item"),
            Format::Rule => insert_at_cursor(text, selection, "\n---\n", None),
            Format::Link { url } => {
                insert_formatting(text, selection, "[", &format!("]({url})"), "link text")
            }
            Format::Image { url, alt } => {
                let alt = alt.as_deref().filter(|a| !a.trim().is_empty()).unwrap_or("image");
                insert_at_cursor(text, selection, &format!("![{alt}]({url})"), None)
            }
        }
    }
}

/// Undo/redo over content snapshots.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<String>,
    index: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&str> {
        self.index
            .and_then(|i| self.entries.get(i))
            .map(String::as_str)
    }

    /// Record a new snapshot. Returns `false` if it equals the current one.
    ///
    /// Recording after an undo discards the redo tail. The oldest entry is
    /// dropped once `HISTORY_LIMIT` is exceeded.
    pub fn record(&mut self, content: &str) -> bool {
        if self.current().unwrap_or("") == content {
            return false;
        }

        let keep = self.index.map_or(0, |i| i + 1);
        self.entries.truncate(keep);
        self.entries.push(content.to_string());
        if self.entries.len() > HISTORY_LIMIT {
            self.entries.remove(0);
        }
        self.index = Some(self.entries.len() - 1);
        true
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.index, Some(i) if i > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.index, Some(i) if i + 1 < self.entries.len())
    }

    pub fn undo(&mut self) -> Option<&str> {
        let i = self.index.filter(|&i| i > 0)? - 1;
        self.index = Some(i);
        self.entries.get(i).map(String::as_str)
    }

    pub fn redo(&mut self) -> Option<&str> {
        let i = self.index.filter(|&i| i + 1 < self.entries.len())? + 1;
        self.index = Some(i);
        self.entries.get(i).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn clamp(text: &str, selection: Selection) -> (usize, usize) {
    let len = char_len(text);
    let a = selection.start.min(len);
    let b = selection.end.min(len);
    (a.min(b), a.max(b))
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices().nth(chars).map_or(text.len(), |(i, _)| i)
}

fn split_at_chars(text: &str, start: usize, end: usize) -> (&str, &str, &str) {
    let (bs, be) = (byte_offset(text, start), byte_offset(text, end));
    (&text[..bs], &text[bs..be], &text[be..])
}

// ------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------
