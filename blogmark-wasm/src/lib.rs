//! WASM bindings for `blogmark`.
//!
//! Exposes the converter to the admin editor via wasm-bindgen.
//! Call `markdown_to_html()` on every keystroke for the live preview, and
//! `apply_format()` / `apply_shortcut()` from the toolbar buttons and
//! keyboard shortcuts. `EditorHistory` backs the undo/redo buttons.

use blogmark::editing::{Format, History, Selection};
use wasm_bindgen::prelude::*;

/// Convert Markdown to a sanitized HTML fragment.
#[wasm_bindgen]
pub fn markdown_to_html(input: &str) -> String {
    blogmark::markdown_to_html(input)
}

/// Parse a post file (front matter + body) and render it.
///
/// Returns `{ title, excerpt, author, category, featured, ..., html }`.
/// Throws the error message if the front matter is unclosed, invalid, or
/// missing a required field.
#[wasm_bindgen]
pub fn parse_post(input: &str) -> Result<JsValue, JsValue> {
    let post = blogmark::parse_post(input).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let rendered = post.render(&blogmark::Options::default());
    Ok(serde_wasm_bindgen::to_value(&rendered)?)
}

/// Check a Markdown document and return diagnostics as JSON.
///
/// Returns a JSON array of `{ severity, message, line, code }` objects.
/// An empty array means nothing will be dropped or neutralised.
#[wasm_bindgen]
pub fn check(input: &str) -> String {
    let diagnostics = blogmark::check(input);
    serde_json::to_string(&diagnostics).unwrap_or_else(|_| "[]".to_string())
}

/// Apply a toolbar action to the textarea contents.
///
/// `format` is one of `bold`, `italic`, `underline`, `strikethrough`, `code`,
/// `heading`, `quote`, `bulletItem`, `numberedItem`, `rule`, `link` (needs
/// `url`) or `image` (needs `url`, optional `alt`). Returns
/// `{ text, selection: { start, end } }`.
#[wasm_bindgen]
pub fn apply_format(
    text: &str,
    start: usize,
    end: usize,
    format: &str,
    url: Option<String>,
    alt: Option<String>,
) -> Result<JsValue, JsValue> {
    let format = format_from_name(format, url, alt).map_err(|e| JsValue::from_str(&e))?;
    let edit = format.apply(text, Selection::new(start, end));
    Ok(serde_wasm_bindgen::to_value(&edit)?)
}

/// Apply a Ctrl/Cmd shortcut (`b`, `i`, `u`, or `k` with a `url`).
///
/// Returns `null` when the key has no action, so the browser default runs.
#[wasm_bindgen]
pub fn apply_shortcut(
    text: &str,
    start: usize,
    end: usize,
    key: char,
    url: Option<String>,
) -> Result<JsValue, JsValue> {
    match Format::from_shortcut(key, url.as_deref()) {
        Some(format) => {
            let edit = format.apply(text, Selection::new(start, end));
            Ok(serde_wasm_bindgen::to_value(&edit)?)
        }
        None => Ok(JsValue::NULL),
    }
}

/// Undo/redo stack for the editor textarea.
#[wasm_bindgen]
#[derive(Default)]
pub struct EditorHistory {
    inner: History,
}

#[wasm_bindgen]
impl EditorHistory {
    #[wasm_bindgen(constructor)]
    pub fn new() -> EditorHistory {
        EditorHistory::default()
    }

    /// Record the current content. Returns `false` if nothing changed.
    pub fn record(&mut self, content: &str) -> bool {
        self.inner.record(content)
    }

    /// Step back; `undefined` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<String> {
        self.inner.undo().map(str::to_string)
    }

    /// Step forward; `undefined` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<String> {
        self.inner.redo().map(str::to_string)
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.inner.can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.inner.can_redo()
    }

    pub fn current(&self) -> Option<String> {
        self.inner.current().map(str::to_string)
    }
}

fn format_from_name(
    name: &str,
    url: Option<String>,
    alt: Option<String>,
) -> Result<Format, String> {
    let needs_url = |url: Option<String>| {
        url.filter(|u| !u.trim().is_empty())
            .ok_or_else(|| format!("Format '{name}' requires a url"))
    };

    Ok(match name {
        "bold" => Format::Bold,
        "italic" => Format::Italic,
        "underline" => Format::Underline,
        "strikethrough" => Format::Strikethrough,
        "code" => Format::Code,
        "heading" => Format::Heading,
        "quote" => Format::Quote,
        "bulletItem" => Format::BulletItem,
        "numberedItem" => Format::NumberedItem,
        "rule" => Format::Rule,
        "link" => Format::Link {
            url: needs_url(url)?,
        },
        "image" => Format::Image {
            url: needs_url(url)?,
            alt,
        },
        other => return Err(format!("Unknown format '{other}'")),
    })
}
