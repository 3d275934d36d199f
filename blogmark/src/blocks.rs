//! Line-oriented block parser.
//!
//! Each input line is classified exactly once, in a single forward pass. The
//! parser tracks which container (a list or a fenced code block) is open and
//! emits `Block` tokens. Text payloads are HTML-escaped after classification,
//! so the markers themselves are matched against the raw source.

use std::sync::LazyLock;

use regex::Regex;

use crate::sanitize::escape_text;

/// A line consisting of exactly this (after trimming) opens or closes a fence.
pub const FENCE: &str = "```";

/// A line consisting of exactly this (after trimming) is a horizontal rule.
pub const RULE: &str = "---";

static ORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s").expect("valid ordered item regex"));

/// Heading markers, most specific first so `# ` never claims a `## ` line.
const HEADINGS: [(&str, u8); 3] = [("### ", 3), ("## ", 2), ("# ", 1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    pub fn tag(self) -> &'static str {
        match self {
            ListKind::Unordered => "ul",
            ListKind::Ordered => "ol",
        }
    }
}

/// One token emitted by the block parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    ListStart(ListKind),
    ListEnd(ListKind),
    ListItem(String),
    Blockquote(String),
    /// Lines between a pair of fences, verbatim apart from escaping.
    CodeBlock(Vec<String>),
    Rule,
    /// A line no other rule claimed. Blank lines are kept as empty strings
    /// so the inline formatter can still see paragraph breaks.
    Line(String),
}

impl Block {
    /// Intermediate HTML for this token, without a trailing newline.
    pub fn to_html(&self) -> String {
        match self {
            Block::Heading { level, text } => format!("<h{level}>{text}</h{level}>"),
            Block::ListStart(kind) => format!("<{}>", kind.tag()),
            Block::ListEnd(kind) => format!("</{}>", kind.tag()),
            Block::ListItem(text) => format!("<li>{text}</li>"),
            Block::Blockquote(text) => format!("<blockquote>{text}</blockquote>"),
            Block::CodeBlock(lines) => format!("<pre><code>{}</code></pre>", lines.join("\n")),
            Block::Rule => "<hr />".to_string(),
            Block::Line(text) => text.clone(),
        }
    }
}

/// Parser state between lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    List(ListKind),
    /// Inside a fence. `list` remembers a list that was open when the fence
    /// started; fences do not close lists.
    Code {
        buffer: Vec<String>,
        list: Option<ListKind>,
    },
}

/// Explicit state machine over lines.
///
/// ```
/// use blogmark::blocks::{Block, BlockParser, ListKind};
///
/// let mut parser = BlockParser::new();
/// assert_eq!(
///     parser.feed("- a"),
///     vec![Block::ListStart(ListKind::Unordered), Block::ListItem("a".into())]
/// );
/// assert_eq!(parser.finish(), vec![Block::ListEnd(ListKind::Unordered)]);
/// ```
#[derive(Debug, Default)]
pub struct BlockParser {
    mode: Mode,
}

impl BlockParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Classify one line (without its `\n`) and return the tokens it emits.
    pub fn feed(&mut self, line: &str) -> Vec<Block> {
        let mut out = Vec::new();
        let trimmed = line.trim();

        if trimmed == FENCE {
            self.toggle_fence(&mut out);
            return out;
        }

        if let Mode::Code { buffer, .. } = &mut self.mode {
            buffer.push(escape_text(line));
            return out;
        }

        if trimmed == RULE {
            self.close_list(&mut out);
            out.push(Block::Rule);
            return out;
        }

        for (marker, level) in HEADINGS {
            if let Some(text) = line.strip_prefix(marker) {
                self.close_list(&mut out);
                out.push(Block::Heading {
                    level,
                    text: escape_text(text),
                });
                return out;
            }
        }

        if let Some(text) = line.strip_prefix("> ") {
            self.close_list(&mut out);
            out.push(Block::Blockquote(escape_text(text)));
            return out;
        }

        if let Some(text) = line.strip_prefix("- ") {
            self.open_list(ListKind::Unordered, &mut out);
            out.push(Block::ListItem(escape_text(text)));
            return out;
        }

        if let Some(marker) = ORDERED_ITEM.find(line) {
            self.open_list(ListKind::Ordered, &mut out);
            out.push(Block::ListItem(escape_text(&line[marker.end()..])));
            return out;
        }

        if trimmed.is_empty() {
            self.close_list(&mut out);
            out.push(Block::Line(String::new()));
            return out;
        }

        out.push(Block::Line(escape_text(line)));
        out
    }

    /// Close whatever is still open at end of input.
    ///
    /// An unterminated fence still yields its buffered lines as a code block.
    pub fn finish(self) -> Vec<Block> {
        match self.mode {
            Mode::Normal => Vec::new(),
            Mode::List(kind) => vec![Block::ListEnd(kind)],
            Mode::Code { buffer, list } => {
                let mut out = vec![Block::CodeBlock(buffer)];
                if let Some(kind) = list {
                    out.push(Block::ListEnd(kind));
                }
                out
            }
        }
    }

    fn toggle_fence(&mut self, out: &mut Vec<Block>) {
        self.mode = match std::mem::take(&mut self.mode) {
            Mode::Code { buffer, list } => {
                out.push(Block::CodeBlock(buffer));
                list.map_or(Mode::Normal, Mode::List)
            }
            Mode::List(kind) => Mode::Code {
                buffer: Vec::new(),
                list: Some(kind),
            },
            Mode::Normal => Mode::Code {
                buffer: Vec::new(),
                list: None,
            },
        };
    }

    fn close_list(&mut self, out: &mut Vec<Block>) {
        if let Mode::List(kind) = self.mode {
            out.push(Block::ListEnd(kind));
            self.mode = Mode::Normal;
        }
    }

    fn open_list(&mut self, kind: ListKind, out: &mut Vec<Block>) {
        match self.mode {
            Mode::List(open) if open == kind => return,
            Mode::List(open) => {
                out.push(Block::ListEnd(open));
                out.push(Block::ListStart(kind));
            }
            _ => out.push(Block::ListStart(kind)),
        }
        self.mode = Mode::List(kind);
    }
}

/// Run the block parser over a whole document.
pub fn tokenize(markdown: &str) -> Vec<Block> {
    if markdown.is_empty() {
        return Vec::new();
    }

    let mut parser = BlockParser::new();
    let mut blocks = Vec::new();
    for line in markdown.split('\n') {
        blocks.extend(parser.feed(line));
    }
    blocks.extend(parser.finish());

    log::trace!("block parser emitted {} tokens", blocks.len());
    blocks
}

/// Intermediate HTML: one token per line, joined with `\n`.
pub fn parse_blocks(markdown: &str) -> String {
    tokenize(markdown)
        .iter()
        .map(Block::to_html)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Normalise line endings and cap the size.
///
/// Returns the prepared text and whether it had to be truncated.
pub fn normalize(input: &str, max_bytes: usize) -> (String, bool) {
    let mut text = input.replace("\r\n", "\n");

    if text.len() <= max_bytes {
        return (text, false);
    }

    let mut cut = max_bytes;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    log::warn!(
        "input of {} bytes exceeds the {} byte limit; truncating",
        text.len(),
        max_bytes
    );
    text.truncate(cut);
    (text, true)
}

// ------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------
