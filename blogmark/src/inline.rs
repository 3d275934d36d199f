//! Inline formatter.
//!
//! Works on the intermediate HTML produced by the block parser. Code is lifted
//! out into placeholders first, so nothing inside a code block or code span
//! is ever rewritten. Link and image targets, and image alt text, are held
//! the same way since they end up inside attributes. Then the ordered
//! substitution rules run, blank-line separated runs of text become
//! paragraphs, and the held fragments come back.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::options::Options;
use crate::sanitize::safe_url;

/// Marks placeholders. Stripped from the input before formatting.
const SENTINEL: char = '\u{1A}';

/// Line prefixes the block parser emits for block-level tokens. Lines that
/// start with one of these are never wrapped in `<p>`.
pub const BLOCK_PREFIXES: &[&str] = &[
    "<h1>",
    "<h2>",
    "<h3>",
    "<ul>",
    "</ul>",
    "<ol>",
    "</ol>",
    "<li>",
    "<blockquote>",
    "<pre>",
    "<hr />",
];

static PRE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<pre><code>(.*?)</code></pre>").expect("valid code block regex")
});

static CODE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\n]+)`").expect("valid code span regex"));

static LINK_OR_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(!?)\[([^\]\n]*)\]\(([^)\n]+)\)").expect("valid link target regex")
});

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1A(\d+)\x1A").expect("valid placeholder regex"));

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("valid paragraph break regex"));

/// One substitution in the ordered pipeline.
pub struct InlineRule {
    pub name: &'static str,
    pattern: Regex,
    render: fn(&Captures<'_>, &Options) -> String,
}

impl InlineRule {
    fn new(name: &'static str, pattern: &str, render: fn(&Captures<'_>, &Options) -> String) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("valid inline rule regex"),
            render,
        }
    }

    fn apply(&self, html: &str, opts: &Options) -> String {
        self.pattern
            .replace_all(html, |caps: &Captures<'_>| (self.render)(caps, opts))
            .into_owned()
    }
}

/// The substitutions, in the order they run. Order matters: bold must see
/// `**` before italic sees `*`, and images must be consumed before the link
/// rule could claim their `[alt](url)` tail.
static RULES: LazyLock<Vec<InlineRule>> = LazyLock::new(|| {
    vec![
        InlineRule::new("bold", r"\*\*(.+?)\*\*", |c, _| {
            format!("<strong>{}</strong>", &c[1])
        }),
        InlineRule::new("italic", r"\*(.+?)\*", |c, _| format!("<em>{}</em>", &c[1])),
        InlineRule::new("strikethrough", r"~~(.+?)~~", |c, _| {
            format!("<del>{}</del>", &c[1])
        }),
        // The editor inserts literal <u> tags; they arrive here escaped.
        InlineRule::new("underline", r"(?i)&lt;u&gt;(.+?)&lt;/u&gt;", |c, _| {
            format!("<u>{}</u>", &c[1])
        }),
        InlineRule::new("image", r"!\[([^\]]*)\]\(([^)]+)\)", |c, _| {
            format!("<img src=\"{}\" alt=\"{}\" />", safe_url(&c[2]), &c[1])
        }),
        InlineRule::new("link", r"\[([^\]]+)\]\(([^)]+)\)", render_link),
    ]
});

fn render_link(caps: &Captures<'_>, opts: &Options) -> String {
    let href = safe_url(&caps[2]);
    if opts.open_links_in_new_tab {
        format!(
            "<a href=\"{href}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
            &caps[1]
        )
    } else {
        format!("<a href=\"{href}\">{}</a>", &caps[1])
    }
}

/// Names of the substitution rules in application order. Inline code is not
/// listed: it is protected before the first rule and restored after the last.
pub fn rule_names() -> Vec<&'static str> {
    RULES.iter().map(|r| r.name).collect()
}

/// Format block-level HTML with default options.
pub fn format_inline(block_html: &str) -> String {
    format_inline_with(block_html, &Options::default())
}

/// Apply inline substitutions and paragraph grouping to the block parser's
/// intermediate HTML.
pub fn format_inline_with(block_html: &str, opts: &Options) -> String {
    let mut stash = Stash::default();
    let html = block_html.replace(SENTINEL, "");

    let html = PRE_BLOCK.replace_all(&html, |c: &Captures<'_>| {
        let held = stash.hold(format!("<code>{}</code>", &c[1]), &c[1]);
        format!("<pre>{held}</pre>")
    });
    let html = CODE_SPAN.replace_all(&html, |c: &Captures<'_>| {
        stash.hold(format!("<code>{}</code>", &c[1]), &c[0])
    });
    let mut html = LINK_OR_IMAGE
        .replace_all(&html, |c: &Captures<'_>| hold_link_parts(&mut stash, c))
        .into_owned();

    for rule in RULES.iter() {
        html = rule.apply(&html, opts);
    }

    let html = group_paragraphs(&html);
    stash.restore(&html)
}

/// Replace the URL of `[text](url)` / `![alt](url)`, and the alt text of an
/// image, with placeholders so no inline rule can put markup inside them.
/// The URL is checked here, against its source text. Link text stays in place
/// and is formatted like any other text.
fn hold_link_parts(stash: &mut Stash, caps: &Captures<'_>) -> String {
    let image = &caps[1];
    if image.is_empty() && caps[2].is_empty() {
        return caps[0].to_string();
    }

    let url = stash.source_text(&caps[3]);
    let url = safe_url(&url).to_string();
    let url = stash.hold(url.clone(), &url);

    let label = if image.is_empty() {
        caps[2].to_string()
    } else {
        let alt = stash.source_text(&caps[2]);
        stash.hold(alt.clone(), &alt)
    };

    format!("{image}[{label}]({url})")
}

/// Split on blank lines and wrap each run of non-block lines in `<p>`.
/// Single newlines inside a run become `<br />`.
///
/// A plain line inside an open list is wrapped too, so it lands as a `<p>`
/// between the `<li>` items rather than being merged into one of them.
fn group_paragraphs(html: &str) -> String {
    let mut out = String::with_capacity(html.len() + 16);
    let mut run: Vec<&str> = Vec::new();

    for chunk in PARAGRAPH_BREAK.split(html) {
        for line in chunk.split('\n') {
            if is_block_line(line) {
                flush_paragraph(&mut out, &mut run);
                out.push_str(line);
            } else {
                run.push(line);
            }
        }
        flush_paragraph(&mut out, &mut run);
    }

    out
}

fn is_block_line(line: &str) -> bool {
    BLOCK_PREFIXES.iter().any(|p| line.starts_with(p))
}

fn flush_paragraph(out: &mut String, run: &mut Vec<&str>) {
    let start = run.iter().position(|l| !l.trim().is_empty());
    let end = run.iter().rposition(|l| !l.trim().is_empty());
    if let (Some(start), Some(end)) = (start, end) {
        out.push_str("<p>");
        out.push_str(&run[start..=end].join("<br />"));
        out.push_str("</p>");
    }
    run.clear();
}

/// Holds protected fragments until formatting is done.
#[derive(Default)]
struct Stash {
    held: Vec<Held>,
}

struct Held {
    html: String,
    /// The text the placeholder replaced.
    source: String,
}

impl Stash {
    fn hold(&mut self, html: String, source: &str) -> String {
        self.held.push(Held {
            html,
            source: source.to_string(),
        });
        format!("{SENTINEL}{}{SENTINEL}", self.held.len() - 1)
    }

    /// `text` with placeholders put back as the source they replaced.
    fn source_text(&self, text: &str) -> String {
        PLACEHOLDER
            .replace_all(text, |c: &Captures<'_>| {
                c[1].parse::<usize>()
                    .ok()
                    .and_then(|i| self.held.get(i))
                    .map(|h| h.source.clone())
                    .unwrap_or_default()
            })
            .into_owned()
    }

    fn restore(&self, html: &str) -> String {
        PLACEHOLDER
            .replace_all(html, |c: &Captures<'_>| {
                c[1].parse::<usize>()
                    .ok()
                    .and_then(|i| self.held.get(i))
                    .map(|h| h.html.clone())
                    .unwrap_or_default()
            })
            .into_owned()
    }
}

// ------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------
