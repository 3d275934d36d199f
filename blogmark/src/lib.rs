//! `blogmark`: Markdown-to-HTML for blog posts and the editor preview.
//!
//! The dialect is deliberately small: `#`/`##`/`###` headings, `-` and `1.`
//! lists, `>` quotes, fenced code, `---` rules, `**bold**`, `*italic*`,
//! `~~strike~~`, `<u>underline</u>`, `` `code` ``, images and links.
//! Conversion is a pure, total function; all literal text is escaped and the
//! result is passed through an allow-list sanitizer.
//!
//! # Quick start
//!
//! ```
//! let html = blogmark::markdown_to_html("# Hello\n\nSome **bold** text");
//! assert_eq!(html, "<h1>Hello</h1><p>Some <strong>bold</strong> text</p>");
//! ```

pub mod blocks;
pub mod editing;
pub mod error;
pub mod inline;
pub mod options;
pub mod post;
pub mod sanitize;
pub mod validate;

pub use error::*;
pub use options::Options;
pub use post::{Post, PostMeta, RenderedPost, parse_post};
pub use sanitize::sanitize_html;
pub use validate::{check, check_post, check_with};

/// Convert Markdown to an HTML fragment with default options.
pub fn markdown_to_html(source: &str) -> String {
    markdown_to_html_with(source, &Options::default())
}

/// Convert Markdown to an HTML fragment.
///
/// Never fails: unterminated lists and fences are closed at end of input,
/// and input beyond `opts.max_input_bytes` is dropped.
pub fn markdown_to_html_with(source: &str, opts: &Options) -> String {
    if source.is_empty() {
        return String::new();
    }

    let (text, _) = blocks::normalize(source, opts.max_input_bytes);
    let block_html = blocks::parse_blocks(&text);
    let html = inline::format_inline_with(&block_html, opts);
    sanitize_html(&html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_and_blank_input() {
        assert_eq!(markdown_to_html(""), "");
        assert_eq!(markdown_to_html("   \n\t\n"), "");
    }

    #[test]
    fn truncated_input_still_renders() {
        let opts = Options {
            max_input_bytes: 7,
            ..Options::default()
        };
        assert_eq!(markdown_to_html_with("- a\n- b\n- c", &opts), "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn markers_inside_link_targets_survive_sanitizing() {
        assert_eq!(
            markdown_to_html("![a *b* c](x.png)"),
            r#"<p><img src="x.png" alt="a *b* c" /></p>"#
        );
        let html = markdown_to_html("[x](http://a.com/*x*/y*)");
        assert_eq!(
            html,
            r#"<p><a href="http://a.com/*x*/y*" target="_blank" rel="noopener noreferrer">x</a></p>"#
        );
        assert_eq!(html.matches("</a>").count(), 1);
    }

    #[test]
    fn uppercase_underline_renders() {
        assert_eq!(markdown_to_html("<U>loud</U>"), "<p><u>loud</u></p>");
    }
}
