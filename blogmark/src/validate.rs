//! Source checks.
//!
//! Conversion never fails, so nothing here is needed to render. These checks
//! report what the converter will silently recover from or neutralise, for
//! the CLI `check` command and the editor.

use std::sync::LazyLock;

use regex::Regex;

use crate::blocks::{FENCE, normalize};
use crate::error::{Diagnostic, Severity};
use crate::options::Options;
use crate::post::parse_post;
use crate::sanitize::is_safe_url;

static LINK_OR_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(!?)\[([^\]]*)\]\(([^)]+)\)").expect("valid link regex")
});

static CODE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`[^`\n]+`").expect("valid code span regex"));

static RAW_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"</?([A-Za-z][A-Za-z0-9]*)\b[^<>]*>").expect("valid raw tag regex")
});

/// Check a Markdown document with default options.
pub fn check(source: &str) -> Vec<Diagnostic> {
    check_with(source, &Options::default())
}

/// Check a Markdown document. Line numbers are 1-based.
pub fn check_with(source: &str, opts: &Options) -> Vec<Diagnostic> {
    check_lines(source, opts, 0)
}

/// Check a post file: front matter first, then the body.
pub fn check_post(source: &str) -> Vec<Diagnostic> {
    match parse_post(source) {
        Ok(post) => check_lines(&post.body, &Options::default(), post.body_start_line),
        Err(e) => {
            let line = match &e {
                crate::PostError::Yaml { line, .. } => *line,
                crate::PostError::Unclosed => Some(1),
                crate::PostError::MissingField(_) => None,
            };
            vec![Diagnostic::new(Severity::Error, e.code(), line, e.to_string())]
        }
    }
}

fn check_lines(source: &str, opts: &Options, line_offset: usize) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let (text, truncated) = normalize(source, opts.max_input_bytes);

    if truncated {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "W002",
            None,
            format!(
                "Input exceeds {} bytes and will be truncated",
                opts.max_input_bytes
            ),
        ));
    }

    let mut open_fence: Option<usize> = None;

    for (idx, line) in text.split('\n').enumerate() {
        let line_no = line_offset + idx + 1;
        let trimmed = line.trim();

        if trimmed == FENCE {
            open_fence = match open_fence {
                Some(_) => None,
                None => Some(line_no),
            };
            continue;
        }
        if open_fence.is_some() {
            continue;
        }

        if trimmed.starts_with(FENCE) {
            diagnostics.push(Diagnostic::new(
                Severity::Warning,
                "W004",
                Some(line_no),
                format!(
                    "`{trimmed}` is not a code fence; fences must be a line containing only ```"
                ),
            ));
        }

        let outside_code = CODE_SPAN.replace_all(line, "");

        for caps in LINK_OR_IMAGE.captures_iter(&outside_code) {
            let url = &caps[3];
            if !is_safe_url(url) {
                let kind = if caps[1].is_empty() { "Link" } else { "Image" };
                diagnostics.push(Diagnostic::new(
                    Severity::Warning,
                    "W003",
                    Some(line_no),
                    format!("{kind} target '{url}' is not allowed and will be replaced with '#'"),
                ));
            }
        }

        for caps in RAW_TAG.captures_iter(&outside_code) {
            if caps[1].eq_ignore_ascii_case("u") {
                continue;
            }
            diagnostics.push(Diagnostic::new(
                Severity::Info,
                "I001",
                Some(line_no),
                format!("Raw HTML '{}' will be shown as text", &caps[0]),
            ));
        }
    }

    if let Some(line_no) = open_fence {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "W001",
            Some(line_no),
            "Code fence is never closed; it runs to the end of the document".to_string(),
        ));
    }

    diagnostics
}

// ------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn codes(diags: &[Diagnostic]) -> Vec<&str> {
        diags.iter().filter_map(|d| d.code.as_deref()).collect()
    }

    #[test]
    fn clean_document_has_no_diagnostics() {
        let diags = check("# Title\n\n- a\n- b\n\n```\n<b>ok in code</b>\n```\n[x](https://x.org)");
        assert!(diags.is_empty(), "Unexpected diagnostics: {diags:?}");
    }

    #[test]
    fn unterminated_fence_reports_opening_line() {
        let diags = check("intro\n```\ncode");
        assert_eq!(codes(&diags), vec!["W001"]);
        assert_eq!(diags[0].line, Some(2));
        assert_eq!(diags[0].severity, Severity::Warning);
    }

    #[test]
    fn fence_with_info_string() {
        let diags = check("```rust\nfn main() {}\n```");
        // The info-string line is plain, so the closing fence opens a new block.
        assert_eq!(codes(&diags), vec!["W004", "W001"]);
        assert_eq!(diags[0].line, Some(1));
    }

    #[test]
    fn blocked_urls() {
        let diags = check("[a](javascript:alert(1)) ![b](data:image/png;base64,xx)");
        assert_eq!(codes(&diags), vec!["W003", "W003"]);
        assert!(diags[0].message.starts_with("Link"));
        assert!(diags[1].message.starts_with("Image"));
    }

    #[test]
    fn raw_html_is_reported_except_underline() {
        let diags = check("<u>fine</u> <script>alert(1)</script> `<i>code</i>`");
        assert_eq!(codes(&diags), vec!["I001", "I001"]);
        assert!(diags[0].message.contains("<script>"));
    }

    #[test]
    fn underline_is_exempt_in_any_case() {
        // Rendered as <u> regardless of case, so nothing to report.
        assert!(check("<U>loud</U> <u>quiet</u>").is_empty());
    }

    #[test]
    fn truncation_is_reported() {
        let opts = Options {
            max_input_bytes: 4,
            ..Options::default()
        };
        assert_eq!(codes(&check_with("abcdefgh", &opts)), vec!["W002"]);
    }

    #[test]
    fn post_body_lines_are_offset() {
        let diags = check_post("---\ntitle: T\nexcerpt: E\n---\nbody\n<b>x</b>");
        assert_eq!(codes(&diags), vec!["I001"]);
        assert_eq!(diags[0].line, Some(6));
    }

    #[test]
    fn post_front_matter_errors() {
        let diags = check_post("---\ntitle: T\n---\nbody");
        assert_eq!(codes(&diags), vec!["E003"]);
        assert_eq!(diags[0].severity, Severity::Error);

        assert_eq!(codes(&check_post("---\ntitle: T")), vec!["E001"]);
    }
}
