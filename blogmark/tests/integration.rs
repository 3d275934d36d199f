//! End-to-end conversion tests: whole documents in, final HTML out.

use blogmark::{Severity, markdown_to_html, parse_post};
use pretty_assertions::assert_eq;

fn fixtures_dir() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../tests/fixtures")
}

fn read_fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture '{}': {}", path.display(), e))
}

#[test]
fn heading_precedence() {
    let html = markdown_to_html("### Sub");
    assert!(html.contains("<h3>Sub</h3>"));
    assert!(!html.contains("<h2>") && !html.contains("<h1>"));
}

#[test]
fn list_grouping_closes_before_paragraph() {
    assert_eq!(
        markdown_to_html("- a\n- b\n\nNext"),
        "<ul><li>a</li><li>b</li></ul><p>Next</p>"
    );
}

#[test]
fn list_type_switch() {
    let html = markdown_to_html("- a\n1. b");
    let ul_close = html.find("</ul>").expect("unordered list closed");
    let ol_open = html.find("<ol>").expect("ordered list opened");
    assert!(ul_close < ol_open, "{html}");
    assert_eq!(html, "<ul><li>a</li></ul><ol><li>b</li></ol>");
}

#[test]
fn code_fence_isolation() {
    assert_eq!(
        markdown_to_html("```\n# not a heading\n```"),
        "<pre><code># not a heading</code></pre>"
    );
}

#[test]
fn inline_ordering() {
    assert_eq!(
        markdown_to_html("**bold *nested* text**"),
        "<p><strong>bold <em>nested</em> text</strong></p>"
    );
}

#[test]
fn link_and_image_disambiguation() {
    let html = markdown_to_html("![alt](img.png) and [text](page.html)");
    assert_eq!(html.matches("<img ").count(), 1);
    assert_eq!(html.matches("<a ").count(), 1);
    assert!(html.contains(r#"<img src="img.png" alt="alt" />"#));
    assert!(html.contains(r#"<a href="page.html" target="_blank" rel="noopener noreferrer">text</a>"#));
    assert!(!html.contains('!'));
}

#[test]
fn script_tags_are_escaped() {
    let html = markdown_to_html("Hello <script>alert(1)</script> world");
    assert!(!html.contains("<script"), "{html}");
    assert_eq!(
        html,
        "<p>Hello &lt;script&gt;alert(1)&lt;/script&gt; world</p>"
    );
}

#[test]
fn attribute_injection_through_urls_is_inert() {
    let html = markdown_to_html(r#"[x](a.html" onclick="alert(1)) ![y](javascript:alert(1))"#);
    assert!(!html.contains("onclick=\""), "{html}");
    assert!(!html.contains("javascript:"), "{html}");
}

#[test]
fn paragraph_wrapping_boundary() {
    assert_eq!(markdown_to_html("Just text"), "<p>Just text</p>");

    let html = markdown_to_html("# H\n\nBody");
    assert!(html.starts_with("<h1>H</h1>"));
    assert!(!html.contains("<p><h1>"));
    assert_eq!(html, "<h1>H</h1><p>Body</p>");
}

#[test]
fn totality_on_awkward_input() {
    for input in ["", " ", "\n\n\n", "```", "```\n", "- ", "1. ", "> ", "**", "[](", "![", "\r\n"] {
        let first = markdown_to_html(input);
        assert_eq!(first, markdown_to_html(input), "non-deterministic for {input:?}");
    }
}

#[test]
fn underline_from_the_editor_survives() {
    assert_eq!(markdown_to_html("<u>under</u>"), "<p><u>under</u></p>");
}

#[test]
fn code_span_contents_are_literal() {
    assert_eq!(
        markdown_to_html("`**not bold**` but **bold**"),
        "<p><code>**not bold**</code> but <strong>bold</strong></p>"
    );
}

#[test]
fn crlf_documents_render_like_lf() {
    assert_eq!(
        markdown_to_html("# T\r\n\r\n- a\r\n- b"),
        markdown_to_html("# T\n\n- a\n- b")
    );
}

#[test]
fn hiring_guide_fixture() {
    let post = parse_post(&read_fixture("posts/hiring-guide.md")).expect("valid post");
    assert_eq!(post.meta.author, "Ada Obi");
    assert_eq!(post.meta.date.as_deref(), Some("March 3, 2025"));
    assert!(post.meta.featured);

    let html = markdown_to_html(&post.body);
    let expected = concat!(
        "<h1>How to Hire the Right Provider</h1>",
        "<p>Finding a <strong>trusted</strong> professional takes <em>a little</em> homework.</p>",
        "<h2>Before you book</h2>",
        "<ul><li>Check reviews</li><li>Ask for a <del>verbal</del> written quote</li><li>Confirm availability</li></ul>",
        "<ol><li>Post your job</li><li>Compare offers</li></ol>",
        "<blockquote>Good work is never cheap, cheap work is never good.</blockquote>",
        "<pre><code>curl https://api.example.com/jobs</code></pre>",
        "<hr />",
        r#"<p>Read our <a href="/blog/safety" target="_blank" rel="noopener noreferrer">safety guide</a> or email us.<br />"#,
        r#"<img src="https://example.com/team.jpg" alt="Team photo" /></p>"#,
    );
    assert_eq!(html, expected);
}

#[test]
fn unsafe_fixture_checks() {
    let source = read_fixture("unsafe.md");
    let diagnostics = blogmark::check(&source);
    let codes: Vec<_> = diagnostics.iter().filter_map(|d| d.code.as_deref()).collect();
    assert_eq!(codes, vec!["W003", "I001", "I001", "W004"]);
    assert!(diagnostics.iter().all(|d| d.severity != Severity::Error));

    let html = markdown_to_html(&source);
    assert!(!html.contains("<script"));
    assert!(html.contains(r##"<a href="#""##));
}
