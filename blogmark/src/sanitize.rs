//! Escaping and allow-list sanitization.
//!
//! Conversion escapes every literal text run before any markup is produced.
//! `sanitize_html` is the second layer: it rewrites an HTML fragment so only
//! the tags and attributes the converter itself emits survive.

use std::sync::LazyLock;

use regex::Regex;

/// Tags the converter can emit.
pub const ALLOWED_TAGS: &[&str] = &[
    "p", "br", "strong", "em", "u", "del", "h1", "h2", "h3", "ul", "ol", "li", "blockquote",
    "code", "pre", "a", "img", "hr",
];

/// Attributes kept on allowed tags. Everything else is dropped.
pub const ALLOWED_ATTRIBUTES: &[&str] = &["href", "src", "alt", "target", "rel"];

/// URL schemes accepted in `href` and `src`. Scheme-less URLs are relative
/// and always accepted.
pub const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// Substituted for any URL the policy rejects.
pub const BLOCKED_URL: &str = "#";

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9]*)\b([^<>]*)>").expect("valid tag regex")
});

static ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*"([^"]*)""#).expect("valid attribute regex")
});

/// Escape `& < > " '` so the text is inert both as element content and
/// inside a quoted attribute value.
pub fn escape_text(text: &str) -> String {
    html_escape::encode_quoted_attribute(text).into_owned()
}

/// Whether `url` may appear in an `href` or `src`.
///
/// Entities are decoded and whitespace/control characters removed before the
/// scheme is inspected, so `jav&#x61;script:` and `java\tscript:` are both
/// caught.
pub fn is_safe_url(url: &str) -> bool {
    let decoded = html_escape::decode_html_entities(url);
    let cleaned: String = decoded
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    let Some(colon) = cleaned.find(':') else {
        return true;
    };
    // A colon after a path, query or fragment delimiter is not a scheme.
    if cleaned[..colon].contains(['/', '?', '#']) {
        return true;
    }
    ALLOWED_SCHEMES.contains(&&cleaned[..colon])
}

/// `url` if it passes the policy, otherwise `#`.
pub fn safe_url(url: &str) -> &str {
    if is_safe_url(url) {
        url
    } else {
        log::debug!("blocked unsafe url: {url}");
        BLOCKED_URL
    }
}

/// Rewrite an HTML fragment so it contains only allow-listed markup.
///
/// Disallowed tags are escaped into visible text rather than deleted, stray
/// angle brackets outside tags are escaped, unknown or unquoted attributes
/// are dropped, and `href`/`src` values are run through `safe_url`.
/// Output of the converter passes through unchanged.
pub fn sanitize_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;

    for caps in TAG.captures_iter(html) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_text(&mut out, &html[last..whole.start()]);
        last = whole.end();

        let closing = !caps[1].is_empty();
        let name = caps[2].to_ascii_lowercase();
        if !ALLOWED_TAGS.contains(&name.as_str()) {
            out.push_str(&escape_text(whole.as_str()));
            continue;
        }

        if closing {
            out.push_str(&format!("</{name}>"));
            continue;
        }

        out.push('<');
        out.push_str(&name);
        let attrs = &caps[3];
        for attr in ATTR.captures_iter(attrs) {
            let key = attr[1].to_ascii_lowercase();
            if !ALLOWED_ATTRIBUTES.contains(&key.as_str()) {
                continue;
            }
            let value = match key.as_str() {
                "href" | "src" => safe_url(&attr[2]),
                _ => &attr[2],
            };
            out.push_str(&format!(" {key}=\"{value}\""));
        }
        if attrs.trim_end().ends_with('/') {
            out.push_str(" /");
        }
        out.push('>');
    }

    push_text(&mut out, &html[last..]);
    out
}

fn push_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

// ------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn escape_covers_quotes() {
        assert_eq!(escape_text(r#"<a href="x">&"#), "&lt;a href=&quot;x&quot;&gt;&amp;");
    }

    #[test]
    fn relative_and_web_urls_are_safe() {
        for url in ["page.html", "/blog/post", "#top", "https://example.com", "HTTP://x", "mailto:a@b.c", "?q=a:b"] {
            assert!(is_safe_url(url), "{url} should be allowed");
        }
    }

    #[test]
    fn script_schemes_are_blocked() {
        for url in [
            "javascript:alert(1)",
            "JavaScript:alert(1)",
            " java\tscript:alert(1)",
            "jav&#x61;script:alert(1)",
            "data:text/html,<b>",
            "vbscript:msgbox",
        ] {
            assert!(!is_safe_url(url), "{url} should be blocked");
            assert_eq!(safe_url(url), BLOCKED_URL);
        }
    }

    #[test]
    fn converter_markup_passes_through() {
        let html = concat!(
            "<h1>T</h1><p>a<br /><strong>b</strong> <em>c</em> <u>d</u> <del>e</del> <code>f</code></p>",
            "<ul><li>x</li></ul><ol><li>y</li></ol><blockquote>q</blockquote><pre><code>z</code></pre><hr />",
            r#"<p><img src="i.png" alt="i" /> <a href="p.html" target="_blank" rel="noopener noreferrer">p</a></p>"#,
        );
        assert_eq!(sanitize_html(html), html);
    }

    #[test]
    fn disallowed_tags_become_text() {
        assert_eq!(
            sanitize_html("<p>hi<script>alert(1)</script></p>"),
            "<p>hi&lt;script&gt;alert(1)&lt;/script&gt;</p>"
        );
    }

    #[test]
    fn event_handlers_and_styles_are_dropped() {
        assert_eq!(
            sanitize_html(r#"<img src="x.png" onerror="alert(1)" style="a" alt="x" />"#),
            r#"<img src="x.png" alt="x" />"#
        );
        assert_eq!(sanitize_html("<p onclick='x'>t</p>"), "<p>t</p>");
    }

    #[test]
    fn unsafe_href_is_neutralised() {
        assert_eq!(
            sanitize_html(r#"<a href="javascript:alert(1)">x</a>"#),
            r##"<a href="#">x</a>"##
        );
    }

    #[test]
    fn stray_brackets_are_escaped() {
        assert_eq!(sanitize_html("a < b > c <!-- x -->"), "a &lt; b &gt; c &lt;!-- x --&gt;");
    }

    #[test]
    fn tag_names_are_case_insensitive() {
        assert_eq!(sanitize_html("<STRONG>x</STRONG>"), "<strong>x</strong>");
    }
}
