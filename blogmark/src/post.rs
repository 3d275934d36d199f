//! Blog post files: YAML front matter followed by a Markdown body.
//!
//! ```text
//! ---
//! title: Hiring a plumber
//! excerpt: What to ask before you book.
//! category: Guides
//! ---
//! # Start here
//! ```

use serde::{Deserialize, Serialize};

use crate::error::PostError;
use crate::options::Options;

pub const DEFAULT_AUTHOR: &str = "HeyB Editorial";
pub const DEFAULT_CATEGORY: &str = "General";

/// Front matter fields of a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMeta {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub excerpt: String,

    #[serde(default = "default_author")]
    pub author: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(default = "default_category")]
    pub category: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default)]
    pub featured: bool,
}

fn default_author() -> String {
    DEFAULT_AUTHOR.to_string()
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl Default for PostMeta {
    fn default() -> Self {
        Self {
            title: String::new(),
            excerpt: String::new(),
            author: default_author(),
            date: None,
            category: default_category(),
            image: None,
            featured: false,
        }
    }
}

/// A parsed post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub meta: PostMeta,
    pub body: String,
    /// 0-based index of the first body line within the source file.
    pub body_start_line: usize,
}

/// A post ready to be stored or served: metadata plus the rendered body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedPost {
    #[serde(flatten)]
    pub meta: PostMeta,
    pub html: String,
}

impl Post {
    pub fn render(&self, opts: &Options) -> RenderedPost {
        RenderedPost {
            meta: self.meta.clone(),
            html: crate::markdown_to_html_with(&self.body, opts),
        }
    }
}

/// Split a document into its front matter (without the `---` lines), its
/// body, and the 0-based line index where the body starts.
///
/// A document that does not open with `---` has no front matter.
pub fn split_front_matter(source: &str) -> Result<(Option<String>, String, usize), PostError> {
    let normalised = source.replace("\r\n", "\n");
    let lines: Vec<&str> = normalised.split('\n').collect();

    if lines.first().map(|l| l.trim()) != Some("---") {
        return Ok((None, normalised, 0));
    }

    let end = lines
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, l)| l.trim() == "---")
        .map(|(i, _)| i)
        .ok_or(PostError::Unclosed)?;

    let yaml = lines[1..end].join("\n");
    let body = lines[end + 1..].join("\n");
    Ok((Some(yaml), body, end + 1))
}

/// Body of a document with any front matter removed. Unclosed front matter
/// is treated as part of the body.
pub fn strip_front_matter(source: &str) -> String {
    match split_front_matter(source) {
        Ok((_, body, _)) => body,
        Err(_) => source.replace("\r\n", "\n"),
    }
}

/// Parse a post file and check that it has a title, an excerpt and a body.
pub fn parse_post(source: &str) -> Result<Post, PostError> {
    let (yaml, body, body_start_line) = split_front_matter(source)?;

    let mut meta = match yaml.as_deref() {
        Some(y) if !y.trim().is_empty() => {
            serde_yaml::from_str::<PostMeta>(y).map_err(|e| PostError::Yaml {
                message: e.to_string(),
                // +1 for the opening `---` line.
                line: e.location().map(|loc| loc.line() + 1),
            })?
        }
        _ => PostMeta::default(),
    };

    if meta.author.trim().is_empty() {
        meta.author = default_author();
    }
    if meta.category.trim().is_empty() {
        meta.category = default_category();
    }

    if meta.title.trim().is_empty() {
        return Err(PostError::MissingField("title"));
    }
    if meta.excerpt.trim().is_empty() {
        return Err(PostError::MissingField("excerpt"));
    }
    if body.trim().is_empty() {
        return Err(PostError::MissingField("content"));
    }

    Ok(Post {
        meta,
        body,
        body_start_line,
    })
}

// ------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------
