use serde::{Deserialize, Serialize};

/// Errors produced while reading a post file.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PostError {
    #[error("Front matter opened with `---` but never closed")]
    Unclosed,

    #[error("Invalid front matter: {message}")]
    Yaml { message: String, line: Option<usize> },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

impl PostError {
    /// Diagnostic code reported by `check_post`.
    pub fn code(&self) -> &'static str {
        match self {
            PostError::Unclosed => "E001",
            PostError::Yaml { .. } => "E002",
            PostError::MissingField(_) => "E003",
        }
    }
}

/// A diagnostic message about a source document.
///
/// Diagnostics never stop conversion: `markdown_to_html` always produces
/// output, and `check` explains what it had to recover from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// 1-based source line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Diagnostic {
    pub(crate) fn new(severity: Severity, code: &str, line: Option<usize>, message: String) -> Self {
        Self {
            severity,
            message,
            line,
            code: Some(code.to_string()),
        }
    }
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}
