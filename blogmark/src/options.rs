use serde::{Deserialize, Serialize};

/// Default cap on converted input: 1 MiB.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 1024 * 1024;

/// Rendering options.
///
/// Deserialises from the `render` section of `blogmark.json`; every field is
/// optional there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    /// Input beyond this many bytes is dropped before parsing.
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: usize,

    /// Emit `target="_blank" rel="noopener noreferrer"` on links.
    #[serde(default = "default_true")]
    pub open_links_in_new_tab: bool,
}

fn default_max_input_bytes() -> usize {
    DEFAULT_MAX_INPUT_BYTES
}

fn default_true() -> bool {
    true
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_input_bytes: default_max_input_bytes(),
            open_links_in_new_tab: true,
        }
    }
}
