use serde::{Deserialize, Serialize};

/// One retrievable recording: where to fetch it and the local filename to
/// store it under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub url: String,
    pub display_name: String,
}

impl Reference {
    pub fn new(url: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            display_name: display_name.into(),
        }
    }
}

/// Everything the extractor needs besides the markup itself.
#[derive(Debug, Clone)]
pub struct ExtractContext<'a> {
    pub query: &'a str,
    pub dialect: &'a str,
    pub file_type: &'a str,
    pub audio_base: &'a str,
}
