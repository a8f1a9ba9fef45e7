use serde::Serialize;

/// Sentence and clause punctuation dropped from lookup keys, in both the
/// full-width and the ASCII forms.
const STRIPPED_PUNCTUATION: [char; 10] = ['，', '？', '！', '。', '；', ',', '?', '!', '.', ';'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupMode {
    Word,
    Phrase,
}

impl LookupMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupMode::Word => "word",
            LookupMode::Phrase => "phrase",
        }
    }
}

pub fn is_stripped(ch: char) -> bool {
    ch.is_whitespace() || STRIPPED_PUNCTUATION.contains(&ch)
}

pub fn normalize_key(text: &str) -> String {
    text.chars().filter(|ch| !is_stripped(*ch)).collect()
}

/// Normalized key, percent-encoded for use as a single URL path segment.
pub fn encode_key(text: &str) -> String {
    urlencoding::encode(&normalize_key(text)).into_owned()
}

pub fn lookup_mode(text: &str) -> LookupMode {
    if text.chars().any(char::is_whitespace) {
        LookupMode::Phrase
    } else {
        LookupMode::Word
    }
}
