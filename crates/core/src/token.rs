use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AudioDlError, Result};

static QUOTED_AFTER_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*'([^']+)'").expect("token pattern"));

// The site sometimes drops the trailing padding from the embedded token.
const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decodes the path fragment embedded in a play control's `onclick` value,
/// e.g. `Play(123,'OTk5L...','...',false)`.
pub fn decode_token(attribute: &str) -> Result<String> {
    let encoded = QUOTED_AFTER_COMMA
        .captures(attribute)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .ok_or_else(|| {
            AudioDlError::MalformedReference(format!("no quoted token in {attribute:?}"))
        })?;
    let bytes = TOKEN_ENGINE.decode(encoded).map_err(|err| {
        AudioDlError::MalformedReference(format!("invalid base64 token {encoded:?}: {err}"))
    })?;
    String::from_utf8(bytes).map_err(|err| {
        AudioDlError::MalformedReference(format!("token {encoded:?} is not utf-8: {err}"))
    })
}
