use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioDlError {
    #[error("resource not found: {url}")]
    NotFound { url: String },
    #[error("malformed reference: {0}")]
    MalformedReference(String),
    #[error("unexpected status {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serde json error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl AudioDlError {
    /// Upstream reported the resource as absent. Callers treat this as an
    /// empty result or a skipped item rather than a failed run.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AudioDlError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, AudioDlError>;
