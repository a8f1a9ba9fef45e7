use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use tracing::debug;

use crate::error::{AudioDlError, Result};

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// The outbound HTTP seam. Implementations must report a missing upstream
/// resource as [`AudioDlError::NotFound`] so the pipeline can recover from it.
pub trait Transport {
    fn fetch_text(&self, url: &str) -> Result<String>;
    fn download(&self, url: &str, dest: &Path) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn fetch_text(&self, url: &str) -> Result<String> {
        (**self).fetch_text(url)
    }

    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        (**self).download(url, dest)
    }
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    fn get(&self, url: &str) -> Result<Response> {
        debug!(url, "GET");
        let response = self.client.get(url).send()?;
        check_status(url, response.status())?;
        Ok(response)
    }
}

impl Transport for HttpTransport {
    fn fetch_text(&self, url: &str) -> Result<String> {
        Ok(self.get(url)?.text()?)
    }

    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let body = self.get(url)?.bytes()?;
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(dest, &body)?;
        Ok(())
    }
}

fn check_status(url: &str, status: StatusCode) -> Result<()> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::NOT_FOUND => Err(AudioDlError::NotFound {
            url: url.to_string(),
        }),
        other => Err(AudioDlError::Status {
            url: url.to_string(),
            status: other.as_u16(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_separates_not_found_from_other_failures() {
        assert!(check_status("u", StatusCode::OK).is_ok());
        assert!(check_status("u", StatusCode::NOT_FOUND)
            .unwrap_err()
            .is_not_found());
        match check_status("u", StatusCode::FORBIDDEN) {
            Err(AudioDlError::Status { status, .. }) => assert_eq!(status, 403),
            other => panic!("unexpected {other:?}"),
        }
    }
}
