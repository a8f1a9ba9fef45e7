use tracing::debug;

use crate::error::Result;
use crate::extract::extract_references;
use crate::normalization::{encode_key, lookup_mode, LookupMode};
use crate::reference::{ExtractContext, Reference};
use crate::transport::Transport;

pub const DEFAULT_SITE_BASE: &str = "https://forvo.com";
pub const DEFAULT_AUDIO_BASE: &str = "https://audio00.forvo.com";
pub const DEFAULT_DIALECT: &str = "zh";
pub const DEFAULT_FILE_TYPE: &str = "mp3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub site_base: String,
    pub audio_base: String,
}

impl SiteConfig {
    pub fn new(site_base: impl Into<String>, audio_base: impl Into<String>) -> Self {
        Self {
            site_base: site_base.into().trim_end_matches('/').to_string(),
            audio_base: audio_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn page_url(&self, query: &str) -> String {
        let route = match lookup_mode(query) {
            LookupMode::Word => "word",
            LookupMode::Phrase => "search",
        };
        format!("{}/{}/{}/", self.site_base, route, encode_key(query))
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SITE_BASE, DEFAULT_AUDIO_BASE)
    }
}

/// Turns a query into the ordered list of recordings the site offers for it.
pub struct Resolver<T> {
    transport: T,
    site: SiteConfig,
}

impl<T: Transport> Resolver<T> {
    pub fn new(transport: T, site: SiteConfig) -> Self {
        Self { transport, site }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn resolve(&self, query: &str, dialect: &str, file_type: &str) -> Result<Vec<Reference>> {
        let mode = lookup_mode(query);
        let url = self.site.page_url(query);
        debug!(query, mode = mode.as_str(), %url, "resolving");
        let document = self.transport.fetch_text(&url)?;
        let ctx = ExtractContext {
            query,
            dialect,
            file_type,
            audio_base: &self.site.audio_base,
        };
        Ok(extract_references(&document, mode, &ctx))
    }
}
