mod cache;
mod error;
mod extract;
mod normalization;
mod reference;
mod resolve;
mod retrieve;
mod token;
mod transport;

pub use cache::{CacheIndex, DEFAULT_CACHE_PATH};
pub use error::{AudioDlError, Result};
pub use extract::extract_references;
pub use normalization::{encode_key, is_stripped, lookup_mode, normalize_key, LookupMode};
pub use reference::{ExtractContext, Reference};
pub use resolve::{
    Resolver, SiteConfig, DEFAULT_AUDIO_BASE, DEFAULT_DIALECT, DEFAULT_FILE_TYPE,
    DEFAULT_SITE_BASE,
};
pub use retrieve::{within_cap, RetrieveOptions, Retriever};
pub use token::decode_token;
pub use transport::{HttpTransport, Transport};
