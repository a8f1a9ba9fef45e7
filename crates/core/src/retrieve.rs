use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::CacheIndex;
use crate::error::Result;
use crate::reference::Reference;
use crate::resolve::{Resolver, DEFAULT_DIALECT, DEFAULT_FILE_TYPE};
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrieveOptions {
    pub dialect: String,
    pub file_type: String,
    pub overwrite: bool,
    /// Highest reference index still processed; 0 means unlimited.
    pub max_count: usize,
    pub delay: Duration,
}

impl Default for RetrieveOptions {
    fn default() -> Self {
        Self {
            dialect: DEFAULT_DIALECT.to_string(),
            file_type: DEFAULT_FILE_TYPE.to_string(),
            overwrite: false,
            max_count: 2,
            delay: Duration::from_millis(500),
        }
    }
}

/// Whether the reference at `index` falls inside the retrieval window.
///
/// The window is inclusive: `max_count = 2` admits indices 0, 1 and 2.
pub fn within_cap(index: usize, max_count: usize) -> bool {
    index == 0 || max_count == 0 || index <= max_count
}

/// Resolves queries and downloads their recordings, remembering finished
/// queries in a [`CacheIndex`].
pub struct Retriever<T> {
    resolver: Resolver<T>,
    cache: CacheIndex,
    pause: Box<dyn FnMut(Duration)>,
}

impl<T: Transport> Retriever<T> {
    pub fn new(resolver: Resolver<T>, cache: CacheIndex) -> Self {
        Self {
            resolver,
            cache,
            pause: Box::new(sleep),
        }
    }

    /// Replaces the throttle between downloads, which defaults to
    /// `std::thread::sleep`.
    pub fn with_pause(mut self, pause: impl FnMut(Duration) + 'static) -> Self {
        self.pause = Box::new(pause);
        self
    }

    pub fn cache(&self) -> &CacheIndex {
        &self.cache
    }

    pub fn into_cache(self) -> CacheIndex {
        self.cache
    }

    pub fn retrieve(
        &mut self,
        target_dir: &Path,
        query: &str,
        opts: &RetrieveOptions,
    ) -> Result<Vec<PathBuf>> {
        if let Some(filenames) = self.cache.get(query) {
            debug!(query, files = filenames.len(), "cache hit");
            return Ok(filenames.iter().map(|name| target_dir.join(name)).collect());
        }

        let references = match self
            .resolver
            .resolve(query, &opts.dialect, &opts.file_type)
        {
            Ok(refs) => refs,
            Err(err) if err.is_not_found() => {
                warn!(query, error = %err, "no result for query");
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        let mut filenames = Vec::new();
        let mut paths = Vec::new();
        for (idx, reference) in references.iter().enumerate() {
            if !within_cap(idx, opts.max_count) {
                break;
            }
            let target = target_dir.join(&reference.display_name);
            if !opts.overwrite && target.exists() {
                debug!(query, path = %target.display(), "already present");
                filenames.push(reference.display_name.clone());
                paths.push(target);
                continue;
            }
            if self.download_one(query, reference, &target)? {
                filenames.push(reference.display_name.clone());
                paths.push(target);
            }
            (self.pause)(opts.delay);
        }

        self.cache.put(query, filenames);
        if let Err(err) = self.cache.flush() {
            warn!(query, error = %err, "failed to persist cache index");
        }
        Ok(paths)
    }

    /// Returns `Ok(false)` when the recording is gone upstream.
    fn download_one(&self, query: &str, reference: &Reference, target: &Path) -> Result<bool> {
        match self.resolver.transport().download(&reference.url, target) {
            Ok(()) => {
                info!(query, path = %target.display(), "downloaded");
                Ok(true)
            }
            Err(err) if err.is_not_found() => {
                warn!(query, url = %reference.url, "audio download returned not found");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }
}
