use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use audiodl_core::{
    CacheIndex, HttpTransport, Resolver, RetrieveOptions, Retriever, Transport,
};
use tracing::{error, info};

use crate::cli::{CacheCommand, LookupArgs};
use crate::config::{parse_queries, AppConfig, FetchOverrides};

pub struct FetchRequest {
    pub queries: Vec<String>,
    pub queries_file: Option<PathBuf>,
    pub target_dir: Option<PathBuf>,
    pub overrides: FetchOverrides,
    pub keep_going: bool,
}

pub fn fetch(cfg: &AppConfig, cache_path: PathBuf, req: FetchRequest) -> Result<()> {
    let mut queries = req.queries;
    if let Some(path) = &req.queries_file {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read queries file {}", path.display()))?;
        queries.extend(parse_queries(&raw));
    }
    if queries.is_empty() {
        return Err(anyhow!("no queries given"));
    }
    let target_dir = cfg.target_dir(req.target_dir);
    fs::create_dir_all(&target_dir)
        .with_context(|| format!("failed to create {}", target_dir.display()))?;
    let opts = cfg.retrieve_options(req.overrides);
    let transport = HttpTransport::new()?;
    let mut retriever = Retriever::new(
        Resolver::new(transport, cfg.site()),
        CacheIndex::load(cache_path),
    );
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    fetch_batch(
        &mut retriever,
        &target_dir,
        &queries,
        &opts,
        req.keep_going,
        &mut out,
    )
}

/// Retrieves each query in order and prints one path per line. Returns the
/// first fatal error unless `keep_going` is set.
fn fetch_batch<T: Transport, W: Write>(
    retriever: &mut Retriever<T>,
    target_dir: &Path,
    queries: &[String],
    opts: &RetrieveOptions,
    keep_going: bool,
    out: &mut W,
) -> Result<()> {
    let mut failed = 0usize;
    for query in queries {
        match retriever.retrieve(target_dir, query, opts) {
            Ok(paths) => {
                info!(query = query.as_str(), files = paths.len(), "query done");
                for path in paths {
                    writeln!(out, "{}", path.display())?;
                }
            }
            Err(err) if keep_going => {
                error!(query = query.as_str(), error = %err, "query failed");
                failed += 1;
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to retrieve {query:?}"));
            }
        }
    }
    if failed > 0 {
        return Err(anyhow!(
            "{failed} of {} queries failed",
            queries.len()
        ));
    }
    Ok(())
}

pub fn resolve(cfg: &AppConfig, query: &str, lookup: LookupArgs) -> Result<()> {
    let opts = cfg.retrieve_options(FetchOverrides {
        lookup,
        ..FetchOverrides::default()
    });
    let resolver = Resolver::new(HttpTransport::new()?, cfg.site());
    let refs = resolver
        .resolve(query, &opts.dialect, &opts.file_type)
        .with_context(|| format!("failed to resolve {query:?}"))?;
    println!("{}", serde_json::to_string_pretty(&refs)?);
    Ok(())
}

pub fn cache(cache_path: PathBuf, action: CacheCommand) -> Result<()> {
    let mut index = CacheIndex::load(cache_path);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    cache_with(&mut index, action, &mut out)
}

fn cache_with<W: Write>(index: &mut CacheIndex, action: CacheCommand, out: &mut W) -> Result<()> {
    match action {
        CacheCommand::List => {
            for key in index.keys() {
                let count = index.get(key).map(<[String]>::len).unwrap_or(0);
                writeln!(out, "{key}\t{count}")?;
            }
        }
        CacheCommand::Show { query } => {
            let files = index
                .get(&query)
                .ok_or_else(|| anyhow!("{query:?} is not cached"))?;
            for file in files {
                writeln!(out, "{file}")?;
            }
        }
        CacheCommand::Forget { query } => {
            if index.remove(&query).is_none() {
                return Err(anyhow!("{query:?} is not cached"));
            }
            index.flush()?;
            writeln!(out, "forgot {query}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use audiodl_core::{AudioDlError, SiteConfig};
    use std::time::Duration;
    use tempfile::tempdir;

    /// Serves one fixed word page and records nothing else.
    struct OnePage;

    impl Transport for OnePage {
        fn fetch_text(&self, url: &str) -> audiodl_core::Result<String> {
            if url.contains("/word/ok/") {
                Ok(r#"<article><em id="zh"></em><li><span class="play" onclick="Play(1,'cC8xLm1wMw==')"></span><span class="ofLink">u</span><span class="from">(x)</span></li></article>"#.to_string())
            } else if url.contains("/word/down/") {
                Err(AudioDlError::Status {
                    url: url.to_string(),
                    status: 502,
                })
            } else {
                Err(AudioDlError::NotFound {
                    url: url.to_string(),
                })
            }
        }

        fn download(&self, url: &str, dest: &Path) -> audiodl_core::Result<()> {
            fs::write(dest, url)?;
            Ok(())
        }
    }

    fn opts() -> RetrieveOptions {
        RetrieveOptions {
            delay: Duration::ZERO,
            ..RetrieveOptions::default()
        }
    }

    fn retriever() -> Retriever<OnePage> {
        Retriever::new(
            Resolver::new(OnePage, SiteConfig::default()),
            CacheIndex::in_memory(),
        )
    }

    #[test]
    fn batch_prints_paths_in_order() {
        let dir = tempdir().unwrap();
        let mut retriever = retriever();
        let mut out = Vec::new();
        let queries = vec!["ok".to_string(), "missing".to_string()];
        fetch_batch(&mut retriever, dir.path(), &queries, &opts(), false, &mut out).unwrap();
        let printed = String::from_utf8(out).unwrap();
        let expected = dir.path().join("_ok - by u (x).mp3");
        assert_eq!(printed, format!("{}\n", expected.display()));
        assert!(retriever.cache().contains("missing"));
    }

    #[test]
    fn batch_stops_on_fatal_error_without_keep_going() {
        let dir = tempdir().unwrap();
        let mut retriever = retriever();
        let queries = vec!["down".to_string(), "ok".to_string()];
        let mut out = Vec::new();
        let err = fetch_batch(&mut retriever, dir.path(), &queries, &opts(), false, &mut out)
            .unwrap_err();
        assert!(err.to_string().contains("down"));
        assert!(!retriever.cache().contains("ok"));
    }

    #[test]
    fn keep_going_runs_remaining_queries() {
        let dir = tempdir().unwrap();
        let mut retriever = retriever();
        let queries = vec!["down".to_string(), "ok".to_string()];
        let mut out = Vec::new();
        let err =
            fetch_batch(&mut retriever, dir.path(), &queries, &opts(), true, &mut out).unwrap_err();
        assert_eq!(err.to_string(), "1 of 2 queries failed");
        assert!(retriever.cache().contains("ok"));
        assert!(!retriever.cache().contains("down"));
    }

    #[test]
    fn cache_commands_list_show_and_forget() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.json");
        let mut index = CacheIndex::load(&path);
        index.put("你好", vec!["a.mp3".to_string(), "b.mp3".to_string()]);
        index.put("早上 好", vec![]);
        index.flush().unwrap();

        let mut out = Vec::new();
        cache_with(&mut index, CacheCommand::List, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "你好\t2\n早上 好\t0\n");

        let mut out = Vec::new();
        cache_with(
            &mut index,
            CacheCommand::Show {
                query: "你好".to_string(),
            },
            &mut out,
        )
        .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a.mp3\nb.mp3\n");

        let mut out = Vec::new();
        cache_with(
            &mut index,
            CacheCommand::Forget {
                query: "你好".to_string(),
            },
            &mut out,
        )
        .unwrap();
        assert!(!CacheIndex::load(&path).contains("你好"));
        assert!(cache_with(
            &mut index,
            CacheCommand::Show {
                query: "你好".to_string()
            },
            &mut out
        )
        .is_err());
    }
}
