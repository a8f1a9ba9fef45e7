use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use audiodl_core::{
    RetrieveOptions, SiteConfig, DEFAULT_AUDIO_BASE, DEFAULT_CACHE_PATH, DEFAULT_SITE_BASE,
};
use serde::Deserialize;

use crate::cli::LookupArgs;

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    pub cache: Option<PathBuf>,
    pub target_dir: Option<PathBuf>,
    #[serde(default)]
    pub site: SiteSection,
    #[serde(default)]
    pub defaults: FetchDefaults,
}

#[derive(Debug, Default, Deserialize)]
pub struct SiteSection {
    pub base_url: Option<String>,
    pub audio_base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FetchDefaults {
    pub dialect: Option<String>,
    pub file_type: Option<String>,
    pub max_count: Option<usize>,
    pub delay_ms: Option<u64>,
}

/// Flags given on the command line for a fetch; `None` defers to the file.
#[derive(Debug, Default)]
pub struct FetchOverrides {
    pub lookup: LookupArgs,
    pub overwrite: bool,
    pub max_count: Option<usize>,
    pub delay_ms: Option<u64>,
}

impl AppConfig {
    pub fn site(&self) -> SiteConfig {
        SiteConfig::new(
            self.site
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_SITE_BASE.to_string()),
            self.site
                .audio_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_AUDIO_BASE.to_string()),
        )
    }

    pub fn cache_path(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.cache.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH))
    }

    pub fn target_dir(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.target_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn retrieve_options(&self, overrides: FetchOverrides) -> RetrieveOptions {
        let base = RetrieveOptions::default();
        let defaults = &self.defaults;
        RetrieveOptions {
            dialect: overrides
                .lookup
                .dialect
                .or_else(|| defaults.dialect.clone())
                .unwrap_or(base.dialect),
            file_type: overrides
                .lookup
                .file_type
                .or_else(|| defaults.file_type.clone())
                .unwrap_or(base.file_type),
            overwrite: overrides.overwrite,
            max_count: overrides
                .max_count
                .or(defaults.max_count)
                .unwrap_or(base.max_count),
            delay: overrides
                .delay_ms
                .or(defaults.delay_ms)
                .map(Duration::from_millis)
                .unwrap_or(base.delay),
        }
    }
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("invalid config {}", path.display()))
}

/// One query per line; blank lines and `#` comments are skipped. Lines are
/// kept verbatim (only the line ending is dropped) since the raw text is the
/// cache key and any whitespace in it selects a phrase lookup.
pub fn parse_queries(raw: &str) -> Vec<String> {
    raw.lines()
        .filter(|line| {
            let content = line.trim();
            !content.is_empty() && !content.starts_with('#')
        })
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let cfg = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.site(), SiteConfig::default());
        assert_eq!(cfg.cache_path(None), PathBuf::from(DEFAULT_CACHE_PATH));
        assert_eq!(
            cfg.retrieve_options(FetchOverrides::default()),
            RetrieveOptions::default()
        );
    }

    #[test]
    fn flags_beat_file_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audiodl.toml");
        fs::write(
            &path,
            r#"
cache = "store/index.json"
target_dir = "media"

[site]
base_url = "http://localhost:8080/"

[defaults]
dialect = "yue"
max_count = 5
delay_ms = 0
"#,
        )
        .unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.site().site_base, "http://localhost:8080");
        assert_eq!(cfg.site().audio_base, DEFAULT_AUDIO_BASE);
        assert_eq!(cfg.cache_path(None), PathBuf::from("store/index.json"));
        assert_eq!(
            cfg.cache_path(Some(PathBuf::from("flag.json"))),
            PathBuf::from("flag.json")
        );
        assert_eq!(cfg.target_dir(None), PathBuf::from("media"));

        let opts = cfg.retrieve_options(FetchOverrides {
            lookup: LookupArgs {
                dialect: None,
                file_type: Some("ogg".to_string()),
            },
            overwrite: true,
            max_count: Some(1),
            delay_ms: None,
        });
        assert_eq!(opts.dialect, "yue");
        assert_eq!(opts.file_type, "ogg");
        assert!(opts.overwrite);
        assert_eq!(opts.max_count, 1);
        assert_eq!(opts.delay, Duration::ZERO);
    }

    #[test]
    fn invalid_config_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audiodl.toml");
        fs::write(&path, "defaults = 3").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn query_file_skips_blanks_and_comments() {
        let raw = "你好\n\n# header\n  \t\n早上 好\r\n谢谢\n";
        assert_eq!(parse_queries(raw), vec!["你好", "早上 好", "谢谢"]);
    }

    #[test]
    fn query_file_lines_are_kept_verbatim() {
        let raw = "你好 \r\n 谢谢\n";
        assert_eq!(parse_queries(raw), vec!["你好 ", " 谢谢"]);
    }
}
