//! Service configuration, loaded once from a YAML file at startup.
//!
//! ```yaml
//! appName: My Podcasts
//! listen: 0.0.0.0:8080      # optional
//! maxStreams: 32            # optional
//! feeds:
//!   - name: Tech
//!     url: https://example.com/tech.rss
//! ```

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Conventional config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "podcast2rygel.yaml";

/// Upper bound on concurrent upstream media fetches unless configured.
pub const DEFAULT_MAX_STREAMS: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// One configured feed. `name` is its identity and its directory name.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FeedConfig {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Display name of the service, used in logs.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Feeds in the order they were configured.
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,

    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    #[serde(default = "default_max_streams")]
    pub max_streams: usize,
}

fn default_app_name() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_max_streams() -> usize {
    DEFAULT_MAX_STREAMS
}

impl Config {
    /// Read and validate the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_streams == 0 {
            return Err(ConfigError::Invalid("maxStreams must be at least 1".into()));
        }

        let mut seen = HashSet::new();
        for feed in &self.feeds {
            if feed.name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "feed with url {} has an empty name",
                    feed.url
                )));
            }
            if feed.name.contains('/') || feed.name == "." || feed.name == ".." {
                return Err(ConfigError::Invalid(format!(
                    "feed name {:?} is not usable as a directory name",
                    feed.name
                )));
            }
            if !seen.insert(feed.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "feed name {:?} is configured more than once",
                    feed.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_minimal_config_with_defaults() {
        let config = Config::parse(
            r#"
appName: Rygel Podcasts
feeds:
  - name: Tech
    url: https://example.com/tech.rss
  - name: News
    url: https://example.com/news.rss
"#,
        )
        .unwrap();

        assert_eq!(config.app_name, "Rygel Podcasts");
        assert_eq!(config.feeds.len(), 2);
        assert_eq!(config.feeds[0].name, "Tech");
        assert_eq!(config.feeds[1].url, "https://example.com/news.rss");
        assert_eq!(config.listen.port(), 8080);
        assert_eq!(config.max_streams, DEFAULT_MAX_STREAMS);
    }

    #[test]
    fn parses_optional_fields() {
        let config = Config::parse(
            r#"
appName: x
listen: 127.0.0.1:9000
maxStreams: 4
feeds: []
"#,
        )
        .unwrap();

        assert_eq!(config.listen, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.max_streams, 4);
    }

    #[test]
    fn rejects_duplicate_feed_names() {
        let err = Config::parse(
            r#"
feeds:
  - name: Tech
    url: https://a/feed
  - name: Tech
    url: https://b/feed
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "got {err}");
    }

    #[test]
    fn rejects_names_with_slash() {
        for name in ["a/b", ".", ".."] {
            let raw = format!("feeds:\n  - name: \"{name}\"\n    url: https://a\n");
            let err = Config::parse(&raw).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{name}: got {err}");
        }
    }

    #[test]
    fn dotted_names_that_are_not_path_segments_are_fine() {
        let config = Config::parse("feeds:\n  - name: \"...and more\"\n    url: https://a\n").unwrap();
        assert_eq!(config.feeds[0].name, "...and more");
    }

    #[test]
    fn rejects_zero_max_streams() {
        let err = Config::parse("maxStreams: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        let err = Config::parse("feeds: [unterminated").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "appName: From File\nfeeds:\n  - name: A\n    url: https://a").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.app_name, "From File");
        assert_eq!(config.feeds[0].name, "A");
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
