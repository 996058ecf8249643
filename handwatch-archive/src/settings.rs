//! Archive tool settings.
//!
//! Read from an optional TOML file, then `HANDWATCH_ARCHIVE_*` environment
//! variables (e.g. `HANDWATCH_ARCHIVE_REPO=lab/glove`). The access token is
//! only ever read from here, never written anywhere.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::github::{GithubStore, DEFAULT_API_URL};

#[derive(Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ArchiveSettings {
    /// Repository in `owner/name` form.
    pub repo: Option<String>,
    pub token: Option<String>,
    pub branch: Option<String>,
    pub api_url: String,
    /// Document the device appends to.
    pub path: String,
    /// Directory for archived copies.
    pub archive_dir: String,
    /// UTC offset that decides where a day ends, e.g. `+08:00`.
    pub utc_offset: String,
    pub timeout_secs: u64,
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            repo: None,
            token: None,
            branch: None,
            api_url: DEFAULT_API_URL.to_string(),
            path: "sensor_data.json".to_string(),
            archive_dir: "archive".to_string(),
            utc_offset: "+08:00".to_string(),
            timeout_secs: 10,
        }
    }
}

// Keep the token out of logs and panic messages
impl std::fmt::Debug for ArchiveSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveSettings")
            .field("repo", &self.repo)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("branch", &self.branch)
            .field("api_url", &self.api_url)
            .field("path", &self.path)
            .field("archive_dir", &self.archive_dir)
            .field("utc_offset", &self.utc_offset)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ArchiveSettings {
    /// Load settings from an optional file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, environment())
    }

    fn load_with(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder
            .add_source(env)
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// The configured day boundary.
    pub fn offset(&self) -> Result<FixedOffset> {
        self.utc_offset
            .parse()
            .with_context(|| format!("Invalid UTC offset {:?}", self.utc_offset))
    }

    /// Current time at the configured offset.
    pub fn now(&self) -> Result<DateTime<FixedOffset>> {
        Ok(Utc::now().with_timezone(&self.offset()?))
    }

    /// Build the GitHub store.
    pub fn store(&self) -> Result<GithubStore> {
        let repo = self
            .repo
            .as_deref()
            .context("No repository configured (set HANDWATCH_ARCHIVE_REPO or --repo)")?;

        let mut builder = GithubStore::builder()
            .repo(repo)
            .api_url(&self.api_url)
            .timeout(Duration::from_secs(self.timeout_secs));
        if let Some(token) = &self.token {
            builder = builder.token(token);
        }
        if let Some(branch) = &self.branch {
            builder = builder.branch(branch);
        }
        Ok(builder.build()?)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("HANDWATCH_ARCHIVE").prefix_separator("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(map))
    }

    #[test]
    fn test_defaults() {
        let settings = ArchiveSettings::load_with(None, env(&[])).unwrap();
        assert_eq!(settings, ArchiveSettings::default());
        assert_eq!(settings.offset().unwrap().local_minus_utc(), 8 * 3600);
        assert!(settings.store().is_err());
    }

    #[test]
    fn test_environment() {
        let settings = ArchiveSettings::load_with(
            None,
            env(&[
                ("HANDWATCH_ARCHIVE_REPO", "lab/glove"),
                ("HANDWATCH_ARCHIVE_TOKEN", "secret"),
                ("HANDWATCH_ARCHIVE_UTC_OFFSET", "-05:00"),
                ("HANDWATCH_ARCHIVE_TIMEOUT_SECS", "3"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.repo.as_deref(), Some("lab/glove"));
        assert_eq!(settings.offset().unwrap().local_minus_utc(), -5 * 3600);
        assert_eq!(settings.timeout_secs, 3);
        assert_eq!(settings.store().unwrap().repo(), "lab/glove");
    }

    #[test]
    fn test_token_is_redacted() {
        let settings = ArchiveSettings {
            token: Some("secret".to_string()),
            ..Default::default()
        };
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_invalid_offset() {
        let settings = ArchiveSettings {
            utc_offset: "Asia/Singapore".to_string(),
            ..Default::default()
        };
        assert!(settings.offset().is_err());
    }
}
