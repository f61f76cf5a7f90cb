//! Application configuration. Precedence: CLI flags > environment > config file > defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::DbError;
use crate::types::User;

pub const DEFAULT_DB_PATH: &str = "recordlite.wal";
pub const DEFAULT_BASE_PATH: &str = "/records";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub db_path: Option<PathBuf>,
    pub log_config: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_retention: Option<usize>,
    /// Path used when rendering navigation links, e.g. `/records`.
    pub base_path: Option<String>,
    /// Username stamped into audit fields when none is given on the command line.
    pub user: Option<String>,
}

impl AppConfig {
    /// Strict load of a single TOML file.
    ///
    /// # Errors
    /// `DbError::Config` when the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .map_err(|e| DbError::Config(format!("{}: {e}", path.display())))?;
        toml::from_str(&s).map_err(|e| DbError::Config(format!("{}: {e}", path.display())))
    }

    /// Layered load: first readable config file, then environment on top. CLI overrides are
    /// applied by the caller with [`AppConfig::overlay`].
    #[must_use]
    pub fn load(cli_cfg: Option<&Path>) -> Self {
        let mut cfg = Self::default();
        for p in config_paths(cli_cfg) {
            if !p.exists() {
                continue;
            }
            match Self::from_file(&p) {
                Ok(file_cfg) => {
                    log::debug!("loaded config from {}", p.display());
                    cfg = file_cfg;
                    break;
                }
                Err(e) => log::warn!("skipping config: {e}"),
            }
        }
        cfg.overlay(Self::from_env());
        cfg
    }

    /// Values set through `RECORDLITE_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let var = |k: &str| std::env::var(k).ok().filter(|s| !s.is_empty());
        Self {
            db_path: var("RECORDLITE_DB").map(PathBuf::from),
            log_config: var("RECORDLITE_LOG_CONFIG").map(PathBuf::from),
            log_dir: var("RECORDLITE_LOG_DIR").map(PathBuf::from),
            log_level: var("RECORDLITE_LOG_LEVEL"),
            log_retention: var("RECORDLITE_LOG_RETENTION").and_then(|s| s.parse().ok()),
            base_path: var("RECORDLITE_BASE_PATH"),
            user: var("RECORDLITE_USER"),
        }
    }

    /// Every field set in `over` replaces the one in `self`.
    pub fn overlay(&mut self, over: Self) {
        macro_rules! take {
            ($($f:ident),*) => { $( if over.$f.is_some() { self.$f = over.$f; } )* };
        }
        take!(db_path, log_config, log_dir, log_level, log_retention, base_path, user);
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH))
    }

    #[must_use]
    pub fn base_path(&self) -> &str {
        self.base_path.as_deref().unwrap_or(DEFAULT_BASE_PATH)
    }

    #[must_use]
    pub fn acting_user(&self) -> User {
        self.user.as_deref().map_or_else(User::anonymous, User::named)
    }
}

fn config_paths(cli_cfg: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(p) = cli_cfg {
        paths.push(p.to_path_buf());
    }
    if let Ok(p) = std::env::var("RECORDLITE_CONFIG") {
        paths.push(PathBuf::from(p));
    }
    if let Ok(home) = std::env::var("USERPROFILE").or_else(|_| std::env::var("HOME")) {
        paths.push(PathBuf::from(home).join(".config").join("recordlite.toml"));
    }
    if let Ok(cur) = std::env::current_dir() {
        paths.push(cur.join("recordlite.toml"));
    }
    paths
}
