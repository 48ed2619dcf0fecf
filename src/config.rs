// src/config.rs
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    env,
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_HEADER_TIMEOUT_MS: u64 = 5_000;

/// A directory whose size the dashboard reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredPath {
    pub label: String,
    pub path: PathBuf,
}

impl MonitoredPath {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind: SocketAddr,
    pub monitored_paths: Vec<MonitoredPath>,
    pub site_url: Option<String>,
    pub header_timeout: Duration,
    pub constants: BTreeMap<String, String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {reason}")]
    Read { path: String, reason: String },
    #[error("invalid config file: {0}")]
    Parse(String),
    #[error("invalid bind address {0:?}")]
    Bind(String),
    #[error("invalid monitored path entry {0:?}; expected label=path")]
    MonitoredPath(String),
    #[error("invalid header timeout {0:?}")]
    HeaderTimeout(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    bind: Option<String>,
    base_dir: Option<PathBuf>,
    site_url: Option<String>,
    header_timeout_ms: Option<u64>,
    monitored_paths: Option<Vec<MonitoredPath>>,
    #[serde(default)]
    constants: BTreeMap<String, String>,
}

fn default_monitored(base: &Path) -> Vec<MonitoredPath> {
    ["media", "data", "src", "cache"]
        .into_iter()
        .map(|name| MonitoredPath::new(name, base.join(name)))
        .collect()
}

fn parse_bind(raw: &str) -> Result<SocketAddr, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Bind(raw.to_string()))
}

fn parse_monitored(raw: &str, base: &Path) -> Result<Vec<MonitoredPath>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            let (label, path) = item
                .split_once('=')
                .ok_or_else(|| ConfigError::MonitoredPath(item.to_string()))?;
            let (label, path) = (label.trim(), path.trim());
            if label.is_empty() || path.is_empty() {
                return Err(ConfigError::MonitoredPath(item.to_string()));
            }
            Ok(MonitoredPath::new(label, base.join(path)))
        })
        .collect()
}

impl Config {
    pub fn defaults(base_dir: &Path) -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            monitored_paths: default_monitored(base_dir),
            site_url: None,
            header_timeout: Duration::from_millis(DEFAULT_HEADER_TIMEOUT_MS),
            constants: BTreeMap::new(),
        }
    }

    /// Layers defaults, then the TOML `file` contents, then `env` overrides.
    /// Relative paths resolve against `base_dir` from the file, else `cwd`.
    pub fn from_sources(
        file: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
        cwd: &Path,
    ) -> Result<Self, ConfigError> {
        let file: ConfigFile = match file {
            Some(raw) => toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?,
            None => ConfigFile::default(),
        };

        let base = match &file.base_dir {
            Some(dir) => cwd.join(dir),
            None => cwd.to_path_buf(),
        };
        let mut cfg = Config::defaults(&base);

        if let Some(bind) = &file.bind {
            cfg.bind = parse_bind(bind)?;
        }
        if let Some(paths) = file.monitored_paths {
            cfg.monitored_paths = paths
                .into_iter()
                .map(|p| MonitoredPath::new(p.label, base.join(p.path)))
                .collect();
        }
        if let Some(ms) = file.header_timeout_ms {
            cfg.header_timeout = Duration::from_millis(ms);
        }
        cfg.site_url = file.site_url;
        cfg.constants = file.constants;

        if let Some(bind) = env("STATUS_BIND") {
            cfg.bind = parse_bind(&bind)?;
        }
        if let Some(url) = env("STATUS_SITE_URL") {
            cfg.site_url = Some(url).filter(|u| !u.trim().is_empty());
        }
        if let Some(ms) = env("STATUS_HEADER_TIMEOUT_MS") {
            let ms: u64 = ms
                .trim()
                .parse()
                .map_err(|_| ConfigError::HeaderTimeout(ms.clone()))?;
            cfg.header_timeout = Duration::from_millis(ms);
        }
        if let Some(raw) = env("STATUS_MONITORED_PATHS") {
            cfg.monitored_paths = parse_monitored(&raw, &base)?;
        }

        Ok(cfg)
    }

    /// Reads `STATUS_CONFIG` (if set) and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let cwd = env::current_dir().map_err(|e| ConfigError::Read {
            path: ".".to_string(),
            reason: e.to_string(),
        })?;
        let file = match env::var("STATUS_CONFIG") {
            Ok(path) => Some(std::fs::read_to_string(&path).map_err(|e| ConfigError::Read {
                path: path.clone(),
                reason: e.to_string(),
            })?),
            Err(_) => None,
        };
        Config::from_sources(file.as_deref(), |k| env::var(k).ok(), &cwd)
    }
}
