use crate::args::Args;
use serde::Deserialize;
use std::fs;
use tracing::level_filters::LevelFilter;

pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";
pub const DEFAULT_PROMETHEUS_URL: &str = "http://127.0.0.1:9090/api/v1/query";
pub const DEFAULT_ALERTMANAGER_URL: &str = "http://127.0.0.1:9093/api/v2/alerts";
pub const DEFAULT_INDEX_FILE: &str = "static/index.html";

/// Which response schema the query endpoint decodes.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Prometheus,
    // may carry an extra `analysis` object
    Thanos,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            "fatal" => Some(LogLevel::Fatal),
            _ => None,
        }
    }

    // tracing has no fatal level
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error | LogLevel::Fatal => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    pub listen: Option<String>,
    // Full URL of the instant query endpoint, e.g. http://prometheus:9090/api/v1/query
    pub prometheus_url: Option<String>,
    // Full URL of the Alertmanager alert list, e.g. http://alertmanager:9093/api/v2/alerts
    pub alertmanager_url: Option<String>,
    // Defaults to `prometheus`.
    pub mode: Option<Mode>,
    // One of trace, debug, info, warn, error, fatal. Anything else falls back to info.
    pub log_level: Option<String>,
    pub index_file: Option<String>,
    // Whole-request timeout for upstream calls. Unset means reqwest's default (none).
    pub timeout_secs: Option<u64>,
    // Connect timeout for upstream calls. Unset means reqwest's default.
    pub connect_timeout_secs: Option<u64>,
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let cfg_str = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path, e))?;
        Ok(toml::from_str(&cfg_str)?)
    }

    /// Builds the effective configuration: file, then environment, then flags.
    pub fn load(args: &Args) -> anyhow::Result<Self> {
        let mut cfg = match &args.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        cfg.apply_env(|key| std::env::var(key).ok());
        cfg.apply_args(args);
        Ok(cfg)
    }

    // Empty values count as unset
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(url) = non_empty("PROMETHEUS_URL") {
            self.prometheus_url = Some(url);
        }
        if let Some(url) = non_empty("ALERTMANAGER_URL") {
            self.alertmanager_url = Some(url);
        }
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(level) = &args.log_level {
            self.log_level = Some(level.clone());
        }
        if args.thanos {
            self.mode = Some(Mode::Thanos);
        }
        if let Some(listen) = &args.listen {
            self.listen = Some(listen.clone());
        }
        if let Some(index_file) = &args.index_file {
            self.index_file = Some(index_file.clone());
        }
    }

    // Unknown names resolve to `None` so the caller can warn before falling back to info
    pub fn log_level(&self) -> (&str, Option<LogLevel>) {
        let name = self.log_level.as_deref().unwrap_or("info");
        (name, LogLevel::from_name(name))
    }
}
