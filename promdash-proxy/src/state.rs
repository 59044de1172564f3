use crate::config::{Config, Mode, DEFAULT_ALERTMANAGER_URL, DEFAULT_INDEX_FILE, DEFAULT_PROMETHEUS_URL};
use reqwest::{Client, Url};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Immutable per-process state shared by all handlers.
pub struct AppState {
    pub client: Client,
    pub prometheus_url: Url,
    pub alertmanager_url: Url,
    pub mode: Mode,
    pub index_file: PathBuf,
}

impl AppState {
    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        // Timeouts only when asked for; otherwise the client defaults apply
        if let Some(secs) = cfg.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
            debug!("Upstream request timeout: {}s", secs);
        }
        if let Some(secs) = cfg.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
            debug!("Upstream connect timeout: {}s", secs);
        }
        let client = builder.build()?;

        let prometheus_url = parse_upstream(
            "Prometheus",
            cfg.prometheus_url.as_deref().unwrap_or(DEFAULT_PROMETHEUS_URL),
        )?;
        let alertmanager_url = parse_upstream(
            "Alertmanager",
            cfg.alertmanager_url.as_deref().unwrap_or(DEFAULT_ALERTMANAGER_URL),
        )?;

        let mode = cfg.mode.unwrap_or_default();
        info!(?mode, "Query response schema selected");

        let index_file = PathBuf::from(cfg.index_file.as_deref().unwrap_or(DEFAULT_INDEX_FILE));
        debug!("Dashboard served from {}", index_file.display());

        Ok(AppState {
            client,
            prometheus_url,
            alertmanager_url,
            mode,
            index_file,
        })
    }
}

fn parse_upstream(name: &str, raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| anyhow::anyhow!("Invalid {} URL '{}': {}", name, raw, e))?;
    info!("Registered upstream: {} -> '{}'", name, url);
    Ok(url)
}
