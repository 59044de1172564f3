use clap::Parser;

/// Command line flags. Anything set here wins over the environment and the config file.
#[derive(Debug, Default, Parser)]
#[command(name = "promdash-proxy", version, about = "Prometheus query and Alertmanager summary proxy")]
pub struct Args {
    #[arg(long, env = "PROMDASH_CONFIG")]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error or fatal
    #[arg(long, alias = "logLevel")]
    pub log_level: Option<String>,

    /// Decode query responses with the Thanos schema (keeps `analysis`)
    #[arg(long)]
    pub thanos: bool,

    #[arg(long)]
    pub listen: Option<String>,

    /// Static dashboard file served at `/`
    #[arg(long)]
    pub index_file: Option<String>,
}
