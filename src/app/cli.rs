use clap::Parser;
use std::path::PathBuf;

/// Command-line options for the router binary.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the JSON configuration document
    #[arg(long, env = "AACE_LOG_ROUTER_CONFIG")]
    pub config: PathBuf,

    /// Tracing filter for the router's own diagnostics
    #[arg(long, env = "AACE_LOG_ROUTER_LOG", default_value = "info")]
    pub log_filter: String,
}
