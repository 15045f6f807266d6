use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

/// Command-line arguments for the postboard binary.
#[derive(Debug, Parser)]
#[command(name = "postboard", version, about = "Postboard blog front-end")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "POSTBOARD_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Serve the blog index page over HTTP.
    Serve(Box<ServeArgs>),
    /// Load posts once and print the (optionally filtered) list.
    List(ListArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct UpstreamOverrides {
    /// Override the posts API endpoint.
    #[arg(long = "posts-url", value_name = "URL")]
    pub posts_url: Option<String>,

    /// Override the posts API request timeout.
    #[arg(long = "upstream-timeout-seconds", value_name = "SECONDS")]
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct LoggingOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub upstream: UpstreamOverrides,

    #[command(flatten)]
    pub logging: LoggingOverrides,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the path prefix of post detail links.
    #[arg(long = "detail-path-prefix", value_name = "PATH")]
    pub detail_path_prefix: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub upstream: UpstreamOverrides,

    #[command(flatten)]
    pub logging: LoggingOverrides,

    /// Only print posts in this category.
    #[arg(long, value_name = "CATEGORY")]
    pub category: Option<String>,

    /// Print the listing as JSON.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub json: bool,
}
