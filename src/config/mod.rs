//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{net::SocketAddr, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

pub use cli::{
    CliArgs, Command, ListArgs, LoggingOverrides, ServeArgs, ServeOverrides, UpstreamOverrides,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "postboard";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_POSTS_URL: &str = "http://localhost:8000/api/posts";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SITE_TITLE: &str = "Minimal Blog";
const DEFAULT_ALL_LABEL: &str = "All";
const DEFAULT_LOADING_MESSAGE: &str = "Loading posts...";
const DEFAULT_DETAIL_PATH_PREFIX: &str = "/posts";
pub(crate) const DEFAULT_DATASTAR_SCRIPT: &str =
    "https://cdn.jsdelivr.net/gh/starfederation/datastar@1.0.0-RC.6/bundles/datastar.js";

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub upstream: UpstreamSettings,
    pub site: SiteSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    pub posts_url: Url,
    pub timeout: Duration,
}

/// Presentation settings for the index page.
#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub title: String,
    pub all_label: String,
    pub loading_message: String,
    /// Detail links are `{detail_path_prefix}/{slug}`; never ends with `/`.
    pub detail_path_prefix: String,
    pub datastar_script: String,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("POSTBOARD").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::List(args)) => {
            raw.apply_upstream_overrides(&args.upstream);
            raw.apply_logging_overrides(&args.logging);
        }
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    upstream: RawUpstreamSettings,
    site: RawSiteSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(prefix) = overrides.detail_path_prefix.as_ref() {
            self.site.detail_path_prefix = Some(prefix.clone());
        }

        self.apply_upstream_overrides(&overrides.upstream);
        self.apply_logging_overrides(&overrides.logging);
    }

    fn apply_upstream_overrides(&mut self, overrides: &UpstreamOverrides) {
        if let Some(url) = overrides.posts_url.as_ref() {
            self.upstream.posts_url = Some(url.clone());
        }
        if let Some(seconds) = overrides.timeout_seconds {
            self.upstream.timeout_seconds = Some(seconds);
        }
    }

    fn apply_logging_overrides(&mut self, overrides: &LoggingOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            upstream,
            site,
        } = raw;

        let server = build_server_settings(server)?;
        let logging = build_logging_settings(logging)?;
        let upstream = build_upstream_settings(upstream)?;
        let site = build_site_settings(site)?;

        Ok(Self {
            server,
            logging,
            upstream,
            site,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_upstream_settings(upstream: RawUpstreamSettings) -> Result<UpstreamSettings, LoadError> {
    let raw_url = upstream
        .posts_url
        .unwrap_or_else(|| DEFAULT_POSTS_URL.to_string());
    let posts_url = Url::parse(raw_url.trim()).map_err(|err| {
        LoadError::invalid("upstream.posts_url", format!("invalid URL `{raw_url}`: {err}"))
    })?;
    if !matches!(posts_url.scheme(), "http" | "https") {
        return Err(LoadError::invalid(
            "upstream.posts_url",
            format!("unsupported scheme `{}`", posts_url.scheme()),
        ));
    }

    let timeout_secs = upstream
        .timeout_seconds
        .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "upstream.timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(UpstreamSettings {
        posts_url,
        timeout: Duration::from_secs(timeout_secs),
    })
}

fn build_site_settings(site: RawSiteSettings) -> Result<SiteSettings, LoadError> {
    let title = non_empty(site.title, DEFAULT_SITE_TITLE, "site.title")?;
    let all_label = non_empty(site.all_label, DEFAULT_ALL_LABEL, "site.all_label")?;
    let loading_message = non_empty(
        site.loading_message,
        DEFAULT_LOADING_MESSAGE,
        "site.loading_message",
    )?;
    let datastar_script = non_empty(
        site.datastar_script,
        DEFAULT_DATASTAR_SCRIPT,
        "site.datastar_script",
    )?;

    let prefix = site
        .detail_path_prefix
        .unwrap_or_else(|| DEFAULT_DETAIL_PATH_PREFIX.to_string());
    let prefix = prefix.trim();
    if !prefix.starts_with('/') {
        return Err(LoadError::invalid(
            "site.detail_path_prefix",
            "path must start with `/`",
        ));
    }
    let detail_path_prefix = prefix.trim_end_matches('/').to_string();

    Ok(SiteSettings {
        title,
        all_label,
        loading_message,
        detail_path_prefix,
        datastar_script,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawUpstreamSettings {
    posts_url: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    title: Option<String>,
    all_label: Option<String>,
    loading_message: Option<String>,
    detail_path_prefix: Option<String>,
    datastar_script: Option<String>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_empty(
    value: Option<String>,
    default: &str,
    key: &'static str,
) -> Result<String, LoadError> {
    match value {
        None => Ok(default.to_string()),
        Some(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(LoadError::invalid(key, "must not be empty"))
            } else {
                Ok(trimmed.to_string())
            }
        }
    }
}
