use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

/// Command-line arguments for the gknight binary.
#[derive(Debug, Parser)]
#[command(
    name = "gknight",
    version,
    about = "Find the games everybody in a group owns"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "GKNIGHT_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Catalog web API key.
    #[arg(
        long = "steam-api-key",
        env = "STEAM_API_KEY",
        value_name = "KEY",
        global = true,
        hide_env_values = true
    )]
    pub steam_api_key: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP services.
    Serve(Box<ServeArgs>),
    /// Compute the common games of a group once and print them.
    Common(CommonArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct SteamOverrides {
    /// Override the catalog web API base URL.
    #[arg(long = "steam-api-base-url", value_name = "URL")]
    pub api_base_url: Option<String>,

    /// Override the store API base URL.
    #[arg(long = "steam-store-base-url", value_name = "URL")]
    pub store_base_url: Option<String>,

    /// Override the per-request timeout against the catalog.
    #[arg(long = "steam-request-timeout-seconds", value_name = "SECONDS")]
    pub request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub steam: SteamOverrides,

    /// Override the public listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the administrative listener host.
    #[arg(long = "server-admin-host", value_name = "HOST")]
    pub server_admin_host: Option<String>,

    /// Override the public listener port.
    #[arg(long = "server-public-port", value_name = "PORT")]
    pub public_port: Option<u16>,

    /// Override the administrative listener port.
    #[arg(long = "server-admin-port", value_name = "PORT")]
    pub admin_port: Option<u16>,

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

    /// Toggle response caching.
    #[arg(
        long = "cache-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cache_enabled: Option<bool>,

    /// Override the cache time-to-live in milliseconds.
    #[arg(long = "cache-ttl-ms", value_name = "MILLIS")]
    pub cache_ttl_ms: Option<u64>,

    /// Override the token bucket capacity per client.
    #[arg(long = "rate-limit-capacity", value_name = "COUNT")]
    pub rate_limit_capacity: Option<u64>,

    /// Override the interval after which a bucket is refilled.
    #[arg(long = "rate-limit-refill-interval-ms", value_name = "MILLIS")]
    pub rate_limit_refill_interval_ms: Option<u64>,
}

#[derive(Debug, Args, Clone)]
pub struct CommonArgs {
    #[command(flatten)]
    pub steam: SteamOverrides,

    /// List every game owned by anyone, with owner counts.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub all: bool,

    /// Page to print, starting at 1.
    #[arg(long, value_name = "N")]
    pub page: Option<u32>,

    /// Games per page (1-100).
    #[arg(long, value_name = "N")]
    pub limit: Option<u32>,

    /// Print JSON instead of a table.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub json: bool,

    /// Identities or roster names; comma separated lists are accepted.
    #[arg(value_name = "IDENTITY", required = true, num_args = 1..)]
    pub identities: Vec<String>,
}
