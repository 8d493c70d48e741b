//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{collections::BTreeMap, net::SocketAddr, num::NonZeroU32, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::domain::roster::Roster;

mod cli;

pub use cli::{CliArgs, Command, CommonArgs, ServeArgs, ServeOverrides, SteamOverrides};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "gknight";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_ADMIN_HOST: &str = "127.0.0.1";
const DEFAULT_PUBLIC_PORT: u16 = 3000;
const DEFAULT_ADMIN_PORT: u16 = 3001;
const DEFAULT_STEAM_API_BASE_URL: &str = "https://api.steampowered.com/";
const DEFAULT_STEAM_STORE_BASE_URL: &str = "https://store.steampowered.com/";
const DEFAULT_STEAM_REQUEST_TIMEOUT_SECS: u64 = 15;
const DEFAULT_CACHE_TTL_MS: u64 = 300_000;
const DEFAULT_RATE_LIMIT_CAPACITY: u64 = 10;
const DEFAULT_RATE_LIMIT_REFILL_INTERVAL_MS: u64 = 10_000;

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub steam: SteamSettings,
    pub cache: CacheSettings,
    pub rate_limit: RateLimitSettings,
    pub roster: Roster,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub public_addr: SocketAddr,
    pub admin_addr: SocketAddr,
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

#[derive(Clone)]
pub struct SteamSettings {
    pub api_key: Option<String>,
    pub api_base_url: Url,
    pub store_base_url: Url,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for SteamSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SteamSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url.as_str())
            .field("store_base_url", &self.store_base_url.as_str())
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct RateLimitSettings {
    pub capacity: NonZeroU32,
    pub refill_interval: Duration,
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

    builder = builder.add_source(Environment::with_prefix("GKNIGHT").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Common(args)) => raw.apply_steam_overrides(&args.steam),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }
    if let Some(key) = cli.steam_api_key.as_ref() {
        raw.steam.api_key = Some(key.clone());
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
    steam: RawSteamSettings,
    cache: RawCacheSettings,
    rate_limit: RawRateLimitSettings,
    roster: BTreeMap<String, String>,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(host) = overrides.server_admin_host.as_ref() {
            self.server.admin_host = Some(host.clone());
        }
        if let Some(port) = overrides.public_port {
            self.server.public_port = Some(port);
        }
        if let Some(port) = overrides.admin_port {
            self.server.admin_port = Some(port);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(enabled) = overrides.cache_enabled {
            self.cache.enabled = Some(enabled);
        }
        if let Some(ttl) = overrides.cache_ttl_ms {
            self.cache.ttl_ms = Some(ttl);
        }
        if let Some(capacity) = overrides.rate_limit_capacity {
            self.rate_limit.capacity = Some(capacity);
        }
        if let Some(interval) = overrides.rate_limit_refill_interval_ms {
            self.rate_limit.refill_interval_ms = Some(interval);
        }
        self.apply_steam_overrides(&overrides.steam);
    }

    fn apply_steam_overrides(&mut self, overrides: &SteamOverrides) {
        if let Some(url) = overrides.api_base_url.as_ref() {
            self.steam.api_base_url = Some(url.clone());
        }
        if let Some(url) = overrides.store_base_url.as_ref() {
            self.steam.store_base_url = Some(url.clone());
        }
        if let Some(seconds) = overrides.request_timeout_seconds {
            self.steam.request_timeout_seconds = Some(seconds);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            steam,
            cache,
            rate_limit,
            roster,
        } = raw;

        let server = build_server_settings(server)?;
        let logging = build_logging_settings(logging)?;
        let steam = build_steam_settings(steam)?;
        let cache = build_cache_settings(cache)?;
        let rate_limit = build_rate_limit_settings(rate_limit)?;
        let roster = Roster::from_entries(&roster)
            .map_err(|err| LoadError::invalid("roster", err.to_string()))?;

        Ok(Self {
            server,
            logging,
            steam,
            cache,
            rate_limit,
            roster,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
    let admin_host = server
        .admin_host
        .unwrap_or_else(|| DEFAULT_ADMIN_HOST.to_string());

    let public_port = server.public_port.unwrap_or(DEFAULT_PUBLIC_PORT);
    if public_port == 0 {
        return Err(LoadError::invalid(
            "server.public_port",
            "port must be greater than zero",
        ));
    }
    let admin_port = server.admin_port.unwrap_or(DEFAULT_ADMIN_PORT);
    if admin_port == 0 {
        return Err(LoadError::invalid(
            "server.admin_port",
            "port must be greater than zero",
        ));
    }

    let public_addr = parse_socket_addr(&host, public_port)
        .map_err(|reason| LoadError::invalid("server.public_addr", reason))?;
    let admin_addr = parse_socket_addr(&admin_host, admin_port)
        .map_err(|reason| LoadError::invalid("server.admin_addr", reason))?;

    Ok(ServerSettings {
        public_addr,
        admin_addr,
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

fn build_steam_settings(steam: RawSteamSettings) -> Result<SteamSettings, LoadError> {
    let api_key = steam.api_key.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    });

    let api_base_url = parse_base_url(
        steam.api_base_url.as_deref(),
        DEFAULT_STEAM_API_BASE_URL,
        "steam.api_base_url",
    )?;
    let store_base_url = parse_base_url(
        steam.store_base_url.as_deref(),
        DEFAULT_STEAM_STORE_BASE_URL,
        "steam.store_base_url",
    )?;

    let timeout_secs = steam
        .request_timeout_seconds
        .unwrap_or(DEFAULT_STEAM_REQUEST_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "steam.request_timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(SteamSettings {
        api_key,
        api_base_url,
        store_base_url,
        request_timeout: Duration::from_secs(timeout_secs),
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let ttl_ms = cache.ttl_ms.unwrap_or(DEFAULT_CACHE_TTL_MS);
    if ttl_ms == 0 {
        return Err(LoadError::invalid("cache.ttl_ms", "must be greater than zero"));
    }

    Ok(CacheSettings {
        enabled: cache.enabled.unwrap_or(true),
        ttl: Duration::from_millis(ttl_ms),
    })
}

fn build_rate_limit_settings(
    rate_limit: RawRateLimitSettings,
) -> Result<RateLimitSettings, LoadError> {
    let capacity_val = rate_limit.capacity.unwrap_or(DEFAULT_RATE_LIMIT_CAPACITY);
    let capacity = non_zero_u32(capacity_val, "rate_limit.capacity")?;

    let interval_ms = rate_limit
        .refill_interval_ms
        .unwrap_or(DEFAULT_RATE_LIMIT_REFILL_INTERVAL_MS);
    if interval_ms == 0 {
        return Err(LoadError::invalid(
            "rate_limit.refill_interval_ms",
            "must be greater than zero",
        ));
    }

    Ok(RateLimitSettings {
        capacity,
        refill_interval: Duration::from_millis(interval_ms),
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    admin_host: Option<String>,
    public_port: Option<u16>,
    admin_port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSteamSettings {
    api_key: Option<String>,
    api_base_url: Option<String>,
    store_base_url: Option<String>,
    request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    ttl_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRateLimitSettings {
    capacity: Option<u64>,
    refill_interval_ms: Option<u64>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

/// Parse an absolute http(s) URL and make sure relative joins append to its path.
fn parse_base_url(
    value: Option<&str>,
    default: &str,
    key: &'static str,
) -> Result<Url, LoadError> {
    let raw = value.map(str::trim).unwrap_or(default);
    let mut url =
        Url::parse(raw).map_err(|err| LoadError::invalid(key, format!("invalid url: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(LoadError::invalid(key, "scheme must be http or https"));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

#[cfg(test)]
mod tests;
