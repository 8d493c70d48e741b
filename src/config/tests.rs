use super::*;

#[test]
fn defaults_resolve_without_any_source() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.public_addr.to_string(), "127.0.0.1:3000");
    assert_eq!(settings.server.admin_addr.to_string(), "127.0.0.1:3001");
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(settings.steam.api_key.is_none());
    assert_eq!(
        settings.steam.api_base_url.as_str(),
        "https://api.steampowered.com/"
    );
    assert_eq!(settings.steam.request_timeout, Duration::from_secs(15));
    assert!(settings.cache.enabled);
    assert_eq!(settings.cache.ttl, Duration::from_millis(300_000));
    assert_eq!(settings.rate_limit.capacity.get(), 10);
    assert_eq!(
        settings.rate_limit.refill_interval,
        Duration::from_millis(10_000)
    );
    assert!(settings.roster.is_empty());
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.public_port = Some(4000);
    raw.logging.level = Some("info".to_string());
    raw.rate_limit.capacity = Some(50);

    let overrides = ServeOverrides {
        public_port: Some(4321),
        log_level: Some("debug".to_string()),
        rate_limit_capacity: Some(3),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.public_addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.rate_limit.capacity.get(), 3);
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn zero_values_are_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.ttl_ms = Some(0);
    let err = Settings::from_raw(raw).expect_err("zero ttl");
    assert!(matches!(err, LoadError::Invalid { key: "cache.ttl_ms", .. }));

    let mut raw = RawSettings::default();
    raw.rate_limit.capacity = Some(0);
    let err = Settings::from_raw(raw).expect_err("zero capacity");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "rate_limit.capacity",
            ..
        }
    ));

    let mut raw = RawSettings::default();
    raw.rate_limit.refill_interval_ms = Some(0);
    assert!(Settings::from_raw(raw).is_err());

    let mut raw = RawSettings::default();
    raw.server.admin_port = Some(0);
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn base_urls_gain_a_trailing_slash() {
    let mut raw = RawSettings::default();
    raw.steam.api_base_url = Some("http://localhost:9000/steam".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(
        settings.steam.api_base_url.as_str(),
        "http://localhost:9000/steam/"
    );
}

#[test]
fn non_http_base_url_is_rejected() {
    let mut raw = RawSettings::default();
    raw.steam.store_base_url = Some("ftp://store.example".to_string());

    let err = Settings::from_raw(raw).expect_err("ftp url");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "steam.store_base_url",
            ..
        }
    ));
}

#[test]
fn blank_api_key_counts_as_absent() {
    let mut raw = RawSettings::default();
    raw.steam.api_key = Some("   ".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.steam.api_key.is_none());
}

#[test]
fn api_key_is_redacted_from_debug_output() {
    let mut raw = RawSettings::default();
    raw.steam.api_key = Some("super-secret".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    let rendered = format!("{:?}", settings.steam);

    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("<redacted>"));
}

#[test]
fn roster_entries_are_normalized() {
    let mut raw = RawSettings::default();
    raw.roster
        .insert(" Brandon ".to_string(), "76561190000000001".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.roster.resolve("BRANDON"), "76561190000000001");
}

#[test]
fn blank_roster_identity_is_rejected() {
    let mut raw = RawSettings::default();
    raw.roster.insert("rudy".to_string(), " ".to_string());

    let err = Settings::from_raw(raw).expect_err("blank identity");
    assert!(matches!(err, LoadError::Invalid { key: "roster", .. }));
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["gknight"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "gknight",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--cache-enabled",
        "false",
        "--steam-api-base-url",
        "http://localhost:9000/",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(serve.overrides.cache_enabled, Some(false));
            assert_eq!(
                serve.overrides.steam.api_base_url.as_deref(),
                Some("http://localhost:9000/")
            );
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_common_arguments() {
    let args = CliArgs::parse_from([
        "gknight",
        "common",
        "--all",
        "--limit",
        "5",
        "--json",
        "brandon,rudy",
        "76561190000000003",
    ]);

    match args.command.expect("common command") {
        Command::Common(common) => {
            assert!(common.all);
            assert!(common.json);
            assert_eq!(common.limit, Some(5));
            assert_eq!(common.page, None);
            assert_eq!(
                common.identities,
                vec!["brandon,rudy".to_string(), "76561190000000003".to_string()]
            );
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn common_requires_an_identity() {
    let result = CliArgs::try_parse_from(["gknight", "common"]);
    assert!(result.is_err());
}
