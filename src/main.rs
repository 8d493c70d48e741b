use std::{fmt::Write as _, net::SocketAddr, process, sync::Arc};

use gknight::{
    application::{
        error::AppError,
        ids,
        library::{CommonGames, LibraryService, OwnershipOverview},
        pagination::{PageInfo, PageParams},
    },
    config,
    infra::{
        error::InfraError,
        http::{self, AdminState, ApiState, Sources},
        steam::SteamClient,
        telemetry,
    },
    util::clock::system_clock,
};
use tokio::try_join;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    if settings.steam.api_key.is_none() {
        warn!(
            target: "gknight::steam",
            "no catalog API key configured; set STEAM_API_KEY or steam.api_key"
        );
    }

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Common(args) => run_common(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let client = Arc::new(SteamClient::new(&settings.steam)?);
    let states = http::build_states(
        Sources::from_single(client),
        &settings.cache,
        &settings.rate_limit,
        settings.roster.clone(),
        system_clock(),
    );

    info!(
        public_addr = %settings.server.public_addr,
        admin_addr = %settings.server.admin_addr,
        cache_enabled = settings.cache.enabled,
        cache_ttl_ms = settings.cache.ttl.as_millis() as u64,
        rate_limit_capacity = settings.rate_limit.capacity.get(),
        roster = settings.roster.len(),
        "starting gknight"
    );

    serve_http(&settings, states.api, states.admin).await
}

async fn serve_http(
    settings: &config::Settings,
    api_state: ApiState,
    admin_state: AdminState,
) -> Result<(), AppError> {
    let public_router = http::build_api_router(api_state);
    let admin_router = http::build_admin_router(admin_state);

    let public_listener = tokio::net::TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    let admin_listener = tokio::net::TcpListener::bind(settings.server.admin_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    let public_server = axum::serve(
        public_listener,
        public_router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal());
    let admin_server = axum::serve(admin_listener, admin_router.into_make_service())
        .with_graceful_shutdown(shutdown_signal());

    try_join!(public_server, admin_server)
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    info!("gknight stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

async fn run_common(settings: config::Settings, args: config::CommonArgs) -> Result<(), AppError> {
    let client = Arc::new(SteamClient::new(&settings.steam)?);
    let library = LibraryService::new(client, None);

    let joined = args.identities.join(",");
    let identities = ids::parse_identities(Some(&joined), &settings.roster)?;
    let params = PageParams::from_optional(args.page, args.limit)?;

    let output = if args.all {
        let overview = library.ownership(&identities, params).await?;
        if args.json {
            to_json(&http::api::models::AllGamesResponse {
                games: overview.page.items,
                pagination: overview.page.info,
                unavailable: overview.unavailable,
            })?
        } else {
            render_ownership_table(&overview)
        }
    } else {
        let common = library.common_games(&identities, params).await?;
        if args.json {
            to_json(&http::api::models::CommonGamesResponse {
                common_games: common.page.items,
                pagination: common.page.info,
                unavailable: common.unavailable,
            })?
        } else {
            render_common_table(&common)
        }
    };

    println!("{output}");
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value)
        .map_err(|err| AppError::unexpected(format!("failed to encode output: {err}")))
}

fn render_common_table(result: &CommonGames) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<10} NAME", "APPID");
    for game in &result.page.items {
        let _ = writeln!(out, "{:<10} {}", game.appid, game.name);
    }
    render_footer(&mut out, &result.page.info, &result.unavailable);
    out
}

fn render_ownership_table(result: &OwnershipOverview) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<10} {:<6} NAME", "APPID", "OWNERS");
    for game in &result.page.items {
        let _ = writeln!(
            out,
            "{:<10} {:<6} {}",
            game.appid, game.owner_count, game.name
        );
    }
    render_footer(&mut out, &result.page.info, &result.unavailable);
    out
}

fn render_footer(out: &mut String, info: &PageInfo, unavailable: &[String]) {
    let _ = write!(
        out,
        "page {}/{} ({} games)",
        info.page, info.pages, info.total
    );
    if !unavailable.is_empty() {
        let _ = write!(out, "\nunavailable: {}", unavailable.join(", "));
    }
}
