//! Jungle Speed game server.
//!
//! Runs the single game table as an actor task and serves it over
//! HTTP/WebSocket.

use std::net::SocketAddr;

use anyhow::Error;
use js_server::{api, config::ServerConfig, logging};
use jungle_speed::table::{TableActor, TableHandle};
use log::info;
use pico_args::Arguments;

const HELP: &str = "\
Run a Jungle Speed game server

USAGE:
  js_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:$PORT]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:3001)
  PORT                     Port on 127.0.0.1 when SERVER_BIND is unset [default: 3001]
  TABLE_NAME               Name of the game table [default: Jungle]
  GRAB_COOLDOWN_MS         Draw lock after a bottle grab, in ms [default: 2000]
  RUST_LOG                 Log filter [default: info]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind_override: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;

    logging::init();

    let config = ServerConfig::from_env(bind_override)?;
    config.validate()?;

    info!(
        "Starting table '{}' with a {:?} grab cooldown",
        config.table.name, config.table.grab_cooldown
    );

    let (actor, table) = TableActor::new(config.table.clone());
    let actor_task = tokio::spawn(actor.run());

    let app = api::create_router(api::AppState {
        table: table.clone(),
    });

    info!("Starting HTTP/WebSocket server on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(table.clone()))
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");
    actor_task.await?;

    Ok(())
}

/// Graceful shutdown signal. Closes the table once Ctrl+C arrives.
async fn shutdown_signal(table: TableHandle) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }

    let _ = table.close().await;
}
