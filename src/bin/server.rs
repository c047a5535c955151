//! Entry point for the stores-api server binary.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use stores_api::{
    auth::TokenService,
    config::{self, CliArgs, Config},
    create_app, db, run_migrations,
    state::AppState,
};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args = CliArgs::parse();
    // Config loading logs to the console until the configured subscriber is installed
    let startup = tracing_subscriber::fmt().with_env_filter(env_filter(args.debug)).finish();
    let config = load_config(&args, startup);

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_tracing(&config, args.debug)?;

    tracing::info!("Starting stores-api");
    tracing::info!(
        "Configuration: database_url={}, listen={}:{}",
        config.database_url,
        config.host,
        config.port
    );

    let pool = db::init_pool(&config.database_url)?;
    {
        let mut conn = pool.get().context("Failed to get a connection for migrations")?;
        run_migrations(&mut conn)?;
    }
    tracing::info!("Database ready");

    let state = AppState::new(Arc::new(pool), TokenService::from_config(&config));

    let app = create_app(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = config.socket_addr().map_err(anyhow::Error::msg)?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initialize the tracing subscriber
///
/// Console output is human-readable unless `log_json` is set. When a log
/// directory is configured, JSON logs also go to a daily rolling file.
fn init_tracing(config: &Config, debug: bool) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = env_filter(debug);

    let mut layers: Vec<BoxedLayer> = Vec::new();
    layers.push(if config.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    });

    let guard = match config.log_dir.as_deref() {
        Some(dir) => {
            let (layer, guard) = file_layer(dir)?;
            layers.push(layer);
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

fn env_filter(debug: bool) -> EnvFilter {
    let default_level = if debug { "stores_api=debug,tower_http=debug" } else { "stores_api=info,tower_http=info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Builds the configuration with `subscriber` receiving its log lines
fn load_config<S>(args: &CliArgs, subscriber: S) -> Config
where
    S: Subscriber + Send + Sync + 'static,
{
    tracing::subscriber::with_default(subscriber, || config::get_config(args))
}

type BoxedLayer = Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>;

fn file_layer(dir: &Path) -> anyhow::Result<(BoxedLayer, WorkerGuard)> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create log directory {:?}", dir))?;

    let appender = tracing_appender::rolling::daily(dir, "stores-api.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = tracing_subscriber::fmt::layer()
        .json()
        .with_ansi(false)
        .with_writer(writer)
        .boxed();

    Ok((layer, guard))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
