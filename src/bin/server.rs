use std::{
    fmt::Display,
    net::{IpAddr, SocketAddr},
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use carteira::{AppState, Config, build_router, graceful_shutdown, logging_middleware};

/// The web server for carteira.
///
/// The secret key, database and debug mode are read from the environment (or a `.env` file).
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The address to listen on.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// The port to serve the app from.
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Read first so that `.env` is loaded before the arguments fall back to the environment.
    let config = Config::from_env();
    let debug = config.as_ref().is_ok_and(|config| config.debug);
    setup_logging(debug);

    let config = config.unwrap_or_else(|error| exit_with_error("Invalid configuration", error));
    let args = Args::parse();

    if config.uses_default_secret() {
        tracing::warn!("SECRET_KEY is not set, falling back to an insecure development key.");
    }

    let connection = config
        .database
        .open()
        .unwrap_or_else(|error| exit_with_error("Could not open the database", error));
    let state = AppState::new(connection, &config.secret_key)
        .unwrap_or_else(|error| exit_with_error("Could not initialize the database", error));
    tracing::info!("Using database {}", config.database_url);

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state));

    let router = if config.debug {
        router.layer(middleware::from_fn(logging_middleware))
    } else {
        router
    };

    #[cfg(debug_assertions)]
    let router = if config.debug {
        router.layer(LiveReloadLayer::new())
    } else {
        router
    };

    let addr = SocketAddr::from((args.host, args.port));
    tracing::info!("HTTP server listening on {}", addr);

    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        exit_with_error("Server error", error);
    }
}

fn exit_with_error(context: &str, error: impl Display) -> ! {
    tracing::error!("{context}: {error}");
    eprintln!("{context}: {error}");
    std::process::exit(1);
}

/// Log to stdout, at the debug level in debug mode and the info level otherwise.
///
/// `RUST_LOG` overrides the level.
fn setup_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
