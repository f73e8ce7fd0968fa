use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use docroute_classifier::HttpClassifier;
use docroute_core::liveness::{liveness_pair, LivenessSetter};
use docroute_pipeline::{ConnectivityMonitor, PgHealthProbe};
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use docroute_api::config::ServerConfig;
use docroute_api::router::build_app_router;
use docroute_api::state::AppState;

const DEFAULT_LOG_FILTER: &str = "docroute_api=debug,docroute_pipeline=debug,tower_http=debug";
const MONITOR_STOP_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env().expect("Invalid server configuration");
    tracing::info!(host = %config.host, port = config.port, "Configuration loaded");

    let pool = docroute_db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    docroute_db::health_check(&pool)
        .await
        .expect("Database is not answering queries");
    docroute_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");

    let (setter, liveness) = liveness_pair(false);
    let monitor_cancel = CancellationToken::new();
    let monitor_handle = spawn_monitor(&pool, setter, &config, monitor_cancel.clone());

    let classifier =
        HttpClassifier::new(config.classifier.clone()).expect("Failed to build classifier client");
    tracing::info!(
        url = %config.classifier.url,
        model = %config.classifier.model,
        "Classifier configured"
    );

    let config = Arc::new(config);
    let state = AppState::new(pool.clone(), Arc::clone(&config), Arc::new(classifier), liveness)
        .expect("Invalid initial routing settings");
    let app = build_app_router(state, &config);

    let ip = config.host.parse().expect("HOST is not an IP address");
    let addr = SocketAddr::new(ip, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Draining background work");
    monitor_cancel.cancel();
    if tokio::time::timeout(MONITOR_STOP_GRACE, monitor_handle).await.is_err() {
        tracing::warn!("Connectivity monitor did not stop in time");
    }
    pool.close().await;
    tracing::info!("Shutdown complete");
}

/// `RUST_LOG` selects levels; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// The backend starts out offline; the first probe runs as soon as the
/// monitor task is scheduled.
fn spawn_monitor(
    pool: &PgPool,
    setter: LivenessSetter,
    config: &ServerConfig,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let monitor = ConnectivityMonitor::new(
        Arc::new(PgHealthProbe::new(pool.clone())),
        setter,
        config.health_probe_interval(),
    );
    tokio::spawn(monitor.run(cancel))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Ctrl-C received"),
        () = terminate => tracing::info!("SIGTERM received"),
    }
}
