use async_trait::async_trait;
use axum::{routing::get, Router};
use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::api::{self, ApiConfig};
use crate::cli::RunConfiguration;
use crate::error::{Result, ValidatorError};
use crate::handlers::{get_feed, AppState};
use crate::mode::ServerLauncher;
use crate::resources::{ensure_output_root, ResourcePaths};
use crate::storage::{FeedStore, StorageLayer};

/// Overrides where the feed database lives.
pub const DATA_DIR_ENV: &str = "GTFSRT_VALIDATOR_DATA_DIR";

const DATABASE_FILE: &str = "gtfsrt.redb";

/// Launcher used by the binary: resolves paths, opens the database and runs
/// the bootstrap.
#[derive(Debug, Default)]
pub struct HttpServerLauncher;

#[async_trait]
impl ServerLauncher for HttpServerLauncher {
    async fn serve(&self, config: RunConfiguration) -> Result<()> {
        let paths = ResourcePaths::resolve()?;

        let data_dir = std::env::var_os(DATA_DIR_ENV).map(PathBuf::from);
        let db_path = database_path(&paths, data_dir.as_deref());
        info!("Using feed database at {:?}", db_path);
        let store = FeedStore::open(&db_path).map_err(ValidatorError::Storage)?;

        ServerBootstrap::new(config, paths, Arc::new(store))
            .start()
            .await
    }
}

/// `<data_dir>/gtfsrt.redb` when a data directory is given (the binary reads
/// it from `$GTFSRT_VALIDATOR_DATA_DIR`), else next to the output root under
/// `<install-dir>/classes`.
pub fn database_path(paths: &ResourcePaths, data_dir: Option<&Path>) -> PathBuf {
    match data_dir {
        Some(dir) => dir.join(DATABASE_FILE),
        None => paths.install_dir.join("classes").join(DATABASE_FILE),
    }
}

/// One-shot startup sequence. `bind` consumes the bootstrap, so the sequence
/// cannot run twice.
pub struct ServerBootstrap {
    config: RunConfiguration,
    paths: ResourcePaths,
    storage: Arc<dyn StorageLayer>,
    api: ApiConfig,
}

impl ServerBootstrap {
    pub fn new(
        config: RunConfiguration,
        paths: ResourcePaths,
        storage: Arc<dyn StorageLayer>,
    ) -> Self {
        Self {
            config,
            paths,
            storage,
            api: ApiConfig::default(),
        }
    }

    /// Storage, output directory, listener, routes; in that order.
    pub async fn bind(self) -> Result<ServerHandle> {
        info!("Initializing storage layer...");
        self.storage.initialize().map_err(ValidatorError::Storage)?;

        // Generated validation output lands here and is served next to the
        // bundled UI.
        ensure_output_root(&self.paths.output_root)?;

        let port = self.config.port;
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ValidatorError::from_bind(port, e))?;
        info!("listening on {}", addr);

        let state = Arc::new(AppState {
            storage: self.storage,
            output_root: self.paths.output_root.clone(),
            api: self.api.clone(),
        });
        let app = build_router(&self.paths, state);

        Ok(ServerHandle { listener, app })
    }

    /// Runs the whole sequence and blocks until Ctrl-C / SIGTERM.
    pub async fn start(self) -> Result<()> {
        self.bind().await?.serve().await
    }
}

/// Routes for a resolved set of content roots.
///
/// Static requests try the bundled root first and fall back to the output
/// root, so generated files can never shadow UI assets of the same name.
pub fn build_router(paths: &ResourcePaths, state: Arc<AppState>) -> Router {
    let static_files =
        ServeDir::new(&paths.bundled_root).fallback(ServeDir::new(&paths.output_root));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers(Any);

    let api_routes = api::router(&state.api);

    Router::new()
        .route("/getFeed", get(get_feed))
        .nest("/api", api_routes)
        .with_state(state)
        .fallback_service(static_files)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// A bound listener with its routes, not yet accepting connections.
pub struct ServerHandle {
    listener: TcpListener,
    app: Router,
}

impl ServerHandle {
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().map_err(ValidatorError::Serve)
    }

    pub async fn serve(self) -> Result<()> {
        self.serve_with_shutdown(shutdown_signal()).await
    }

    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Ok(addr) = self.listener.local_addr() {
            info!("Go to http://localhost:{} in your browser", addr.port());
        }
        axum::serve(self.listener, self.app)
            .with_graceful_shutdown(signal)
            .await
            .map_err(ValidatorError::Serve)?;
        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
