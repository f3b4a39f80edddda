//! Server configuration and lifecycle.
//!
//! Wires the route handlers into an axum router, shares the catalog store and
//! event log across handlers, and runs the listener with graceful shutdown.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use registrar_core::{Catalog, Error, Result};
use registrar_telemetry::{EventLog, RequestMetrics};

use crate::routes;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub addr: SocketAddr,
    /// Enable CORS.
    pub cors: bool,
    /// Path to the course catalog JSON file.
    pub course_file: PathBuf,
    /// Path to the JSON event log file.
    pub event_log_file: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".parse().unwrap(),
            cors: true,
            course_file: PathBuf::from("course_catalog.json"),
            event_log_file: PathBuf::from("logoutput.json"),
        }
    }
}

impl ServerConfig {
    /// Creates a new server config builder.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }
}

/// Builder for ServerConfig.
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    addr: Option<SocketAddr>,
    cors: Option<bool>,
    course_file: Option<PathBuf>,
    event_log_file: Option<PathBuf>,
}

impl ServerConfigBuilder {
    /// Sets the listen address.
    pub fn addr(mut self, addr: SocketAddr) -> Self {
        self.addr = Some(addr);
        self
    }

    /// Sets whether CORS is enabled.
    pub fn cors(mut self, enabled: bool) -> Self {
        self.cors = Some(enabled);
        self
    }

    /// Sets the course catalog file path.
    pub fn course_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.course_file = Some(path.into());
        self
    }

    /// Sets the event log file path.
    pub fn event_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.event_log_file = Some(path.into());
        self
    }

    /// Builds the server config.
    pub fn build(self) -> ServerConfig {
        let defaults = ServerConfig::default();
        ServerConfig {
            addr: self.addr.unwrap_or(defaults.addr),
            cors: self.cors.unwrap_or(defaults.cors),
            course_file: self.course_file.unwrap_or(defaults.course_file),
            event_log_file: self.event_log_file.unwrap_or(defaults.event_log_file),
        }
    }
}

/// Shared application state.
#[derive(Debug)]
pub struct AppState {
    /// The course catalog store.
    pub catalog: Catalog,
    /// The JSON event log file.
    pub events: EventLog,
    /// Request counters.
    pub metrics: RequestMetrics,
}

impl AppState {
    /// Creates app state from the given config, initializing the event log
    /// file if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the event log file cannot be created.
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let events = EventLog::open(&config.event_log_file)
            .map_err(|e| Error::internal(format!("failed to open event log: {e}")))?;

        Ok(Self {
            catalog: Catalog::new(&config.course_file),
            events,
            metrics: RequestMetrics::default(),
        })
    }
}

/// The HTTP server.
pub struct Server {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl Server {
    /// Creates a new server with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the event log file cannot be created.
    pub fn new(config: ServerConfig) -> Result<Self> {
        let state = Arc::new(AppState::new(&config)?);
        Ok(Self { config, state })
    }

    /// Returns the shared application state.
    #[must_use]
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Creates the router.
    fn router(&self) -> Router {
        let mut router = Router::new()
            .route("/", get(routes::index))
            .route("/catalog", get(routes::course_catalog))
            .route(
                "/add_course",
                get(routes::add_course_form).post(routes::add_course_submit),
            )
            .route("/course/{code}", get(routes::course_details))
            .route("/delete_course/{code}", post(routes::delete_course))
            .route("/manual-trace", get(routes::manual_trace))
            .with_state(Arc::clone(&self.state));

        // Add middleware
        router = router.layer(TraceLayer::new_for_http());

        if self.config.cors {
            router = router.layer(CorsLayer::permissive());
        }

        router
    }

    /// Runs the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot start.
    pub async fn run(self) -> Result<()> {
        let router = self.router();

        tracing::info!(
            addr = %self.config.addr,
            course_file = %self.config.course_file.display(),
            event_log = %self.config.event_log_file.display(),
            "Starting registrar server"
        );
        eprintln!(
            "\n\x1b[32m✓\x1b[0m Server listening on http://{}",
            self.config.addr
        );
        eprintln!("  Press Ctrl+C to stop\n");

        let listener = tokio::net::TcpListener::bind(self.config.addr)
            .await
            .map_err(Error::Io)?;

        // Set up graceful shutdown
        let shutdown_signal = async {
            let ctrl_c = async {
                tokio::signal::ctrl_c()
                    .await
                    .expect("Failed to install Ctrl+C handler");
            };

            #[cfg(unix)]
            let terminate = async {
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                    .expect("Failed to install signal handler")
                    .recv()
                    .await;
            };

            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                () = ctrl_c => {
                    eprintln!("\n\x1b[33m⚡\x1b[0m Received Ctrl+C, shutting down gracefully...");
                },
                () = terminate => {
                    eprintln!("\n\x1b[33m⚡\x1b[0m Received SIGTERM, shutting down gracefully...");
                },
            }
        };

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(Error::Io)?;

        tracing::info!("Server shutdown complete");
        eprintln!("\x1b[32m✓\x1b[0m Server stopped");

        Ok(())
    }
}
