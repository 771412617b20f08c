use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{any, get},
};
use medsim_api::SimRouter;
use medsim_db_memory::create_backend;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{config::AppConfig, handlers};

/// Shared handler state. The single lock serialises every request against
/// the backend, which keeps id assignment deterministic.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<Mutex<SimRouter>>,
}

impl AppState {
    pub fn new(router: SimRouter) -> Self {
        Self {
            router: Arc::new(Mutex::new(router)),
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self, String> {
        let backend = create_backend(&cfg.backend_config()?);
        Ok(Self::new(SimRouter::new(backend)))
    }
}

pub struct MedsimServer {
    addr: SocketAddr,
    app: Router,
}

pub fn build_app(cfg: &AppConfig) -> Result<Router, String> {
    let state = AppState::from_config(cfg)?;
    Ok(build_app_with_state(cfg, state))
}

pub fn build_app_with_state(cfg: &AppConfig, state: AppState) -> Router {
    let body_limit = cfg.server.body_limit_bytes;
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/api/{*path}", any(handlers::api))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = tracing::field::Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub fn build(self) -> Result<MedsimServer, String> {
        let app = build_app(&self.config)?;
        Ok(MedsimServer {
            addr: self.addr,
            app,
        })
    }
}

impl MedsimServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
