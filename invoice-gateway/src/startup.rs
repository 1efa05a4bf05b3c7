//! Application startup: router construction and server lifecycle.

use crate::config::Config;
use crate::handlers;
use crate::services::ledger::LedgerClient;
use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/invoices",
            post(handlers::invoices::issue_invoice).get(handlers::invoices::list_invoices),
        )
        .route("/invoices/verify", post(handlers::invoices::verify_invoice))
        .route("/invoices/verify-qr", post(handlers::invoices::verify_scan))
        .route("/invoices/:id", get(handlers::invoices::get_invoice))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .with_state(state)
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application: construct the ledger client, assemble the
    /// router, and bind the listener (port 0 yields a random port).
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let ledger = LedgerClient::new(config.backend.clone());
        if ledger.is_configured() {
            tracing::info!("Backend ledger client initialized");
        } else {
            tracing::warn!(
                "BACKEND_URL not set - running standalone, only local issuance is available"
            );
        }

        let state = AppState {
            config: config.clone(),
            ledger,
        };
        let router = build_router(state);

        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
        let listener = TcpListener::bind(addr).await?;
        let port = listener.local_addr()?.port();

        tracing::info!(service = %config.service_name, port = port, "Application built");

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        tracing::info!("Listening on port {}", self.port);
        axum::serve(self.listener, self.router).await?;

        Ok(())
    }
}
