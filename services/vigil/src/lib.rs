//! Vigil - HTTP endpoint health monitoring service
//!
//! Polls a stored list of endpoints on an interval, classifies every result
//! as up or down, and serves the live status snapshot over a web dashboard.

pub mod checker;
pub mod config;
pub mod dashboard;
pub mod endpoint;
pub mod error;
pub mod io;
pub mod session;
pub mod status;
pub mod store;

pub use config::{load_config, Config};
pub use endpoint::Endpoint;
pub use error::{Result, VigilError};

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::checker::HealthChecker;
use crate::session::PollSession;
use crate::store::EndpointStore;

/// Run the vigil service with the given configuration.
///
/// Blocks until ctrl-c, then stops polling gracefully.
pub async fn run(config: Config) -> Result<()> {
    let http: Arc<dyn io::HttpClient> = Arc::new(io::ReqwestHttpClient::default());
    let store = EndpointStore::new(&config.endpoints_file);
    let checker = HealthChecker::new(http, config.timeout());
    let session = PollSession::new(store, checker);
    let cancel = CancellationToken::new();

    // Setup shutdown handler
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for ctrl-c");
        tracing::info!("Shutdown signal received");
        cancel_for_signal.cancel();
    });

    // Start dashboard if enabled
    if config.dashboard.enabled {
        let dashboard_port = config.dashboard.port;
        let dashboard_state = session.state();
        let cancel_for_dashboard = cancel.clone();

        tokio::spawn(async move {
            let router = dashboard::build_router(dashboard_state);
            let addr = SocketAddr::from(([0, 0, 0, 0], dashboard_port));
            tracing::info!("Dashboard listening on http://{}", addr);

            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(l) => l,
                Err(e) => {
                    tracing::error!(
                        "Failed to bind dashboard to port {}: {}. Continuing without dashboard.",
                        dashboard_port,
                        e
                    );
                    return;
                }
            };

            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    cancel_for_dashboard.cancelled().await;
                })
                .await
                .ok();

            tracing::debug!("Dashboard stopped");
        });
    }

    session.start_auto_polling(config.refresh_interval());
    tracing::info!(
        "Vigil started; polling every {}s",
        config.refresh_interval_seconds
    );

    // Block until shutdown is requested
    cancel.cancelled().await;

    session.stop_auto_polling().await;
    tracing::info!("Vigil stopped");

    Ok(())
}
