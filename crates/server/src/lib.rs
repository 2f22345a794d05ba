//! HTTP host for the browser gate: the gate middleware, its endpoints and the health check.

mod error;
mod gate;
mod health;
pub mod logger;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{Extension, Router, response::Html, routing::get};
use axum_server::{Handle, tls_rustls::RustlsConfig};
use browser_rules::ParsedIdentity;
use config::Config;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub use error::Error;
pub use gate::{BrowserGateLayer, BrowserGateService};

pub type Result<T> = std::result::Result<T, Error>;

pub struct ServeConfig {
    pub listen_address: SocketAddr,
    pub config: Config,
    /// Cancelling the token stops the server after in-flight requests complete.
    pub shutdown_signal: CancellationToken,
}

/// Builds the application router.
///
/// The health endpoint is added after the gate layer and is never intercepted.
pub fn router(config: &Config) -> Router {
    let gate = Arc::new(config.gate.clone());

    let mut app = Router::new().route("/", get(index));

    if gate.enabled {
        app = app.merge(gate::routes(gate.clone()));
    }

    let mut app = app.layer(BrowserGateLayer::new(gate));

    if config.server.health.enabled {
        app = app.route(&config.server.health.path, get(health::health));
    }

    app
}

pub async fn serve(
    ServeConfig {
        listen_address,
        config,
        shutdown_signal,
    }: ServeConfig,
) -> crate::Result<()> {
    let app = router(&config);

    let listener = TcpListener::bind(listen_address).await.map_err(Error::Bind)?;

    if config.gate.is_active() {
        log::debug!(
            "Browser gate active with {} requirement(s), unsupported page at {}",
            config.gate.requirements.len(),
            config.gate.path
        );
    }

    match &config.server.tls {
        Some(tls_config) => {
            let rustls_config = RustlsConfig::from_pem_file(&tls_config.certificate, &tls_config.key)
                .await
                .map_err(|e| Error::Tls(e.to_string()))?;

            log::info!("Listening on https://{listen_address}");

            // axum-server accepts std listeners only
            let std_listener = listener.into_std().map_err(Error::Bind)?;

            let handle = Handle::new();
            let shutdown_handle = handle.clone();

            tokio::spawn(async move {
                shutdown_signal.cancelled().await;
                shutdown_handle.graceful_shutdown(Some(Duration::from_secs(10)));
            });

            axum_server::from_tcp_rustls(std_listener, rustls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .map_err(|e| Error::Server(std::io::Error::other(e)))?;
        }
        None => {
            log::info!("Listening on http://{listen_address}");

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal.cancelled_owned())
                .await
                .map_err(Error::Server)?;
        }
    }

    Ok(())
}

async fn index(identity: Option<Extension<ParsedIdentity>>) -> Html<String> {
    let greeting = identity
        .as_ref()
        .and_then(|Extension(identity)| identity.browser_name_and_version())
        .map(|(name, version)| format!("<h1>Hello, {} {}!</h1>", gate::escape(name), gate::escape(version)))
        .unwrap_or_else(|| "<h1>Hello, World!</h1>".to_string());

    Html(greeting)
}
