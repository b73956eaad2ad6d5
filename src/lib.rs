pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod listing;
pub mod media;
pub mod profile;
pub mod routes;
pub mod timestamp;

#[cfg(test)]
mod test_util;

use anyhow::Context;
use axum::extract::Extension;
use entrait::{entrait, Impl};
use tokio::net::TcpListener;
use tokio::signal;
use tower::ServiceBuilder;

///
/// Mockable system abstraction
///
#[entrait(mock_api=SystemMock)]
pub trait System {
    fn get_current_time(&self) -> time::OffsetDateTime;
}

///
/// Mockable config accessor
///
#[entrait(mock_api=GetConfigMock)]
pub trait GetConfig {
    fn get_jwt_signing_key(&self) -> &hmac::Hmac<sha2::Sha384>;
    fn get_image_host_config(&self) -> &config::ImageHostConfig;
    fn get_search_api_config(&self) -> &config::SearchApiConfig;
}

///
/// Shared client for outbound calls to the image host and the search provider
///
#[entrait(mock_api=GetHttpClientMock)]
pub trait GetHttpClient {
    fn get_http_client(&self) -> &reqwest::Client;
}

pub async fn serve(app: app::App) -> anyhow::Result<()> {
    let address = format!("0.0.0.0:{}", app.config.port);

    let router = routes::api_router().layer(
        ServiceBuilder::new()
            // Enables logging. Use `RUST_LOG=tower_http=debug`
            .layer(tower_http::trace::TraceLayer::new_for_http())
            .layer(Extension(Impl::new(app))),
    );

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("could not bind to {address}"))?;
    tracing::info!("Server running on {address}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("error running HTTP server")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("failed to install signal handler: {e}");
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
}
