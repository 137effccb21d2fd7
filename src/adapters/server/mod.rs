//! Read-only HTTP surface over the synchronized key store.

pub mod lookup;
pub mod pages;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::core::errors::{DirectoryError, Result};
use crate::core::traits::key_store::KeyStore;

/// Presentation settings for the lookup server.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Shown as the page title.
    pub app_name: String,
    /// Appended to download file names, e.g. `.asc`.
    pub key_extension: String,
}

/// Shared state of every handler.
pub struct AppState {
    pub store: Arc<dyn KeyStore>,
    pub settings: ServerSettings,
}

/// Build the lookup router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/search", get(pages::search))
        // Web Key Directory
        .route(
            "/.well-known/openpgpkey/:domain/hu/:hash",
            get(lookup::wkd_advanced),
        )
        .route("/.well-known/openpgpkey/hu/:hash", get(lookup::wkd_direct))
        .route(
            "/.well-known/openpgpkey/:domain/policy",
            get(lookup::wkd_policy),
        )
        .route("/.well-known/openpgpkey/policy", get(lookup::wkd_policy))
        // Verifying Keyserver
        .route(
            "/vks/v1/by-fingerprint/:fingerprint",
            get(lookup::vks_by_fingerprint),
        )
        .route("/vks/v1/by-keyid/:keyid", get(lookup::vks_by_keyid))
        .route("/vks/v1/by-email/:email", get(lookup::vks_by_email))
        // HTTP Keyserver Protocol
        .route("/pks/lookup", get(lookup::hkp_lookup))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `state` on `bind` until Ctrl-C.
pub async fn serve(bind: &str, state: Arc<AppState>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| DirectoryError::ServerError {
            detail: format!("cannot listen on {bind}: {e}"),
        })?;

    tracing::info!(addr = %bind, "lookup server listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
        .map_err(|e| DirectoryError::ServerError {
            detail: e.to_string(),
        })
}
