//! # HTTP Server
//!
//! Main HTTP server combining all endpoint routers.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::config::HttpServerConfig;
use super::cors::cors_layer;
use super::posts_routes::posts_routes;
use super::realtime_routes::{realtime_routes, RealtimeState};
use super::settings_routes::settings_routes;
use super::upload_routes::upload_routes;
use crate::media::MediaUploader;
use crate::posts::PostService;
use crate::realtime::BroadcastNotifier;
use crate::settings::SettingsService;
use crate::store::{BlobStore, PostStore, SettingsStore};

/// Store collaborators the server is wired to
#[derive(Clone)]
pub struct Backends {
    pub posts: Arc<dyn PostStore>,
    pub settings: Arc<dyn SettingsStore>,
    pub blobs: Arc<dyn BlobStore>,
}

impl Backends {
    /// Use one value for both tables and the blob store
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: PostStore + SettingsStore + BlobStore + 'static,
    {
        Self {
            posts: store.clone(),
            settings: store.clone(),
            blobs: store,
        }
    }
}

/// HTTP server for the content API
pub struct HttpServer {
    config: HttpServerConfig,
    notifier: Arc<BroadcastNotifier>,
    router: Router,
}

impl HttpServer {
    /// Wire managers and routes over the given stores
    pub fn new(config: HttpServerConfig, backends: Backends) -> Self {
        let notifier = Arc::new(BroadcastNotifier::new(config.broadcast_capacity));
        let router = Self::build_router(&config, backends, notifier.clone());
        Self {
            config,
            notifier,
            router,
        }
    }

    /// Build the combined router with all endpoints
    fn build_router(
        config: &HttpServerConfig,
        backends: Backends,
        notifier: Arc<BroadcastNotifier>,
    ) -> Router {
        let posts = Arc::new(PostService::new(
            backends.posts,
            backends.blobs.clone(),
            notifier.clone(),
        ));
        let settings = Arc::new(SettingsService::new(backends.settings, notifier.clone()));
        let uploader = Arc::new(MediaUploader::new(backends.blobs));
        let realtime = Arc::new(RealtimeState::new(
            notifier,
            Duration::from_secs(config.ws_heartbeat_secs.max(1)),
        ));

        Router::new()
            .route("/health", get(health_handler))
            .merge(posts_routes(posts))
            .merge(upload_routes(uploader, config.max_upload_bytes))
            .merge(settings_routes(settings))
            .merge(realtime_routes(realtime))
            .layer(cors_layer(config))
            .layer(TraceLayer::new_for_http())
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Notifier the managers publish into
    pub fn notifier(&self) -> Arc<BroadcastNotifier> {
        self.notifier.clone()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until Ctrl-C
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("Invalid socket address: {}", e))
        })?;

        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until Ctrl-C
    pub async fn serve(self, listener: TcpListener) -> Result<(), std::io::Error> {
        info!(addr = %listener.local_addr()?, "postboard listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
