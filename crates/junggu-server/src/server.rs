//! `JungguServer` — Axum HTTP server.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::extract::State;
use axum::response::Json;
use axum::routing::{get, post};
use junggu_core::PlaceStore;
use junggu_llm::{CompletionProvider, GenerationParams};
use junggu_runtime::SessionManager;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::handlers;
use crate::health::{self, HealthResponse};
use crate::shutdown::ShutdownCoordinator;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Places shared by every session.
    pub store: Arc<PlaceStore>,
    /// Live sessions.
    pub sessions: Arc<SessionManager>,
    /// Completion collaborator.
    pub provider: Arc<dyn CompletionProvider>,
    /// When the server started.
    pub start_time: Instant,
}

/// The places server.
pub struct JungguServer {
    config: ServerConfig,
    store: Arc<PlaceStore>,
    sessions: Arc<SessionManager>,
    provider: Arc<dyn CompletionProvider>,
    shutdown: Arc<ShutdownCoordinator>,
    start_time: Instant,
}

impl JungguServer {
    /// Create a new server.
    pub fn new(
        config: ServerConfig,
        store: PlaceStore,
        provider: Arc<dyn CompletionProvider>,
        params: GenerationParams,
    ) -> Self {
        let sessions = SessionManager::new(config.max_sessions, params)
            .with_idle_ttl(config.session_idle_ttl());
        Self {
            config,
            store: Arc::new(store),
            sessions: Arc::new(sessions),
            provider,
            shutdown: Arc::new(ShutdownCoordinator::new()),
            start_time: Instant::now(),
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            store: self.store.clone(),
            sessions: self.sessions.clone(),
            provider: self.provider.clone(),
            start_time: self.start_time,
        };

        Router::new()
            .route("/health", get(health_handler))
            .route("/sessions", post(handlers::create_session))
            .route(
                "/sessions/{id}",
                get(handlers::get_session).delete(handlers::end_session),
            )
            .route("/sessions/{id}/filter", post(handlers::toggle_filter))
            .route("/sessions/{id}/chat", post(handlers::chat))
            .route("/sessions/{id}/render", get(handlers::render))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Serve on `listener` until the shutdown coordinator fires.
    ///
    /// Idle sessions are swept in the background for as long as the server
    /// runs.
    pub async fn serve(&self, listener: TcpListener) -> std::io::Result<()> {
        let token = self.shutdown.token();
        info!(addr = ?listener.local_addr().ok(), places = self.store.len(), "server listening");
        let sweeper = spawn_idle_sweeper(
            Arc::clone(&self.sessions),
            sweep_interval(self.sessions.idle_ttl()),
            token.clone(),
        );
        let result = axum::serve(listener, self.router())
            .with_graceful_shutdown(token.cancelled_owned())
            .await;
        sweeper.abort();
        result
    }

    /// Get the session manager.
    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Sweep a few times per TTL, at most once a minute.
fn sweep_interval(ttl: Duration) -> Duration {
    (ttl / 4).clamp(Duration::from_secs(1), Duration::from_secs(60))
}

/// Evict idle sessions every `every` until `token` is cancelled.
fn spawn_idle_sweeper(
    sessions: Arc<SessionManager>,
    every: Duration,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                () = token.cancelled() => break,
                _ = ticker.tick() => {
                    let _ = sessions.evict_idle();
                }
            }
        }
        debug!("idle session sweeper stopped");
    })
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(
        state.start_time,
        state.sessions.active_count(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use junggu_llm::MockProvider;
    use tower::ServiceExt;

    fn make_server() -> JungguServer {
        JungguServer::new(
            ServerConfig::default(),
            PlaceStore::default(),
            Arc::new(MockProvider::replying(Vec::<String>::new())),
            GenerationParams::default(),
        )
    }

    #[test]
    fn server_with_default_config() {
        let server = make_server();
        assert_eq!(server.config().host, "127.0.0.1");
        assert_eq!(server.config().port, 8501);
        assert_eq!(server.sessions().max_sessions(), 1000);
        assert!(!server.shutdown().is_shutting_down());
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let server = make_server();
        let _ = server.sessions().create_session().unwrap();

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = server.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 10_000)
            .await
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["active_sessions"], 1);
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let req = Request::builder()
            .uri("/nonexistent")
            .body(Body::empty())
            .unwrap();
        let resp = make_server().router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn sweep_interval_is_bounded() {
        assert_eq!(sweep_interval(Duration::from_secs(1800)), Duration::from_secs(60));
        assert_eq!(sweep_interval(Duration::from_secs(120)), Duration::from_secs(30));
        assert_eq!(sweep_interval(Duration::from_secs(2)), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_evicts_abandoned_sessions() {
        let sessions = Arc::new(
            SessionManager::new(4, GenerationParams::default())
                .with_idle_ttl(Duration::from_secs(60)),
        );
        let _ = sessions.create_session().unwrap();
        let token = CancellationToken::new();
        let task = spawn_idle_sweeper(
            Arc::clone(&sessions),
            Duration::from_secs(15),
            token.clone(),
        );

        tokio::time::sleep(Duration::from_secs(90)).await;
        assert_eq!(sessions.active_count(), 0);

        token.cancel();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn serve_stops_on_shutdown() {
        let server = Arc::new(make_server());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let task = {
            let server = Arc::clone(&server);
            tokio::spawn(async move { server.serve(listener).await })
        };
        server.shutdown().shutdown();
        task.await.unwrap().unwrap();
    }
}
