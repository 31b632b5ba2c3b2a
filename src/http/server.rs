//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (panic catcher, request ID, tracing, CORS,
//!   security headers, body limit, timeout)
//! - Own the rate limiter and its sweeper task
//! - Bind server to listener and shut down gracefully

use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::Request;
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::RelayConfig;
use crate::contact::ContactRelay;
use crate::http::handlers::{health, not_found, send_email, AppState};
use crate::http::response::internal_error;
use crate::http::X_REQUEST_ID;
use crate::lifecycle::signals::shutdown_signal;
use crate::mail::{DispatchSettings, MailDispatcher, MailTransport, MemoryTransport, SmtpTransport, TransportError};
use crate::security::cors::cors_layer;
use crate::security::headers::with_security_headers;
use crate::security::rate_limit::{spawn_sweeper, RateLimiter};

/// HTTP server for the contact relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
    limiter: Option<Arc<RateLimiter>>,
}

impl HttpServer {
    /// Create a server that delivers through the configured transport:
    /// SMTP, or a logging in-memory transport when `mail.dry_run` is set.
    pub fn new(config: RelayConfig) -> Result<Self, TransportError> {
        let transport: Arc<dyn MailTransport> = if config.mail.dry_run {
            Arc::new(MemoryTransport::logging())
        } else {
            Arc::new(SmtpTransport::from_config(&config.mail)?)
        };
        Ok(Self::with_transport(config, transport))
    }

    /// Create a server around an existing transport.
    pub fn with_transport(config: RelayConfig, transport: Arc<dyn MailTransport>) -> Self {
        let limiter = config
            .rate_limit
            .enabled
            .then(|| Arc::new(RateLimiter::from_config(&config.rate_limit)));
        Self::with_parts(config, transport, limiter)
    }

    /// Create a server around an existing transport and limiter.
    pub fn with_parts(
        config: RelayConfig,
        transport: Arc<dyn MailTransport>,
        limiter: Option<Arc<RateLimiter>>,
    ) -> Self {
        let dispatcher = MailDispatcher::new(transport, DispatchSettings::from(&config.mail));
        let state = AppState {
            relay: ContactRelay::new(dispatcher, limiter.clone()),
            trust_forwarded_for: config.rate_limit.trust_forwarded_for,
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            limiter,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let router = Router::new()
            .route("/api/send-email", post(send_email).fallback(not_found))
            .route("/api/health", get(health).fallback(not_found))
            .fallback(not_found)
            .with_state(state)
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(cors_layer(&config.cors));

        let router = if config.security.enable_headers {
            with_security_headers(router)
        } else {
            router
        };

        router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id,
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(CatchPanicLayer::custom(panic_response))
    }

    /// Run the server until `shutdown` fires or the process is signalled.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            rate_limit = self.limiter.is_some(),
            dry_run = self.config.mail.dry_run,
            "HTTP server starting"
        );

        let sweeper = self
            .limiter
            .clone()
            .map(|limiter| spawn_sweeper(limiter, shutdown.resubscribe()));

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown_signal() => {}
                    _ = shutdown.recv() => {
                        tracing::info!("Shutdown requested");
                    }
                }
            })
            .await?;

        if let Some(sweeper) = sweeper {
            sweeper.abort();
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router.
    ///
    /// `POST /api/send-email` reads the peer address from `ConnectInfo`, so
    /// whoever serves this must use `into_make_service_with_connect_info`
    /// (or insert `ConnectInfo<SocketAddr>` into each request), as [`run`]
    /// does.
    ///
    /// [`run`]: HttpServer::run
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn limiter(&self) -> Option<&Arc<RateLimiter>> {
        self.limiter.as_ref()
    }
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "Handler panicked");
    internal_error()
}
