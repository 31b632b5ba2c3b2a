//! Shared helpers for integration tests.

use contact_relay::config::RelayConfig;
use contact_relay::mail::MemoryTransport;
use contact_relay::security::{ManualClock, RateLimiter};
use contact_relay::{HttpServer, Shutdown};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct TestServer {
    pub addr: SocketAddr,
    pub transport: MemoryTransport,
    pub shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn operator(&self) -> &'static str {
        "owner@example.com"
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Config pointing at a fake mailbox; the transport is always in-memory.
pub fn test_config() -> RelayConfig {
    let mut config = RelayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.mail.username = "relay@example.com".into();
    config.mail.password = "unused".into();
    config.mail.operator_address = "owner@example.com".into();
    config
}

/// Start a server on an ephemeral port.
pub async fn start_server(config: RelayConfig) -> TestServer {
    let transport = MemoryTransport::new();
    let server = HttpServer::with_transport(config, Arc::new(transport.clone()));
    spawn(server, transport).await
}

/// Start a server whose limiter runs on a manual clock.
#[allow(dead_code)]
pub async fn start_server_with_clock(config: RelayConfig, clock: ManualClock) -> TestServer {
    let limiter = RateLimiter::with_clock(
        config.rate_limit.max_requests,
        config.rate_limit.window(),
        Arc::new(clock),
    );
    let transport = MemoryTransport::new();
    let server = HttpServer::with_parts(config, Arc::new(transport.clone()), Some(Arc::new(limiter)));
    spawn(server, transport).await
}

async fn spawn(server: HttpServer, transport: MemoryTransport) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer {
        addr,
        transport,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

#[allow(dead_code)]
pub fn jane() -> Value {
    json!({
        "name": "Jane",
        "email": "jane@example.com",
        "subject": "Hi",
        "message": "Hello"
    })
}
