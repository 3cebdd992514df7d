//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use route_dispatch::config::ServerConfig;
use route_dispatch::http::{HttpServer, ServerError, ServerState};
use route_dispatch::routing::DispatchTable;
use tokio::task::JoinHandle;

/// A server bound to an ephemeral localhost port.
pub struct TestServer {
    pub server: Arc<HttpServer>,
    pub addr: SocketAddr,
    pub task: JoinHandle<Result<(), ServerError>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub fn server_config(name: &str) -> ServerConfig {
    ServerConfig {
        name: name.into(),
        host: "127.0.0.1".into(),
        port: 0,
        ..Default::default()
    }
}

/// Spawn `server` and wait until it is accepting connections.
pub async fn start_server(server: HttpServer) -> TestServer {
    let server = Arc::new(server);
    let task = tokio::spawn({
        let server = server.clone();
        async move { server.run().await }
    });

    let addr = tokio::time::timeout(Duration::from_secs(5), server.listening())
        .await
        .expect("server did not bind in time")
        .expect("server stopped before binding");
    wait_for_state(&server, ServerState::Running).await;

    TestServer { server, addr, task }
}

pub async fn start(config: ServerConfig, table: DispatchTable) -> TestServer {
    start_server(HttpServer::new(&config, table).unwrap()).await
}

pub async fn wait_for_state(server: &HttpServer, expected: ServerState) {
    for _ in 0..100 {
        if server.state() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("server never reached {expected:?}, stuck in {:?}", server.state());
}

/// Collects formatted log output of the current thread's subscriber.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Route this thread's `tracing` events into the capture until the guard
    /// drops. Pair with a current-thread runtime so server tasks log here too.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.contents().matches(needle).count()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
