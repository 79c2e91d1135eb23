//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates an in-memory DB, default config,
//! session store, and full [`AppContext`]. The [`with_server_config`]
//! constructor starts Axum on a random port for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use fluidbean::config::Config;
use fluidbean::server::sessions::SessionStore;
use fluidbean::server::{create_router, AppContext};
use fluidbean_engine::pool::init_memory_pool;

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory database.
pub struct TestHarness {
    pub ctx: AppContext,
}

impl TestHarness {
    /// Create a new harness with default configuration and in-memory DB.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new harness with a custom configuration and in-memory DB.
    pub fn with_config(config: Config) -> Self {
        let db_pool = init_memory_pool().expect("failed to create in-memory pool");
        let ctx = AppContext {
            config: Arc::new(config),
            sessions: Arc::new(SessionStore::default()),
            db_pool,
        };
        Self { ctx }
    }

    /// Config with login credentials set, for auth flows.
    pub fn auth_config(username: &str, password: &str) -> Config {
        let mut config = Config::default();
        config.auth.username = Some(username.to_string());
        config.auth.password = Some(password.to_string());
        config
    }

    /// Start the server on a random port and return the harness and the
    /// bound address.
    pub async fn with_server_config(config: Config) -> (Self, SocketAddr) {
        let harness = Self::with_config(config);
        let app = create_router(harness.ctx.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind test listener");
        let addr = listener.local_addr().expect("failed to read local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server failed");
        });
        (harness, addr)
    }

    /// Start the server with default configuration.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::with_server_config(Config::default()).await
    }
}

/// A reqwest client that keeps cookies and never follows redirects, so
/// tests can assert on the redirect responses themselves.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("failed to build test client")
}
