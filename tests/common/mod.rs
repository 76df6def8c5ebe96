//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::Value;
use task_api::config::AppConfig;
use task_api::http::HttpServer;
use task_api::lifecycle::Shutdown;
use task_api::store::Database;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// A running server on an ephemeral port, backed by a scratch database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    pub database: Arc<Database>,
    pub dir: TempDir,
    shutdown: Shutdown,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// POST /tasks with a JSON body.
    #[allow(dead_code)]
    pub async fn create(&self, body: Value) -> reqwest::Response {
        self.client
            .post(self.url("/tasks"))
            .json(&body)
            .send()
            .await
            .expect("server unreachable")
    }

    /// GET `path` and decode the JSON array it returns.
    pub async fn list(&self, path: &str) -> Vec<Value> {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("server unreachable");
        assert_eq!(res.status(), 200);
        res.json().await.expect("list body is not JSON")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Boot the server with default config, a temp database and temp upload dir.
pub async fn spawn_app() -> TestApp {
    let dir = TempDir::new().unwrap();

    let mut config = AppConfig::default();
    config.storage.database_path = dir.path().join("db.json");
    config.import.tmp_dir = dir.path().join("tmp");

    let database = Arc::new(
        Database::open(&config.storage.database_path)
            .await
            .unwrap(),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config, database.clone()).unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap();

    TestApp {
        addr,
        client,
        database,
        dir,
        shutdown,
    }
}
