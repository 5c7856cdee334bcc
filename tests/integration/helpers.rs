//! Test helpers and utilities

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use tokio::net::TcpListener;

use healthcheck::config::Config;
use healthcheck::pause::{FilePauseStore, MemoryPauseStore, PauseStore};
use healthcheck::probe::{Backends, Probe, ProbeBase, ProbeResult};
use healthcheck::registry::{OutputRegistry, ProbeRegistry};
use healthcheck::{Healthcheck, Server};

pub const SECRET: &str = "s3cr3t";

/// Probe with a fixed outcome.
pub struct FixedProbe {
    base: ProbeBase,
    fail: bool,
}

impl FixedProbe {
    pub fn passing(identifier: &str) -> Self {
        Self {
            base: ProbeBase::new(identifier, identifier),
            fail: false,
        }
    }

    pub fn failing(identifier: &str) -> Self {
        Self {
            base: ProbeBase::new(identifier, identifier),
            fail: true,
        }
    }
}

#[async_trait]
impl Probe for FixedProbe {
    fn identifier(&self) -> &str {
        self.base.identifier()
    }

    fn title(&self) -> &str {
        self.base.title()
    }

    async fn run(&mut self) {
        self.base.start();
        if self.fail {
            self.base.error(format!("{} is broken", self.base.identifier()));
        } else {
            self.base.success(format!("{} is fine", self.base.identifier()));
        }
        self.base.stop();
    }

    fn result(&self) -> &ProbeResult {
        self.base.result()
    }
}

/// Server setup, adjusted per test before `start`.
pub struct TestSetup {
    pub config: Config,
    pub registry: ProbeRegistry,
    pub backends: Backends,
    pub pause_file: Option<PathBuf>,
}

#[allow(dead_code)]
impl TestSetup {
    /// `ok` and `broken` probes registered, `ok` configured, every caller allowed.
    pub fn new() -> Self {
        let mut config = Config::default();
        config.server.secret = SECRET.to_string();
        config.server.allowed_ips = "*".to_string();
        config.healthcheck.probes = vec!["ok".to_string()];

        let mut registry = ProbeRegistry::with_defaults();
        registry.register("ok", |_| Box::new(FixedProbe::passing("OkProbe")));
        registry.register("broken", |_| Box::new(FixedProbe::failing("BrokenProbe")));

        Self {
            config,
            registry,
            backends: Backends::default(),
            pause_file: None,
        }
    }

    pub fn probes(mut self, keys: &[&str]) -> Self {
        self.config.healthcheck.probes = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn debug(mut self) -> Self {
        self.config.healthcheck.debug = true;
        self
    }

    pub fn allowed_ips(mut self, list: &str) -> Self {
        self.config.server.allowed_ips = list.to_string();
        self
    }

    pub fn backends(mut self, backends: Backends) -> Self {
        self.backends = backends;
        self
    }

    pub fn pause_file(mut self, path: PathBuf) -> Self {
        self.pause_file = Some(path);
        self
    }

    pub async fn start(self) -> TestServer {
        let pause_store: Arc<dyn PauseStore> = match self.pause_file {
            Some(path) => Arc::new(FilePauseStore::new(path)),
            None => Arc::new(MemoryPauseStore::new()),
        };

        let engine = Healthcheck::new(
            &self.config,
            self.registry,
            OutputRegistry::with_defaults(),
            pause_store,
            self.backends,
        );

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local address");

        let server = Server::new(self.config.server.clone(), engine);
        let handle = tokio::spawn(async move {
            let _ = server.run(listener).await;
        });

        TestServer {
            base_url: format!("http://{}", addr),
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
            handle,
        }
    }
}

/// Running in-process server.
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    handle: tokio::task::JoinHandle<()>,
}

#[allow(dead_code)]
impl TestServer {
    /// Make a GET request to the server
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// GET the healthcheck in `format`.
    pub async fn healthcheck(&self, format: &str) -> Response {
        self.get(&format!("/healthcheck/{}/{}", SECRET, format)).await
    }

    /// GET the JSON healthcheck and parse it.
    pub async fn healthcheck_json(&self) -> (reqwest::StatusCode, serde_json::Value) {
        let resp = self.healthcheck("json").await;
        let status = resp.status();
        let json = resp.json().await.expect("Body is not JSON");
        (status, json)
    }

    pub async fn pause(&self, probe: &str) -> Response {
        self.get(&format!("/healthcheck-pause/{}/?probe={}", SECRET, probe))
            .await
    }

    pub async fn play(&self, probe: &str) -> Response {
        self.get(&format!("/healthcheck-play/{}/?probe={}", SECRET, probe))
            .await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Assert that response has expected status
pub fn assert_status(response: &Response, expected: reqwest::StatusCode) {
    assert_eq!(
        response.status(),
        expected,
        "Expected status {}, got {}",
        expected,
        response.status()
    );
}

/// Assert that response contains header with prefix
pub fn assert_header_starts_with(response: &Response, name: &str, prefix: &str) {
    let value = response
        .headers()
        .get(name)
        .unwrap_or_else(|| panic!("Header '{}' not found", name))
        .to_str()
        .unwrap();
    assert!(
        value.starts_with(prefix),
        "Header '{}' expected to start with '{}', got '{}'",
        name,
        prefix,
        value
    );
}

/// Assert that response body contains substring
pub async fn assert_body_contains(response: Response, substring: &str) {
    let body = response.text().await.expect("Failed to read body");
    assert!(
        body.contains(substring),
        "Body does not contain '{}'. Body: {}",
        substring,
        &body[..body.len().min(500)]
    );
}
