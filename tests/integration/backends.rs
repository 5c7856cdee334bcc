//! Built-in probes wired to backends
//!
//! The Solr core check runs its real HTTP pinger against a wiremock server.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::StatusCode;
use tokio::net::TcpListener;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use healthcheck::config::SolrCoreEndpoint;
use healthcheck::probe::{
    BackendError, Backends, HttpCorePinger, ScheduledTask, StaticSites, TaskRepository,
};

use crate::helpers::*;

struct Tasks(Vec<ScheduledTask>);

#[async_trait]
impl TaskRepository for Tasks {
    async fn active_tasks(&self) -> Result<Vec<ScheduledTask>, BackendError> {
        Ok(self.0.clone())
    }
}

/// Solr stand-in whose core `core` answers pings with `body`.
async fn solr_mock(core: &str, body: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/solr/{}/admin/ping", core)))
        .and(query_param("wt", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;
    server
}

fn solr_backends(core_url: String) -> Backends {
    let sites = StaticSites::from_endpoints(&[SolrCoreEndpoint {
        site: "main".to_string(),
        language: "en".to_string(),
        url: core_url,
    }])
    .unwrap();

    Backends::new()
        .with_solr_sites(Arc::new(sites))
        .with_solr_pinger(Arc::new(HttpCorePinger::new()))
}

#[tokio::test]
async fn test_scheduler_reports_late_task() {
    let tasks = Tasks(vec![
        ScheduledTask::new(1, "Index queue worker")
            .with_next_execution(Utc::now() + Duration::minutes(5)),
        ScheduledTask::new(2, "Garbage collection")
            .with_next_execution(Utc::now() - Duration::minutes(45)),
    ]);

    let server = TestSetup::new()
        .probes(&["scheduler"])
        .backends(Backends::new().with_scheduler(Arc::new(tasks)))
        .start()
        .await;
    let (status, json) = server.healthcheck_json().await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let messages = json["probes"][0]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["status"], "success");
    assert_eq!(messages[1]["status"], "error");
    assert!(messages[1]["text"]
        .as_str()
        .unwrap()
        .contains("Garbage collection"));
}

#[tokio::test]
async fn test_scheduler_without_tasks_is_healthy() {
    let server = TestSetup::new()
        .probes(&["scheduler"])
        .backends(Backends::new().with_scheduler(Arc::new(Tasks(vec![]))))
        .start()
        .await;
    let (status, json) = server.healthcheck_json().await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "success");
    assert_eq!(json["probes"].as_array().unwrap().len(), 1);

    let messages = json["probes"][0]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["status"], "success");
    assert_eq!(messages[0]["text"], "No scheduler tasks configured");
}

#[tokio::test]
async fn test_solr_core_reachable() {
    let solr = solr_mock(
        "core_en",
        serde_json::json!({"responseHeader": {"status": 0}, "status": "OK"}),
    )
    .await;
    let server = TestSetup::new()
        .probes(&["solr_core"])
        .backends(solr_backends(format!("{}/solr/core_en", solr.uri())))
        .start()
        .await;
    let (status, json) = server.healthcheck_json().await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["probes"][0]["identifier"], "SolrCoreProbe");
    assert!(json["probes"][0]["messages"][0]["text"]
        .as_str()
        .unwrap()
        .ends_with("is reachable"));
}

#[tokio::test]
async fn test_solr_core_invalid_response() {
    let solr = solr_mock("core_de", serde_json::json!({"error": "core not loaded"})).await;
    let server = TestSetup::new()
        .probes(&["solr_core"])
        .backends(solr_backends(format!("{}/solr/core_de", solr.uri())))
        .start()
        .await;
    let (status, json) = server.healthcheck_json().await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(json["probes"][0]["messages"][0]["text"]
        .as_str()
        .unwrap()
        .ends_with("returned an invalid response"));
}

#[tokio::test]
async fn test_solr_core_unreachable() {
    // Bind and release a port so nothing listens on it.
    let closed = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let server = TestSetup::new()
        .probes(&["solr_core"])
        .backends(solr_backends(format!("http://{}/solr/core_en", closed)))
        .start()
        .await;
    let (status, json) = server.healthcheck_json().await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(json["probes"][0]["messages"][0]["text"]
        .as_str()
        .unwrap()
        .ends_with("is not reachable"));
}
