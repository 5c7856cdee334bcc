//! Healthcheck endpoint tests
//!
//! Status codes, formats and configuration errors.

use crate::helpers::*;
use reqwest::StatusCode;

#[tokio::test]
async fn test_liveness() {
    let server = TestSetup::new().start().await;
    let resp = server.get("/health").await;

    assert_status(&resp, StatusCode::OK);
    assert_header_starts_with(&resp, "content-type", "application/json");
    assert_body_contains(resp, r#""status":"ok""#).await;
}

#[tokio::test]
async fn test_healthy_json() {
    let server = TestSetup::new().start().await;
    let (status, json) = server.healthcheck_json().await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "success");
    assert_eq!(json["probes"][0]["identifier"], "OkProbe");
    assert_eq!(json["probes"][0]["messages"][0]["text"], "OkProbe is fine");
    assert!(json["probes"][0]["duration"].is_number());
}

#[tokio::test]
async fn test_failing_probe_is_503() {
    let server = TestSetup::new().probes(&["ok", "broken"]).start().await;
    let (status, json) = server.healthcheck_json().await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], "error");
    assert_eq!(json["probes"][0]["status"], "success");
    assert_eq!(json["probes"][1]["status"], "error");
}

#[tokio::test]
async fn test_default_format_is_html() {
    let server = TestSetup::new().start().await;
    let resp = server.get(&format!("/healthcheck/{}/", SECRET)).await;

    assert_status(&resp, StatusCode::OK);
    assert_header_starts_with(&resp, "content-type", "text/html");
    assert_body_contains(resp, "OkProbe is fine").await;
}

#[tokio::test]
async fn test_no_store() {
    let server = TestSetup::new().start().await;
    let resp = server.healthcheck("json").await;

    assert_eq!(
        resp.headers().get("cache-control").unwrap().to_str().unwrap(),
        "no-store"
    );
}

#[tokio::test]
async fn test_unknown_format_is_generic_503() {
    let server = TestSetup::new().start().await;
    let resp = server.healthcheck("xml").await;

    assert_status(&resp, StatusCode::SERVICE_UNAVAILABLE);
    assert_header_starts_with(&resp, "content-type", "text/plain");
    assert_body_contains(resp, "not configured correctly").await;
}

#[tokio::test]
async fn test_unknown_probe_detail_in_debug() {
    let server = TestSetup::new().probes(&["ok", "redis"]).debug().start().await;
    let resp = server.healthcheck("json").await;

    assert_status(&resp, StatusCode::SERVICE_UNAVAILABLE);
    assert_body_contains(resp, "probe 'redis' is not registered").await;
}

#[tokio::test]
async fn test_no_probes_configured() {
    let server = TestSetup::new().probes(&[]).debug().start().await;
    let resp = server.healthcheck("json").await;

    assert_status(&resp, StatusCode::SERVICE_UNAVAILABLE);
    assert_body_contains(resp, "no probes configured").await;
}

#[tokio::test]
async fn test_inapplicable_probes_are_left_out() {
    // No backends: database and scheduler probes do not apply.
    let server = TestSetup::new()
        .probes(&["database", "scheduler", "ok"])
        .start()
        .await;
    let (status, json) = server.healthcheck_json().await;

    assert_eq!(status, StatusCode::OK);
    let probes = json["probes"].as_array().unwrap();
    assert_eq!(probes.len(), 1);
    assert_eq!(probes[0]["identifier"], "OkProbe");
}

#[tokio::test]
async fn test_dummy_output() {
    let mut setup = TestSetup::new();
    setup
        .config
        .healthcheck
        .outputs
        .push(("dummy".to_string(), "dummy".to_string()));
    let server = setup.start().await;

    let resp = server.healthcheck("dummy").await;
    assert_status(&resp, StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "[]");
}
