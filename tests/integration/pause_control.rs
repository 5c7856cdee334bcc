//! Pause and play endpoint tests

use crate::helpers::*;
use reqwest::StatusCode;

#[tokio::test]
async fn test_paused_failure_does_not_count() {
    let server = TestSetup::new().probes(&["ok", "broken"]).start().await;
    assert_eq!(server.healthcheck_json().await.0, StatusCode::SERVICE_UNAVAILABLE);

    let resp = server.pause("BrokenProbe").await;
    assert_status(&resp, StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), r#"["success"]"#);

    let (status, json) = server.healthcheck_json().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "success");
    assert_eq!(json["probes"][1]["paused"], true);
    assert_eq!(json["probes"][1]["status"], "error");
}

#[tokio::test]
async fn test_play_resumes_probe() {
    let server = TestSetup::new().probes(&["broken"]).start().await;

    server.pause("BrokenProbe").await;
    assert_eq!(server.healthcheck_json().await.0, StatusCode::OK);

    let resp = server.play("BrokenProbe").await;
    assert_status(&resp, StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), r#"["success"]"#);

    assert_eq!(server.healthcheck_json().await.0, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_missing_probe_parameter() {
    let server = TestSetup::new().start().await;
    let resp = server
        .get(&format!("/healthcheck-pause/{}/", SECRET))
        .await;

    assert_status(&resp, StatusCode::BAD_REQUEST);
    assert_eq!(resp.text().await.unwrap(), r#"["error"]"#);
}

#[tokio::test]
async fn test_pause_flags_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paused.json");

    let server = TestSetup::new()
        .probes(&["broken"])
        .pause_file(path.clone())
        .start()
        .await;
    server.pause("BrokenProbe").await;
    drop(server);

    let server = TestSetup::new()
        .probes(&["broken"])
        .pause_file(path)
        .start()
        .await;
    let (status, json) = server.healthcheck_json().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["probes"][0]["paused"], true);
}
