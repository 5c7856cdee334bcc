//! Secret and IP allow-list tests

use crate::helpers::*;
use reqwest::StatusCode;

#[tokio::test]
async fn test_wrong_secret_is_refused() {
    let server = TestSetup::new().start().await;
    let resp = server.get("/healthcheck/guess/json").await;

    assert_status(&resp, StatusCode::FORBIDDEN);
    assert_eq!(resp.text().await.unwrap(), "Access denied");
}

#[tokio::test]
async fn test_reason_shown_in_debug() {
    let server = TestSetup::new().debug().start().await;
    let resp = server.get("/healthcheck/guess/json").await;

    assert_status(&resp, StatusCode::FORBIDDEN);
    assert_body_contains(resp, "secret does not match").await;
}

#[tokio::test]
async fn test_ip_not_in_allow_list() {
    let server = TestSetup::new().allowed_ips("10.0.0.0/8").debug().start().await;
    let resp = server.healthcheck("json").await;

    assert_status(&resp, StatusCode::FORBIDDEN);
    assert_body_contains(resp, "caller IP is not allowed").await;
}

#[tokio::test]
async fn test_empty_allow_list_refuses_everyone() {
    let server = TestSetup::new().allowed_ips("").start().await;
    assert_status(&server.healthcheck("json").await, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_loopback_pattern_allowed() {
    let server = TestSetup::new().allowed_ips("127.*.*.*").start().await;
    assert_status(&server.healthcheck("json").await, StatusCode::OK);
}

#[tokio::test]
async fn test_pause_requires_secret() {
    let server = TestSetup::new().start().await;
    let resp = server.get("/healthcheck-pause/guess/?probe=OkProbe").await;

    assert_status(&resp, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_path() {
    let server = TestSetup::new().start().await;
    assert_status(&server.get("/").await, StatusCode::NOT_FOUND);
    assert_status(&server.get("/status/s3cr3t/json").await, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_post_not_allowed() {
    let server = TestSetup::new().start().await;
    let resp = server
        .client
        .post(format!("{}/healthcheck/{}/json", server.base_url, SECRET))
        .send()
        .await
        .unwrap();

    assert_status(&resp, StatusCode::METHOD_NOT_ALLOWED);
}
