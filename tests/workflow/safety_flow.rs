use crate::support::gateway;
use geminizer::safety::{SafetyMonitor, SafetyStatus};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn empty_draft_stays_idle_without_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/safety/check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"is_safe": true})))
        .expect(0)
        .mount(&server)
        .await;

    let monitor = SafetyMonitor::new(gateway(&server), Duration::ZERO);
    monitor.on_draft_changed("");
    monitor.on_draft_changed("   ");
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(monitor.snapshot().status, SafetyStatus::Idle);
    server.verify().await;
}

#[tokio::test]
async fn latest_draft_wins_against_slow_earlier_check() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/safety/check"))
        .and(body_json(json!({"prompt": "draft one"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"is_safe": false, "issues": ["stale issue"]}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/safety/check"))
        .and(body_json(json!({"prompt": "draft two"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"is_safe": true})))
        .mount(&server)
        .await;

    let monitor = SafetyMonitor::new(gateway(&server), Duration::ZERO);
    monitor.on_draft_changed("draft one");
    tokio::time::sleep(Duration::from_millis(30)).await;
    let latest = monitor.on_draft_changed("draft two");

    let settled = monitor.settled().await;
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(settled.sequence, latest);
    assert_eq!(settled.status, SafetyStatus::Safe);
    let now = monitor.snapshot();
    assert_eq!(now.draft, "draft two");
    assert_eq!(now.status, SafetyStatus::Safe);
    assert!(now.issues.is_empty());
}

#[tokio::test]
async fn transport_failure_enters_error_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/safety/check"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let monitor = SafetyMonitor::new(gateway(&server), Duration::ZERO);
    monitor.on_draft_changed("wet silk");

    let snapshot = monitor.settled().await;

    assert_eq!(snapshot.status, SafetyStatus::Error);
    assert!(snapshot.issues.is_empty());
    assert!(snapshot.error.is_some());
}
