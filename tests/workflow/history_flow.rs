use crate::support::{gateway, history_entry};
use geminizer::error::HistoryError;
use geminizer::history::HistorySynchronizer;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn refresh_is_idempotent_without_mutation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            history_entry("g3", "third"),
            history_entry("g2", "second"),
            history_entry("g1", "first"),
        ])))
        .expect(2)
        .mount(&server)
        .await;

    let history = HistorySynchronizer::new(gateway(&server));

    let first = history.refresh().await.unwrap();
    let second = history.refresh().await.unwrap();

    assert_eq!(first, second);
    let ids: Vec<&str> = second.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["g3", "g2", "g1"]);
    server.verify().await;
}

#[tokio::test]
async fn failed_delete_surfaces_error_and_keeps_entry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/history"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([history_entry("g1", "first")])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/history/g1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db locked"))
        .expect(1)
        .mount(&server)
        .await;

    let history = HistorySynchronizer::new(gateway(&server));
    history.refresh().await.unwrap();

    let err = history.remove("g1").await.unwrap_err();

    assert!(matches!(err, HistoryError::Service(ref e) if e.status() == Some(500)));
    assert_eq!(history.entries().len(), 1);
    server.verify().await;
}

#[tokio::test]
async fn successful_delete_refreshes_from_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            history_entry("g2", "second"),
            history_entry("g1", "first"),
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/history"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([history_entry("g1", "first")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/history/g2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let history = HistorySynchronizer::new(gateway(&server));
    history.refresh().await.unwrap();

    history.remove("g2").await.unwrap();

    let entries = history.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, "g1");
    server.verify().await;
}
