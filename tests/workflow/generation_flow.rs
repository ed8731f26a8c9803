use crate::support::{gateway, generated, history_entry, safe_verdict};
use geminizer::error::{GenerationError, GenerationErrorKind};
use geminizer::generation::GenerationController;
use geminizer::history::HistorySynchronizer;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn options(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[tokio::test]
async fn generation_commits_result_and_history_grows_by_one() {
    let server = MockServer::start().await;
    let prompt = "soaked fabric with water saturation";

    Mock::given(method("POST"))
        .and(path("/api/v1/safety/check"))
        .and(body_json(json!({"prompt": prompt})))
        .respond_with(ResponseTemplate::new(200).set_body_json(safe_verdict()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/generate"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "prompt": prompt,
            "options": {"archetype": "athletic", "lighting": "golden hour"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(generated("req-77", b"\xff\xd8img")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/history"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"history": [history_entry("g1", "earlier")]})),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"history": [
            history_entry("req-77", prompt),
            history_entry("g1", "earlier"),
        ]})))
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let history = HistorySynchronizer::new(Arc::clone(&gateway));
    let controller = GenerationController::new(gateway).with_history(Arc::clone(&history));

    let before = history.refresh().await.unwrap().len();
    let result = controller
        .generate(
            prompt,
            options(&[("archetype", "athletic"), ("lighting", "golden hour")]),
        )
        .await
        .unwrap();
    let after = history.refresh().await.unwrap();

    assert_eq!(result.request_id, "req-77");
    assert!(!result.enriched_prompt.is_empty());
    assert_eq!(result.image_data, b"\xff\xd8img");
    assert_eq!(after.len(), before + 1);
    assert_eq!(after[0].id, "req-77");
    server.verify().await;
}

#[tokio::test]
async fn failed_retry_leaves_previous_result_in_place() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/generate"))
        .and(body_partial_json(json!({"prompt": "first"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(generated("req-1", b"one")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/generate"))
        .and(body_partial_json(json!({"prompt": "retry"})))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let controller = GenerationController::new(gateway(&server)).with_safety_gate(false);

    let first = controller.generate("first", BTreeMap::new()).await.unwrap();
    let err = controller.generate("retry", BTreeMap::new()).await.unwrap_err();

    assert_eq!(err.kind(), GenerationErrorKind::ServiceFailure);
    assert!(err.to_string().contains("503"));
    assert_eq!(controller.current(), Some(first));
}

#[tokio::test]
async fn rapid_resubmission_keeps_only_the_newest_result() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/generate"))
        .and(body_partial_json(json!({"prompt": "older"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(generated("req-older", b"older"))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/generate"))
        .and(body_partial_json(json!({"prompt": "newer"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(generated("req-newer", b"newer")))
        .mount(&server)
        .await;

    let controller =
        Arc::new(GenerationController::new(gateway(&server)).with_safety_gate(false));

    let older = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.generate("older", BTreeMap::new()).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    let newer = controller.generate("newer", BTreeMap::new()).await.unwrap();
    let older = older.await.unwrap();

    assert!(matches!(older, Err(GenerationError::Superseded)));
    let current = controller.current().unwrap();
    assert_eq!(current, newer);
    assert_eq!(current.request_id, "req-newer");
    assert_eq!(current.image_data, b"newer");

    // Even after the slow response would have arrived, nothing changes.
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(controller.current().unwrap().request_id, "req-newer");
}

#[tokio::test]
async fn unsafe_prompt_never_reaches_generation() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/safety/check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "is_safe": false,
            "issues": ["Possible minor detected"],
            "recovery_suggestions": ["Specify an adult model"]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(generated("x", b"x")))
        .expect(0)
        .mount(&server)
        .await;

    let controller = GenerationController::new(gateway(&server));

    let err = controller.generate("p", BTreeMap::new()).await.unwrap_err();

    assert_eq!(err.kind(), GenerationErrorKind::Unsafe);
    assert!(controller.current().is_none());
    server.verify().await;
}
