use geminizer::gateway::types::SystemStatus;
use geminizer::gateway::{Endpoint, Gateway, HttpGateway, fetch};
use geminizer::session::{FileKeyValueStore, IDENTITY_KEY, Identity, SessionStore, TOKEN_KEY};
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn login_then_logout_leaves_no_credentials_on_disk() {
    let tmp = TempDir::new().unwrap();
    let store_path = tmp.path().join("session.json");
    let store = SessionStore::open(FileKeyValueStore::new(&store_path));

    store
        .login(Identity::new("studio-admin"), "tok-abc")
        .unwrap();
    let on_disk = std::fs::read_to_string(&store_path).unwrap();
    assert!(on_disk.contains(TOKEN_KEY));
    assert!(on_disk.contains(IDENTITY_KEY));

    store.logout().unwrap();
    let on_disk: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    assert!(!on_disk.contains_key(TOKEN_KEY));
    assert!(!on_disk.contains_key(IDENTITY_KEY));
    assert!(SessionStore::open(FileKeyValueStore::new(&store_path)).current().is_none());
}

#[tokio::test]
async fn restored_session_token_is_sent_as_bearer() {
    let tmp = TempDir::new().unwrap();
    let store_path = tmp.path().join("session.json");
    SessionStore::open(FileKeyValueStore::new(&store_path))
        .login(Identity::new("studio-admin"), "tok-abc")
        .unwrap();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/ai/status"))
        .and(header("authorization", "Bearer tok-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "overall_health": 0.91,
            "average_performance": 0.84,
            "system_load": 0.2,
            "agents_used": 2,
            "total_agents": 5
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = SessionStore::open(FileKeyValueStore::new(&store_path));
    let gateway = HttpGateway::new(&server.uri(), Duration::from_secs(5), Duration::from_secs(2))
        .unwrap()
        .with_bearer_token(session.token().as_deref());

    let status: SystemStatus = fetch(&gateway as &dyn Gateway, Endpoint::AiStatus)
        .await
        .unwrap();

    assert_eq!(status.total_agents, 5);
    server.verify().await;
}
